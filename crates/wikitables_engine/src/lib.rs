//! Driver engine: collaborator seam, sequential run loop, and output
//! consolidation.
mod consolidate;
mod engine;
mod manifest;
mod persist;
mod scrape;
mod types;

pub use consolidate::{reset_output_root, ConsolidateError, ConsolidateSummary, Consolidator};
pub use engine::EngineHandle;
pub use manifest::{write_run_manifest, ManifestEntry, MANIFEST_FILENAME};
pub use persist::{ensure_dir, write_atomic, PersistError};
pub use scrape::{ChannelProgressSink, CommandScraper, ProgressSink, ScrapeSettings, Scraper};
pub use types::{
    EngineEvent, JobId, JobProgress, ScrapeError, ScrapeFailureKind, ScrapeOutput, Stage,
};
