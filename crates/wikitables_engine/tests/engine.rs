use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use tempfile::TempDir;
use wikitables_engine::{
    reset_output_root, Consolidator, EngineEvent, EngineHandle, ProgressSink, ScrapeError,
    ScrapeFailureKind, ScrapeOutput, Scraper,
};

const FIVE_NAMES: [&str; 5] = ["mountains", "volcanoes", "123", "nba", "films"];

/// Stands in for the external collaborator: stages one CSV per job, or fails
/// jobs on the deny list, and records the order jobs were started in.
struct ScriptedScraper {
    staging_root: PathBuf,
    fail: HashSet<String>,
    started: Arc<Mutex<Vec<String>>>,
}

impl ScriptedScraper {
    fn new(staging_root: PathBuf, fail: &[&str]) -> Self {
        Self {
            staging_root,
            fail: fail.iter().map(|name| name.to_string()).collect(),
            started: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

#[async_trait::async_trait]
impl Scraper for ScriptedScraper {
    async fn scrape(
        &self,
        _job_id: u64,
        _url: &str,
        output_name: &str,
        _sink: &dyn ProgressSink,
    ) -> Result<ScrapeOutput, ScrapeError> {
        self.started.lock().unwrap().push(output_name.to_string());
        if self.fail.contains(output_name) {
            return Err(ScrapeError::new(
                ScrapeFailureKind::NonZeroExit(2),
                "scripted failure",
            ));
        }
        let staged_dir = self.staging_root.join(output_name);
        fs::create_dir_all(&staged_dir).unwrap();
        let content = format!("rank,name\n1,{output_name}\n");
        fs::write(staged_dir.join("table-1.csv"), &content).unwrap();
        Ok(ScrapeOutput {
            output_name: output_name.to_string(),
            staged_dir,
            file_count: 1,
            byte_len: content.len() as u64,
        })
    }
}

fn run_jobs(engine: &EngineHandle, names: &[&str]) -> Vec<(u64, Result<ScrapeOutput, ScrapeError>)> {
    for (index, name) in names.iter().enumerate() {
        let url = format!("https://en.wikipedia.org/wiki/{name}");
        engine.enqueue(index as u64 + 1, url, *name);
    }

    let mut completions = Vec::new();
    while completions.len() < names.len() {
        match engine.recv().expect("engine alive") {
            EngineEvent::JobCompleted { job_id, result } => completions.push((job_id, result)),
            EngineEvent::Progress(_) => {}
        }
    }
    completions
}

#[test]
fn five_jobs_complete_in_order_and_consolidate() {
    let temp = TempDir::new().unwrap();
    let staging_root = temp.path().join("outputTables");
    let output_root = temp.path().join("output");

    let scraper = Arc::new(ScriptedScraper::new(staging_root.clone(), &[]));
    let started = scraper.started.clone();
    let engine = EngineHandle::with_scraper(scraper);

    let completions = run_jobs(&engine, &FIVE_NAMES);

    // Strictly sequential: completion events arrive in enqueue order.
    let completed_ids: Vec<_> = completions.iter().map(|(id, _)| *id).collect();
    assert_eq!(completed_ids, [1, 2, 3, 4, 5]);
    assert_eq!(*started.lock().unwrap(), FIVE_NAMES);
    assert!(completions.iter().all(|(_, result)| result.is_ok()));

    reset_output_root(&output_root).unwrap();
    let names: Vec<String> = FIVE_NAMES.iter().map(|name| name.to_string()).collect();
    let summary = Consolidator::new(&staging_root, &output_root)
        .consolidate(&names)
        .unwrap();
    assert_eq!(summary.moved, names);

    // Exactly the five job directories, each non-empty.
    let mut found: Vec<_> = fs::read_dir(&output_root)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().into_string().unwrap())
        .collect();
    found.sort();
    let mut expected: Vec<_> = FIVE_NAMES.iter().map(|name| name.to_string()).collect();
    expected.sort();
    assert_eq!(found, expected);
    for name in FIVE_NAMES {
        let staged = output_root.join(name);
        assert!(fs::read_dir(&staged).unwrap().next().is_some());
        assert!(!staging_root.join(name).exists());
    }
}

#[test]
fn a_failed_job_does_not_block_the_rest() {
    let temp = TempDir::new().unwrap();
    let staging_root = temp.path().join("outputTables");
    let output_root = temp.path().join("output");

    let scraper = Arc::new(ScriptedScraper::new(staging_root.clone(), &["123"]));
    let started = scraper.started.clone();
    let engine = EngineHandle::with_scraper(scraper);

    let completions = run_jobs(&engine, &FIVE_NAMES);

    // Every job still ran, in order.
    assert_eq!(*started.lock().unwrap(), FIVE_NAMES);
    let failed: Vec<_> = completions
        .iter()
        .filter_map(|(id, result)| result.as_ref().err().map(|err| (*id, err.kind)))
        .collect();
    assert_eq!(failed, [(3, ScrapeFailureKind::NonZeroExit(2))]);

    // Consolidation takes only the completed jobs; the failed name never
    // appears under the output root.
    let completed_names: Vec<String> = completions
        .iter()
        .filter(|(_, result)| result.is_ok())
        .map(|(_, result)| result.as_ref().unwrap().output_name.clone())
        .collect();
    reset_output_root(&output_root).unwrap();
    Consolidator::new(&staging_root, &output_root)
        .consolidate(&completed_names)
        .unwrap();

    assert!(!output_root.join("123").exists());
    assert_eq!(fs::read_dir(&output_root).unwrap().count(), 4);
}

#[test]
fn progress_events_carry_the_job_id() {
    let temp = TempDir::new().unwrap();
    let staging_root = temp.path().join("outputTables");

    struct NoisyScraper {
        inner: ScriptedScraper,
    }

    #[async_trait::async_trait]
    impl Scraper for NoisyScraper {
        async fn scrape(
            &self,
            job_id: u64,
            url: &str,
            output_name: &str,
            sink: &dyn ProgressSink,
        ) -> Result<ScrapeOutput, ScrapeError> {
            sink.emit(EngineEvent::Progress(wikitables_engine::JobProgress {
                job_id,
                stage: wikitables_engine::Stage::Scraping,
                detail: Some("working".to_string()),
            }));
            self.inner.scrape(job_id, url, output_name, sink).await
        }
    }

    let engine = EngineHandle::with_scraper(Arc::new(NoisyScraper {
        inner: ScriptedScraper::new(staging_root, &[]),
    }));
    engine.enqueue(7, "https://en.wikipedia.org/wiki/A", "solo");

    let mut progress_ids = Vec::new();
    loop {
        match engine.recv().expect("engine alive") {
            EngineEvent::Progress(progress) => progress_ids.push(progress.job_id),
            EngineEvent::JobCompleted { job_id, result } => {
                assert_eq!(job_id, 7);
                result.expect("scrape ok");
                break;
            }
        }
    }
    assert_eq!(progress_ids, [7]);
}
