use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::Utc;
use driver_logging::{driver_debug, driver_error, driver_info, driver_warn};
use wikitables_core::{JobOutcome, RunPlan, RunReport};
use wikitables_engine::{
    reset_output_root, write_run_manifest, Consolidator, EngineEvent, EngineHandle, ManifestEntry,
    ScrapeSettings,
};

pub struct RunOptions {
    pub scrape: ScrapeSettings,
    pub output_root: PathBuf,
}

/// Runs every job in the plan (strictly in plan order), consolidates the
/// completed ones into the output root, and writes the run manifest.
///
/// Job failures land in the report and do not abort the run; only
/// driver-level failures (consolidation, manifest IO) return an error.
pub fn execute(plan: &RunPlan, options: RunOptions) -> anyhow::Result<RunReport> {
    let staging_root = options.scrape.staging_root.clone();
    let engine = EngineHandle::new(options.scrape);
    execute_with_engine(plan, &engine, &staging_root, &options.output_root)
}

pub(crate) fn execute_with_engine(
    plan: &RunPlan,
    engine: &EngineHandle,
    staging_root: &Path,
    output_root: &Path,
) -> anyhow::Result<RunReport> {
    let mut report = RunReport::new(plan);

    for job in plan.jobs() {
        driver_info!(
            "job {}: {} <- {}",
            job.id,
            job.spec.output_name(),
            job.spec.url()
        );
        engine.enqueue(job.id, job.spec.url(), job.spec.output_name());
    }

    let mut remaining = plan.len();
    while remaining > 0 {
        let event = engine.recv().context("engine worker stopped early")?;
        match event {
            EngineEvent::Progress(progress) => {
                driver_debug!(
                    "job {} {:?} {}",
                    progress.job_id,
                    progress.stage,
                    progress.detail.as_deref().unwrap_or("")
                );
            }
            EngineEvent::JobCompleted { job_id, result } => {
                remaining -= 1;
                let outcome = match result {
                    Ok(output) => {
                        driver_info!(
                            "job {} completed: {} files under {}",
                            job_id,
                            output.file_count,
                            output.staged_dir.display()
                        );
                        JobOutcome::Completed {
                            files: output.file_count,
                            bytes: output.byte_len,
                        }
                    }
                    Err(err) => {
                        driver_warn!("job {} failed: {}", job_id, err);
                        JobOutcome::Failed {
                            reason: err.to_string(),
                        }
                    }
                };
                if !report.record(job_id, outcome) {
                    driver_warn!("dropping outcome for unknown job id {}", job_id);
                }
            }
        }
    }

    reset_output_root(output_root)
        .with_context(|| format!("resetting output root {}", output_root.display()))?;
    let completed = report.completed_names();
    Consolidator::new(staging_root, output_root)
        .consolidate(&completed)
        .context("consolidating job output")?;
    write_run_manifest(output_root, &Utc::now().to_rfc3339(), &manifest_entries(&report))
        .context("writing run manifest")?;

    log_summary(&report);
    Ok(report)
}

fn manifest_entries(report: &RunReport) -> Vec<ManifestEntry> {
    report
        .records()
        .map(|record| {
            let (files, bytes, failure) = match &record.outcome {
                Some(JobOutcome::Completed { files, bytes }) => (*files, *bytes, None),
                Some(JobOutcome::Failed { reason }) => (0, 0, Some(reason.clone())),
                None => (0, 0, Some("never reported".to_string())),
            };
            ManifestEntry {
                output_name: record.spec.output_name().to_string(),
                url: record.spec.url().to_string(),
                files,
                bytes,
                failure,
            }
        })
        .collect()
}

fn log_summary(report: &RunReport) {
    for record in report.records() {
        match &record.outcome {
            Some(JobOutcome::Completed { files, bytes }) => driver_info!(
                "  {}: completed ({} files, {} bytes)",
                record.spec.output_name(),
                files,
                bytes
            ),
            Some(JobOutcome::Failed { reason }) => {
                driver_error!("  {}: failed ({})", record.spec.output_name(), reason)
            }
            None => driver_warn!("  {}: never reported", record.spec.output_name()),
        }
    }
    let summary = report.summary();
    driver_info!("{} of {} jobs completed", summary.completed, summary.total);
}
