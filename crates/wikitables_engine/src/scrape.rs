use std::fs;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;

use crate::{
    EngineEvent, JobId, JobProgress, ScrapeError, ScrapeFailureKind, ScrapeOutput, Stage,
};

#[derive(Debug, Clone)]
pub struct ScrapeSettings {
    /// Collaborator executable, resolved through PATH when not absolute.
    pub command: PathBuf,
    /// Arguments inserted before the per-job flags.
    pub extra_args: Vec<String>,
    /// Where the collaborator stages per-job directories.
    pub staging_root: PathBuf,
}

impl Default for ScrapeSettings {
    fn default() -> Self {
        Self {
            command: PathBuf::from("wikitablescrape"),
            extra_args: Vec::new(),
            staging_root: PathBuf::from("outputTables"),
        }
    }
}

pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct ChannelProgressSink {
    tx: std::sync::mpsc::Sender<EngineEvent>,
}

impl ChannelProgressSink {
    pub fn new(tx: std::sync::mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl ProgressSink for ChannelProgressSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

/// The collaborator seam: fetch one article and stage its tables under
/// `<staging_root>/<output_name>`.
#[async_trait::async_trait]
pub trait Scraper: Send + Sync {
    async fn scrape(
        &self,
        job_id: JobId,
        url: &str,
        output_name: &str,
        sink: &dyn ProgressSink,
    ) -> Result<ScrapeOutput, ScrapeError>;
}

/// Production collaborator adapter: runs the external scraping program as a
/// subprocess with the contract
///
/// ```text
/// <command> [extra args..] --url <url> --name <output_name> --staging-root <dir>
/// ```
///
/// stdout is streamed into progress events; stderr is kept for failure
/// messages. After a clean exit the staged directory is verified, so a
/// collaborator that silently produced nothing is still a typed failure.
#[derive(Debug, Clone)]
pub struct CommandScraper {
    settings: ScrapeSettings,
}

impl CommandScraper {
    pub fn new(settings: ScrapeSettings) -> Self {
        Self { settings }
    }
}

#[async_trait::async_trait]
impl Scraper for CommandScraper {
    async fn scrape(
        &self,
        job_id: JobId,
        url: &str,
        output_name: &str,
        sink: &dyn ProgressSink,
    ) -> Result<ScrapeOutput, ScrapeError> {
        url::Url::parse(url)
            .map_err(|err| ScrapeError::new(ScrapeFailureKind::InvalidUrl, err.to_string()))?;

        sink.emit(EngineEvent::Progress(JobProgress {
            job_id,
            stage: Stage::Launching,
            detail: Some(self.settings.command.display().to_string()),
        }));

        let mut child = Command::new(&self.settings.command)
            .args(&self.settings.extra_args)
            .arg("--url")
            .arg(url)
            .arg("--name")
            .arg(output_name)
            .arg("--staging-root")
            .arg(&self.settings.staging_root)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|err| ScrapeError::new(ScrapeFailureKind::Launch, err.to_string()))?;

        // stderr is drained on its own task so a chatty collaborator cannot
        // deadlock against the stdout loop below.
        let stderr_tail = child.stderr.take().map(|stderr| {
            tokio::spawn(async move {
                let mut lines = BufReader::new(stderr).lines();
                let mut tail = None;
                while let Ok(Some(line)) = lines.next_line().await {
                    if !line.trim().is_empty() {
                        tail = Some(line);
                    }
                }
                tail
            })
        });

        if let Some(stdout) = child.stdout.take() {
            let mut lines = BufReader::new(stdout).lines();
            while let Some(line) = lines
                .next_line()
                .await
                .map_err(|err| ScrapeError::new(ScrapeFailureKind::Io, err.to_string()))?
            {
                sink.emit(EngineEvent::Progress(JobProgress {
                    job_id,
                    stage: Stage::Scraping,
                    detail: Some(line),
                }));
            }
        }

        let status = child
            .wait()
            .await
            .map_err(|err| ScrapeError::new(ScrapeFailureKind::Io, err.to_string()))?;

        let stderr_tail = match stderr_tail {
            Some(task) => task.await.ok().flatten(),
            None => None,
        };

        match status.code() {
            Some(0) => {}
            Some(code) => {
                let message = stderr_tail
                    .unwrap_or_else(|| format!("collaborator exited with status {code}"));
                return Err(ScrapeError::new(
                    ScrapeFailureKind::NonZeroExit(code),
                    message,
                ));
            }
            None => {
                return Err(ScrapeError::new(
                    ScrapeFailureKind::Signalled,
                    stderr_tail.unwrap_or_else(|| "terminated by signal".to_string()),
                ));
            }
        }

        sink.emit(EngineEvent::Progress(JobProgress {
            job_id,
            stage: Stage::Collecting,
            detail: None,
        }));

        let staged_dir = self.settings.staging_root.join(output_name);
        let (file_count, byte_len) = measure_staged_dir(&staged_dir)?;
        if file_count == 0 {
            return Err(ScrapeError::new(
                ScrapeFailureKind::NoTables,
                format!("collaborator staged no files under {}", staged_dir.display()),
            ));
        }

        Ok(ScrapeOutput {
            output_name: output_name.to_string(),
            staged_dir,
            file_count,
            byte_len,
        })
    }
}

fn measure_staged_dir(dir: &Path) -> Result<(usize, u64), ScrapeError> {
    if !dir.is_dir() {
        return Err(ScrapeError::new(
            ScrapeFailureKind::StagingMissing,
            format!("expected staged directory at {}", dir.display()),
        ));
    }

    let mut file_count = 0usize;
    let mut byte_len = 0u64;
    let mut pending = vec![dir.to_path_buf()];
    while let Some(current) = pending.pop() {
        let entries = fs::read_dir(&current)
            .map_err(|err| ScrapeError::new(ScrapeFailureKind::Io, err.to_string()))?;
        for entry in entries {
            let entry =
                entry.map_err(|err| ScrapeError::new(ScrapeFailureKind::Io, err.to_string()))?;
            let metadata = entry
                .metadata()
                .map_err(|err| ScrapeError::new(ScrapeFailureKind::Io, err.to_string()))?;
            if metadata.is_dir() {
                pending.push(entry.path());
            } else {
                file_count += 1;
                byte_len += metadata.len();
            }
        }
    }
    Ok((file_count, byte_len))
}
