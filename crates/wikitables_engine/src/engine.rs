use std::sync::{mpsc, Arc};
use std::thread;

use crate::scrape::{ChannelProgressSink, CommandScraper, ScrapeSettings, Scraper};
use crate::{EngineEvent, JobId};

enum EngineCommand {
    Enqueue {
        job_id: JobId,
        url: String,
        output_name: String,
    },
}

/// Handle to the run worker. Enqueued jobs are serviced strictly one at a
/// time in enqueue order; a job must finish (or fail) before the next one
/// starts, since all jobs share the staging root.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(settings: ScrapeSettings) -> Self {
        Self::with_scraper(Arc::new(CommandScraper::new(settings)))
    }

    /// Runs the engine against a caller-supplied collaborator.
    pub fn with_scraper(scraper: Arc<dyn Scraper>) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().expect("tokio runtime");
            while let Ok(command) = cmd_rx.recv() {
                // block_on, not spawn: each job runs to completion before the
                // next command is taken off the queue.
                runtime.block_on(handle_command(scraper.as_ref(), command, event_tx.clone()));
            }
        });

        Self { cmd_tx, event_rx }
    }

    pub fn enqueue(
        &self,
        job_id: JobId,
        url: impl Into<String>,
        output_name: impl Into<String>,
    ) {
        let _ = self.cmd_tx.send(EngineCommand::Enqueue {
            job_id,
            url: url.into(),
            output_name: output_name.into(),
        });
    }

    /// Blocks until the next event; None once the worker has shut down.
    pub fn recv(&self) -> Option<EngineEvent> {
        self.event_rx.recv().ok()
    }
}

async fn handle_command(
    scraper: &dyn Scraper,
    command: EngineCommand,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    match command {
        EngineCommand::Enqueue {
            job_id,
            url,
            output_name,
        } => {
            driver_logging::set_job_label(&output_name);
            let sink = ChannelProgressSink::new(event_tx.clone());
            let result = scraper.scrape(job_id, &url, &output_name, &sink).await;
            let _ = event_tx.send(EngineEvent::JobCompleted { job_id, result });
            driver_logging::clear_job_label();
        }
    }
}
