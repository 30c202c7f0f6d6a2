//! Start/stop command handling around the crawl orchestrator.
//!
//! Commands arrive over an mpsc channel. At most one crawl is in flight; a
//! stop cancels it cooperatively and the crawl still exports what it has.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::crawling::{CrawlOrchestrator, CrawlReport};
use crate::domain::CrawlConfig;
use crate::infrastructure::download::Exporter;
use crate::infrastructure::notifier::{Notification, Notifier};

/// Command channel capacity for [`CrawlController::spawn`].
pub const COMMAND_BUFFER: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrawlCommand {
    Start(CrawlConfig),
    Stop,
}

struct RunningCrawl {
    cancel: CancellationToken,
    handle: JoinHandle<CrawlReport>,
}

enum Event {
    Command(Option<CrawlCommand>),
    Finished(Result<CrawlReport, JoinError>),
}

async fn finished(running: &mut Option<RunningCrawl>) -> Result<CrawlReport, JoinError> {
    match running {
        Some(crawl) => (&mut crawl.handle).await,
        None => std::future::pending().await,
    }
}

pub struct CrawlController {
    orchestrator: Arc<CrawlOrchestrator>,
    exporter: Exporter,
    notifier: Arc<dyn Notifier>,
}

impl CrawlController {
    pub fn new(
        orchestrator: Arc<CrawlOrchestrator>,
        exporter: Exporter,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            orchestrator,
            exporter,
            notifier,
        }
    }

    /// Run the controller on its own task.
    pub fn spawn(self) -> (mpsc::Sender<CrawlCommand>, JoinHandle<Vec<CrawlReport>>) {
        let (tx, rx) = mpsc::channel(COMMAND_BUFFER);
        (tx, tokio::spawn(self.run(rx)))
    }

    /// Handle commands until the channel closes, then cancel and drain any
    /// running crawl. Returns the reports of every finished crawl in order.
    pub async fn run(self, mut commands: mpsc::Receiver<CrawlCommand>) -> Vec<CrawlReport> {
        let mut reports = Vec::new();
        let mut running: Option<RunningCrawl> = None;

        loop {
            let event = tokio::select! {
                command = commands.recv() => Event::Command(command),
                result = finished(&mut running), if running.is_some() => Event::Finished(result),
            };

            match event {
                Event::Command(Some(CrawlCommand::Start(config))) => {
                    if running.is_some() {
                        let state = *self.orchestrator.state().borrow();
                        warn!("Start ignored: a crawl is already running ({:?})", state);
                        continue;
                    }
                    if let Err(e) = config.validate() {
                        warn!("Start rejected: {}", e);
                        self.notifier.notify(Notification::Rejected {
                            reason: e.to_string(),
                        });
                        continue;
                    }
                    running = Some(self.start(config));
                }
                Event::Command(Some(CrawlCommand::Stop)) => match &running {
                    Some(crawl) => {
                        info!("Stop requested");
                        crawl.cancel.cancel();
                        self.notifier.notify(Notification::Stopping);
                    }
                    None => debug!("Stop ignored: no crawl running"),
                },
                Event::Command(None) => {
                    if let Some(crawl) = running.take() {
                        info!("Command channel closed; stopping the running crawl");
                        crawl.cancel.cancel();
                        Self::collect(crawl.handle.await, &mut reports);
                    }
                    break;
                }
                Event::Finished(result) => {
                    running = None;
                    Self::collect(result, &mut reports);
                }
            }
        }

        reports
    }

    fn start(&self, config: CrawlConfig) -> RunningCrawl {
        let cancel = CancellationToken::new();
        self.notifier.notify(Notification::Started);
        info!("Starting crawl with {:?}", config);

        let orchestrator = Arc::clone(&self.orchestrator);
        let exporter = self.exporter.clone();
        let notifier = Arc::clone(&self.notifier);
        let token = cancel.clone();
        let handle = tokio::spawn(async move {
            orchestrator
                .run_and_export(&config, &token, &exporter, notifier.as_ref())
                .await
        });

        RunningCrawl { cancel, handle }
    }

    fn collect(result: Result<CrawlReport, JoinError>, reports: &mut Vec<CrawlReport>) {
        match result {
            Ok(report) => reports.push(report),
            Err(e) => error!("Crawl task failed: {}", e),
        }
    }
}
