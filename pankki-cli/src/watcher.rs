use pankki_ynab::{ArchiveError, BudgetApi, RunFailure, RunSummary, SyncOrchestrator, move_file};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info};

/// What one poll of the downloads directory did.
#[derive(Debug)]
pub enum PollOutcome {
    NothingFound,
    Synced(RunSummary),
    Failed(RunFailure),
}

/// Polls for a freshly downloaded export and hands it to the orchestrator.
pub struct DirectoryWatcher {
    watched: PathBuf,
    work_file: PathBuf,
    interval: Duration,
}

impl DirectoryWatcher {
    pub fn new(watched: PathBuf, work_file: PathBuf, interval: Duration) -> Self {
        Self {
            watched,
            work_file,
            interval,
        }
    }

    pub async fn poll_once<A: BudgetApi>(
        &self,
        orchestrator: &mut SyncOrchestrator<A>,
    ) -> Result<PollOutcome, ArchiveError> {
        if !self.watched.exists() {
            return Ok(PollOutcome::NothingFound);
        }

        info!(path = %self.watched.display(), "detected export, moving into work dir");
        move_file(&self.watched, &self.work_file)?;

        Ok(match orchestrator.process_file(&self.work_file).await {
            Ok(summary) => PollOutcome::Synced(summary),
            Err(failure) => PollOutcome::Failed(failure),
        })
    }

    /// Poll until Ctrl-C. Failures are logged and polling continues.
    pub async fn run<A: BudgetApi>(&self, orchestrator: &mut SyncOrchestrator<A>) {
        let ctrl_c = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "could not listen for Ctrl-C");
                std::future::pending::<()>().await;
            }
        };
        self.run_until(orchestrator, ctrl_c).await;
    }

    /// Poll until `shutdown` completes, including while a file is being
    /// processed. `shutdown` is polled from the first iteration on, so a
    /// signal it listens for is never missed between polls.
    pub async fn run_until<A: BudgetApi>(
        &self,
        orchestrator: &mut SyncOrchestrator<A>,
        shutdown: impl Future<Output = ()>,
    ) {
        info!(
            path = %self.watched.display(),
            interval_ms = self.interval.as_millis() as u64,
            "watching for export"
        );
        tokio::pin!(shutdown);

        loop {
            let outcome = tokio::select! {
                _ = &mut shutdown => {
                    info!("directory watcher interrupted by user");
                    return;
                }
                outcome = self.poll_once(orchestrator) => outcome,
            };

            match outcome {
                Ok(PollOutcome::NothingFound) => {}
                Ok(PollOutcome::Synced(_)) => info!("processing complete"),
                Ok(PollOutcome::Failed(failure)) => {
                    info!(
                        state = %failure.state,
                        file = %self.work_file.display(),
                        "run failed; re-download or re-run the file to retry"
                    );
                }
                Err(e) => error!(error = %e, "could not pick up export"),
            }

            tokio::select! {
                _ = &mut shutdown => {
                    info!("directory watcher interrupted by user");
                    return;
                }
                _ = tokio::time::sleep(self.interval) => {}
            }
        }
    }
}
