//! One sync run per detected export file:
//! normalize -> convert -> resolve categories -> upload -> archive.

use chrono::Local;
use pankki_core::{AmountError, CanonicalTransaction, MilliunitTransaction};
use pankki_ingest::{NormalizeError, normalize_file, write_normalized_csv};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, error, info};

use crate::archive::{ArchiveLayout, move_file, run_stamp};
use crate::builder::TransactionBuilder;
use crate::categories::build_payee_category_map;
use crate::client::BudgetApi;
use crate::error::{ArchiveError, SyncError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    Idle,
    Normalizing,
    Converting,
    ResolvingCategories,
    Uploading,
    Archiving,
    Failed,
}

impl fmt::Display for SyncState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SyncState::Idle => "idle",
            SyncState::Normalizing => "normalizing",
            SyncState::Converting => "converting",
            SyncState::ResolvingCategories => "resolving categories",
            SyncState::Uploading => "uploading",
            SyncState::Archiving => "archiving",
            SyncState::Failed => "failed",
        };
        f.write_str(s)
    }
}

#[derive(Error, Debug)]
pub enum RunError {
    #[error(transparent)]
    Normalize(#[from] NormalizeError),

    #[error(transparent)]
    Amount(#[from] AmountError),

    #[error("upload failed: {0}")]
    Upload(#[from] SyncError),

    #[error(transparent)]
    Archive(#[from] ArchiveError),
}

/// A run that ended in `Failed`, with the state it failed in.
#[derive(Error, Debug)]
#[error("sync failed while {state}: {error}")]
pub struct RunFailure {
    pub state: SyncState,
    #[source]
    pub error: RunError,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub rows: usize,
    pub uploaded: usize,
    pub duplicate_import_ids: Vec<String>,
    pub output: PathBuf,
    pub archived: PathBuf,
}

pub struct SyncOrchestrator<A> {
    api: A,
    builder: TransactionBuilder,
    layout: ArchiveLayout,
    state: SyncState,
}

impl<A: BudgetApi> SyncOrchestrator<A> {
    pub fn new(api: A, builder: TransactionBuilder, layout: ArchiveLayout) -> Self {
        Self {
            api,
            builder,
            layout,
            state: SyncState::Idle,
        }
    }

    /// State of the current or most recent run.
    pub fn state(&self) -> SyncState {
        self.state
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    fn transition(&mut self, next: SyncState) {
        debug!(from = %self.state, to = %next, "sync state");
        self.state = next;
    }

    /// Run one full sync for `input`. A failure is logged and returned; the
    /// orchestrator is ready for the next file either way.
    pub async fn process_file(&mut self, input: &Path) -> Result<RunSummary, RunFailure> {
        let stamp = run_stamp(Local::now());
        info!(input = %input.display(), "starting sync run");

        match self.run(input, &stamp).await {
            Ok(summary) => {
                self.transition(SyncState::Idle);
                info!(
                    rows = summary.rows,
                    uploaded = summary.uploaded,
                    duplicates = summary.duplicate_import_ids.len(),
                    output = %summary.output.display(),
                    "sync run complete"
                );
                Ok(summary)
            }
            Err(error) => {
                let failure = RunFailure {
                    state: self.state,
                    error,
                };
                self.transition(SyncState::Failed);
                error!(error = %failure, detail = ?failure.error, "sync run failed");
                Err(failure)
            }
        }
    }

    async fn run(&mut self, input: &Path, stamp: &str) -> Result<RunSummary, RunError> {
        self.transition(SyncState::Normalizing);
        let canonical: Vec<CanonicalTransaction> = normalize_file(input)?;
        info!(rows = canonical.len(), "statement normalized");

        self.transition(SyncState::Converting);
        let rows = canonical
            .iter()
            .map(CanonicalTransaction::to_milliunits)
            .collect::<Result<Vec<MilliunitTransaction>, _>>()?;

        self.transition(SyncState::ResolvingCategories);
        let payees = self.api.fetch_payees().await;
        let history = self.api.fetch_transaction_history().await;
        info!(payees = payees.len(), transactions = history.len(), "fetched budget metadata");
        let payee_to_category = build_payee_category_map(&history, &payees);
        info!(mappings = payee_to_category.len(), "derived payee to category mappings");
        let entries = self.builder.build(&rows, &payee_to_category);

        self.transition(SyncState::Uploading);
        let upload = self.api.bulk_upload(&entries).await?;

        self.transition(SyncState::Archiving);
        let output = self.layout.results_path(stamp);
        write_normalized_csv(&output, &canonical).map_err(|source| ArchiveError::Output {
            path: output.clone(),
            source,
        })?;
        info!(path = %output.display(), "saved normalized statement");

        let archived = self.layout.history_path(stamp);
        move_file(input, &archived)?;

        Ok(RunSummary {
            rows: rows.len(),
            uploaded: upload.submitted,
            duplicate_import_ids: upload.duplicate_import_ids,
            output,
            archived,
        })
    }
}
