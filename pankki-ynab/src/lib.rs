//! pankki-ynab: YNAB API client, payee category inference, payload building and the sync run

pub mod archive;
pub mod builder;
pub mod categories;
pub mod client;
pub mod error;
pub mod orchestrator;

pub use archive::{ArchiveLayout, move_file, run_stamp};
pub use builder::{TransactionBuilder, import_id};
pub use categories::build_payee_category_map;
pub use client::{BudgetApi, BudgetSyncClient, Credentials, UploadSummary, DEFAULT_BASE_URL};
pub use error::{ArchiveError, SyncError};
pub use orchestrator::{RunError, RunFailure, RunSummary, SyncOrchestrator, SyncState};
