use pankki_core::{
    BudgetEntry, Milliunits, PayeeDirectory, RemoteTransaction, DEFAULT_CATEGORY_ID,
};
use pankki_ynab::{
    ArchiveLayout, BudgetApi, RunError, SyncError, SyncOrchestrator, SyncState, TransactionBuilder,
    UploadSummary,
};
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .join("fixtures")
        .join("sbank_export.csv")
}

/// In-memory stand-in for the budget service.
#[derive(Default)]
struct FakeBudget {
    payees: PayeeDirectory,
    history: Vec<RemoteTransaction>,
    reject_upload: bool,
    uploads: RefCell<Vec<Vec<BudgetEntry>>>,
}

impl BudgetApi for FakeBudget {
    async fn fetch_payees(&self) -> PayeeDirectory {
        self.payees.clone()
    }

    async fn fetch_transaction_history(&self) -> Vec<RemoteTransaction> {
        self.history.clone()
    }

    async fn bulk_upload(&self, entries: &[BudgetEntry]) -> Result<UploadSummary, SyncError> {
        self.uploads.borrow_mut().push(entries.to_vec());
        if self.reject_upload {
            return Err(SyncError::Remote {
                status: 500,
                body: "internal error".into(),
            });
        }
        Ok(UploadSummary {
            submitted: entries.len(),
            ..Default::default()
        })
    }
}

fn budget_with_history() -> FakeBudget {
    FakeBudget {
        payees: PayeeDirectory::from([
            ("p-kauppa".to_string(), "Kauppa Oy".to_string()),
            ("p-stream".to_string(), "Suoratoisto Ab".to_string()),
        ]),
        history: vec![
            RemoteTransaction {
                payee_id: Some("p-kauppa".into()),
                category_id: Some("cat-groceries".into()),
                ..Default::default()
            },
            RemoteTransaction {
                payee_id: Some("p-stream".into()),
                category_id: Some("cat-subscriptions".into()),
                ..Default::default()
            },
        ],
        ..Default::default()
    }
}

/// Copy the fixture into a fresh working dir, since a run moves its input.
fn stage_export(work: &Path, contents: Option<&str>) -> PathBuf {
    let input = work.join("export.csv");
    match contents {
        Some(text) => fs::write(&input, text).unwrap(),
        None => {
            fs::copy(fixture_path(), &input).unwrap();
        }
    }
    input
}

fn files_in(dir: &Path) -> Vec<PathBuf> {
    match fs::read_dir(dir) {
        Ok(entries) => entries.map(|e| e.unwrap().path()).collect(),
        Err(_) => Vec::new(),
    }
}

#[tokio::test]
async fn test_full_run_uploads_and_archives() {
    let work = tempfile::tempdir().unwrap();
    let input = stage_export(work.path(), None);
    let layout = ArchiveLayout::under(work.path());
    let mut orch = SyncOrchestrator::new(budget_with_history(), TransactionBuilder::default(), layout.clone());

    let summary = orch.process_file(&input).await.expect("run should succeed");
    assert_eq!(orch.state(), SyncState::Idle);
    assert_eq!(summary.rows, 7);
    assert_eq!(summary.uploaded, 7);

    let uploads = orch.api().uploads.borrow();
    assert_eq!(uploads.len(), 1);
    let entries = &uploads[0];

    let lunch = &entries[0];
    assert_eq!(lunch.amount, Milliunits(-15500));
    assert_eq!(lunch.payee_name, "Kauppa Oy");
    assert_eq!(lunch.memo, "KORTTIOSTO | Lounas");
    assert_eq!(lunch.category_id, "cat-groceries");
    assert_eq!(lunch.import_id, "YNAB:-15500:2024-01-02:1");

    let salary = &entries[1];
    assert_eq!(salary.amount, Milliunits(2_500_000));
    assert_eq!(salary.category_id, DEFAULT_CATEGORY_ID);
    assert_eq!(salary.import_id, "YNAB:2500000:2024-01-03:1");

    assert_eq!(entries[2].payee_name, "Liisa Virtanen");
    assert_eq!(entries[6].amount, Milliunits(-1_234_560));

    // Two identical E-LASKU rows share an import id; the service keeps one.
    assert_eq!(entries[4].category_id, "cat-subscriptions");
    assert_eq!(entries[4].import_id, "YNAB:-9990:2024-01-10:1");
    assert_eq!(entries[4].import_id, entries[5].import_id);

    assert!(!input.exists(), "input should be moved to history");
    assert!(summary.archived.starts_with(&layout.history_dir));
    assert!(summary.archived.exists());

    let output = fs::read_to_string(&summary.output).unwrap();
    assert!(output.starts_with("Date;Payee;Memo;Outflow;Inflow\n"));
    assert!(output.contains("2024-01-02;Kauppa Oy;KORTTIOSTO | Lounas;15,50;0,00"));
    assert_eq!(output.lines().count(), 8);
}

#[tokio::test]
async fn test_rerun_produces_identical_import_ids() {
    let mut ids = Vec::new();
    for _ in 0..2 {
        let work = tempfile::tempdir().unwrap();
        let input = stage_export(work.path(), None);
        let mut orch = SyncOrchestrator::new(
            FakeBudget::default(),
            TransactionBuilder::default(),
            ArchiveLayout::under(work.path()),
        );
        orch.process_file(&input).await.unwrap();
        let uploads = orch.api().uploads.borrow();
        ids.push(uploads[0].iter().map(|e| e.import_id.clone()).collect::<Vec<_>>());
    }
    assert_eq!(ids[0], ids[1]);
}

#[tokio::test]
async fn test_without_payees_everything_gets_default_category() {
    let work = tempfile::tempdir().unwrap();
    let input = stage_export(work.path(), None);
    let budget = FakeBudget {
        // payee fetch degraded to empty, history still present
        history: budget_with_history().history,
        ..Default::default()
    };
    let mut orch = SyncOrchestrator::new(budget, TransactionBuilder::default(), ArchiveLayout::under(work.path()));

    orch.process_file(&input).await.unwrap();
    let uploads = orch.api().uploads.borrow();
    assert!(uploads[0].iter().all(|e| e.category_id == DEFAULT_CATEGORY_ID));
}

#[tokio::test]
async fn test_headers_only_export_uploads_nothing() {
    let work = tempfile::tempdir().unwrap();
    let header = fs::read_to_string(fixture_path()).unwrap().lines().next().unwrap().to_string();
    let input = stage_export(work.path(), Some(&format!("{header}\n")));
    let mut orch = SyncOrchestrator::new(
        FakeBudget::default(),
        TransactionBuilder::default(),
        ArchiveLayout::under(work.path()),
    );

    let summary = orch.process_file(&input).await.unwrap();
    assert_eq!(summary.rows, 0);
    assert_eq!(summary.uploaded, 0);
    let uploads = orch.api().uploads.borrow();
    assert_eq!(uploads.len(), 1);
    assert!(uploads[0].is_empty());
    assert_eq!(
        fs::read_to_string(&summary.output).unwrap(),
        "Date;Payee;Memo;Outflow;Inflow\n"
    );
}

#[tokio::test]
async fn test_upload_failure_leaves_input_in_place() {
    let work = tempfile::tempdir().unwrap();
    let input = stage_export(work.path(), None);
    let layout = ArchiveLayout::under(work.path());
    let budget = FakeBudget {
        reject_upload: true,
        ..Default::default()
    };
    let mut orch = SyncOrchestrator::new(budget, TransactionBuilder::default(), layout.clone());

    let failure = orch.process_file(&input).await.unwrap_err();
    assert_eq!(failure.state, SyncState::Uploading);
    assert!(matches!(failure.error, RunError::Upload(SyncError::Remote { status: 500, .. })));
    assert_eq!(orch.state(), SyncState::Failed);

    assert!(input.exists(), "failed run must not archive the export");
    assert!(files_in(&layout.results_dir).is_empty());
    assert!(files_in(&layout.history_dir).is_empty());
}

#[tokio::test]
async fn test_schema_error_stops_before_network() {
    let work = tempfile::tempdir().unwrap();
    let input = stage_export(work.path(), Some("Summa;Maksaja\n-1,00;X\n"));
    let mut orch = SyncOrchestrator::new(
        FakeBudget::default(),
        TransactionBuilder::default(),
        ArchiveLayout::under(work.path()),
    );

    let failure = orch.process_file(&input).await.unwrap_err();
    assert_eq!(failure.state, SyncState::Normalizing);
    assert!(matches!(
        failure.error,
        RunError::Normalize(pankki_ingest::NormalizeError::Schema(_))
    ));
    assert!(orch.api().uploads.borrow().is_empty());
    assert!(input.exists());
}

#[tokio::test]
async fn test_orchestrator_recovers_after_failed_run() {
    let work = tempfile::tempdir().unwrap();
    let mut orch = SyncOrchestrator::new(
        FakeBudget::default(),
        TransactionBuilder::default(),
        ArchiveLayout::under(work.path()),
    );

    let bad = stage_export(work.path(), Some("Summa\n1,00\n"));
    assert!(orch.process_file(&bad).await.is_err());
    assert_eq!(orch.state(), SyncState::Failed);

    let good = stage_export(work.path(), None);
    let summary = orch.process_file(&good).await.unwrap();
    assert_eq!(summary.rows, 7);
    assert_eq!(orch.state(), SyncState::Idle);
}
