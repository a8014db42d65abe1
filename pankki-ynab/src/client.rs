//! HTTP client for the YNAB REST API, scoped to one budget.

use pankki_core::{BudgetEntry, Payee, PayeeDirectory, RemoteTransaction};
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::error::SyncError;

pub const DEFAULT_BASE_URL: &str = "https://api.youneedabudget.com/v1";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const ERROR_BODY_LIMIT: usize = 500;

/// API token and budget id, as stored in `info.json`.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct Credentials {
    pub api_key: String,
    pub budget_id: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"<redacted>")
            .field("budget_id", &self.budget_id)
            .finish()
    }
}

/// Result of a bulk upload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadSummary {
    pub submitted: usize,
    /// Ids of newly created transactions, when the response lists them.
    pub transaction_ids: Vec<String>,
    /// Import ids the service had already seen and skipped.
    pub duplicate_import_ids: Vec<String>,
}

/// The remote operations a sync run needs.
///
/// The two fetches never fail from the caller's point of view: a failed
/// request is logged and yields an empty result, so a sync can proceed
/// without category suggestions.
#[allow(async_fn_in_trait)]
pub trait BudgetApi {
    async fn fetch_payees(&self) -> PayeeDirectory;
    async fn fetch_transaction_history(&self) -> Vec<RemoteTransaction>;
    async fn bulk_upload(&self, entries: &[BudgetEntry]) -> Result<UploadSummary, SyncError>;
}

#[derive(Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Deserialize)]
struct PayeesData {
    payees: Vec<Payee>,
}

#[derive(Deserialize)]
struct TransactionsData {
    transactions: Vec<RemoteTransaction>,
}

#[derive(Deserialize)]
struct BulkData {
    bulk: BulkResult,
}

#[derive(Deserialize, Default)]
struct BulkResult {
    #[serde(default)]
    transaction_ids: Vec<String>,
    #[serde(default)]
    duplicate_import_ids: Vec<String>,
}

#[derive(Serialize)]
struct BulkRequest<'a> {
    transactions: &'a [BudgetEntry],
}

pub struct BudgetSyncClient {
    client: reqwest::Client,
    base_url: String,
    credentials: Credentials,
}

impl BudgetSyncClient {
    pub fn new(credentials: Credentials) -> Self {
        Self::with_base_url(credentials, DEFAULT_BASE_URL)
    }

    /// `base_url` is the API root, e.g. `https://api.youneedabudget.com/v1`.
    pub fn with_base_url(credentials: Credentials, base_url: &str) -> Self {
        Self::with_http_client(credentials, base_url, reqwest::Client::new())
    }

    pub fn with_http_client(credentials: Credentials, base_url: &str, client: reqwest::Client) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/budgets/{}/{}", self.base_url, self.credentials.budget_id, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, SyncError> {
        let url = self.url(path);
        let resp = self
            .client
            .get(&url)
            .bearer_auth(&self.credentials.api_key)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;
        let resp = check_status(resp).await?;
        let body = resp.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// `GET /budgets/{id}/payees`, propagating errors.
    pub async fn try_fetch_payees(&self) -> Result<PayeeDirectory, SyncError> {
        let env: Envelope<PayeesData> = self.get_json("payees").await?;
        Ok(payee_directory(env.data.payees))
    }

    /// `GET /budgets/{id}/transactions`, propagating errors.
    pub async fn try_fetch_transactions(&self) -> Result<Vec<RemoteTransaction>, SyncError> {
        let env: Envelope<TransactionsData> = self.get_json("transactions").await?;
        Ok(env.data.transactions)
    }
}

impl BudgetApi for BudgetSyncClient {
    async fn fetch_payees(&self) -> PayeeDirectory {
        info!("fetching payees");
        match self.try_fetch_payees().await {
            Ok(payees) => {
                info!(count = payees.len(), "fetched payees");
                payees
            }
            Err(e) => {
                error!(error = %e, "failed to fetch payees; continuing without them");
                PayeeDirectory::new()
            }
        }
    }

    async fn fetch_transaction_history(&self) -> Vec<RemoteTransaction> {
        info!("fetching transactions");
        match self.try_fetch_transactions().await {
            Ok(txns) => {
                info!(count = txns.len(), "fetched transactions");
                txns
            }
            Err(e) => {
                error!(error = %e, "failed to fetch transactions; continuing without them");
                Vec::new()
            }
        }
    }

    async fn bulk_upload(&self, entries: &[BudgetEntry]) -> Result<UploadSummary, SyncError> {
        if entries.is_empty() {
            info!("no transactions to upload");
            return Ok(UploadSummary::default());
        }

        let url = self.url("transactions/bulk");
        info!(url = %url, count = entries.len(), "uploading transactions (bulk)");
        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.credentials.api_key)
            .timeout(REQUEST_TIMEOUT)
            .json(&BulkRequest { transactions: entries })
            .send()
            .await
            .inspect_err(|e| error!(error = %e, "bulk upload request failed"))?;
        let resp = check_status(resp)
            .await
            .inspect_err(|e| error!(error = %e, "bulk upload rejected"))?;

        let body = resp.text().await?;
        let result = match serde_json::from_str::<Envelope<BulkData>>(&body) {
            Ok(env) => env.data.bulk,
            Err(e) => {
                warn!(error = %e, "bulk upload accepted but response body was not understood");
                BulkResult::default()
            }
        };

        info!(
            created = result.transaction_ids.len(),
            duplicates = result.duplicate_import_ids.len(),
            "bulk upload successful"
        );
        if !result.duplicate_import_ids.is_empty() {
            info!(import_ids = ?result.duplicate_import_ids, "service skipped already-imported transactions");
        }

        Ok(UploadSummary {
            submitted: entries.len(),
            transaction_ids: result.transaction_ids,
            duplicate_import_ids: result.duplicate_import_ids,
        })
    }
}

/// Id -> name for live payees; deleted payees are left out.
fn payee_directory(payees: Vec<Payee>) -> PayeeDirectory {
    payees
        .into_iter()
        .filter(|p| !p.deleted)
        .map(|p| (p.id, p.name))
        .collect()
}

async fn check_status(resp: Response) -> Result<Response, SyncError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let body = truncate_body(resp.text().await.unwrap_or_default());
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(SyncError::Auth {
            status: status.as_u16(),
            body,
        });
    }
    Err(SyncError::Remote {
        status: status.as_u16(),
        body,
    })
}

fn truncate_body(body: String) -> String {
    match body.char_indices().nth(ERROR_BODY_LIMIT) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body,
    }
}
