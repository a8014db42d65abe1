use pankki_ingest::NormalizeError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("credentials rejected ({status}): {body}")]
    Auth { status: u16, body: String },

    #[error("server returned {status}: {body}")]
    Remote { status: u16, body: String },

    #[error("could not decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("writing normalized output {}: {source}", path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: NormalizeError,
    },

    #[error("moving {} to {}: {source}", from.display(), to.display())]
    Move {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
