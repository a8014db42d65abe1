use std::path::PathBuf;
use thiserror::Error;

/// Problems with local configuration or credentials.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("credentials file not found: {}", .0.display())]
    MissingCredentials(PathBuf),

    #[error("reading {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parsing {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("`{field}` is missing or empty in {}", path.display())]
    EmptyField { path: PathBuf, field: &'static str },

    #[error("downloads directory does not exist: {} (set watch.downloads_dir in config.toml)", .0.display())]
    DownloadsDir(PathBuf),
}
