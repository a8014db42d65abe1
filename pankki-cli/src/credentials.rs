use pankki_ynab::Credentials;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

#[derive(Debug, Default, Deserialize)]
struct InfoFile {
    api_key: Option<String>,
    budget_id: Option<String>,
}

/// `<work_dir>/Config/info.json`
pub fn credentials_path(work_dir: &Path) -> PathBuf {
    work_dir.join("Config").join("info.json")
}

pub fn load_credentials(path: &Path) -> Result<Credentials, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::MissingCredentials(path.to_path_buf()));
    }
    let s = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let info: InfoFile = serde_json::from_str(&s).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    let field = |value: Option<String>, name: &'static str| {
        value
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::EmptyField {
                path: path.to_path_buf(),
                field: name,
            })
    };

    Ok(Credentials {
        api_key: field(info.api_key, "api_key")?,
        budget_id: field(info.budget_id, "budget_id")?,
    })
}
