use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

pub fn home_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .context("neither HOME nor USERPROFILE is set")?;
    Ok(PathBuf::from(home))
}

pub fn pankki_home() -> Result<PathBuf> {
    Ok(home_dir()?.join(".pankki"))
}

pub fn ensure_pankki_home() -> Result<PathBuf> {
    let dir = pankki_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}
