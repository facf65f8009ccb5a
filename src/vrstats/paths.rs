use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct VrStatsPaths {
    pub data_dir: PathBuf,
    pub archive_dir: PathBuf,
    pub raw_dir: PathBuf,
    pub processed_dir: PathBuf,
    pub logs_dir: PathBuf,
}

fn env_or_default_path(var: &str, fallback: PathBuf) -> PathBuf {
    match env::var(var) {
        Ok(v) if !v.trim().is_empty() => PathBuf::from(v.trim()),
        _ => fallback,
    }
}

pub fn resolve_paths() -> Result<VrStatsPaths> {
    let cwd = env::current_dir().context("current directory could not be resolved")?;
    let data_dir = cwd.join(env_or_default_path("VRSTATS_DATA_DIR", PathBuf::from("data")));

    let archive_dir = env_or_default_path("VRSTATS_ARCHIVE_DIR", data_dir.join("historical"));
    let raw_dir = env_or_default_path("VRSTATS_RAW_DIR", data_dir.join("raw"));
    let processed_dir = env_or_default_path("VRSTATS_PROCESSED_DIR", data_dir.join("processed"));
    let logs_dir = env_or_default_path("VRSTATS_LOGS_DIR", data_dir.join("logs"));

    Ok(VrStatsPaths {
        data_dir,
        archive_dir,
        raw_dir,
        processed_dir,
        logs_dir,
    })
}
