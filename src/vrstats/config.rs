use crate::error::VrStatsError;
use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;
use url::Url;

pub const DEFAULT_LISTING_URL: &str = "https://www.pa.gov/agencies/dos/resources/voting-and-elections-resources/voting-and-election-statistics#accordion-6cb6ca8a99-item-df8c67bfea";
pub const DEFAULT_BASE_ORIGIN: &str = "https://www.pa.gov";
pub const DEFAULT_CONTAINER_ID_SUFFIX: &str = "df8c67bfea";
pub const DEFAULT_CURRENT_STATS_URL: &str = "https://www.pa.gov/content/dam/copapwp-pagov/en/dos/resources/voting-and-elections/voting-and-election-statistics/currentvotestats.xls";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveConfig {
    pub listing_url: String,
    pub base_origin: String,
    pub container_id_suffix: String,
    #[serde(default = "default_listing_timeout_secs")]
    pub listing_timeout_secs: u64,
    #[serde(default = "default_document_timeout_secs")]
    pub document_timeout_secs: u64,
}

fn default_listing_timeout_secs() -> u64 {
    60
}

fn default_document_timeout_secs() -> u64 {
    120
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            listing_url: DEFAULT_LISTING_URL.to_string(),
            base_origin: DEFAULT_BASE_ORIGIN.to_string(),
            container_id_suffix: DEFAULT_CONTAINER_ID_SUFFIX.to_string(),
            listing_timeout_secs: default_listing_timeout_secs(),
            document_timeout_secs: default_document_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentStatsConfig {
    pub source_url: String,
    pub raw_file_name: String,
    pub timeout_secs: u64,
}

impl Default for CurrentStatsConfig {
    fn default() -> Self {
        Self {
            source_url: DEFAULT_CURRENT_STATS_URL.to_string(),
            raw_file_name: "current_voter_stats.xls".to_string(),
            timeout_secs: 120,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct VrStatsConfig {
    pub archive: ArchiveConfig,
    pub current: CurrentStatsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct PartialVrStatsConfig {
    archive: Option<ArchiveConfig>,
    current: Option<CurrentStatsConfig>,
}

fn env_or_u64(var: &str, fallback: u64) -> u64 {
    match env::var(var) {
        Ok(v) => v.trim().parse::<u64>().ok().unwrap_or(fallback),
        Err(_) => fallback,
    }
}

fn env_or_string(var: &str, fallback: &str) -> String {
    match env::var(var) {
        Ok(v) if !v.trim().is_empty() => v.trim().to_string(),
        _ => fallback.to_string(),
    }
}

fn invalid(message: impl Into<String>) -> anyhow::Error {
    VrStatsError::InvalidConfig(message.into()).into()
}

fn validate(cfg: &VrStatsConfig) -> Result<()> {
    for (name, value) in [
        ("archive.listing_url", &cfg.archive.listing_url),
        ("archive.base_origin", &cfg.archive.base_origin),
        ("current.source_url", &cfg.current.source_url),
    ] {
        Url::parse(value).map_err(|err| invalid(format!("{name} `{value}`: {err}")))?;
    }
    if cfg.archive.container_id_suffix.trim().is_empty() {
        return Err(invalid("archive.container_id_suffix cannot be empty"));
    }
    if cfg.archive.container_id_suffix.contains('"') {
        return Err(invalid("archive.container_id_suffix cannot contain quotes"));
    }
    if cfg.archive.listing_timeout_secs == 0 {
        return Err(invalid("archive.listing_timeout_secs must be >= 1"));
    }
    if cfg.archive.document_timeout_secs == 0 {
        return Err(invalid("archive.document_timeout_secs must be >= 1"));
    }
    if cfg.current.timeout_secs == 0 {
        return Err(invalid("current.timeout_secs must be >= 1"));
    }
    if cfg.current.raw_file_name.trim().is_empty() || cfg.current.raw_file_name.contains('/') {
        return Err(invalid("current.raw_file_name must be a plain file name"));
    }
    Ok(())
}

pub fn resolve_config_path() -> Option<PathBuf> {
    if let Ok(custom) = env::var("VRSTATS_CONFIG_PATH") {
        let trimmed = custom.trim();
        if !trimmed.is_empty() {
            return Some(PathBuf::from(trimmed));
        }
    }

    let home = dirs::home_dir()?;
    Some(home.join(".vrstats").join("vrstats.toml"))
}

fn merge_file_config(base: &mut VrStatsConfig) -> Result<()> {
    let Some(path) = resolve_config_path() else {
        return Ok(());
    };
    if !path.exists() {
        return Ok(());
    }

    let raw = fs::read_to_string(&path)?;
    let parsed: PartialVrStatsConfig = toml::from_str(&raw)
        .map_err(|err| anyhow!("failed to parse vrstats config {}: {err}", path.display()))?;
    if let Some(archive) = parsed.archive {
        base.archive = archive;
    }
    if let Some(current) = parsed.current {
        base.current = current;
    }
    Ok(())
}

fn apply_env_overrides(cfg: &mut VrStatsConfig) {
    cfg.archive.listing_url = env_or_string("VRSTATS_LISTING_URL", &cfg.archive.listing_url);
    cfg.archive.base_origin = env_or_string("VRSTATS_BASE_ORIGIN", &cfg.archive.base_origin);
    cfg.archive.container_id_suffix = env_or_string(
        "VRSTATS_CONTAINER_ID_SUFFIX",
        &cfg.archive.container_id_suffix,
    );
    cfg.archive.listing_timeout_secs = env_or_u64(
        "VRSTATS_LISTING_TIMEOUT_SECS",
        cfg.archive.listing_timeout_secs,
    );
    cfg.archive.document_timeout_secs = env_or_u64(
        "VRSTATS_DOCUMENT_TIMEOUT_SECS",
        cfg.archive.document_timeout_secs,
    );
    cfg.current.source_url = env_or_string("VRSTATS_CURRENT_STATS_URL", &cfg.current.source_url);
    cfg.current.timeout_secs =
        env_or_u64("VRSTATS_CURRENT_TIMEOUT_SECS", cfg.current.timeout_secs);
}

pub fn load_config() -> Result<VrStatsConfig> {
    let mut cfg = VrStatsConfig::default();
    merge_file_config(&mut cfg)?;
    apply_env_overrides(&mut cfg);
    validate(&cfg)?;
    Ok(cfg)
}
