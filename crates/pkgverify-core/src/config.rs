use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::freshness::FreshnessPolicy;

/// Network limits for artifact downloads (optional `[fetch]` section in config.toml).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Seconds allowed to establish a connection.
    pub connect_timeout_secs: u64,
    /// Seconds allowed for the whole transfer; exceeding it is a transport error.
    pub timeout_secs: u64,
    /// Maximum number of redirects followed.
    pub max_redirections: u32,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 30,
            timeout_secs: 600,
            max_redirections: 10,
        }
    }
}

/// Global configuration loaded from `~/.config/pkgverify/config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PkgVerifyConfig {
    /// Directories whose `*.xml` files are linted.
    pub scan_dirs: Vec<PathBuf>,
    /// Freshness policy: "matches-last-modified" (default) or "contains-today".
    #[serde(default)]
    pub freshness: FreshnessPolicy,
    /// Descriptor verified by `verify` when no file is given.
    #[serde(default = "default_verify_target")]
    pub verify_target: PathBuf,
    /// Where downloaded artifacts are stored (None = current directory).
    #[serde(default)]
    pub download_dir: Option<PathBuf>,
    #[serde(default)]
    pub fetch: FetchConfig,
}

fn default_verify_target() -> PathBuf {
    PathBuf::from("tests/test-autoconfig.xml")
}

impl Default for PkgVerifyConfig {
    fn default() -> Self {
        Self {
            scan_dirs: vec![PathBuf::from("examples"), PathBuf::from("config")],
            freshness: FreshnessPolicy::default(),
            verify_target: default_verify_target(),
            download_dir: None,
            fetch: FetchConfig::default(),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("pkgverify")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<PkgVerifyConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = PkgVerifyConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }
    load_from(&path)
}

/// Load configuration from an explicit file. The file must exist.
pub fn load_from(path: &Path) -> Result<PkgVerifyConfig> {
    let data =
        fs::read_to_string(path).with_context(|| format!("read config {}", path.display()))?;
    let cfg: PkgVerifyConfig =
        toml::from_str(&data).with_context(|| format!("parse config {}", path.display()))?;
    Ok(cfg)
}
