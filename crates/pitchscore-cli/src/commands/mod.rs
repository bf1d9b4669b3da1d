//! CLI subcommands.

pub mod analyze;
pub mod batch;
pub mod config;

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use pitchscore_core::models::{LimitsConfig, PitchConfig};
use pitchscore_core::DocumentKind;

/// Location of the user configuration file.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("pitchscore")
        .join("config.json")
}

/// The `--config` path if given, otherwise the default location.
pub fn resolve_config_path(config_path: Option<&str>) -> PathBuf {
    config_path
        .map(PathBuf::from)
        .unwrap_or_else(default_config_path)
}

/// Load the configuration file (defaults if absent) without environment overrides.
pub fn load_file_config(config_path: Option<&str>) -> anyhow::Result<PitchConfig> {
    let path = resolve_config_path(config_path);

    if path.exists() {
        debug!("Loading config from {}", path.display());
        Ok(PitchConfig::from_file(&path)?)
    } else if config_path.is_some() {
        anyhow::bail!("Config file not found: {}", path.display());
    } else {
        Ok(PitchConfig::default())
    }
}

/// Load the effective configuration: file, then environment overrides.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<PitchConfig> {
    Ok(load_file_config(config_path)?.with_env_overrides())
}

/// Whether a path has one of the accepted deck extensions.
pub fn is_deck(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .and_then(DocumentKind::from_filename)
        .is_some()
}

/// Accepted extensions for error messages, e.g. ".pdf, .pptx, .ppt".
fn accepted_extensions() -> String {
    DocumentKind::ALL
        .iter()
        .flat_map(|kind| kind.extensions())
        .map(|ext| format!(".{}", ext))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Read a deck from disk, enforcing the extension allowlist and size limit.
pub fn read_deck(path: &Path, limits: &LimitsConfig) -> anyhow::Result<Vec<u8>> {
    if !path.exists() {
        anyhow::bail!("Input file not found: {}", path.display());
    }

    if !is_deck(path) {
        anyhow::bail!(
            "Unsupported file format: {} (expected {})",
            path.display(),
            accepted_extensions()
        );
    }

    let size = fs::metadata(path)?.len();
    if size > limits.max_file_bytes() {
        anyhow::bail!(
            "File too large: {} is {} bytes, limit is {} MB",
            path.display(),
            size,
            limits.max_file_mb
        );
    }

    Ok(fs::read(path)?)
}
