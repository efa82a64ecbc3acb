//! Configuration for requote.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variable (REQUOTE_CONFIG pointing at a config file)
//! 2. Config file (.requote/config.yaml, searched upward from cwd)
//! 3. User config (~/.requote/config.yaml)
//! 4. Built-in defaults
//!
//! The defaults reproduce the engine's documented matching policy; a
//! config file only needs the keys it wants to override.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::engine::{MatcherLimits, RelocateOptions};

/// Default chars of context in anchor excerpts.
const DEFAULT_ANCHOR_WINDOW: usize = 80;

/// Global cached configuration (stores Result to handle init errors)
static CONFIG: OnceLock<std::result::Result<ResolvedConfig, String>> = OnceLock::new();

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub matcher: Option<MatcherLimits>,
    #[serde(default)]
    pub highlight: Option<HighlightConfig>,
    #[serde(default)]
    pub anchor: Option<AnchorConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HighlightConfig {
    pub duration_ms: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnchorConfig {
    pub window: Option<usize>,
}

/// Resolved configuration with every value filled in
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Engine options (matcher tolerances, highlight duration)
    pub options: RelocateOptions,
    /// Chars of context in anchor excerpts
    pub anchor_window: usize,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            options: RelocateOptions::default(),
            anchor_window: DEFAULT_ANCHOR_WINDOW,
            config_file: None,
        }
    }
}

/// Find config file by searching current directory and parents,
/// then falling back to the user config directory.
fn find_config_file() -> Option<PathBuf> {
    if let Ok(explicit) = std::env::var("REQUOTE_CONFIG") {
        return Some(PathBuf::from(explicit));
    }

    let mut current = std::env::current_dir().ok()?;
    loop {
        let config_path = current.join(".requote").join("config.yaml");
        if config_path.exists() {
            return Some(config_path);
        }
        if !current.pop() {
            break;
        }
    }

    let user_config = dirs::home_dir()?.join(".requote").join("config.yaml");
    if user_config.exists() {
        return Some(user_config);
    }

    None
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Load configuration from all sources
fn load_config() -> Result<ResolvedConfig> {
    let config_file = find_config_file();

    let mut resolved = ResolvedConfig::default();

    if let Some(ref config_path) = config_file {
        let config = load_config_file(config_path)?;

        if let Some(matcher) = config.matcher {
            resolved.options.limits = matcher;
        }
        if let Some(duration) = config.highlight.and_then(|h| h.duration_ms) {
            resolved.options.highlight_duration_ms = duration;
        }
        if let Some(window) = config.anchor.and_then(|a| a.window) {
            resolved.anchor_window = window;
        }
    }

    resolved.config_file = config_file;
    Ok(resolved)
}

/// Get the global configuration (loads once, then cached)
pub fn config() -> Result<&'static ResolvedConfig> {
    let result = CONFIG.get_or_init(|| load_config().map_err(|e| e.to_string()));

    match result {
        Ok(config) => Ok(config),
        Err(e) => anyhow::bail!("{}", e),
    }
}

/// Force reload configuration (useful for testing)
pub fn reload_config() -> Result<ResolvedConfig> {
    load_config()
}

/// Engine options from the resolved configuration.
pub fn relocate_options() -> Result<RelocateOptions> {
    Ok(config()?.options.clone())
}

/// Anchor excerpt window from the resolved configuration.
pub fn anchor_window() -> Result<usize> {
    Ok(config()?.anchor_window)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_config_file() {
        let resolved = ResolvedConfig::default();
        assert_eq!(resolved.options.limits.tolerance_floor, 3);
        assert_eq!(resolved.options.highlight_duration_ms, 2000);
        assert_eq!(resolved.anchor_window, 80);
        assert!(resolved.config_file.is_none());
    }

    #[test]
    fn test_parse_partial_config_file() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("config.yaml");
        std::fs::write(&path, "highlight:\n  duration_ms: 900\n").unwrap();

        let config = load_config_file(&path).unwrap();
        assert_eq!(config.highlight.unwrap().duration_ms, Some(900));
        assert!(config.matcher.is_none());
        assert!(config.anchor.is_none());
    }

    #[test]
    fn test_parse_matcher_overrides() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("config.yaml");
        std::fs::write(&path, "matcher:\n  tolerance_floor: 5\n").unwrap();

        let config = load_config_file(&path).unwrap();
        let limits = config.matcher.unwrap();
        assert_eq!(limits.tolerance_floor, 5);
        // Unspecified keys fall back to the documented policy.
        assert_eq!(limits.tolerance_ratio, 0.1);
    }

    #[test]
    fn test_malformed_config_is_an_error() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("config.yaml");
        std::fs::write(&path, "matcher: [not, a, map]\n").unwrap();

        assert!(load_config_file(&path).is_err());
    }
}
