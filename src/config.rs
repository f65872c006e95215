//! Configuration for vidcat paths.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (VIDCAT_HOME, VIDCAT_CATALOG, VIDCAT_IMAGES)
//! 2. Config file (.vidcat/config.yaml)
//! 3. Defaults (~/.vidcat)
//!
//! Config file discovery:
//! - Searches current directory and parents for .vidcat/config.yaml
//! - Paths in config file are relative to the project root (parent of .vidcat/)

use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::core::images::{DEFAULT_PLACEHOLDER, DEFAULT_URL_PREFIX};
use crate::core::DEFAULT_LOCK_TIMEOUT;

/// Global cached configuration (stores Result to handle init errors)
static CONFIG: OnceLock<Result<ResolvedConfig, String>> = OnceLock::new();

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub images: Option<ImagesConfig>,
    #[serde(default)]
    pub store: Option<StoreConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PathsConfig {
    /// State directory (relative to project root)
    pub home: Option<String>,
    /// Catalog document (relative to project root)
    pub catalog: Option<String>,
    /// Image directory (relative to project root)
    pub images: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImagesConfig {
    pub url_prefix: Option<String>,
    pub default_image: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    pub lock_timeout_ms: Option<u64>,
}

/// Resolved configuration with absolute paths
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// State directory
    pub home: PathBuf,
    /// Catalog document
    pub catalog: PathBuf,
    /// Image blob directory
    pub images: PathBuf,
    /// Public prefix for image references
    pub image_url_prefix: String,
    /// Reference used for videos without an image
    pub default_image: String,
    /// Upper bound on waiting for the writer lock
    pub lock_timeout: Duration,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
}

impl ResolvedConfig {
    /// Configuration rooted at `home` with default settings
    pub fn with_home(home: impl Into<PathBuf>) -> Self {
        let home = home.into();
        Self {
            catalog: home.join("videos.json"),
            images: home.join("images"),
            home,
            image_url_prefix: DEFAULT_URL_PREFIX.to_string(),
            default_image: DEFAULT_PLACEHOLDER.to_string(),
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
            config_file: None,
        }
    }
}

/// Find config file by searching current directory and parents
fn find_config_file() -> Option<PathBuf> {
    let mut current = std::env::current_dir().ok()?;

    loop {
        let config_path = current.join(".vidcat").join("config.yaml");
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
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

/// Resolve a path that may be relative to the project root
fn resolve_path(base: &Path, path_str: &str) -> PathBuf {
    let path = PathBuf::from(path_str);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
    }
}

fn env_path(key: &str) -> Option<PathBuf> {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from)
}

/// Apply a parsed config file on top of the defaults
fn apply_config_file(config: ConfigFile, config_path: &Path, default_home: PathBuf) -> ResolvedConfig {
    // Base directory is the parent of .vidcat/ (i.e., grandparent of config.yaml)
    let base_dir = config_path
        .parent()
        .and_then(|p| p.parent())
        .unwrap_or(Path::new("."));

    let home = config
        .paths
        .home
        .as_deref()
        .map(|h| resolve_path(base_dir, h))
        .unwrap_or(default_home);

    let mut resolved = ResolvedConfig::with_home(home);

    if let Some(ref catalog) = config.paths.catalog {
        resolved.catalog = resolve_path(base_dir, catalog);
    }
    if let Some(ref images) = config.paths.images {
        resolved.images = resolve_path(base_dir, images);
    }
    if let Some(images) = config.images {
        if let Some(prefix) = images.url_prefix {
            resolved.image_url_prefix = prefix;
        }
        if let Some(default_image) = images.default_image {
            resolved.default_image = default_image;
        }
    }
    if let Some(ms) = config.store.and_then(|s| s.lock_timeout_ms) {
        resolved.lock_timeout = Duration::from_millis(ms);
    }

    resolved.config_file = Some(config_path.to_path_buf());
    resolved
}

/// Load configuration from all sources
fn load_config() -> Result<ResolvedConfig> {
    let default_home = dirs::home_dir()
        .context("Failed to determine home directory")?
        .join(".vidcat");

    let mut resolved = match find_config_file() {
        Some(config_path) => {
            let config = load_config_file(&config_path)?;
            apply_config_file(config, &config_path, default_home)
        }
        None => ResolvedConfig::with_home(default_home),
    };

    // Environment overrides everything
    if let Some(home) = env_path("VIDCAT_HOME") {
        // Paths derived from the old home follow it; explicit ones stay
        if resolved.catalog == resolved.home.join("videos.json") {
            resolved.catalog = home.join("videos.json");
        }
        if resolved.images == resolved.home.join("images") {
            resolved.images = home.join("images");
        }
        resolved.home = home;
    }
    if let Some(catalog) = env_path("VIDCAT_CATALOG") {
        resolved.catalog = catalog;
    }
    if let Some(images) = env_path("VIDCAT_IMAGES") {
        resolved.images = images;
    }

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

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_with_home_defaults() {
        let config = ResolvedConfig::with_home("/test/.vidcat");

        assert_eq!(config.catalog, PathBuf::from("/test/.vidcat/videos.json"));
        assert_eq!(config.images, PathBuf::from("/test/.vidcat/images"));
        assert_eq!(config.image_url_prefix, "/public/images");
        assert_eq!(config.lock_timeout, DEFAULT_LOCK_TIMEOUT);
        assert!(config.config_file.is_none());
    }

    #[test]
    fn test_config_file_parsing() {
        let temp = TempDir::new().unwrap();
        let vidcat_dir = temp.path().join(".vidcat");
        std::fs::create_dir_all(&vidcat_dir).unwrap();

        let config_path = vidcat_dir.join("config.yaml");
        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(
            file,
            r#"
version: "1.0"
paths:
  catalog: data/videos.json
  images: public/images
images:
  url_prefix: /static/images
store:
  lock_timeout_ms: 2500
"#
        )
        .unwrap();

        let parsed = load_config_file(&config_path).unwrap();
        assert_eq!(parsed.version, "1.0");
        assert_eq!(parsed.paths.catalog, Some("data/videos.json".to_string()));

        let resolved = apply_config_file(parsed, &config_path, PathBuf::from("/fallback"));
        assert_eq!(resolved.home, PathBuf::from("/fallback"));
        assert_eq!(resolved.catalog, temp.path().join("data/videos.json"));
        assert_eq!(resolved.images, temp.path().join("public/images"));
        assert_eq!(resolved.image_url_prefix, "/static/images");
        assert_eq!(resolved.default_image, DEFAULT_PLACEHOLDER);
        assert_eq!(resolved.lock_timeout, Duration::from_millis(2500));
        assert_eq!(resolved.config_file, Some(config_path));
    }

    #[test]
    fn test_resolve_relative_path() {
        let base = PathBuf::from("/home/user/project");

        assert_eq!(
            resolve_path(&base, "./data"),
            PathBuf::from("/home/user/project/./data")
        );
        assert_eq!(
            resolve_path(&base, "/absolute/path"),
            PathBuf::from("/absolute/path")
        );
    }
}
