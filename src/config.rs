//! Configuration for panelforge.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (OPENAI_API_KEY, OPENAI_BASE_URL, PANELFORGE_HOST,
//!    PANELFORGE_PORT, PANELFORGE_PUBLIC_DIR)
//! 2. Config file (.panelforge/config.yaml)
//! 3. Defaults
//!
//! Config file discovery:
//! - Searches current directory and parents for .panelforge/config.yaml
//! - Relative paths in the config file resolve against the project root
//!   (the directory containing .panelforge/)

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Global cached configuration (stores Result to handle init errors)
static CONFIG: OnceLock<Result<ResolvedConfig, String>> = OnceLock::new();

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub server: Option<ServerConfig>,
    #[serde(default)]
    pub openai: Option<OpenAiConfig>,
    #[serde(default)]
    pub story: Option<StoryConfig>,
    #[serde(default)]
    pub storage: Option<StorageConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpenAiConfig {
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub text_model: Option<String>,
    pub image_model: Option<String>,
    pub image_size: Option<String>,
    pub image_quality: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoryConfig {
    pub page_count: Option<usize>,
    pub delimiter: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Directory for persisted images (relative to project root)
    pub public_dir: Option<String>,
    pub url_prefix: Option<String>,
}

/// Resolved configuration with absolute paths
#[derive(Debug, Clone, Default, Serialize)]
pub struct ResolvedConfig {
    pub server: ServerSettings,
    pub openai: OpenAiSettings,
    pub story: StorySettings,
    pub storage: StorageSettings,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OpenAiSettings {
    pub base_url: String,
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub text_model: String,
    pub image_model: String,
    pub image_size: String,
    pub image_quality: String,
    pub timeout_seconds: u64,
}

impl Default for OpenAiSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: None,
            text_model: "gpt-4o".to_string(),
            image_model: "dall-e-3".to_string(),
            image_size: "1024x1024".to_string(),
            image_quality: "standard".to_string(),
            timeout_seconds: 120,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StorySettings {
    /// Number of pages the script prompt asks for
    pub page_count: usize,
    /// Token separating pages in the raw script
    pub delimiter: String,
}

impl Default for StorySettings {
    fn default() -> Self {
        Self {
            page_count: 4,
            delimiter: "HUZZAA".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StorageSettings {
    /// Where embedded image payloads are written
    pub public_dir: PathBuf,
    /// URL path the public directory is served under
    pub url_prefix: String,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            public_dir: PathBuf::from("public/generated"),
            url_prefix: "/generated".to_string(),
        }
    }
}

impl ResolvedConfig {
    /// Reject settings the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.story.page_count == 0 {
            anyhow::bail!("story.page_count must be at least 1");
        }
        if self.story.delimiter.trim().is_empty() {
            anyhow::bail!("story.delimiter cannot be empty");
        }
        if !self.storage.url_prefix.starts_with('/') {
            anyhow::bail!(
                "storage.url_prefix must start with '/': {}",
                self.storage.url_prefix
            );
        }
        Ok(())
    }

    pub fn has_api_key(&self) -> bool {
        self.openai
            .api_key
            .as_deref()
            .map(|k| !k.is_empty())
            .unwrap_or(false)
    }
}

/// Find config file by searching current directory and parents
fn find_config_file() -> Option<PathBuf> {
    let mut current = std::env::current_dir().ok()?;

    loop {
        let config_path = current.join(".panelforge").join("config.yaml");
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

/// Merge file values, environment and defaults
///
/// `env` is injected so tests can resolve without touching the process
/// environment.
fn resolve_config<F>(
    file: Option<ConfigFile>,
    config_path: Option<&Path>,
    env: F,
) -> Result<ResolvedConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let file = file.unwrap_or_default();
    let defaults = ResolvedConfig::default();

    // Base directory is the parent of .panelforge/ (i.e., grandparent of config.yaml)
    let base_dir = config_path
        .and_then(|p| p.parent())
        .and_then(|p| p.parent())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));

    let server = {
        let cfg = file.server.as_ref();
        let port = match env("PANELFORGE_PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .with_context(|| format!("Invalid PANELFORGE_PORT: {}", raw))?,
            None => cfg.and_then(|s| s.port).unwrap_or(defaults.server.port),
        };
        ServerSettings {
            host: env("PANELFORGE_HOST")
                .or_else(|| cfg.and_then(|s| s.host.clone()))
                .unwrap_or(defaults.server.host),
            port,
        }
    };

    let openai = {
        let cfg = file.openai.as_ref();
        let d = defaults.openai;
        OpenAiSettings {
            base_url: env("OPENAI_BASE_URL")
                .or_else(|| cfg.and_then(|o| o.base_url.clone()))
                .unwrap_or(d.base_url),
            api_key: env("OPENAI_API_KEY").or_else(|| cfg.and_then(|o| o.api_key.clone())),
            text_model: cfg.and_then(|o| o.text_model.clone()).unwrap_or(d.text_model),
            image_model: cfg.and_then(|o| o.image_model.clone()).unwrap_or(d.image_model),
            image_size: cfg.and_then(|o| o.image_size.clone()).unwrap_or(d.image_size),
            image_quality: cfg
                .and_then(|o| o.image_quality.clone())
                .unwrap_or(d.image_quality),
            timeout_seconds: cfg
                .and_then(|o| o.timeout_seconds)
                .unwrap_or(d.timeout_seconds),
        }
    };

    let story = {
        let cfg = file.story.as_ref();
        StorySettings {
            page_count: cfg
                .and_then(|s| s.page_count)
                .unwrap_or(defaults.story.page_count),
            delimiter: cfg
                .and_then(|s| s.delimiter.clone())
                .unwrap_or(defaults.story.delimiter),
        }
    };

    let storage = {
        let cfg = file.storage.as_ref();
        let public_dir = if let Some(dir) = env("PANELFORGE_PUBLIC_DIR") {
            PathBuf::from(dir)
        } else if let Some(dir) = cfg.and_then(|s| s.public_dir.as_deref()) {
            resolve_path(&base_dir, dir)
        } else {
            defaults.storage.public_dir
        };
        StorageSettings {
            public_dir,
            url_prefix: cfg
                .and_then(|s| s.url_prefix.clone())
                .unwrap_or(defaults.storage.url_prefix),
        }
    };

    let config = ResolvedConfig {
        server,
        openai,
        story,
        storage,
        config_file: config_path.map(Path::to_path_buf),
    };
    config.validate()?;

    Ok(config)
}

/// Load configuration from all sources
fn load_config() -> Result<ResolvedConfig> {
    let config_path = find_config_file();
    let file = match config_path {
        Some(ref path) => Some(load_config_file(path)?),
        None => None,
    };

    resolve_config(file, config_path.as_deref(), |key| std::env::var(key).ok())
}

/// Get the global configuration (loads once, then cached)
pub fn config() -> Result<&'static ResolvedConfig> {
    let result = CONFIG.get_or_init(|| load_config().map_err(|e| format!("{:#}", e)));

    match result {
        Ok(config) => Ok(config),
        Err(e) => anyhow::bail!("{}", e),
    }
}

/// Force reload configuration (bypasses the cache)
pub fn reload_config() -> Result<ResolvedConfig> {
    load_config()
}
