use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const CONFIG_DIR: &str = ".godex";
const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub indexer: IndexerConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexerConfig {
    /// Glob patterns for files to index, matched against the file name
    #[serde(default = "default_include")]
    pub include: Vec<String>,

    /// Patterns to skip (in addition to .gitignore)
    #[serde(default = "default_exclude")]
    pub exclude: Vec<String>,

    /// Drop elements whose content hash is already in the store
    #[serde(default = "default_dedup")]
    pub dedup: bool,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            include: default_include(),
            exclude: default_exclude(),
            dedup: default_dedup(),
        }
    }
}

fn default_include() -> Vec<String> {
    vec!["*.go".to_string()]
}

fn default_exclude() -> Vec<String> {
    vec![
        "vendor".to_string(),
        "testdata".to_string(),
        "node_modules".to_string(),
        ".git".to_string(),
        "dist".to_string(),
        "build".to_string(),
    ]
}

fn default_dedup() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Store file name (relative to .godex/)
    #[serde(default = "default_index_file")]
    pub index_file: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            index_file: default_index_file(),
        }
    }
}

fn default_index_file() -> String {
    "codebase.jsonl".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Write logs to rotating files under `directory`
    #[serde(default)]
    pub enabled: bool,

    /// Also log to stderr
    #[serde(default = "default_log_stderr")]
    pub stderr: bool,

    /// Log level for the file output: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log directory; relative paths resolve against the project root
    #[serde(default = "default_log_directory")]
    pub directory: PathBuf,

    /// Log file name prefix
    #[serde(default = "default_log_file_prefix")]
    pub file_prefix: String,

    /// Rotation strategy: minutely, hourly, daily, never
    #[serde(default = "default_log_rotation")]
    pub rotation: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            stderr: default_log_stderr(),
            level: default_log_level(),
            directory: default_log_directory(),
            file_prefix: default_log_file_prefix(),
            rotation: default_log_rotation(),
        }
    }
}

fn default_log_stderr() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_directory() -> PathBuf {
    PathBuf::from(".godex/logs")
}

fn default_log_file_prefix() -> String {
    "godex".to_string()
}

fn default_log_rotation() -> String {
    "daily".to_string()
}

impl Config {
    /// Load configuration from the .godex directory
    pub fn load(root: &Path) -> Result<Self> {
        let config_path = root.join(CONFIG_DIR).join(CONFIG_FILE);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read config from {:?}", config_path))?;

            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config from {:?}", config_path))
        } else {
            Ok(Config::default())
        }
    }

    /// Save configuration to the .godex directory
    pub fn save(&self, root: &Path) -> Result<()> {
        let config_dir = root.join(CONFIG_DIR);
        let config_path = config_dir.join(CONFIG_FILE);

        std::fs::create_dir_all(&config_dir)
            .with_context(|| format!("Failed to create config directory {:?}", config_dir))?;

        let content =
            toml::to_string_pretty(self).with_context(|| "Failed to serialize config")?;

        std::fs::write(&config_path, content)
            .with_context(|| format!("Failed to write config to {:?}", config_path))?;

        Ok(())
    }

    /// Get the path to the .godex directory
    pub fn godex_dir(root: &Path) -> PathBuf {
        root.join(CONFIG_DIR)
    }

    /// Get the path to the element store file
    pub fn index_path(&self, root: &Path) -> PathBuf {
        Self::godex_dir(root).join(&self.storage.index_file)
    }

    /// Check if godex is initialized in the given directory
    pub fn is_initialized(root: &Path) -> bool {
        Self::godex_dir(root).exists()
    }
}
