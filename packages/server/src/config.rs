use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

pub const DEFAULT_CONFIG_NAME: &str = "copydesk.config.json";

/// Environment variable overriding `environment` from the config file
pub const ENV_VAR: &str = "COPYDESK_ENV";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    pub fn is_production(self) -> bool {
        matches!(self, Environment::Production)
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "development" => Some(Environment::Development),
            "production" => Some(Environment::Production),
            _ => None,
        }
    }
}

/// Copydesk configuration file format
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Directory containing page-module sources
    #[serde(default = "default_content_dir")]
    pub content_dir: String,

    /// SQLite database path for the edit-record store
    #[serde(default = "default_db_path")]
    pub db_path: String,

    /// Address the intake API binds to
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    #[serde(default = "default_environment")]
    pub environment: Environment,

    /// Cross-origin allow-list: exact origins plus single-level wildcard
    /// patterns like `https://*.vercel.app`
    #[serde(default)]
    pub allowed_origins: Vec<String>,

    /// Page key to source file, relative to `content_dir`
    #[serde(default)]
    pub pages: HashMap<String, String>,
}

fn default_content_dir() -> String {
    "content".to_string()
}

fn default_db_path() -> String {
    "copydesk.db".to_string()
}

fn default_bind_addr() -> String {
    "127.0.0.1:4010".to_string()
}

fn default_environment() -> Environment {
    Environment::Development
}

impl Config {
    /// Load config from a directory; `COPYDESK_ENV` overrides the file's
    /// `environment` field
    pub fn load(cwd: &str) -> anyhow::Result<Self> {
        let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

        let mut config: Config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            serde_json::from_str(&content)?
        } else {
            Config::default()
        };

        if let Ok(raw) = std::env::var(ENV_VAR) {
            match Environment::parse(&raw) {
                Some(env) => config.environment = env,
                None => anyhow::bail!("invalid {} value: {}", ENV_VAR, raw),
            }
        }

        Ok(config)
    }

    /// Get absolute path to the content directory
    pub fn get_content_dir(&self, cwd: &str) -> PathBuf {
        PathBuf::from(cwd).join(&self.content_dir)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            content_dir: default_content_dir(),
            db_path: default_db_path(),
            bind_addr: default_bind_addr(),
            environment: default_environment(),
            allowed_origins: vec![],
            pages: HashMap::new(),
        }
    }
}
