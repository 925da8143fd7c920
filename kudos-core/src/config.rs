//! Configuration management for Kudos
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (KUDOS_*)
//! 3. Config file (~/.config/kudos/config.toml, or `--config <path>`)
//! 4. Default values

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::auth::{EditPolicy, DEFAULT_SESSION_TTL};
use crate::{Error, Result};

/// HTTP listener settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address to listen on
    pub bind: String,

    /// Largest accepted request body
    pub body_limit_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:3000".to_string(),
            body_limit_bytes: 64 * 1024,
        }
    }
}

/// Which review store implementation to run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Memory,
    Sqlite,
}

impl FromStr for StoreBackend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(StoreBackend::Memory),
            "sqlite" => Ok(StoreBackend::Sqlite),
            other => Err(Error::Config(format!("Unknown storage backend: {}", other))),
        }
    }
}

impl fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreBackend::Memory => write!(f, "memory"),
            StoreBackend::Sqlite => write!(f, "sqlite"),
        }
    }
}

/// Review storage settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StoreBackend,

    /// SQLite file, only used by the sqlite backend
    pub path: PathBuf,

    pub max_connections: u32,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            path: kudos_db::DatabaseConfig::default_path(),
            max_connections: 5,
        }
    }
}

impl StorageConfig {
    pub fn database_config(&self) -> kudos_db::DatabaseConfig {
        kudos_db::DatabaseConfig::new(&self.path).with_max_connections(self.max_connections)
    }
}

/// A review inserted into an empty store at startup
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SeedReview {
    pub product: i64,
    pub message: String,
    pub author: String,
}

impl SeedReview {
    fn new(product: i64, message: &str, author: &str) -> Self {
        Self {
            product,
            message: message.to_string(),
            author: author.to_string(),
        }
    }
}

/// Review behaviour settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ReviewsConfig {
    /// Who may edit a review's message
    pub edit_policy: EditPolicy,

    /// Insert `seed_reviews` when the store starts out empty
    pub seed: bool,

    pub seed_reviews: Vec<SeedReview>,
}

impl Default for ReviewsConfig {
    fn default() -> Self {
        Self {
            edit_policy: EditPolicy::default(),
            seed: true,
            seed_reviews: vec![
                SeedReview::new(1, "One of my favorites!", "admin@guardian.com"),
                SeedReview::new(1, "Fresh out of a replicator.", "jim@guardian.com"),
                SeedReview::new(2, "y0ur f1r3wall needs m0r3 musc13", "Anonymous"),
                SeedReview::new(3, "Tastes like metal.", "bjoern.kimminich@gmail.com"),
            ],
        }
    }
}

/// A login account; passwords are stored as lowercase hex SHA-256 digests
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AccountConfig {
    pub email: String,
    pub password_sha256: String,
}

/// Login settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    pub accounts: Vec<AccountConfig>,

    /// How long a login token stays valid, e.g. `"6h"` or `"30m"`
    #[serde(with = "humantime_serde")]
    pub session_ttl: Duration,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            accounts: vec![
                AccountConfig {
                    email: "admin@guardian.com".to_string(),
                    password_sha256:
                        "240be518fabd2724ddb6f04eeb1da5967448d7e831c08c8fa822809f74c720a9"
                            .to_string(),
                },
                AccountConfig {
                    email: "jim@guardian.com".to_string(),
                    password_sha256:
                        "c534541702f7e186e3520e8e929c1b9c19b3afc7be14adc5491a64a7563e963c"
                            .to_string(),
                },
                AccountConfig {
                    email: "bjoern.kimminich@gmail.com".to_string(),
                    password_sha256:
                        "07afada2d81267b59eea355307a3ee3f1be5132ce91123e64869cf4ffaf93615"
                            .to_string(),
                },
            ],
            session_ttl: DEFAULT_SESSION_TTL,
        }
    }
}

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,

    #[serde(rename = "database")]
    pub storage: StorageConfig,

    pub reviews: ReviewsConfig,

    pub auth: AuthConfig,
}

/// Values supplied on the command line
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub bind: Option<String>,
    pub backend: Option<StoreBackend>,
    pub db_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from the default config file location
    ///
    /// Returns default config if file doesn't exist
    pub fn load() -> Result<Self> {
        if let Some(path) = Self::default_config_path() {
            if path.exists() {
                return Self::load_from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))
    }

    /// Get the default config file path
    ///
    /// Returns `~/.config/kudos/config.toml` on Unix
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("kudos").join("config.toml"))
    }

    /// Apply environment variable overrides
    ///
    /// Supported variables:
    /// - KUDOS_BIND: listen address
    /// - KUDOS_DB_BACKEND: `memory` or `sqlite`
    /// - KUDOS_DB_PATH: SQLite file
    /// - KUDOS_EDIT_POLICY: `authenticated` or `owner`
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    fn with_overrides_from(mut self, var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(bind) = var("KUDOS_BIND") {
            self.server.bind = bind;
        }

        if let Some(backend) = var("KUDOS_DB_BACKEND") {
            self.storage.backend = backend.parse()?;
        }

        if let Some(path) = var("KUDOS_DB_PATH") {
            self.storage.path = PathBuf::from(path);
        }

        if let Some(policy) = var("KUDOS_EDIT_POLICY") {
            self.reviews.edit_policy = policy.parse().map_err(Error::Config)?;
        }

        Ok(self)
    }

    /// Apply CLI flag overrides
    pub fn with_cli_overrides(mut self, overrides: ConfigOverrides) -> Self {
        if let Some(bind) = overrides.bind {
            self.server.bind = bind;
        }

        if let Some(backend) = overrides.backend {
            self.storage.backend = backend;
        }

        if let Some(path) = overrides.db_path {
            self.storage.path = path;
        }

        self
    }

    /// Load configuration with all overrides applied
    ///
    /// Priority: CLI > env > config file > defaults
    pub fn load_with_overrides(
        config_path: Option<&Path>,
        overrides: ConfigOverrides,
    ) -> Result<Self> {
        let base = match config_path {
            Some(path) => Self::load_from_file(path)?,
            None => Self::load()?,
        };
        Ok(base.with_env_overrides()?.with_cli_overrides(overrides))
    }
}
