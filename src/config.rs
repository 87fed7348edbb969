use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub provider: ProviderConfig,
    #[serde(default)]
    pub client: ClientSettings,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    /// Sports endpoint root of the odds API
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Bookmaker region used for odds requests (e.g., "eu", "us")
    #[serde(default = "default_region")]
    pub region: String,
    /// Market type requested for odds and live odds
    #[serde(default = "default_market")]
    pub market: String,
    /// Timeout for the credential connectivity probe
    #[serde(default = "default_probe_timeout")]
    pub probe_timeout_ms: u64,
    /// Timeout for data requests
    #[serde(default = "default_request_timeout")]
    pub request_timeout_ms: u64,
    /// Credential used when nothing has been stored yet
    #[serde(default)]
    pub api_key: Option<String>,
}

fn default_base_url() -> String {
    "https://api.the-odds-api.com/v4/sports".to_string()
}

fn default_region() -> String {
    "eu".to_string()
}

fn default_market() -> String {
    "h2h".to_string()
}

fn default_probe_timeout() -> u64 {
    5_000
}

fn default_request_timeout() -> u64 {
    10_000
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            region: default_region(),
            market: default_market(),
            probe_timeout_ms: default_probe_timeout(),
            request_timeout_ms: default_request_timeout(),
            api_key: None,
        }
    }
}

impl ProviderConfig {
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClientSettings {
    /// How long a response is served as fresh
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_secs: u64,
    /// Minimum spacing between consecutive upstream calls
    #[serde(default = "default_request_delay")]
    pub request_delay_ms: u64,
    /// Default lookback for score requests
    #[serde(default = "default_days_from")]
    pub scores_days_from: u32,
}

fn default_cache_ttl() -> u64 {
    30
}

fn default_request_delay() -> u64 {
    1_200
}

fn default_days_from() -> u32 {
    1
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            cache_ttl_secs: default_cache_ttl(),
            request_delay_ms: default_request_delay(),
            scores_days_from: default_days_from(),
        }
    }
}

impl ClientSettings {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// PostgreSQL connection URL; in-memory storage when unset
    #[serde(default)]
    pub database_url: Option<String>,
    /// Maximum connections in pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Location of the local credential mirror
    #[serde(default)]
    pub mirror_path: Option<PathBuf>,
}

fn default_max_connections() -> u32 {
    5
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            max_connections: default_max_connections(),
            mirror_path: None,
        }
    }
}

impl StorageConfig {
    /// Mirror location, falling back to the platform config directory.
    pub fn resolved_mirror_path(&self) -> Option<PathBuf> {
        self.mirror_path.clone().or_else(|| {
            dirs::config_dir().map(|dir| dir.join("oddsline").join("credential.json"))
        })
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Enable JSON formatted logs
    #[serde(default)]
    pub json: bool,
    /// Directory for daily rotated log files
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl AppConfig {
    /// Load configuration from files and environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from a specific directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();

        let builder = Config::builder()
            // Start with default values
            .set_default("provider.base_url", default_base_url())?
            .set_default("logging.level", "info")?
            .set_default("logging.json", false)?
            .set_default("client.cache_ttl_secs", 30)?
            .set_default("client.request_delay_ms", 1200)?
            .set_default("storage.max_connections", 5)?
            // Load default config file
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Load environment-specific config (e.g., config/production.toml)
            .add_source(
                File::from(config_dir.join(
                    std::env::var("ODDSLINE_ENV").unwrap_or_else(|_| "development".to_string()),
                ))
                .required(false),
            )
            // Override with environment variables (ODDSLINE__PROVIDER__API_KEY, etc.)
            .add_source(
                Environment::with_prefix("ODDSLINE")
                    .separator("__")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }

    /// Create a default configuration for CLI usage
    pub fn default_config() -> Self {
        Self {
            provider: ProviderConfig::default(),
            client: ClientSettings::default(),
            storage: StorageConfig::default(),
            logging: LoggingConfig {
                level: default_log_level(),
                json: false,
                dir: None,
            },
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.provider.base_url.trim().is_empty() {
            errors.push("provider.base_url must not be empty".to_string());
        }

        if self.provider.region.trim().is_empty() {
            errors.push("provider.region must not be empty".to_string());
        }

        if self.provider.market.trim().is_empty() {
            errors.push("provider.market must not be empty".to_string());
        }

        if self.provider.probe_timeout_ms == 0 || self.provider.request_timeout_ms == 0 {
            errors.push("provider timeouts must be positive".to_string());
        }

        if self.provider.probe_timeout_ms > self.provider.request_timeout_ms {
            errors.push(
                "provider.probe_timeout_ms should not exceed provider.request_timeout_ms"
                    .to_string(),
            );
        }

        if self.client.cache_ttl_secs == 0 {
            errors.push("client.cache_ttl_secs must be positive".to_string());
        }

        if self.storage.max_connections == 0 {
            errors.push("storage.max_connections must be positive".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
