use serde::Deserialize;

use crate::error::EvoloopResult;

/// Root application configuration. Loaded from environment variables
/// with the prefix `EVOLOOP__` and an optional TOML config file.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Monte-Carlo trials per prob-best estimate.
    #[serde(default = "default_num_simulations")]
    pub num_simulations: usize,
    #[serde(default = "default_parallel")]
    pub parallel: bool,
    /// Below this many trials the estimate runs on the calling thread.
    #[serde(default = "default_min_parallel_simulations")]
    pub min_parallel_simulations: usize,
    /// Worker count for parallel estimates; 0 means one per rayon thread.
    #[serde(default)]
    pub workers: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_filter")]
    pub filter: String,
    #[serde(default = "default_log_json")]
    pub json: bool,
}

// Default functions
fn default_num_simulations() -> usize {
    10_000
}
fn default_parallel() -> bool {
    true
}
fn default_min_parallel_simulations() -> usize {
    20_000
}
fn default_log_filter() -> String {
    "evoloop=info".to_string()
}
fn default_log_json() -> bool {
    true
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            num_simulations: default_num_simulations(),
            parallel: default_parallel(),
            min_parallel_simulations: default_min_parallel_simulations(),
            workers: 0,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            json: default_log_json(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables only.
    pub fn load() -> EvoloopResult<Self> {
        Self::load_from(None)
    }

    /// Load configuration from an optional file, then environment variables
    /// (which take precedence).
    pub fn load_from(path: Option<&str>) -> EvoloopResult<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(true));
        }
        let builder = builder.add_source(
            config::Environment::with_prefix("EVOLOOP")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }
}
