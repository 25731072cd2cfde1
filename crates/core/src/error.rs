use thiserror::Error;
use uuid::Uuid;

use crate::types::VariantStatus;

pub type EngineResult<T> = Result<T, EngineError>;
pub type EvoloopResult<T> = Result<T, EvoloopError>;

/// Failures of the allocation and statistics math.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("No eligible variants to select from")]
    EmptyInput,

    #[error(
        "Invalid Beta parameters for variant {}: alpha={alpha}, beta={beta}",
        .variant_id.as_deref().unwrap_or("<unnamed>")
    )]
    InvalidParameter {
        variant_id: Option<String>,
        alpha: f64,
        beta: f64,
    },
}

#[derive(Error, Debug)]
pub enum EvoloopError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("Invalid variant transition: {from} -> {to}")]
    InvalidTransition {
        from: VariantStatus,
        to: VariantStatus,
    },

    #[error("Site not found: {0}")]
    SiteNotFound(Uuid),

    #[error("Site not running: {0}")]
    SiteNotRunning(Uuid),

    #[error("Variant not found: {0}")]
    VariantNotFound(String),

    #[error("No variants found for site {0}")]
    NoVariants(Uuid),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
