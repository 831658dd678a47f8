//! Error taxonomy for the evaluation pipeline and its collaborators.

/// Errors raised by a model registry while gathering candidates.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("model registry unavailable: {0}")]
    Unavailable(String),

    #[error("malformed model manifest: {0}")]
    Malformed(String),

    #[error("registry io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised by a scorer while scoring one model.
#[derive(Debug, thiserror::Error)]
pub enum ScoreError {
    #[error("scoring failed: {0}")]
    Failed(String),

    #[error("model output missing: {0}")]
    MissingOutput(String),

    #[error("scorer io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Pipeline errors.
#[derive(Debug, thiserror::Error)]
pub enum EvalError {
    #[error("empty result set: no scored models to rank")]
    EmptyResults,

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("scoring model {model} failed: {source}")]
    Scoring {
        model: String,
        #[source]
        source: ScoreError,
    },

    #[error("invalid pipeline config: {0}")]
    InvalidConfig(String),

    #[error("task source error: {0}")]
    TaskSource(String),

    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, EvalError>;
