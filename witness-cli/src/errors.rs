use circuit_engine::field::FieldError;
use circuit_engine::CircuitError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("cannot access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("input `{0}` is given more than once")]
    DuplicateInput(String),

    #[error("malformed json: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Circuit(#[from] CircuitError),

    #[error(transparent)]
    Field(#[from] FieldError),
}

impl CliError {
    pub fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| CliError::Io { path, source }
    }
}
