use taskscope_api::ConduitError;
use thiserror::Error;

/// All the ways a report run can go wrong
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Remote API error: {0}")]
    Remote(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ConduitError> for Error {
    fn from(err: ConduitError) -> Self {
        match err {
            ConduitError::Api { .. } => Error::Remote(err.to_string()),
            ConduitError::Network(_) | ConduitError::Parse(_) => Error::Transport(err.to_string()),
        }
    }
}
