use thiserror::Error;

use chroma_core::error::{ConfigError, SimError};

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Sim(#[from] SimError),

    #[error("failed to start game loop thread: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("game loop is no longer running")]
    LoopClosed,

    #[error("game loop thread panicked")]
    LoopPanicked,

    #[error("failed to encode snapshot: {0}")]
    Encode(#[from] serde_json::Error),
}
