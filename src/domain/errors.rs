use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Collection error: {0}")]
    Collection(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Config error: {0}")]
    Config(String),
}

impl DomainError {
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    pub fn protocol(msg: impl Into<String>) -> Self {
        Self::Protocol(msg.into())
    }

    pub fn collection(msg: impl Into<String>) -> Self {
        Self::Collection(msg.into())
    }

    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Transport and protocol failures are caught at the call site and
    /// turned into sentinel results; everything else propagates.
    pub fn is_service_failure(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Protocol(_))
    }
}

pub type Result<T> = std::result::Result<T, DomainError>;
