use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] tickwatch_core::ValidationError),

    #[error(transparent)]
    Poller(#[from] tickwatch_core::PollerError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) => 2,
            Self::Poller(tickwatch_core::PollerError::Validation(_)) => 2,
            Self::Poller(tickwatch_core::PollerError::RuntimeUnavailable) => 3,
            Self::Io(_) => 10,
        }
    }
}
