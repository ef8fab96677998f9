use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::Quote;

/// Classification of a failed fetch attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchErrorKind {
    /// The request could not complete (network, timeout, non-success status).
    Transport,
    /// The service answered, but without a quote payload for the symbol.
    Upstream,
    /// The quote payload was present but a required field was missing or malformed.
    Parse,
}

impl FetchErrorKind {
    pub const fn code(self) -> &'static str {
        match self {
            Self::Transport => "fetch.transport",
            Self::Upstream => "fetch.upstream",
            Self::Parse => "fetch.parse",
        }
    }
}

impl Display for FetchErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Outcome of a failed attempt, reported through [`FetchState::Failed`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchError {
    kind: FetchErrorKind,
    message: String,
}

impl FetchError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            kind: FetchErrorKind::Transport,
            message: message.into(),
        }
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        Self {
            kind: FetchErrorKind::Upstream,
            message: message.into(),
        }
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self {
            kind: FetchErrorKind::Parse,
            message: message.into(),
        }
    }

    pub const fn kind(&self) -> FetchErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for FetchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.kind.code())
    }
}

impl std::error::Error for FetchError {}

/// Observable state of the most recent fetch attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "data", rename_all = "snake_case")]
pub enum FetchState {
    Loading,
    Ready(Quote),
    Failed(FetchError),
}

impl FetchState {
    pub fn quote(&self) -> Option<&Quote> {
        match self {
            Self::Ready(quote) => Some(quote),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&FetchError> {
        match self {
            Self::Failed(error) => Some(error),
            _ => None,
        }
    }

    pub fn failure_kind(&self) -> Option<FetchErrorKind> {
        self.error().map(FetchError::kind)
    }

    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub const fn is_settled(&self) -> bool {
        !self.is_loading()
    }
}

impl From<Result<Quote, FetchError>> for FetchState {
    fn from(value: Result<Quote, FetchError>) -> Self {
        match value {
            Ok(quote) => Self::Ready(quote),
            Err(error) => Self::Failed(error),
        }
    }
}
