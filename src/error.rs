use std::{fmt, io};

use machine_learning::MlErr;

/// All errors that can occur while setting up or running a training session.
#[derive(Debug)]
pub enum SessionError {
    /// Invalid configuration, caught before building the network.
    InvalidConfig(String),
    /// The configuration file couldn't be read.
    Io(io::Error),
    /// The configuration file isn't valid json for a `Config`.
    Json(serde_json::Error),
    /// The network rejected an operation during training.
    Ml(MlErr),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidConfig(msg) => write!(f, "invalid config: {msg}"),
            Self::Io(e) => write!(f, "io error: {e}"),
            Self::Json(e) => write!(f, "malformed config: {e}"),
            Self::Ml(e) => write!(f, "training error: {e}"),
        }
    }
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Json(e) => Some(e),
            Self::Ml(e) => Some(e),
            Self::InvalidConfig(_) => None,
        }
    }
}

impl From<io::Error> for SessionError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for SessionError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

impl From<MlErr> for SessionError {
    fn from(e: MlErr) -> Self {
        Self::Ml(e)
    }
}
