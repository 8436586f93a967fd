/// Errors raised by a registry client.
///
/// Only [`RegistryError::Config`] escapes the controller; every other variant
/// means the upstream registry is unavailable and is absorbed into an empty
/// query result.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// Invalid construction parameters.
    #[error("configuration error: {0}")]
    Config(String),

    /// Connection, timeout or protocol failure talking to the registry.
    #[error("registry transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Registry answered with a non-success status.
    #[error("registry returned {status} for {path}")]
    Status {
        path: String,
        status: reqwest::StatusCode,
    },

    /// Registry answered with a body that does not decode.
    #[error("malformed registry response for {path}: {message}")]
    Decode {
        path: String,
        message: String,
    },
}

impl RegistryError {
    #[must_use]
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Short label used when logging an absorbed failure.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Config(_) => "config",
            Self::Transport(e) if e.is_timeout() => "timeout",
            Self::Transport(e) if e.is_connect() => "connect",
            Self::Transport(_) => "transport",
            Self::Status { .. } => "status",
            Self::Decode { .. } => "decode",
        }
    }
}
