use thiserror::Error;

/// Errors raised by the solver library.
///
/// Configuration errors are raised before any message is exchanged, identically on
/// every rank. Communication errors only come from the threads backend, where a
/// vanished peer disconnects its channel; the MPI backend blocks instead. Backend
/// errors cover failures of the transport itself that involve no particular peer.
#[derive(Error, Debug)]
pub enum SolverError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Rank {rank} lost contact with rank {peer}: {message}")]
    Communication {
        rank: usize,
        peer: usize,
        message: String,
    },

    #[error("Message passing backend error: {0}")]
    Backend(String),

    #[error("Halo row from rank {peer} has {got} values, expected {expected}")]
    HaloShape {
        peer: usize,
        got: usize,
        expected: usize,
    },

    #[error("Rank {rank} has no {side} halo row for global row {row}")]
    MissingHalo {
        rank: usize,
        side: &'static str,
        row: usize,
    },

    #[error("Config file error: {0}")]
    ConfigFile(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type SolverResult<T> = Result<T, SolverError>;

impl SolverError {
    pub fn invalid(message: impl Into<String>) -> Self {
        SolverError::InvalidConfiguration(message.into())
    }

    pub fn backend(message: impl Into<String>) -> Self {
        SolverError::Backend(message.into())
    }
}
