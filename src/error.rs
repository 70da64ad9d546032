use std::path::PathBuf;

/// Errors surfaced by the move arbitration pipeline.
///
/// Most source failures never reach the caller: an unavailable book,
/// tablebase or remote service simply yields no move. What is left here
/// are engine failures, misconfiguration and transport errors that the
/// remote sources log before swallowing.
#[derive(Debug, thiserror::Error)]
pub enum ArbiterError {
    #[error("engine failure: {0}")]
    Engine(String),

    #[error("invalid engine protocol: {0}. Expected xboard, uci, or homemade")]
    UnknownProtocol(String),

    #[error("no engine constructor registered for {0}")]
    EngineNotRegistered(String),

    #[error("illegal move {mv} in position {fen}")]
    IllegalMove { mv: String, fen: String },

    #[error("FEN error: {0}")]
    Fen(String),

    #[error("could not open book {path}: {reason}")]
    Book { path: PathBuf, reason: String },

    #[error("could not open tablebase: {0}")]
    Tablebase(String),

    #[error("request to {url} failed: {reason}")]
    Http { url: String, reason: String },

    #[error("malformed response: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, ArbiterError>;
