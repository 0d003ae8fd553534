use thiserror::Error;

use crate::state::ServerKind;

#[derive(Error, Debug)]
pub enum RaftError {
    #[error("illegal transition {transition} from {kind}")]
    IllegalTransition {
        transition: &'static str,
        kind: ServerKind,
    },

    #[error("invalid server id: {0}")]
    InvalidServerId(#[from] uuid::Error),

    #[error("index must be non-negative, got {0}")]
    NegativeIndex(i64),

    #[error("term counter overflowed")]
    TermOverflow,

    #[error("storage codec error: {0}")]
    Storage(#[from] serde_json::Error),

    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("transport error: {0}")]
    Transport(String),
}

pub type Result<T> = std::result::Result<T, RaftError>;
