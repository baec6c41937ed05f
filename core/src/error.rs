use thiserror::Error;

pub type RankResult<T> = Result<T, RankError>;

#[derive(Error, Debug)]
pub enum RankError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("malformed payload: {0}")]
    Decode(String),

    #[error("app not found: {app_id}")]
    AppNotFound { app_id: u64 },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("storage error: {0}")]
    Storage(String),
}

impl RankError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        RankError::InvalidInput(msg.into())
    }

    /// Whether the failure came from an external collaborator rather than the caller.
    pub fn is_upstream(&self) -> bool {
        matches!(self, RankError::Transport(_) | RankError::Decode(_))
    }
}

impl From<serde_json::Error> for RankError {
    fn from(e: serde_json::Error) -> Self {
        RankError::Decode(e.to_string())
    }
}

impl From<sled::Error> for RankError {
    fn from(e: sled::Error) -> Self {
        RankError::Storage(e.to_string())
    }
}

impl From<bincode::Error> for RankError {
    fn from(e: bincode::Error) -> Self {
        RankError::Storage(e.to_string())
    }
}

impl From<std::io::Error> for RankError {
    fn from(e: std::io::Error) -> Self {
        RankError::Storage(e.to_string())
    }
}
