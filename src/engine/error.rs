use ulid::Ulid;

use super::conflict::Conflict;

#[derive(Debug)]
pub enum EngineError {
    /// A referenced activity/formula/resource record does not exist.
    NotFound(Ulid),
    /// The referenced record exists but is switched off.
    Inactive(Ulid),
    /// Malformed request input (empty window, zero participants, ...).
    InvalidRequest(&'static str),
    LimitExceeded(&'static str),
    /// Asked to commit a window that is not available. Carries every
    /// conflict the re-check found.
    Unavailable(Vec<Conflict>),
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::NotFound(id) => write!(f, "not found: {id}"),
            EngineError::Inactive(id) => write!(f, "inactive: {id}"),
            EngineError::InvalidRequest(msg) => write!(f, "invalid request: {msg}"),
            EngineError::LimitExceeded(msg) => write!(f, "limit exceeded: {msg}"),
            EngineError::Unavailable(conflicts) => {
                let msgs = conflicts
                    .iter()
                    .map(|c| c.message.as_str())
                    .collect::<Vec<_>>()
                    .join("; ");
                write!(f, "not available: {msgs}")
            }
        }
    }
}

impl std::error::Error for EngineError {}
