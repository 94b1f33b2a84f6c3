use crate::entity::EntityId;
use crate::fish::Lifecycle;

/// Alias for `Result<T, CoreError>`.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors raised by the data model.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A lifecycle transition that the state machine does not allow.
    #[error("fish {id}: invalid lifecycle transition {from} -> {to}")]
    InvalidTransition {
        /// The fish whose transition was rejected.
        id: EntityId,
        /// The state the fish is in.
        from: Lifecycle,
        /// The requested state.
        to: Lifecycle,
    },

    /// The level configuration is unusable.
    #[error("invalid level config: {0}")]
    InvalidLevel(String),

    /// A level file could not be decoded.
    #[error("level decode error: {0}")]
    Decode(#[from] serde_json::Error),
}
