use fathom_core::{CoreError, EntityId};
use fathom_mechanics::MechError;

use crate::store::StoreError;

/// Alias for `Result<T, SimError>`.
pub type SimResult<T> = Result<T, SimError>;

/// Errors surfaced by the simulation.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// A fish id did not resolve to a live fish.
    #[error("entity not found in simulation: {0}")]
    EntityNotFound(EntityId),

    /// `tick` was called after the run finished.
    #[error("run has ended; call reset_run() before ticking again")]
    RunEnded,

    /// The level was rejected or a lifecycle transition was illegal.
    #[error(transparent)]
    Level(#[from] CoreError),

    /// A tuning value was rejected.
    #[error(transparent)]
    Tuning(#[from] MechError),

    /// The run store failed where the caller asked for the failure.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_problem() {
        let id = EntityId::new();
        assert_eq!(
            SimError::EntityNotFound(id).to_string(),
            format!("entity not found in simulation: {id}")
        );
        assert!(SimError::RunEnded.to_string().contains("reset_run()"));
        let tuning = SimError::from(MechError::InvalidTuning {
            field: "player.drag",
            reason: "too sticky".into(),
        });
        assert_eq!(tuning.to_string(), "invalid tuning for player.drag: too sticky");
    }
}
