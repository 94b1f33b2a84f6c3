//! Error types for the rules crate.

/// Errors that can occur when validating tuning parameters.
#[derive(Debug, thiserror::Error)]
pub enum MechError {
    /// A tuning value is out of its usable range.
    #[error("invalid tuning for {field}: {reason}")]
    InvalidTuning {
        /// The offending field, e.g. `"stamina.drain_rate"`.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}

/// Convenience result type for rule operations.
pub type MechResult<T> = Result<T, MechError>;

/// Reject negative or non-finite values.
pub(crate) fn ensure_non_negative(field: &'static str, value: f32) -> MechResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(MechError::InvalidTuning {
            field,
            reason: format!("expected a finite value >= 0, got {value}"),
        })
    }
}
