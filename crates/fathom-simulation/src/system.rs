use crate::context::SimContext;
use crate::error::SimResult;

/// One phase of the frame.
///
/// Systems are executed in registration order. Each system receives
/// a mutable context providing access to the ocean, clock, input, RNG,
/// store, and event log.
pub trait System: std::fmt::Debug {
    /// Human-readable name for this system.
    fn name(&self) -> &str;

    /// Called once per frame.
    fn tick(&mut self, ctx: &mut SimContext<'_>) -> SimResult<()>;

    /// Called once at the start of every run. Optional setup hook.
    fn init(&mut self, _ctx: &mut SimContext<'_>) -> SimResult<()> {
        Ok(())
    }

    /// Forget per-run state before a new run starts.
    fn reset(&mut self) {}

    /// Support downcasting to concrete types for cross-system communication.
    fn as_any(&self) -> &dyn std::any::Any;

    /// Support downcasting to concrete types for cross-system communication.
    fn as_any_mut(&mut self) -> &mut dyn std::any::Any;
}
