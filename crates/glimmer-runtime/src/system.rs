//! Runtime system trait

use crate::context::FrameContext;
use glimmer_core::Result;

/// A system that can be ticked by the frame loop
///
/// Systems are updated in registration order, once per rendered frame, with
/// the same [`FrameContext`] snapshot. A system that fails to update for one
/// frame should log and recover rather than return an error; errors returned
/// here are reserved for conditions that make the system unusable.
pub trait RuntimeSystem {
    /// Called once when the system is first registered
    fn initialize(&mut self) -> Result<()>;

    /// Called once per frame for variable-rate logic
    fn update(&mut self, ctx: &FrameContext, dt: f64) -> Result<()>;

    /// Called when the system is being shut down. Must release devices and
    /// background work.
    fn shutdown(&mut self) -> Result<()>;

    /// Human-readable name for this system
    fn name(&self) -> &str;
}
