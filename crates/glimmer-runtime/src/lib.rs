//! Glimmer Runtime - Frame loop infrastructure
//!
//! Provides the building blocks shared by the simulation and gesture sides:
//! - `FrameClock` - accumulated frame time, the phase source for all animation
//! - `RateGate` / `MonotonicClock` - throttling for inference decoupled from render rate
//! - `PointerState` - window cursor tracking in normalized device coordinates
//! - `formation_cell` - single-writer, many-reader shared `Formation`
//! - `SceneEvent` / `EventBus` - typed event queue for transitions and readiness
//! - `FrameContext` - immutable per-frame snapshot handed to every system
//! - `RuntimeSystem` - trait for systems ticked by the frame loop

mod clock;
mod context;
mod event;
mod event_bus;
mod input;
mod state;
mod system;

pub use clock::{FrameClock, MonotonicClock, RateGate};
pub use context::FrameContext;
pub use event::SceneEvent;
pub use event_bus::EventBus;
pub use input::PointerState;
pub use state::{formation_cell, FormationReader, FormationWriter};
pub use system::RuntimeSystem;
