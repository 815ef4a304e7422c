//! Glimmer Gesture - Hand gestures to formations
//!
//! Provides:
//! - `HandLandmarks` - the 21-point hand model and its palm/fingertip geometry
//! - `GestureRecognizer` - scale-invariant open / closed classification
//! - `GestureStateMachine` - debounced TREE / SCATTERED / TEXT transitions
//! - `GestureController` / `GestureWorker` - camera and model plumbing, rate
//!   limiting, manual overrides, and the single writer of the shared formation
//! - `synthetic` - scripted hands and a fake camera for headless runs

pub mod config;
pub mod controller;
pub mod landmarks;
pub mod machine;
pub mod recognizer;
pub mod source;
pub mod synthetic;

pub use config::GestureConfig;
pub use controller::{CommandSender, FormationCommand, GestureController, GestureWorker};
pub use landmarks::HandLandmarks;
pub use machine::{GestureStateMachine, Transition};
pub use recognizer::{gesture_ratio, Gesture, GestureRecognizer};
pub use source::{FrameSource, LandmarkModel, ModelSlot, VideoFrame};
