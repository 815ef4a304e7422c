//! Glimmer Core - Foundational types for the Glimmer particle scene
//!
//! This crate provides the core types that all other Glimmer crates depend on:
//! - `Formation` - The shared target shape selector
//! - `InstanceTransform`, `Color` - Per-instance render data
//! - Error types and Result alias
//!
//! Vector math is `glam`; the common types are re-exported here so downstream
//! crates agree on a single version.

mod error;
mod formation;
mod types;

pub use error::{GlimmerError, Result};
pub use formation::Formation;
pub use glam::{EulerRot, Mat4, Quat, Vec2, Vec3};
pub use types::{Color, InstanceTransform};
