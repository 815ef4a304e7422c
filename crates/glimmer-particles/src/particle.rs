//! Particle types: CPU simulation state and GPU instance data

use bytemuck::{Pod, Zeroable};
use glimmer_core::{Color, InstanceTransform, Vec3};
use serde::Serialize;

/// Visual class of a formation particle
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticleKind {
    /// Small, dark-green, constant scale
    Needle,
    /// Larger, gold, pulses in scale
    Ornament,
}

/// CPU-side formation particle (not sent to GPU).
///
/// Everything except `current_position` is fixed at creation. The text
/// target lives on the field, since it arrives later than the rest.
#[derive(Clone, Debug)]
pub struct Particle {
    pub id: u32,
    pub kind: ParticleKind,
    pub scatter_position: Vec3,
    pub tree_position: Vec3,
    pub current_position: Vec3,
    pub color: Color,
    pub scale: f32,
    /// Per-axis self-rotation speed in radians per second
    pub rotation_speed: Vec3,
}

impl Particle {
    pub fn is_ornament(&self) -> bool {
        self.kind == ParticleKind::Ornament
    }
}

/// GPU instance data - matches the WGSL `ParticleInstance` struct.
/// 48 bytes (3 rows of vec4).
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable, Serialize)]
pub struct ParticleInstance {
    /// World position + uniform scale packed into vec4
    pub pos_scale: [f32; 4], // xyz = position, w = scale
    /// Euler rotation in radians (XYZ order), w unused
    pub rotation: [f32; 4],
    /// Color with alpha
    pub color: [f32; 4], // rgba
}

impl ParticleInstance {
    pub fn new(transform: &InstanceTransform, color: Color) -> Self {
        let p = transform.position;
        let r = transform.rotation;
        Self {
            pos_scale: [p.x, p.y, p.z, transform.scale],
            rotation: [r.x, r.y, r.z, 0.0],
            color: color.to_array(),
        }
    }

    pub fn position(&self) -> Vec3 {
        Vec3::new(self.pos_scale[0], self.pos_scale[1], self.pos_scale[2])
    }

    pub fn scale(&self) -> f32 {
        self.pos_scale[3]
    }

    pub fn transform(&self) -> InstanceTransform {
        InstanceTransform::from_position(self.position())
            .with_rotation(Vec3::new(self.rotation[0], self.rotation[1], self.rotation[2]))
            .with_scale(self.scale())
    }
}
