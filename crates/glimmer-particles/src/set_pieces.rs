//! Single objects whose visibility follows the formation: the star on top of
//! the tree and the birthday cake shown with the text.

use crate::curves::approach_f32;
use glimmer_core::{Formation, InstanceTransform, Vec3};
use std::f32::consts::TAU;

const TOPPER_SPIN: f32 = 0.5;
const TOPPER_HIDDEN_SCALE: f32 = 0.01;
const SCALE_RATE: f32 = 2.0;

/// Star at the tip of the tree. Visible only in tree formation.
#[derive(Debug, Clone)]
pub struct TreeTopper {
    tree_height: f32,
    rotation_y: f32,
    scale: f32,
    position: Vec3,
}

impl TreeTopper {
    pub fn new(tree_height: f32) -> Self {
        Self {
            tree_height,
            rotation_y: 0.0,
            scale: 1.0,
            position: Vec3::new(0.0, tree_height / 2.0, 0.0),
        }
    }

    pub fn advance(&mut self, formation: Formation, elapsed: f32, dt: f32) {
        self.rotation_y += dt * TOPPER_SPIN;
        self.position.y = self.tree_height / 2.0 + 0.5 + (elapsed * 1.5).sin() * 0.1;
        let target = if formation == Formation::Tree {
            1.0
        } else {
            TOPPER_HIDDEN_SCALE
        };
        self.scale = approach_f32(self.scale, target, SCALE_RATE, dt);
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn transform(&self) -> InstanceTransform {
        InstanceTransform::from_position(self.position)
            .with_rotation(Vec3::new(0.0, self.rotation_y, 0.0))
            .with_scale(self.scale)
    }
}

const CANDLE_COUNT: usize = 8;
const CANDLE_RING_RADIUS: f32 = 1.8;
const FLAME_HEIGHT: f32 = 3.8;
const CAKE_BASE_Y: f32 = -5.0;
const CAKE_SPIN: f32 = 0.2;

/// Cake with a ring of flickering candles. Grows in only for text formation.
#[derive(Debug, Clone)]
pub struct BirthdayCake {
    scale: f32,
    rotation_y: f32,
    flames: [InstanceTransform; CANDLE_COUNT],
}

impl Default for BirthdayCake {
    fn default() -> Self {
        Self::new()
    }
}

impl BirthdayCake {
    pub fn new() -> Self {
        let mut cake = Self {
            scale: 0.0,
            rotation_y: 0.0,
            flames: [InstanceTransform::IDENTITY; CANDLE_COUNT],
        };
        cake.flicker(0.0);
        cake
    }

    pub fn advance(&mut self, formation: Formation, elapsed: f32, dt: f32) {
        let visible = formation == Formation::Text;
        let target = if visible { 1.0 } else { 0.0 };
        self.scale = approach_f32(self.scale, target, SCALE_RATE, dt);
        if visible {
            self.rotation_y += dt * CAKE_SPIN;
        }
        self.flicker(elapsed);
    }

    fn flicker(&mut self, elapsed: f32) {
        for (i, flame) in self.flames.iter_mut().enumerate() {
            let angle = i as f32 / CANDLE_COUNT as f32 * TAU;
            let position = Vec3::new(
                angle.cos() * CANDLE_RING_RADIUS,
                FLAME_HEIGHT,
                angle.sin() * CANDLE_RING_RADIUS,
            );
            let scale = 1.0 + (elapsed * 10.0 + i as f32).sin() * 0.2;
            *flame = InstanceTransform::from_position(position).with_scale(scale);
        }
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn is_visible(&self) -> bool {
        self.scale > 1e-3
    }

    /// Transform of the cake group
    pub fn transform(&self) -> InstanceTransform {
        InstanceTransform::from_position(Vec3::new(0.0, CAKE_BASE_Y, 0.0))
            .with_rotation(Vec3::new(0.0, self.rotation_y, 0.0))
            .with_scale(self.scale)
    }

    /// Flame transforms relative to the cake group
    pub fn flames(&self) -> &[InstanceTransform] {
        &self.flames
    }
}
