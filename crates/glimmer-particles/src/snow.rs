//! Ambient snowfall with pointer-driven wind.
//!
//! Fall, drift and wind impulses are tuned per 60 fps frame and scaled by
//! the actual step so the field behaves the same at any frame rate.

use crate::config::SnowConfig;
use crate::curves::frame_decay;
use crate::particle::ParticleInstance;
use crate::rand::ParticleRng;
use glimmer_core::{Color, InstanceTransform, Vec2, Vec3};
use std::f32::consts::TAU;

#[derive(Debug, Clone, PartialEq)]
pub struct Flake {
    pub position: Vec3,
    /// World units per reference frame
    pub fall_speed: f32,
    /// Drift and spin phase in radians
    pub phase: f32,
    pub size: f32,
    /// Wind velocity on x and z, world units per second
    pub wind: Vec2,
}

pub struct SnowField {
    config: SnowConfig,
    rng: ParticleRng,
    flakes: Vec<Flake>,
    last_pointer: Option<Vec3>,
    pointer_velocity: Vec3,
    elapsed: f32,
    instances: Vec<ParticleInstance>,
}

impl SnowField {
    pub fn new(config: SnowConfig, mut rng: ParticleRng) -> Self {
        let bounds = config.bounds();
        let flakes = (0..config.count)
            .map(|_| Flake {
                position: Vec3::new(
                    rng.centered(bounds.x),
                    rng.centered(bounds.y),
                    rng.centered(bounds.z),
                ),
                fall_speed: rng.range(config.fall_speed[0], config.fall_speed[1]),
                phase: rng.next_f32() * TAU,
                size: rng.range(config.size[0], config.size[1]),
                wind: Vec2::ZERO,
            })
            .collect::<Vec<_>>();
        let instances = vec![ParticleInstance::default(); flakes.len()];

        Self {
            config,
            rng,
            flakes,
            last_pointer: None,
            pointer_velocity: Vec3::ZERO,
            elapsed: 0.0,
            instances,
        }
    }

    pub fn flakes(&self) -> &[Flake] {
        &self.flakes
    }

    pub fn len(&self) -> usize {
        self.flakes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flakes.is_empty()
    }

    /// Pointer velocity used for the most recent wind impulse
    pub fn pointer_velocity(&self) -> Vec3 {
        self.pointer_velocity
    }

    fn track_pointer(&mut self, pointer: Option<Vec3>, dt: f32) {
        let Some(p) = pointer else {
            return;
        };
        self.pointer_velocity = match self.last_pointer {
            Some(prev) if dt > 0.0 => {
                ((p - prev) / dt).clamp_length_max(self.config.max_pointer_speed)
            }
            _ => Vec3::ZERO,
        };
        self.last_pointer = Some(p);
    }

    pub fn advance(&mut self, pointer: Option<Vec3>, dt: f32) -> &[ParticleInstance] {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        self.elapsed += dt;
        self.track_pointer(pointer, dt);

        let t = self.elapsed;
        let frames = dt * self.config.reference_fps;
        let damping = frame_decay(self.config.damping_per_frame, self.config.reference_fps, dt);
        let bounds = self.config.bounds();
        let radius = self.config.wind_radius;
        let impulse = Vec2::new(self.pointer_velocity.x, self.pointer_velocity.y)
            * self.config.wind_strength
            * self.config.wind_gain
            * frames;
        let color = Color::WHITE.with_alpha(self.config.opacity);

        for (flake, instance) in self.flakes.iter_mut().zip(self.instances.iter_mut()) {
            let pos = &mut flake.position;
            pos.y -= flake.fall_speed * frames;
            pos.x += (t + flake.phase).sin() * self.config.drift_amplitude * frames;

            // Wind acts in a cylinder along z around the pointer
            if let Some(center) = pointer {
                let dx = pos.x - center.x;
                let dy = pos.y - center.y;
                let dist_sq = dx * dx + dy * dy;
                if dist_sq < radius * radius {
                    let influence = (radius - dist_sq.sqrt()) / radius;
                    flake.wind += impulse * influence;
                }
            }

            pos.x += flake.wind.x * dt;
            pos.z += flake.wind.y * dt;
            flake.wind *= damping;

            if pos.y < -bounds.y {
                pos.y = bounds.y;
                pos.x = self.rng.centered(bounds.x);
                pos.z = self.rng.centered(bounds.z);
                flake.wind = Vec2::ZERO;
            }

            pos.x = wrap_axis(pos.x, bounds.x);
            pos.z = wrap_axis(pos.z, bounds.z);

            let transform = InstanceTransform::from_position(*pos)
                .with_rotation(Vec3::new(t * 0.2 + flake.phase, t * 0.1 + flake.phase, 0.0))
                .with_scale(flake.size);
            *instance = ParticleInstance::new(&transform, color);
        }

        &self.instances
    }

    pub fn instances(&self) -> &[ParticleInstance] {
        &self.instances
    }
}

/// Wraps `value` into `[-half, half]`, however many box widths it is out.
fn wrap_axis(value: f32, half: f32) -> f32 {
    if half <= 0.0 || (-half..=half).contains(&value) {
        return value;
    }
    (value + half).rem_euclid(half * 2.0) - half
}
