//! The formation particle field: thousands of needles and ornaments that
//! interpolate between scatter, tree and text targets.

use crate::config::ParticleFieldConfig;
use crate::curves::approach;
use crate::interaction::repulsion_offset;
use crate::particle::{Particle, ParticleInstance, ParticleKind};
use crate::rand::ParticleRng;
use crate::sampler::{sample_scatter, TreeShape};
use glimmer_core::{Formation, GlimmerError, InstanceTransform, Result, Vec3};

/// Hover oscillation for a formation: (amplitude, frequency)
fn hover_params(formation: Formation) -> (f32, f32) {
    match formation {
        Formation::Scattered => (0.5, 0.5),
        Formation::Tree | Formation::Text => (0.1, 1.5),
    }
}

pub struct ParticleField {
    config: ParticleFieldConfig,
    particles: Vec<Particle>,
    /// Filled in once text sampling finishes
    text_targets: Option<Vec<Vec3>>,
    /// Accumulated simulation time in seconds
    elapsed: f32,
    instances: Vec<ParticleInstance>,
}

impl ParticleField {
    /// Seed every particle. All particles start at their scatter position.
    pub fn new(config: ParticleFieldConfig, rng: &mut ParticleRng) -> Self {
        let shape = TreeShape::new(config.tree_height, config.tree_base_radius);
        let needles = config.palette.needles();
        let ornaments = config.palette.ornaments();

        let particles: Vec<Particle> = (0..config.count)
            .map(|i| {
                let kind = if rng.chance(config.ornament_fraction) {
                    ParticleKind::Ornament
                } else {
                    ParticleKind::Needle
                };
                let scatter = sample_scatter(rng, config.scatter_radius);
                let tree = shape.sample(rng, i);
                let (color, scale) = match kind {
                    ParticleKind::Ornament => {
                        let color = if rng.chance(0.5) { ornaments[0] } else { ornaments[1] };
                        (color, rng.range(0.1, 0.25))
                    }
                    ParticleKind::Needle => {
                        let color = if rng.chance(0.5) { needles[0] } else { needles[1] };
                        (color, rng.range(0.02, 0.1))
                    }
                };
                let rotation_speed = Vec3::new(rng.next_f32(), rng.next_f32(), rng.next_f32());

                Particle {
                    id: i as u32,
                    kind,
                    scatter_position: scatter,
                    tree_position: tree,
                    current_position: scatter,
                    color,
                    scale,
                    rotation_speed,
                }
            })
            .collect();

        let ornament_count = particles.iter().filter(|p| p.is_ornament()).count();
        log::debug!(
            "Seeded {} formation particles ({} ornaments)",
            particles.len(),
            ornament_count
        );

        let instances = vec![ParticleInstance::default(); particles.len()];
        Self {
            config,
            particles,
            text_targets: None,
            elapsed: 0.0,
            instances,
        }
    }

    pub fn config(&self) -> &ParticleFieldConfig {
        &self.config
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn has_text_targets(&self) -> bool {
        self.text_targets.is_some()
    }

    /// Target of particle `index` for `formation`. Text falls back to the
    /// scatter position until text targets are set.
    pub fn target(&self, index: usize, formation: Formation) -> Option<Vec3> {
        let p = self.particles.get(index)?;
        Some(Self::target_of(p, self.text_targets.as_deref(), formation))
    }

    fn target_of(p: &Particle, text: Option<&[Vec3]>, formation: Formation) -> Vec3 {
        match formation {
            Formation::Scattered => p.scatter_position,
            Formation::Tree => p.tree_position,
            Formation::Text => text
                .and_then(|t| t.get(p.id as usize).copied())
                .unwrap_or(p.scatter_position),
        }
    }

    /// Replace the text targets, one per particle in id order. Particles
    /// keep their current position and retarget smoothly.
    pub fn set_text_targets(&mut self, samples: &[Vec3]) -> Result<()> {
        if samples.len() != self.particles.len() {
            return Err(GlimmerError::SampleCountMismatch {
                expected: self.particles.len(),
                got: samples.len(),
            });
        }
        self.text_targets = Some(samples.to_vec());
        Ok(())
    }

    fn lerp_rate(&self, formation: Formation) -> f32 {
        match formation {
            Formation::Text => self.config.text_lerp_rate,
            Formation::Scattered | Formation::Tree => self.config.scatter_lerp_rate,
        }
    }

    /// Step the simulation by `dt` seconds and return one instance per particle.
    pub fn advance(
        &mut self,
        formation: Formation,
        interaction_point: Option<Vec3>,
        dt: f32,
    ) -> &[ParticleInstance] {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        self.elapsed += dt;
        let t = self.elapsed;

        let rate = self.lerp_rate(formation);
        let repel_center = interaction_point.filter(|_| formation.allows_interaction());
        let (hover_amp, hover_freq) = hover_params(formation);
        let text_scale = if formation == Formation::Text {
            self.config.text_scale
        } else {
            1.0
        };
        let text = self.text_targets.as_deref();

        for (p, instance) in self.particles.iter_mut().zip(self.instances.iter_mut()) {
            let target = Self::target_of(p, text, formation);
            p.current_position = approach(p.current_position, target, rate, dt);

            let mut pos = p.current_position;
            if let Some(center) = repel_center {
                if let Some(push) = repulsion_offset(
                    pos,
                    center,
                    self.config.repulsion_radius,
                    self.config.repulsion_push,
                ) {
                    pos += push;
                }
            }

            let phase = p.id as f32;
            pos.y += (t * hover_freq + phase).sin() * hover_amp;

            let rotation = Vec3::new(t * p.rotation_speed.x, t * p.rotation_speed.y, 0.0);

            let mut scale_mult = match p.kind {
                ParticleKind::Ornament => 1.0 + (t * 3.0 + phase).sin() * 0.2,
                ParticleKind::Needle => 1.0,
            };
            scale_mult *= text_scale;

            let transform = InstanceTransform::from_position(pos)
                .with_rotation(rotation)
                .with_scale(p.scale * scale_mult);
            *instance = ParticleInstance::new(&transform, p.color);
        }

        &self.instances
    }

    /// Instances from the last `advance`
    pub fn instances(&self) -> &[ParticleInstance] {
        &self.instances
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(count: usize, seed: u32) -> ParticleField {
        let config = ParticleFieldConfig {
            count,
            ..Default::default()
        };
        ParticleField::new(config, &mut ParticleRng::new(seed))
    }

    fn distances(field: &ParticleField, formation: Formation) -> Vec<f32> {
        field
            .particles()
            .iter()
            .enumerate()
            .map(|(i, p)| p.current_position.distance(field.target(i, formation).unwrap()))
            .collect()
    }

    #[test]
    fn starts_scattered() {
        let f = field(100, 1);
        for p in f.particles() {
            assert_eq!(p.current_position, p.scatter_position);
            assert!(p.scatter_position.length() <= 25.0 + 1e-3);
        }
    }

    #[test]
    fn same_seed_same_layout() {
        let a = field(200, 77);
        let b = field(200, 77);
        for (pa, pb) in a.particles().iter().zip(b.particles()) {
            assert_eq!(pa.scatter_position, pb.scatter_position);
            assert_eq!(pa.tree_position, pb.tree_position);
            assert_eq!(pa.kind, pb.kind);
        }
    }

    #[test]
    fn roughly_fifteen_percent_ornaments() {
        let f = field(4000, 3);
        let ornaments = f.particles().iter().filter(|p| p.is_ornament()).count();
        let share = ornaments as f32 / 4000.0;
        assert!((share - 0.15).abs() < 0.03, "share {share}");
        for p in f.particles() {
            match p.kind {
                ParticleKind::Ornament => assert!(p.scale >= 0.1 && p.scale < 0.25),
                ParticleKind::Needle => assert!(p.scale >= 0.02 && p.scale < 0.1),
            }
        }
    }

    #[test]
    fn step_stays_on_segment_without_overshoot() {
        let mut f = field(50, 4);
        let before: Vec<Vec3> = f.particles().iter().map(|p| p.current_position).collect();
        f.advance(Formation::Tree, None, 1.0 / 60.0);
        for (i, p) in f.particles().iter().enumerate() {
            let start = before[i];
            let target = p.tree_position;
            let total = start.distance(target);
            let moved = start.distance(p.current_position);
            let left = p.current_position.distance(target);
            assert!(moved <= total + 1e-4);
            assert!((moved + left - total).abs() < 1e-3);
        }
    }

    #[test]
    fn long_step_lands_on_target() {
        let mut f = field(20, 5);
        f.advance(Formation::Tree, None, 10.0);
        for d in distances(&f, Formation::Tree) {
            assert!(d < 1e-4);
        }
    }

    #[test]
    fn approach_is_monotone() {
        let mut f = field(100, 6);
        let mut prev = distances(&f, Formation::Tree);
        for _ in 0..30 {
            f.advance(Formation::Tree, None, 1.0 / 60.0);
            let now = distances(&f, Formation::Tree);
            for (a, b) in prev.iter().zip(&now) {
                assert!(b <= a);
            }
            prev = now;
        }
    }

    #[test]
    fn tree_ignores_interaction_point() {
        let mut with = field(200, 8);
        let mut without = field(200, 8);
        let center = Some(Vec3::ZERO);
        for _ in 0..5 {
            let a = with.advance(Formation::Tree, center, 0.016).to_vec();
            let b = without.advance(Formation::Tree, None, 0.016).to_vec();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn scattered_repels_nearby_particles() {
        let mut with = field(400, 9);
        let mut without = field(400, 9);
        let a = with.advance(Formation::Scattered, Some(Vec3::ZERO), 0.016).to_vec();
        let b = without.advance(Formation::Scattered, None, 0.016).to_vec();

        let mut pushed = 0;
        for (i, p) in with.particles().iter().enumerate() {
            let d = p.current_position.length();
            let delta = a[i].position() - b[i].position();
            if d < 8.0 && d > 0.01 {
                assert!(delta.dot(p.current_position) > 0.0);
                assert!((delta.length() - 5.0 * (8.0 - d) / 8.0).abs() < 1e-3);
                pushed += 1;
            } else {
                assert!(delta.length() < 1e-6);
            }
        }
        assert!(pushed > 0);
        // Repulsion never changes the simulated position
        for (pa, pb) in with.particles().iter().zip(without.particles()) {
            assert_eq!(pa.current_position, pb.current_position);
        }
    }

    #[test]
    fn text_falls_back_to_scatter() {
        let f = field(10, 10);
        assert!(!f.has_text_targets());
        for (i, p) in f.particles().iter().enumerate() {
            assert_eq!(f.target(i, Formation::Text), Some(p.scatter_position));
        }
    }

    #[test]
    fn text_targets_are_used_once_set() {
        let mut f = field(10, 11);
        let samples: Vec<Vec3> = (0..10).map(|i| Vec3::new(i as f32, 1.0, 0.0)).collect();
        f.set_text_targets(&samples).unwrap();
        assert!(f.has_text_targets());
        assert_eq!(f.target(3, Formation::Text), Some(Vec3::new(3.0, 1.0, 0.0)));
    }

    #[test]
    fn set_text_targets_is_idempotent() {
        let mut f = field(10, 12);
        let samples: Vec<Vec3> = (0..10).map(|i| Vec3::splat(i as f32)).collect();
        f.set_text_targets(&samples).unwrap();
        let first: Vec<_> = (0..10).map(|i| f.target(i, Formation::Text)).collect();
        f.set_text_targets(&samples).unwrap();
        let second: Vec<_> = (0..10).map(|i| f.target(i, Formation::Text)).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn mismatched_sample_count_rejected() {
        let mut f = field(10, 13);
        let err = f.set_text_targets(&[Vec3::ZERO; 3]).unwrap_err();
        assert!(matches!(
            err,
            GlimmerError::SampleCountMismatch { expected: 10, got: 3 }
        ));
        assert!(!f.has_text_targets());
    }

    #[test]
    fn retarget_mid_flight_is_smooth() {
        let mut f = field(30, 14);
        f.advance(Formation::Text, None, 0.1);
        let before: Vec<Vec3> = f.particles().iter().map(|p| p.current_position).collect();
        let samples = vec![Vec3::new(0.0, 5.0, 0.0); 30];
        f.set_text_targets(&samples).unwrap();
        for (p, b) in f.particles().iter().zip(&before) {
            assert_eq!(p.current_position, *b);
        }
        f.advance(Formation::Text, None, 1.0 / 60.0);
        for (p, b) in f.particles().iter().zip(&before) {
            // One frame moves at most rate * dt of the remaining distance
            let max_step = b.distance(Vec3::new(0.0, 5.0, 0.0)) * (2.0 / 60.0) + 1e-4;
            assert!(p.current_position.distance(*b) <= max_step);
        }
    }

    #[test]
    fn text_formation_shrinks_particles() {
        let mut scattered = field(50, 15);
        let mut text = field(50, 15);
        let a = scattered.advance(Formation::Scattered, None, 0.0).to_vec();
        let b = text.advance(Formation::Text, None, 0.0).to_vec();
        for (ia, ib) in a.iter().zip(&b) {
            assert!((ib.scale() - ia.scale() * 0.7).abs() < 1e-5);
        }
    }

    #[test]
    fn needles_do_not_pulse() {
        let mut f = field(200, 16);
        for _ in 0..10 {
            f.advance(Formation::Tree, None, 0.05);
        }
        for (p, inst) in f.particles().iter().zip(f.instances()) {
            if p.kind == ParticleKind::Needle {
                assert!((inst.scale() - p.scale).abs() < 1e-6);
            }
        }
    }
}
