//! Distant background starfield with slow spin and pointer parallax.

use crate::config::{PaletteConfig, StarfieldConfig};
use crate::curves::approach_f32;
use crate::particle::ParticleInstance;
use crate::rand::ParticleRng;
use glimmer_core::{Color, InstanceTransform, Vec2, Vec3};

const STAR_SIZE: f32 = 0.25;
const STAR_OPACITY: f32 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Star {
    /// Position in the field's local frame
    pub position: Vec3,
    pub color: Color,
}

pub struct Starfield {
    config: StarfieldConfig,
    stars: Vec<Star>,
    /// Whole-field Euler rotation (XYZ). Y spins, X and Z follow the pointer.
    rotation: Vec3,
    instances: Vec<ParticleInstance>,
}

impl Starfield {
    pub fn new(config: StarfieldConfig, palette: &PaletteConfig, rng: &mut ParticleRng) -> Self {
        let options = [
            Color::from_hex(palette.gold).scaled(0.8),
            Color::from_hex(palette.needle_light).scaled(0.8),
            Color::from_hex(0xaaccff).scaled(0.6),
            Color::WHITE.scaled(0.7),
        ];
        let stars = (0..config.count)
            .map(|_| {
                let position = rng.in_shell(config.inner_radius, config.outer_radius);
                let color = rng.pick(&options).copied().unwrap_or(Color::WHITE);
                Star { position, color }
            })
            .collect::<Vec<_>>();
        let instances = vec![ParticleInstance::default(); stars.len()];
        Self {
            config,
            stars,
            rotation: Vec3::ZERO,
            instances,
        }
    }

    pub fn stars(&self) -> &[Star] {
        &self.stars
    }

    pub fn len(&self) -> usize {
        self.stars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stars.is_empty()
    }

    pub fn rotation(&self) -> Vec3 {
        self.rotation
    }

    /// Transform of the whole field, for renderers that draw it as one object
    pub fn transform(&self) -> InstanceTransform {
        InstanceTransform::IDENTITY.with_rotation(self.rotation)
    }

    pub fn advance(&mut self, pointer_ndc: Option<Vec2>, dt: f32) -> &[ParticleInstance] {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        self.rotation.y += dt * self.config.spin;

        // Without a pointer the tilt relaxes back to level
        let pointer = pointer_ndc.unwrap_or(Vec2::ZERO);
        let target_x = -pointer.y * self.config.parallax;
        let target_z = pointer.x * self.config.parallax;
        self.rotation.x = approach_f32(self.rotation.x, target_x, self.config.parallax_rate, dt);
        self.rotation.z = approach_f32(self.rotation.z, target_z, self.config.parallax_rate, dt);

        let quat = self.transform().quat();
        for (star, instance) in self.stars.iter().zip(self.instances.iter_mut()) {
            let transform = InstanceTransform::from_position(quat * star.position)
                .with_scale(STAR_SIZE);
            *instance = ParticleInstance::new(&transform, star.color.with_alpha(STAR_OPACITY));
        }
        &self.instances
    }

    pub fn instances(&self) -> &[ParticleInstance] {
        &self.instances
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field() -> Starfield {
        Starfield::new(
            StarfieldConfig::default(),
            &PaletteConfig::default(),
            &mut ParticleRng::new(31),
        )
    }

    #[test]
    fn stars_sit_in_shell() {
        let f = field();
        assert_eq!(f.len(), 2000);
        for s in f.stars() {
            let r = s.position.length();
            assert!(r >= 40.0 - 1e-3 && r <= 90.0 + 1e-3);
        }
    }

    #[test]
    fn spins_slowly_about_y() {
        let mut f = field();
        for _ in 0..60 {
            f.advance(None, 1.0 / 60.0);
        }
        assert!((f.rotation().y - 0.01).abs() < 1e-5);
        assert!(f.rotation().x.abs() < 1e-6 && f.rotation().z.abs() < 1e-6);
    }

    #[test]
    fn tilt_follows_pointer() {
        let mut f = field();
        for _ in 0..600 {
            f.advance(Some(Vec2::new(1.0, 1.0)), 1.0 / 60.0);
        }
        assert!((f.rotation().x + 0.05).abs() < 1e-4);
        assert!((f.rotation().z - 0.05).abs() < 1e-4);
    }

    #[test]
    fn rotation_preserves_star_distance() {
        let mut f = field();
        let inst = f.advance(Some(Vec2::new(0.3, -0.8)), 0.5).to_vec();
        for (s, i) in f.stars().iter().zip(&inst) {
            assert!((s.position.length() - i.position().length()).abs() < 1e-2);
        }
    }
}
