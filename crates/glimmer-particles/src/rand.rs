//! Lightweight xorshift32 PRNG - seeded, so every layout is reproducible

use glimmer_core::Vec3;

pub struct ParticleRng {
    state: u32,
}

impl ParticleRng {
    pub fn new(seed: u32) -> Self {
        Self {
            state: if seed == 0 { 1 } else { seed },
        }
    }

    pub fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }

    /// Independent generator seeded from this one (for background work)
    pub fn fork(&mut self) -> Self {
        Self::new(self.next_u32())
    }

    /// Returns a float in [0, 1)
    pub fn next_f32(&mut self) -> f32 {
        // 24 high bits fit the f32 mantissa exactly, so 1.0 is never produced
        (self.next_u32() >> 8) as f32 / (1u32 << 24) as f32
    }

    /// Returns a float in [min, max)
    pub fn range(&mut self, min: f32, max: f32) -> f32 {
        min + self.next_f32() * (max - min)
    }

    /// Returns a float in [-extent, extent)
    pub fn centered(&mut self, extent: f32) -> f32 {
        self.range(-extent, extent)
    }

    /// True with probability `p`
    pub fn chance(&mut self, p: f32) -> bool {
        self.next_f32() < p
    }

    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        let idx = ((self.next_f32() * items.len() as f32) as usize).min(items.len() - 1);
        items.get(idx)
    }

    /// Returns a random unit direction vector (uniformly on sphere surface)
    pub fn random_direction(&mut self) -> Vec3 {
        // Marsaglia method for uniform sphere sampling
        loop {
            let x = self.range(-1.0, 1.0);
            let y = self.range(-1.0, 1.0);
            let s = x * x + y * y;
            if s < 1.0 {
                let factor = 2.0 * (1.0 - s).sqrt();
                return Vec3::new(x * factor, y * factor, 1.0 - 2.0 * s);
            }
        }
    }

    /// Uniform point inside a ball. The cube root on the radius keeps the
    /// density constant instead of clumping at the center.
    pub fn in_ball(&mut self, radius: f32) -> Vec3 {
        let dir = self.random_direction();
        dir * (radius * self.next_f32().cbrt())
    }

    /// Uniform direction with a radius drawn uniformly from [inner, outer)
    pub fn in_shell(&mut self, inner: f32, outer: f32) -> Vec3 {
        let r = self.range(inner, outer);
        self.random_direction() * r
    }
}
