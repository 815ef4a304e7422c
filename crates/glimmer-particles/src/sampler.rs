//! Target geometry sampling: scatter ball, spiral tree, and triangle-mesh
//! surfaces (used for text).

use crate::rand::ParticleRng;
use glimmer_core::{GlimmerError, Result, Vec3};

/// Uniform point in the scatter ball
pub fn sample_scatter(rng: &mut ParticleRng, radius: f32) -> Vec3 {
    rng.in_ball(radius)
}

/// Cone-like tree: radius shrinks linearly with height, particles wind
/// around it on a spiral indexed by particle id.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TreeShape {
    pub height: f32,
    pub base_radius: f32,
    /// Spiral advance per particle index, radians
    pub angle_step: f32,
    /// Random extra angle in [0, angle_jitter)
    pub angle_jitter: f32,
    /// Radial noise width, centered on the ideal radius
    pub radius_jitter: f32,
}

impl TreeShape {
    pub fn new(height: f32, base_radius: f32) -> Self {
        Self {
            height,
            base_radius,
            angle_step: 0.5,
            angle_jitter: 0.5,
            radius_jitter: 0.5,
        }
    }

    /// Ideal (noise-free) radius at normalized height `h` in [0, 1]
    pub fn radius_at(&self, h: f32) -> f32 {
        self.base_radius * (1.0 - h)
    }

    pub fn sample(&self, rng: &mut ParticleRng, index: usize) -> Vec3 {
        let h = rng.next_f32();
        let y = (h - 0.5) * self.height;
        let angle = index as f32 * self.angle_step + rng.next_f32() * self.angle_jitter;
        let noise = (rng.next_f32() - 0.5) * self.radius_jitter;
        let radius = (self.radius_at(h) + noise).max(0.0);
        Vec3::new(angle.cos() * radius, y, angle.sin() * radius)
    }
}

/// Indexed triangle mesh
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriangleMesh {
    pub positions: Vec<Vec3>,
    pub triangles: Vec<[u32; 3]>,
}

impl TriangleMesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Append a quad given in counter-clockwise order
    pub fn push_quad(&mut self, corners: [Vec3; 4]) {
        let base = self.positions.len() as u32;
        self.positions.extend_from_slice(&corners);
        self.triangles.push([base, base + 1, base + 2]);
        self.triangles.push([base, base + 2, base + 3]);
    }

    /// Append an axis-aligned box spanning `min`..`max` (all six faces)
    pub fn push_box(&mut self, min: Vec3, max: Vec3) {
        let (a, b) = (min, max);
        // front / back
        self.push_quad([
            Vec3::new(a.x, a.y, b.z),
            Vec3::new(b.x, a.y, b.z),
            Vec3::new(b.x, b.y, b.z),
            Vec3::new(a.x, b.y, b.z),
        ]);
        self.push_quad([
            Vec3::new(b.x, a.y, a.z),
            Vec3::new(a.x, a.y, a.z),
            Vec3::new(a.x, b.y, a.z),
            Vec3::new(b.x, b.y, a.z),
        ]);
        // left / right
        self.push_quad([
            Vec3::new(a.x, a.y, a.z),
            Vec3::new(a.x, a.y, b.z),
            Vec3::new(a.x, b.y, b.z),
            Vec3::new(a.x, b.y, a.z),
        ]);
        self.push_quad([
            Vec3::new(b.x, a.y, b.z),
            Vec3::new(b.x, a.y, a.z),
            Vec3::new(b.x, b.y, a.z),
            Vec3::new(b.x, b.y, b.z),
        ]);
        // top / bottom
        self.push_quad([
            Vec3::new(a.x, b.y, b.z),
            Vec3::new(b.x, b.y, b.z),
            Vec3::new(b.x, b.y, a.z),
            Vec3::new(a.x, b.y, a.z),
        ]);
        self.push_quad([
            Vec3::new(a.x, a.y, a.z),
            Vec3::new(b.x, a.y, a.z),
            Vec3::new(b.x, a.y, b.z),
            Vec3::new(a.x, a.y, b.z),
        ]);
    }

    pub fn translate(&mut self, offset: Vec3) {
        for p in &mut self.positions {
            *p += offset;
        }
    }

    /// Axis-aligned bounds of all vertices
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let first = *self.positions.first()?;
        Some(
            self.positions
                .iter()
                .fold((first, first), |(lo, hi), p| (lo.min(*p), hi.max(*p))),
        )
    }

    /// Move the mesh so its bounding box is centered on the origin
    pub fn center(&mut self) {
        if let Some((lo, hi)) = self.bounds() {
            self.translate(-(lo + hi) * 0.5);
        }
    }

    pub fn surface_area(&self) -> f32 {
        self.triangles
            .iter()
            .filter_map(|t| self.corners(t))
            .map(|[a, b, c]| triangle_area(a, b, c))
            .sum()
    }

    fn corners(&self, tri: &[u32; 3]) -> Option<[Vec3; 3]> {
        Some([
            *self.positions.get(tri[0] as usize)?,
            *self.positions.get(tri[1] as usize)?,
            *self.positions.get(tri[2] as usize)?,
        ])
    }
}

fn triangle_area(a: Vec3, b: Vec3, c: Vec3) -> f32 {
    (b - a).cross(c - a).length() * 0.5
}

/// Area-weighted uniform sampler over a triangle mesh surface
#[derive(Debug, Clone)]
pub struct MeshSampler {
    triangles: Vec<[Vec3; 3]>,
    /// Running area total, one entry per triangle
    cumulative: Vec<f32>,
}

impl MeshSampler {
    /// Build the area table. Degenerate triangles are kept but never chosen.
    pub fn new(mesh: &TriangleMesh) -> Result<Self> {
        let mut triangles = Vec::with_capacity(mesh.triangles.len());
        let mut cumulative = Vec::with_capacity(mesh.triangles.len());
        let mut total = 0.0;

        for tri in &mesh.triangles {
            let corners = mesh.corners(tri).ok_or_else(|| {
                GlimmerError::SamplingError(format!(
                    "triangle {tri:?} references a vertex outside 0..{}",
                    mesh.positions.len()
                ))
            })?;
            total += triangle_area(corners[0], corners[1], corners[2]);
            triangles.push(corners);
            cumulative.push(total);
        }

        if !(total > 0.0) {
            return Err(GlimmerError::SamplingError(
                "mesh has no surface area to sample".into(),
            ));
        }

        Ok(Self {
            triangles,
            cumulative,
        })
    }

    pub fn total_area(&self) -> f32 {
        self.cumulative.last().copied().unwrap_or(0.0)
    }

    /// One uniformly distributed point on the surface
    pub fn sample(&self, rng: &mut ParticleRng) -> Vec3 {
        let pick = rng.next_f32() * self.total_area();
        let idx = self
            .cumulative
            .partition_point(|&c| c <= pick)
            .min(self.triangles.len() - 1);
        let [a, b, c] = self.triangles[idx];

        let mut u = rng.next_f32();
        let mut v = rng.next_f32();
        if u + v > 1.0 {
            u = 1.0 - u;
            v = 1.0 - v;
        }
        a + (b - a) * u + (c - a) * v
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scatter_within_radius() {
        let mut rng = ParticleRng::new(1);
        for _ in 0..500 {
            assert!(sample_scatter(&mut rng, 25.0).length() <= 25.0 + 1e-3);
        }
    }

    #[test]
    fn tree_tapers_with_height() {
        let shape = TreeShape::new(14.0, 6.5);
        let mut rng = ParticleRng::new(2);
        for i in 0..2000 {
            let p = shape.sample(&mut rng, i);
            assert!(p.y >= -7.0 - 1e-4 && p.y <= 7.0 + 1e-4);
            let h = p.y / 14.0 + 0.5;
            let radial = (p.x * p.x + p.z * p.z).sqrt();
            // Ideal radius plus at most half the jitter width
            assert!(radial <= shape.radius_at(h) + 0.25 + 1e-3);
        }
    }

    #[test]
    fn tree_is_deterministic_for_seed() {
        let shape = TreeShape::new(14.0, 6.5);
        let mut a = ParticleRng::new(99);
        let mut b = ParticleRng::new(99);
        for i in 0..50 {
            assert_eq!(shape.sample(&mut a, i), shape.sample(&mut b, i));
        }
    }

    #[test]
    fn box_mesh_area() {
        let mut mesh = TriangleMesh::new();
        mesh.push_box(Vec3::ZERO, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(mesh.triangles.len(), 12);
        assert!((mesh.surface_area() - 22.0).abs() < 1e-4);
    }

    #[test]
    fn center_moves_bounds_to_origin() {
        let mut mesh = TriangleMesh::new();
        mesh.push_box(Vec3::new(2.0, 2.0, 2.0), Vec3::new(4.0, 6.0, 3.0));
        mesh.center();
        let (lo, hi) = mesh.bounds().unwrap();
        assert!((lo + hi).length() < 1e-5);
    }

    #[test]
    fn samples_lie_on_surface() {
        let mut mesh = TriangleMesh::new();
        mesh.push_quad([
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(2.0, 0.0, 0.0),
            Vec3::new(2.0, 1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ]);
        let sampler = MeshSampler::new(&mesh).unwrap();
        let mut rng = ParticleRng::new(4);
        for _ in 0..500 {
            let p = sampler.sample(&mut rng);
            assert!(p.z.abs() < 1e-6);
            assert!(p.x >= -1e-5 && p.x <= 2.0 + 1e-5);
            assert!(p.y >= -1e-5 && p.y <= 1.0 + 1e-5);
        }
    }

    #[test]
    fn sampling_is_area_weighted() {
        // Two unit-height quads side by side, the right one three times wider
        let mut mesh = TriangleMesh::new();
        mesh.push_quad([
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ]);
        mesh.push_quad([
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(4.0, 0.0, 0.0),
            Vec3::new(4.0, 1.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
        ]);
        let sampler = MeshSampler::new(&mesh).unwrap();
        let mut rng = ParticleRng::new(8);
        let n = 8000;
        let left = (0..n).filter(|_| sampler.sample(&mut rng).x < 1.0).count();
        let share = left as f32 / n as f32;
        assert!((share - 0.25).abs() < 0.03, "share {share}");
    }

    #[test]
    fn empty_mesh_rejected() {
        assert!(MeshSampler::new(&TriangleMesh::new()).is_err());
    }

    #[test]
    fn bad_index_rejected() {
        let mesh = TriangleMesh {
            positions: vec![Vec3::ZERO, Vec3::X],
            triangles: vec![[0, 1, 2]],
        };
        assert!(matches!(
            MeshSampler::new(&mesh),
            Err(GlimmerError::SamplingError(_))
        ));
    }
}
