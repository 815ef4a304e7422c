//! Pointer to world-space interaction point, and the repulsion falloff
//! applied around it.

use crate::config::CameraConfig;
use glimmer_core::{Mat4, Vec2, Vec3};

/// Perspective camera used only for unprojecting the pointer
#[derive(Debug, Clone, Copy)]
pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    /// Vertical field of view in degrees
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    pub fn from_config(config: &CameraConfig) -> Self {
        Self {
            position: Vec3::from_array(config.position),
            target: Vec3::from_array(config.target),
            up: Vec3::Y,
            fov: config.fov,
            aspect: config.aspect,
            near: config.near,
            far: config.far,
        }
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov.to_radians(), self.aspect, self.near, self.far)
    }

    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    pub fn inverse_view_projection_matrix(&self) -> Mat4 {
        self.view_projection_matrix().inverse()
    }

    /// World-space ray through a normalized device coordinate
    /// (`x` right, `y` up, both in [-1, 1])
    pub fn ray_through(&self, ndc: Vec2) -> Ray {
        let inv_vp = self.inverse_view_projection_matrix();
        // perspective_rh maps depth to [0, 1]
        let near = inv_vp.project_point3(Vec3::new(ndc.x, ndc.y, 0.0));
        let far = inv_vp.project_point3(Vec3::new(ndc.x, ndc.y, 1.0));
        let dir = (far - near).try_normalize().unwrap_or(Vec3::NEG_Z);
        Ray {
            origin: near,
            direction: dir,
        }
    }

    /// Project a world point to NDC. `None` when behind the camera.
    pub fn world_to_ndc(&self, p: Vec3) -> Option<Vec2> {
        let clip = self.view_projection_matrix() * p.extend(1.0);
        if clip.w <= 0.001 {
            return None;
        }
        Some(Vec2::new(clip.x / clip.w, clip.y / clip.w))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Unit length
    pub direction: Vec3,
}

impl Ray {
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Plane of points `p` with `normal · p + constant = 0`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub normal: Vec3,
    pub constant: f32,
}

impl Plane {
    pub fn new(normal: Vec3, constant: f32) -> Self {
        Self {
            normal: normal.normalize_or_zero(),
            constant,
        }
    }

    pub fn distance_to(&self, p: Vec3) -> f32 {
        self.normal.dot(p) + self.constant
    }

    /// Intersection in front of the ray origin, or `None` when the ray is
    /// parallel to the plane or points away from it.
    pub fn intersect(&self, ray: &Ray) -> Option<Vec3> {
        let denom = self.normal.dot(ray.direction);
        if denom.abs() < 1e-6 {
            return None;
        }
        let t = -self.distance_to(ray.origin) / denom;
        if t < 0.0 {
            return None;
        }
        Some(ray.at(t))
    }
}

/// Converts pointer NDC into the shared interaction point.
/// Recomputed every frame; nothing is cached between calls.
#[derive(Debug, Clone, Copy)]
pub struct InteractionResolver {
    pub camera: Camera,
    pub plane: Plane,
}

impl InteractionResolver {
    pub fn new(camera: Camera, plane: Plane) -> Self {
        Self { camera, plane }
    }

    pub fn from_config(config: &CameraConfig) -> Self {
        Self::new(
            Camera::from_config(config),
            Plane::new(Vec3::from_array(config.plane_normal), config.plane_constant),
        )
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        if aspect > 0.0 && aspect.is_finite() {
            self.camera.aspect = aspect;
        }
    }

    pub fn project(&self, ndc: Vec2) -> Option<Vec3> {
        self.plane.intersect(&self.camera.ray_through(ndc))
    }
}

/// Outward push on `position` from `center`: zero at `radius`, `push` at the
/// center. `None` outside the radius or when the offset is too short to give
/// a direction.
pub fn repulsion_offset(position: Vec3, center: Vec3, radius: f32, push: f32) -> Option<Vec3> {
    let offset = position - center;
    let dist = offset.length();
    if dist >= radius || dist <= 0.01 {
        return None;
    }
    let strength = (radius - dist) / radius;
    Some(offset / dist * strength * push)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> InteractionResolver {
        InteractionResolver::from_config(&CameraConfig::default())
    }

    #[test]
    fn center_ray_hits_plane_near_origin() {
        // Camera at (0, 4, 30) looking at the origin
        let p = resolver().project(Vec2::ZERO).unwrap();
        assert!(p.z.abs() < 1e-3);
        assert!(p.length() < 1e-2, "{p:?}");
    }

    #[test]
    fn pointer_right_maps_to_positive_x() {
        let r = resolver();
        let right = r.project(Vec2::new(0.5, 0.0)).unwrap();
        let left = r.project(Vec2::new(-0.5, 0.0)).unwrap();
        assert!(right.x > 0.0 && left.x < 0.0);
        assert!((right.x + left.x).abs() < 1e-3);
        let up = r.project(Vec2::new(0.0, 0.5)).unwrap();
        assert!(up.y > 0.0);
    }

    #[test]
    fn projected_point_round_trips_to_ndc() {
        let r = resolver();
        let ndc = Vec2::new(0.3, -0.2);
        let p = r.project(ndc).unwrap();
        let back = r.camera.world_to_ndc(p).unwrap();
        assert!((back - ndc).length() < 1e-3);
    }

    #[test]
    fn parallel_ray_misses() {
        let plane = Plane::new(Vec3::Z, 0.0);
        let ray = Ray {
            origin: Vec3::new(0.0, 0.0, 5.0),
            direction: Vec3::X,
        };
        assert!(plane.intersect(&ray).is_none());
    }

    #[test]
    fn plane_behind_ray_misses() {
        let plane = Plane::new(Vec3::Z, 0.0);
        let ray = Ray {
            origin: Vec3::new(0.0, 0.0, 5.0),
            direction: Vec3::Z,
        };
        assert!(plane.intersect(&ray).is_none());
    }

    #[test]
    fn offset_plane_constant() {
        // z = 2 plane
        let plane = Plane::new(Vec3::Z, -2.0);
        let ray = Ray {
            origin: Vec3::new(1.0, 1.0, 10.0),
            direction: Vec3::NEG_Z,
        };
        let hit = plane.intersect(&ray).unwrap();
        assert!((hit - Vec3::new(1.0, 1.0, 2.0)).length() < 1e-5);
    }

    #[test]
    fn repulsion_falls_off_linearly() {
        let near = repulsion_offset(Vec3::new(2.0, 0.0, 0.0), Vec3::ZERO, 8.0, 5.0).unwrap();
        assert!((near - Vec3::new(5.0 * 0.75, 0.0, 0.0)).length() < 1e-5);
        let far = repulsion_offset(Vec3::new(6.0, 0.0, 0.0), Vec3::ZERO, 8.0, 5.0).unwrap();
        assert!(far.length() < near.length());
        assert!(repulsion_offset(Vec3::new(9.0, 0.0, 0.0), Vec3::ZERO, 8.0, 5.0).is_none());
    }

    #[test]
    fn repulsion_skips_degenerate_offset() {
        assert!(repulsion_offset(Vec3::ZERO, Vec3::ZERO, 8.0, 5.0).is_none());
        assert!(repulsion_offset(Vec3::splat(0.001), Vec3::ZERO, 8.0, 5.0).is_none());
    }
}
