//! Camera rays and wedge picking.
//!
//! A tap is turned into a world-space [`Ray`] by [`Camera::screen_ray`], then
//! tested against every candidate wedge in the wedge's own frame. A wedge is
//! the slice of a ball of radius `radius` whose yaw lies within `±half_angle`
//! of the wedge's outward axis (local `-Z`).

use glam::{Affine3A, Vec3};

// ── Ray ──

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Unit length.
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Express this ray in the frame whose world transform is `world`.
    pub fn to_local(&self, world: &Affine3A) -> Ray {
        let inv = world.inverse();
        Ray::new(
            inv.transform_point3(self.origin),
            inv.transform_vector3(self.direction),
        )
    }
}

// ── Camera ──

/// Pinhole camera mapping screen pixels to rays and back.
#[derive(Debug, Clone, Copy)]
pub struct Camera {
    eye: Vec3,
    forward: Vec3,
    right: Vec3,
    up: Vec3,
    fov_factor: f32,
    viewport: [f32; 2],
}

impl Camera {
    pub fn look_at(eye: Vec3, target: Vec3, fov_deg: f32, viewport: [f32; 2]) -> Self {
        let forward = (target - eye).normalize();
        let right = forward.cross(Vec3::Y).normalize();
        let up = right.cross(forward);
        Self {
            eye,
            forward,
            right,
            up,
            fov_factor: (fov_deg.to_radians() * 0.5).tan(),
            viewport: [viewport[0].max(1.0), viewport[1].max(1.0)],
        }
    }

    pub fn set_viewport(&mut self, width: f32, height: f32) {
        self.viewport = [width.max(1.0), height.max(1.0)];
    }

    pub fn viewport(&self) -> [f32; 2] {
        self.viewport
    }

    pub fn eye(&self) -> Vec3 {
        self.eye
    }

    /// Camera-space right axis; its sign tells which half of the screen a point is on.
    pub fn right(&self) -> Vec3 {
        self.right
    }

    fn aspect(&self) -> f32 {
        self.viewport[0] / self.viewport[1]
    }

    /// Ray from the eye through pixel `(x, y)` (origin top-left).
    pub fn screen_ray(&self, x: f32, y: f32) -> Ray {
        let u = (x / self.viewport[0]) * 2.0 - 1.0;
        let v = 1.0 - (y / self.viewport[1]) * 2.0;
        let dir = self.forward
            + self.right * (u * self.fov_factor * self.aspect())
            + self.up * (v * self.fov_factor);
        Ray::new(self.eye, dir)
    }

    /// Pixel position of a world point, or `None` if it is behind the camera.
    pub fn project(&self, point: Vec3) -> Option<[f32; 2]> {
        let rel = point - self.eye;
        let depth = rel.dot(self.forward);
        if depth <= 1e-4 {
            return None;
        }
        let u = rel.dot(self.right) / (depth * self.fov_factor * self.aspect());
        let v = rel.dot(self.up) / (depth * self.fov_factor);
        Some([
            (u + 1.0) * 0.5 * self.viewport[0],
            (1.0 - v) * 0.5 * self.viewport[1],
        ])
    }
}

impl Default for Camera {
    /// Slightly raised, narrow-FOV view of a unit-radius puzzle at the origin.
    fn default() -> Self {
        Self::look_at(Vec3::new(0.0, 1.5, 8.0), Vec3::ZERO, 25.0, [800.0, 600.0])
    }
}

// ── Wedge geometry ──

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WedgeShape {
    pub radius: f32,
    pub half_angle: f32,
}

impl WedgeShape {
    pub fn for_ring(radius: f32, slices: usize) -> Self {
        Self {
            radius,
            half_angle: std::f32::consts::PI / slices.max(1) as f32,
        }
    }

    /// Yaw of a local point about +Y, measured from the outward axis `-Z`.
    pub fn yaw_of(p: Vec3) -> f32 {
        (-p.x).atan2(-p.z)
    }

    fn outward(yaw: f32) -> Vec3 {
        Vec3::new(-yaw.sin(), 0.0, -yaw.cos())
    }

    fn within_yaw(&self, p: Vec3) -> bool {
        Self::yaw_of(p).abs() <= self.half_angle + 1e-6
    }

    /// Nearest non-negative hit distance of a *local* ray, if any.
    pub fn intersect(&self, ray: &Ray) -> Option<f32> {
        let mut best: Option<f32> = None;
        let mut consider = |t: f32| {
            if t >= 0.0 && best.map_or(true, |b| t < b) {
                best = Some(t);
            }
        };

        // Curved outer surface.
        let b = ray.origin.dot(ray.direction);
        let c = ray.origin.length_squared() - self.radius * self.radius;
        let disc = b * b - c;
        if disc >= 0.0 {
            let root = disc.sqrt();
            for t in [-b - root, -b + root] {
                if self.within_yaw(ray.at(t)) {
                    consider(t);
                }
            }
        }

        // Flat side faces: half-planes through the Y axis at yaw ±half_angle.
        for yaw in [-self.half_angle, self.half_angle] {
            let along = Self::outward(yaw);
            let normal = along.cross(Vec3::Y);
            let denom = ray.direction.dot(normal);
            if denom.abs() < 1e-8 {
                continue;
            }
            let t = -ray.origin.dot(normal) / denom;
            let p = ray.at(t);
            if p.length_squared() <= self.radius * self.radius && p.dot(along) >= 0.0 {
                consider(t);
            }
        }

        best
    }
}

/// A successful pick: which candidate was hit and how far along the world ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickHit<K> {
    pub key: K,
    pub distance: f32,
}

/// Nearest wedge hit by `ray` among `candidates` (key + current world transform).
pub fn pick_nearest<K, I>(ray: &Ray, shape: &WedgeShape, candidates: I) -> Option<PickHit<K>>
where
    K: Copy,
    I: IntoIterator<Item = (K, Affine3A)>,
{
    let mut best: Option<PickHit<K>> = None;
    for (key, world) in candidates {
        let local = ray.to_local(&world);
        let Some(t) = shape.intersect(&local) else {
            continue;
        };
        let hit_world = world.transform_point3(local.at(t));
        let distance = (hit_world - ray.origin).length();
        if best.map_or(true, |b| distance < b.distance) {
            best = Some(PickHit { key, distance });
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Quat;
    use std::f32::consts::PI;

    #[test]
    fn center_pixel_ray_points_at_target() {
        let cam = Camera::look_at(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, 45.0, [200.0, 100.0]);
        let ray = cam.screen_ray(100.0, 50.0);
        assert!((ray.direction - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-5);
    }

    #[test]
    fn project_inverts_screen_ray() {
        let cam = Camera::default();
        let ray = cam.screen_ray(612.0, 233.0);
        let [x, y] = cam.project(ray.at(6.0)).unwrap();
        assert!((x - 612.0).abs() < 0.05, "x = {}", x);
        assert!((y - 233.0).abs() < 0.05, "y = {}", y);
        assert!(cam.project(cam.eye() + Vec3::Z).is_none());
    }

    #[test]
    fn wedge_hit_only_inside_its_arc() {
        let wedge = WedgeShape::for_ring(1.0, 8);
        // Straight down onto the wedge's outward axis.
        let hit = wedge.intersect(&Ray::new(Vec3::new(0.0, 3.0, -0.5), -Vec3::Y));
        assert!((hit.unwrap() - (3.0 - (0.75f32).sqrt())).abs() < 1e-4);
        // Straight down onto the opposite side: empty space for this wedge.
        assert!(wedge
            .intersect(&Ray::new(Vec3::new(0.0, 3.0, 0.5), -Vec3::Y))
            .is_none());
    }

    #[test]
    fn wedge_side_face_is_hit_from_the_gap() {
        let wedge = WedgeShape::for_ring(1.0, 8);
        // Ray along the boundary direction, entering the flat face from outside the arc.
        let yaw = wedge.half_angle + 0.3;
        let start = Vec3::new(-yaw.sin(), 0.0, -yaw.cos()) * 0.5;
        let toward = Vec3::new(-(-0.2f32).sin(), 0.0, -(-0.2f32).cos()) * 0.5;
        let t = wedge.intersect(&Ray::new(start, toward - start)).unwrap();
        assert!(t > 0.0 && t < (toward - start).length());
    }

    #[test]
    fn pick_nearest_prefers_closest_wedge() {
        let wedge = WedgeShape::for_ring(1.0, 8);
        // Two wedges facing the camera on +Z, one shifted back.
        let facing = Quat::from_rotation_y(PI);
        let near = Affine3A::from_rotation_translation(facing, Vec3::ZERO);
        let far = Affine3A::from_rotation_translation(facing, Vec3::new(0.0, 0.0, -3.0));
        let ray = Ray::new(Vec3::new(0.0, 0.0, 10.0), -Vec3::Z);

        let hit = pick_nearest(&ray, &wedge, [(7usize, far), (3usize, near)]).unwrap();
        assert_eq!(hit.key, 3);
        assert!((hit.distance - 9.0).abs() < 1e-4);

        let miss = Ray::new(Vec3::new(5.0, 0.0, 10.0), -Vec3::Z);
        assert!(pick_nearest(&miss, &wedge, [(3usize, near)]).is_none());
    }
}
