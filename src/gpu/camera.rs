//! Fixed viewing camera.

use glam::{Mat4, Vec3};

use crate::config::CameraConfig;

/// Camera on the +Z axis looking at the origin.
///
/// The scene rotates, the camera never moves.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// Distance from the origin along +Z.
    pub distance: f32,
    /// Vertical field of view in degrees.
    pub fov: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    pub fn new(config: &CameraConfig) -> Self {
        Self {
            distance: config.distance,
            fov: config.fov,
            near: config.near,
            far: config.far,
        }
    }

    /// The camera's world position.
    pub fn position(&self) -> Vec3 {
        Vec3::new(0.0, 0.0, self.distance)
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position(), Vec3::ZERO, Vec3::Y)
    }

    pub fn projection(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov.to_radians(), aspect, self.near, self.far)
    }

    /// Combined view-projection for a viewport of the given aspect ratio.
    pub fn view_proj(&self, aspect: f32) -> Mat4 {
        self.projection(aspect) * self.view_matrix()
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(&CameraConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    #[test]
    fn test_origin_projects_to_center() {
        let camera = Camera::default();
        let clip = camera.view_proj(1.0) * Vec4::new(0.0, 0.0, 0.0, 1.0);
        let ndc = clip.truncate() / clip.w;

        assert!(ndc.x.abs() < 1e-6);
        assert!(ndc.y.abs() < 1e-6);
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
    }

    #[test]
    fn test_nearer_points_are_larger() {
        let camera = Camera::default();
        let vp = camera.view_proj(1.0);
        let project = |p: Vec3| {
            let clip = vp * p.extend(1.0);
            clip.x / clip.w
        };

        let far = project(Vec3::new(50.0, 0.0, -60.0));
        let near = project(Vec3::new(50.0, 0.0, 60.0));
        assert!(near > far);
        assert!(far > 0.0);
    }

    #[test]
    fn test_scene_fits_in_view() {
        // The largest default shape reaches about 80 units from the origin
        let camera = Camera::default();
        let clip = camera.view_proj(1.0) * Vec4::new(80.0, 80.0, 0.0, 1.0);
        assert!((clip.x / clip.w).abs() < 1.0);
        assert!((clip.y / clip.w).abs() < 1.0);
    }
}
