//! Orthographic camera with pixel-sized world units.

use glam::{Mat4, Vec3};

use super::viewport::Viewport;
use crate::params::RenderConfig;

/// Orthographic camera looking down -Z at the bar plane
#[derive(Debug, Clone, PartialEq)]
pub struct OrthographicCamera {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
}

impl OrthographicCamera {
    /// Camera whose bounds cover `viewport` one world unit per pixel
    pub fn new(viewport: Viewport, config: &RenderConfig) -> Self {
        let mut camera = Self {
            left: 0.0,
            right: 0.0,
            top: 0.0,
            bottom: 0.0,
            near: config.near_plane,
            far: config.far_plane,
            position: Vec3::new(0.0, 0.0, config.camera_z),
        };
        camera.set_viewport(viewport);
        camera
    }

    /// Recompute bounds, centred on the origin
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.left = -viewport.width / 2.0;
        self.right = viewport.width / 2.0;
        self.top = viewport.height / 2.0;
        self.bottom = -viewport.height / 2.0;
    }

    /// Create view-projection matrix for rendering
    pub fn view_proj(&self) -> Mat4 {
        let view = Mat4::look_at_rh(self.position, self.position - Vec3::Z, Vec3::Y);
        let proj = Mat4::orthographic_rh(
            self.left,
            self.right,
            self.bottom,
            self.top,
            self.near,
            self.far,
        );
        proj * view
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    fn camera(width: u32, height: u32) -> OrthographicCamera {
        OrthographicCamera::new(Viewport::new(width, height), &RenderConfig::default())
    }

    #[test]
    fn test_bounds_follow_viewport() {
        let mut camera = camera(800, 600);
        assert_eq!((camera.left, camera.right), (-400.0, 400.0));
        assert_eq!((camera.bottom, camera.top), (-300.0, 300.0));

        camera.set_viewport(Viewport::new(1000, 200));
        assert_eq!((camera.left, camera.right), (-500.0, 500.0));
        assert_eq!((camera.bottom, camera.top), (-100.0, 100.0));
    }

    #[test]
    fn test_corners_map_to_clip_edges() {
        let view_proj = camera(800, 600).view_proj();

        let top_right = view_proj * Vec4::new(400.0, 300.0, 0.0, 1.0);
        assert!((top_right.x - 1.0).abs() < 1e-5);
        assert!((top_right.y - 1.0).abs() < 1e-5);

        let bottom_left = view_proj * Vec4::new(-400.0, -300.0, 0.0, 1.0);
        assert!((bottom_left.x + 1.0).abs() < 1e-5);
        assert!((bottom_left.y + 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_bar_and_border_depths_are_visible() {
        let view_proj = camera(800, 600).view_proj();
        for z in [0.0, 1.0] {
            let clip = view_proj * Vec4::new(0.0, 0.0, z, 1.0);
            assert!(clip.z >= 0.0 && clip.z <= 1.0, "z={} clipped to {}", z, clip.z);
        }
    }
}
