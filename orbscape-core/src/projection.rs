/// Camera and projection utilities
use nalgebra::{Matrix4, Point3, Vector3};

use crate::viewport::Viewport;

/// Perspective camera
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
    pub up: Vector3<f32>,
    /// Vertical field of view in radians
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            position: Point3::new(0.0, 0.0, 5.0),
            target: Point3::new(0.0, 0.0, 0.0),
            up: Vector3::new(0.0, 1.0, 0.0),
            fov: std::f32::consts::PI / 4.0, // 45 degrees
            aspect: width.max(1) as f32 / height.max(1) as f32,
            near: 0.1,
            far: 100.0,
        }
    }

    /// The hero camera: 50 degree lens one unit up and six back, looking down -Z.
    pub fn scene_default(viewport: &Viewport) -> Self {
        let position = Point3::new(0.0, 1.0, 6.0);
        Self {
            position,
            target: position - Vector3::z(),
            fov: 50.0_f32.to_radians(),
            aspect: viewport.aspect(),
            ..Self::new(viewport.width, viewport.height)
        }
    }

    pub fn resize(&mut self, viewport: &Viewport) {
        self.aspect = viewport.aspect();
    }

    /// Create the view matrix (camera transformation)
    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(&self.position, &self.target, &self.up)
    }

    pub fn projection_matrix(&self) -> Matrix4<f32> {
        Matrix4::new_perspective(self.aspect, self.fov, self.near, self.far)
    }

    /// Combined projection * view
    pub fn view_projection(&self) -> Matrix4<f32> {
        self.projection_matrix() * self.view_matrix()
    }

    /// Project a 3D point to 2D screen space
    ///
    /// Returns `(x, y, depth)` with `depth` in normalized device units, or
    /// `None` when the point falls outside the clip volume.
    pub fn project_to_screen(
        &self,
        point: &Point3<f32>,
        model_matrix: &Matrix4<f32>,
        width: u32,
        height: u32,
    ) -> Option<(f32, f32, f32)> {
        let mvp = self.view_projection() * model_matrix;
        project_with(&mvp, point, width, height)
    }
}

/// Project through a precomputed MVP matrix.
pub fn project_with(
    mvp: &Matrix4<f32>,
    point: &Point3<f32>,
    width: u32,
    height: u32,
) -> Option<(f32, f32, f32)> {
    let clip = mvp * point.to_homogeneous();

    // Behind the eye, or degenerate
    if clip.w < 1e-6 {
        return None;
    }

    let ndc_x = clip.x / clip.w;
    let ndc_y = clip.y / clip.w;
    let ndc_z = clip.z / clip.w;

    // Clip test
    if !(-1.0..=1.0).contains(&ndc_x) || !(-1.0..=1.0).contains(&ndc_y) || !(-1.0..=1.0).contains(&ndc_z) {
        return None;
    }

    // Convert to screen space
    let screen_x = (ndc_x + 1.0) * 0.5 * width as f32;
    let screen_y = (1.0 - ndc_y) * 0.5 * height as f32;

    Some((screen_x, screen_y, ndc_z))
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(800, 600)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camera_creation() {
        let camera = Camera::new(800, 600);
        assert!((camera.fov - std::f32::consts::FRAC_PI_4).abs() < 1e-6);
        assert!((camera.aspect - 800.0 / 600.0).abs() < 1e-6);
    }

    #[test]
    fn test_view_matrix() {
        let camera = Camera::new(800, 600);
        let view = camera.view_matrix();
        // View matrix should be non-zero
        assert!(view.norm() > 0.0);
    }

    #[test]
    fn test_scene_default() {
        let camera = Camera::scene_default(&Viewport::new(1600, 900));
        assert_eq!(camera.position, Point3::new(0.0, 1.0, 6.0));
        assert!((camera.fov - 50.0_f32.to_radians()).abs() < 1e-6);
        assert!((camera.aspect - 16.0 / 9.0).abs() < 1e-6);
    }

    #[test]
    fn test_resize_replaces_aspect() {
        let mut camera = Camera::scene_default(&Viewport::new(800, 600));
        camera.resize(&Viewport::new(500, 1000));
        assert!((camera.aspect - 0.5).abs() < 1e-6);

        camera.resize(&Viewport::new(300, 100));
        assert!((camera.aspect - 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_project_centre_and_behind() {
        let camera = Camera::scene_default(&Viewport::new(200, 100));
        let identity = Matrix4::identity();

        // Straight ahead of the eye lands mid-screen
        let (x, y, depth) = camera
            .project_to_screen(&Point3::new(0.0, 1.0, 0.0), &identity, 200, 100)
            .unwrap();
        assert!((x - 100.0).abs() < 1e-3);
        assert!((y - 50.0).abs() < 1e-3);
        assert!(depth > -1.0 && depth < 1.0);

        // Behind the camera
        assert!(camera
            .project_to_screen(&Point3::new(0.0, 1.0, 10.0), &identity, 200, 100)
            .is_none());
    }
}
