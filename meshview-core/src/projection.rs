/// Camera and projection utilities (left-handed, depth in [0, 1])
use nalgebra::{Matrix4, Point3, Vector3, Vector4};

/// Camera configuration for 3D rendering
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
    pub up: Vector3<f32>,
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    /// A camera at `position` looking at `target` with +Y up, a quarter-pi
    /// field of view and a 1..100 depth range.
    pub fn looking_at(position: Point3<f32>, target: Point3<f32>) -> Self {
        Self {
            position,
            target,
            up: Vector3::y(),
            fov: std::f32::consts::FRAC_PI_4,
            aspect: 1.0,
            near: 1.0,
            far: 100.0,
        }
    }

    pub fn with_aspect(mut self, aspect: f32) -> Self {
        self.aspect = aspect;
        self
    }

    /// Create the view matrix (camera transformation)
    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_lh(&self.position, &self.target, &self.up)
    }

    /// Create the projection matrix
    pub fn projection_matrix(&self) -> Matrix4<f32> {
        perspective_fov_lh(self.fov, self.aspect, self.near, self.far)
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::looking_at(Point3::new(0.0, 3.0, -5.0), Point3::origin())
    }
}

/// Left-handed perspective projection mapping view depth `near..far` onto `0..1`.
pub fn perspective_fov_lh(fov_y: f32, aspect: f32, near: f32, far: f32) -> Matrix4<f32> {
    let y_scale = 1.0 / (fov_y / 2.0).tan();
    let x_scale = y_scale / aspect;
    let depth = far / (far - near);
    Matrix4::new(
        x_scale, 0.0, 0.0, 0.0,
        0.0, y_scale, 0.0, 0.0,
        0.0, 0.0, depth, -near * depth,
        0.0, 0.0, 1.0, 0.0,
    )
}

/// Project a model-space point to screen space as `(x, y, depth)`.
///
/// Points behind the eye or outside the depth range are rejected; x/y may land
/// off screen and are left for the rasterizer to clamp.
pub fn project_to_screen(
    mvp: &Matrix4<f32>,
    point: &Point3<f32>,
    width: usize,
    height: usize,
) -> Option<(f32, f32, f32)> {
    let clip = mvp * Vector4::new(point.x, point.y, point.z, 1.0);

    // Prevent division by near-zero depth values
    if clip.w < 1e-6 {
        return None;
    }

    let ndc = clip.xyz() / clip.w;
    if !(0.0..=1.0).contains(&ndc.z) {
        return None;
    }

    let screen_x = (ndc.x + 1.0) * 0.5 * width as f32;
    let screen_y = (1.0 - ndc.y) * 0.5 * height as f32;

    Some((screen_x, screen_y, ndc.z))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camera_creation() {
        let camera = Camera::default().with_aspect(2.0);
        assert!((camera.aspect - 2.0).abs() < 1e-6);
        assert_eq!(camera.near, 1.0);
    }

    #[test]
    fn test_target_projects_to_center() {
        let camera = Camera::looking_at(Point3::new(0.0, 3.0, -5.0), Point3::origin());
        let mvp = camera.projection_matrix() * camera.view_matrix();
        let (x, y, depth) = project_to_screen(&mvp, &Point3::origin(), 80, 40).unwrap();
        assert!((x - 40.0).abs() < 1e-3);
        assert!((y - 20.0).abs() < 1e-3);
        assert!(depth > 0.0 && depth < 1.0);
    }

    #[test]
    fn test_left_handed_axes() {
        // Looking down +Z, +X appears to the right and +Y above.
        let camera = Camera::looking_at(Point3::new(0.0, 0.0, -5.0), Point3::origin());
        let mvp = camera.projection_matrix() * camera.view_matrix();
        let (x, _, _) = project_to_screen(&mvp, &Point3::new(1.0, 0.0, 0.0), 80, 40).unwrap();
        let (_, y, _) = project_to_screen(&mvp, &Point3::new(0.0, 1.0, 0.0), 80, 40).unwrap();
        assert!(x > 40.0);
        assert!(y < 20.0);
    }

    #[test]
    fn test_behind_camera_is_rejected() {
        let camera = Camera::looking_at(Point3::new(0.0, 0.0, -5.0), Point3::origin());
        let mvp = camera.projection_matrix() * camera.view_matrix();
        assert!(project_to_screen(&mvp, &Point3::new(0.0, 0.0, -10.0), 80, 40).is_none());
        assert!(project_to_screen(&mvp, &Point3::new(0.0, 0.0, 200.0), 80, 40).is_none());
    }
}
