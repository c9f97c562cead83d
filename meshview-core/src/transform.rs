/// 3D transformation matrices and rotation state
use nalgebra::{Matrix4, Vector3};

/// Rotation state around three axes (in radians)
#[derive(Debug, Clone, Copy)]
pub struct RotationState {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl RotationState {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn zero() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 0.0,
        }
    }

    /// Spin about Y only, as driven by the frame clock.
    pub fn yaw(angle: f32) -> Self {
        Self::new(0.0, angle, 0.0)
    }
}

impl Default for RotationState {
    fn default() -> Self {
        Self::zero()
    }
}

/// The per-draw world/view/projection matrices handed to a device.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformTriple {
    pub world: Matrix4<f32>,
    pub view: Matrix4<f32>,
    pub projection: Matrix4<f32>,
}

impl TransformTriple {
    pub fn mvp(&self) -> Matrix4<f32> {
        Transform::mvp_matrix(&self.world, &self.view, &self.projection)
    }
}

/// Transform builder for 3D transformations
pub struct Transform;

impl Transform {
    /// Create a rotation matrix from a rotation state
    pub fn rotation_matrix(rotation: &RotationState) -> Matrix4<f32> {
        let rx = Matrix4::new_rotation(Vector3::new(rotation.x, 0.0, 0.0));
        let ry = Matrix4::new_rotation(Vector3::new(0.0, rotation.y, 0.0));
        let rz = Matrix4::new_rotation(Vector3::new(0.0, 0.0, rotation.z));

        // Apply rotations in order: Z, Y, X
        rz * ry * rx
    }

    /// Create a translation matrix
    pub fn translation_matrix(offset: &Vector3<f32>) -> Matrix4<f32> {
        Matrix4::new_translation(offset)
    }

    /// Create a uniform scale matrix
    pub fn scale_matrix(scale: f32) -> Matrix4<f32> {
        Matrix4::new_scaling(scale)
    }

    /// World matrix for one placed mesh: rotate, then scale, then translate.
    pub fn world_matrix(
        rotation: &RotationState,
        scale: f32,
        offset: &Vector3<f32>,
    ) -> Matrix4<f32> {
        Self::translation_matrix(offset)
            * Self::scale_matrix(scale)
            * Self::rotation_matrix(rotation)
    }

    /// Create a model-view-projection matrix
    pub fn mvp_matrix(
        model: &Matrix4<f32>,
        view: &Matrix4<f32>,
        projection: &Matrix4<f32>,
    ) -> Matrix4<f32> {
        projection * view * model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    #[test]
    fn test_identity_rotation() {
        let rotation = RotationState::zero();
        let matrix = Transform::rotation_matrix(&rotation);
        assert!((matrix - Matrix4::identity()).norm() < 1e-6);
    }

    #[test]
    fn test_world_matrix_order() {
        // Translation is applied after scaling, so the offset is not scaled.
        let offset = Vector3::new(-1.0, 0.0, 0.0);
        let world = Transform::world_matrix(&RotationState::zero(), 20.0, &offset);
        let p = world.transform_point(&Point3::new(0.05, 0.0, 0.0));
        assert!((p.x - 0.0).abs() < 1e-5);
    }

    #[test]
    fn test_yaw_keeps_height() {
        let world = Transform::world_matrix(&RotationState::yaw(1.3), 1.0, &Vector3::zeros());
        let p = world.transform_point(&Point3::new(1.0, 2.0, 0.0));
        assert!((p.y - 2.0).abs() < 1e-6);
        assert!((p.coords.xz().norm() - 1.0).abs() < 1e-6);
    }
}
