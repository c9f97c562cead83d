//! Rendering device abstraction.
//!
//! A device owns uploaded geometry the way a GPU owns vertex buffers: meshes are
//! acquired with [`RenderDevice::upload`] and must be handed back exactly once
//! with [`RenderDevice::release`]. [`crate::context::AppContext`] takes care of
//! the pairing.

use crate::error::{DeviceError, SceneError};
use crate::geometry::Mesh;
use crate::transform::TransformTriple;

/// Handle to a mesh uploaded to a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshId(usize);

impl MeshId {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

/// 8-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLUE: Rgb = Rgb::new(0, 0, 255);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Fixed render state set once at bootstrap.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderState {
    pub depth_test: bool,
    /// Minimum brightness in `0..=1` applied to every face.
    pub ambient: f32,
}

impl Default for RenderState {
    fn default() -> Self {
        Self {
            depth_test: true,
            ambient: 0.3,
        }
    }
}

pub trait RenderDevice {
    /// Take ownership of a mesh's geometry.
    fn upload(&mut self, mesh: Mesh) -> MeshId;

    /// Free geometry acquired with [`RenderDevice::upload`].
    fn release(&mut self, id: MeshId);

    fn set_render_state(&mut self, state: RenderState);

    /// Make the surface visible. Nothing is displayed before this call.
    fn show(&mut self, title: &str) -> Result<(), DeviceError>;

    /// The surface changed size.
    fn resize(&mut self, _cols: u16, _rows: u16) {}

    /// Width over height of the drawable area, as seen by the viewer.
    fn aspect(&self) -> f32 {
        1.0
    }

    fn clear(&mut self, color: Rgb);

    fn begin_scene(&mut self) -> Result<(), SceneError>;

    fn set_transforms(&mut self, transforms: &TransformTriple);

    fn draw_subset(&mut self, id: MeshId, subset: usize);

    /// Short status text for the current frame.
    fn set_caption(&mut self, _caption: &str) {}

    fn end_scene(&mut self);

    fn present(&mut self) -> Result<(), DeviceError>;
}
