/// The two built-in viewer programs and their constants
use nalgebra::{Point3, Vector3};

use crate::device::{RenderState, Rgb};
use crate::primitives::Primitive;
use crate::projection::Camera;
use crate::selection::Selection;

/// Where a program's mesh comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum MeshSource {
    /// A model file name, resolved against the search path.
    File(String),
    Primitive(Primitive),
}

impl MeshSource {
    pub fn file(name: &str) -> Self {
        MeshSource::File(name.to_string())
    }
}

/// Everything that distinguishes one viewer program from another.
#[derive(Debug, Clone)]
pub struct ProgramSpec {
    pub title: String,
    /// Requested surface size in terminal cells.
    pub viewport: (u16, u16),
    pub clear_color: Rgb,
    pub camera: Camera,
    /// Spin about Y in radians per second; `None` keeps meshes still.
    pub spin: Option<f32>,
    pub scale: f32,
    pub meshes: Vec<MeshSource>,
    /// Offsets used while every mesh is shown; mesh `i` sits at slot `i`.
    pub slots: Vec<Vector3<f32>>,
    pub render_state: RenderState,
}

impl ProgramSpec {
    /// Three chess pieces loaded from `.x` files, spinning, cycled by mouse click.
    pub fn chess() -> Self {
        Self {
            title: "Meshes".to_string(),
            viewport: (60, 30),
            clear_color: Rgb::BLUE,
            camera: Camera::looking_at(Point3::new(0.0, 3.0, -5.0), Point3::origin()),
            spin: Some(1.0),
            scale: 20.0,
            meshes: vec![
                MeshSource::file("ChessPawn.x"),
                MeshSource::file("ChessQueen.x"),
                MeshSource::file("ChessRook.x"),
            ],
            slots: vec![
                Vector3::new(-1.0, 0.0, 0.0),
                Vector3::new(0.0, 0.0, 0.0),
                Vector3::new(1.0, 0.0, 0.0),
            ],
            render_state: RenderState::default(),
        }
    }

    /// Five generated primitives, selected with the number keys.
    pub fn shapes() -> Self {
        Self {
            title: "Primitives".to_string(),
            viewport: (100, 40),
            clear_color: Rgb::WHITE,
            camera: Camera::looking_at(Point3::new(0.0, 3.0, -10.0), Point3::origin()),
            spin: None,
            scale: 1.0,
            meshes: vec![
                MeshSource::Primitive(Primitive::Box {
                    width: 2.0,
                    height: 2.0,
                    depth: 2.0,
                }),
                MeshSource::Primitive(Primitive::Sphere {
                    radius: 0.55,
                    slices: 30,
                    stacks: 10,
                }),
                MeshSource::Primitive(Primitive::Cylinder {
                    radius1: 0.5,
                    radius2: 0.5,
                    length: 5.0,
                    slices: 20,
                    stacks: 20,
                }),
                MeshSource::Primitive(Primitive::Teapot),
                MeshSource::Primitive(Primitive::Torus {
                    inner_radius: 0.1,
                    outer_radius: 1.0,
                    sides: 20,
                    rings: 20,
                }),
            ],
            slots: vec![
                Vector3::new(2.0, 0.0, 0.0),
                Vector3::new(-2.0, 0.0, 0.0),
                Vector3::new(1.0, 0.0, 2.0),
                Vector3::new(-1.0, 0.0, 2.0),
                Vector3::new(0.0, 0.0, 2.0),
            ],
            render_state: RenderState::default(),
        }
    }

    /// Draw list for a selection: `(mesh index, offset)` pairs in draw order.
    pub fn placements(&self, selection: Selection) -> Vec<(usize, Vector3<f32>)> {
        match selection {
            Selection::All => (0..self.meshes.len())
                .map(|i| (i, self.slots.get(i).copied().unwrap_or_else(Vector3::zeros)))
                .collect(),
            Selection::Single(i) if i < self.meshes.len() => vec![(i, Vector3::zeros())],
            Selection::Single(_) => Vec::new(),
        }
    }

    /// Y rotation after `elapsed_secs` of running.
    pub fn spin_angle(&self, elapsed_secs: f32) -> f32 {
        self.spin.map_or(0.0, |rate| rate * elapsed_secs)
    }
}
