//! Meshview Core Library - geometry, model loading and render dispatch
//!
//! This library holds everything that does not touch the terminal: model
//! parsing (`.x`, STL), primitive generation, transforms and projection, the
//! selection state machine, the device abstraction, and the idle-driven
//! message loop that ties them together.

pub mod app;
pub mod context;
pub mod device;
pub mod error;
pub mod geometry;
pub mod loader;
pub mod primitives;
pub mod program;
pub mod projection;
pub mod render;
pub mod selection;
pub mod stl;
pub mod transform;
pub mod xfile;

// Re-export commonly used types
pub use app::{run, AppEvent, EventSource, RunStats};
pub use context::{startup, AppContext, LoadedMesh};
pub use device::{MeshId, RenderDevice, RenderState, Rgb};
pub use error::{DeviceError, Error, LoadError, SceneError};
pub use geometry::{Mesh, Triangle, Vertex};
pub use loader::SearchPath;
pub use program::{MeshSource, ProgramSpec};
pub use projection::Camera;
pub use selection::{Selection, SelectionState, Trigger};
pub use transform::{RotationState, Transform, TransformTriple};
