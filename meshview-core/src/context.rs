//! Application context: the device, the loaded meshes and the selection.

use std::time::Instant;

use log::{debug, info};

use crate::device::{MeshId, RenderDevice};
use crate::error::Result;
use crate::geometry::Mesh;
use crate::loader::{load_source, SearchPath};
use crate::program::ProgramSpec;
use crate::selection::SelectionState;

/// A mesh living on the device.
#[derive(Debug, Clone)]
pub struct LoadedMesh {
    pub id: MeshId,
    pub name: String,
    pub subset_count: usize,
}

/// Owns the device and everything uploaded to it.
///
/// Dropping the context releases every mesh (in load order) and then the
/// device, on success and on every early-return path alike.
pub struct AppContext<D: RenderDevice> {
    // Dropped after `Drop::drop` has released the meshes.
    device: D,
    meshes: Vec<LoadedMesh>,
    pub program: ProgramSpec,
    pub selection: SelectionState,
    pub started: Instant,
}

impl<D: RenderDevice> AppContext<D> {
    pub fn new(mut device: D, program: ProgramSpec) -> Self {
        device.set_render_state(program.render_state);
        let selection = SelectionState::new(program.meshes.len());
        Self {
            device,
            meshes: Vec::with_capacity(program.meshes.len()),
            program,
            selection,
            started: Instant::now(),
        }
    }

    /// Upload a mesh and keep its handle until the context drops.
    pub fn adopt(&mut self, mesh: Mesh) -> &LoadedMesh {
        let name = mesh.name.clone();
        let subset_count = mesh.subset_count();
        let triangles = mesh.triangles.len();
        let id = self.device.upload(mesh);
        info!(
            "loaded mesh {} ({} triangles, {} subsets)",
            name, triangles, subset_count
        );
        self.meshes.push(LoadedMesh {
            id,
            name,
            subset_count,
        });
        &self.meshes[self.meshes.len() - 1]
    }

    pub fn meshes(&self) -> &[LoadedMesh] {
        &self.meshes
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }
}

impl<D: RenderDevice> Drop for AppContext<D> {
    fn drop(&mut self) {
        for mesh in self.meshes.drain(..) {
            debug!("releasing mesh {}", mesh.name);
            self.device.release(mesh.id);
        }
    }
}

/// Bootstrap a program: configure the device, load every mesh, then show the surface.
///
/// Any load failure aborts before the surface is shown; meshes loaded so far are
/// released when the partial context drops.
pub fn startup<D: RenderDevice>(
    device: D,
    program: ProgramSpec,
    search: &SearchPath,
) -> Result<AppContext<D>> {
    info!("starting {}", program.title);
    let mut context = AppContext::new(device, program);

    let sources = context.program.meshes.clone();
    for source in &sources {
        let mesh = load_source(source, search)?;
        context.adopt(mesh);
    }

    let title = context.program.title.clone();
    context.device.show(&title)?;
    context.started = Instant::now();
    Ok(context)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::recording::{count, Call, RecordingDevice};
    use crate::error::{Error, LoadError};
    use std::fs;

    const TRIANGLE_X: &str = "xof 0303txt 0032\nMesh { 3; 0;0;0;, 1;0;0;, 0;1;0;; 1; 3;0,1,2;; }";

    fn write_chess_files(dir: &std::path::Path) {
        for name in ["ChessPawn.x", "ChessQueen.x", "ChessRook.x"] {
            fs::write(dir.join(name), TRIANGLE_X).unwrap();
        }
    }

    #[test]
    fn test_startup_without_files_fails_before_show() {
        let root = tempfile::tempdir().unwrap();
        let (device, log) = RecordingDevice::new();

        let result = startup(device, ProgramSpec::chess(), &SearchPath::with_parent(root.path()));
        assert!(matches!(result, Err(Error::Load(LoadError::NotFound { .. }))));
        assert_eq!(count(&log, |c| *c == Call::Show), 0);
        assert_eq!(count(&log, |c| *c == Call::DeviceDropped), 1);
    }

    #[test]
    fn test_startup_from_parent_directory() {
        let root = tempfile::tempdir().unwrap();
        let work = root.path().join("bin");
        fs::create_dir(&work).unwrap();
        write_chess_files(root.path());

        let (device, log) = RecordingDevice::new();
        let context =
            startup(device, ProgramSpec::chess(), &SearchPath::with_parent(&work)).unwrap();
        assert_eq!(context.meshes().len(), 3);
        assert_eq!(count(&log, |c| *c == Call::Show), 1);
    }

    #[test]
    fn test_partial_failure_releases_loaded_meshes() {
        let root = tempfile::tempdir().unwrap();
        fs::write(root.path().join("ChessPawn.x"), TRIANGLE_X).unwrap();

        let (device, log) = RecordingDevice::new();
        let search = SearchPath::with_parent(root.path());
        assert!(startup(device, ProgramSpec::chess(), &search).is_err());

        let calls = log.borrow().clone();
        let first = MeshId::new(0);
        assert_eq!(calls.iter().filter(|c| **c == Call::Release(first)).count(), 1);
        assert_eq!(calls.last(), Some(&Call::DeviceDropped));
    }

    #[test]
    fn test_every_resource_released_once_in_order() {
        let (device, log) = RecordingDevice::new();
        let context = startup(device, ProgramSpec::shapes(), &SearchPath::new(Vec::new())).unwrap();
        assert_eq!(context.meshes().len(), 5);
        drop(context);

        let calls = log.borrow().clone();
        let releases: Vec<&Call> = calls.iter().filter(|c| matches!(c, Call::Release(_))).collect();
        let expected: Vec<Call> = (0..5).map(|i| Call::Release(MeshId::new(i))).collect();
        assert_eq!(releases.len(), 5);
        assert!(releases.iter().zip(&expected).all(|(a, b)| *a == b));
        assert_eq!(count(&log, |c| *c == Call::DeviceDropped), 1);
        assert_eq!(calls.last(), Some(&Call::DeviceDropped));
    }
}
