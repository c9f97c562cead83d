//! Model file lookup and decoding.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::error::LoadError;
use crate::geometry::Mesh;
use crate::program::MeshSource;
use crate::{stl, xfile};

/// Ordered list of directories searched for model files.
#[derive(Debug, Clone)]
pub struct SearchPath {
    dirs: Vec<PathBuf>,
}

impl SearchPath {
    pub fn new(dirs: Vec<PathBuf>) -> Self {
        Self { dirs }
    }

    /// `root` first, then its parent directory.
    pub fn with_parent(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let parent = root.join("..");
        Self::new(vec![root, parent])
    }

    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }
}

impl Default for SearchPath {
    fn default() -> Self {
        Self::with_parent(".")
    }
}

fn decode(path: &Path, name: &str) -> Result<Mesh, LoadError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(name);

    let data = fs::read(path).map_err(|source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    match extension.as_deref() {
        Some("x") => xfile::parse_x(stem, &data).map_err(|source| LoadError::XFile {
            path: path.to_path_buf(),
            source,
        }),
        Some("stl") => stl::parse_stl(stem, &data).map_err(|source| LoadError::Stl {
            path: path.to_path_buf(),
            source,
        }),
        _ => Err(LoadError::UnsupportedExtension(name.to_string())),
    }
}

/// Load `name` from the first search directory that holds a readable, valid copy.
///
/// A broken file in an earlier directory does not hide a good one later on; if
/// nothing loads, the last decode error wins over `NotFound`.
pub fn load_model(name: &str, search: &SearchPath) -> Result<Mesh, LoadError> {
    if !matches!(
        Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref(),
        Some("x") | Some("stl")
    ) {
        return Err(LoadError::UnsupportedExtension(name.to_string()));
    }

    let mut last_error = None;
    for (attempt, dir) in search.dirs().iter().enumerate() {
        let path = dir.join(name);
        if !path.is_file() {
            debug!("{} not found in {}", name, dir.display());
            continue;
        }
        match decode(&path, name) {
            Ok(mesh) => {
                if attempt > 0 {
                    info!("loaded {} from fallback location {}", name, path.display());
                }
                return Ok(mesh);
            }
            Err(e) => {
                debug!("skipping {}: {}", path.display(), e);
                last_error = Some(e);
            }
        }
    }

    Err(last_error.unwrap_or_else(|| LoadError::NotFound {
        name: name.to_string(),
        searched: search.dirs().to_vec(),
    }))
}

/// Produce the mesh for one program entry.
pub fn load_source(source: &MeshSource, search: &SearchPath) -> Result<Mesh, LoadError> {
    match source {
        MeshSource::File(name) => load_model(name, search),
        MeshSource::Primitive(primitive) => Ok(primitive.build()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::Primitive;
    use std::fs;

    const TRIANGLE_X: &str = "xof 0303txt 0032\nMesh { 3; 0;0;0;, 1;0;0;, 0;1;0;; 1; 3;0,1,2;; }";

    #[test]
    fn test_missing_everywhere_is_not_found() {
        let root = tempfile::tempdir().unwrap();
        let work = root.path().join("work");
        fs::create_dir(&work).unwrap();

        let err = load_model("ChessPawn.x", &SearchPath::with_parent(&work)).unwrap_err();
        match err {
            LoadError::NotFound { name, searched } => {
                assert_eq!(name, "ChessPawn.x");
                assert_eq!(searched.len(), 2);
            }
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn test_parent_directory_fallback() {
        let root = tempfile::tempdir().unwrap();
        let work = root.path().join("work");
        fs::create_dir(&work).unwrap();
        fs::write(root.path().join("ChessPawn.x"), TRIANGLE_X).unwrap();

        let mesh = load_model("ChessPawn.x", &SearchPath::with_parent(&work)).unwrap();
        assert_eq!(mesh.name, "ChessPawn");
        assert_eq!(mesh.triangles.len(), 1);
    }

    #[test]
    fn test_broken_file_falls_through_to_parent() {
        let root = tempfile::tempdir().unwrap();
        let work = root.path().join("work");
        fs::create_dir(&work).unwrap();
        fs::write(work.join("ChessRook.x"), "xof 0303bin 0032....").unwrap();
        fs::write(root.path().join("ChessRook.x"), TRIANGLE_X).unwrap();

        assert!(load_model("ChessRook.x", &SearchPath::with_parent(&work)).is_ok());
    }

    #[test]
    fn test_broken_file_reports_parse_error() {
        let root = tempfile::tempdir().unwrap();
        fs::write(root.path().join("ChessQueen.x"), "not a model").unwrap();

        let search = SearchPath::new(vec![root.path().to_path_buf()]);
        let err = load_model("ChessQueen.x", &search).unwrap_err();
        assert!(matches!(err, LoadError::XFile { .. }));
    }

    #[test]
    fn test_unsupported_extension() {
        let err = load_model("pawn.obj", &SearchPath::default()).unwrap_err();
        assert!(matches!(err, LoadError::UnsupportedExtension(_)));
    }

    #[test]
    fn test_bundled_chess_pieces() {
        let assets = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../assets");
        let search = SearchPath::new(vec![assets]);
        for name in ["ChessPawn.x", "ChessQueen.x", "ChessRook.x"] {
            let mesh = load_model(name, &search).unwrap();
            assert_eq!(mesh.subset_count(), 2, "{name}");
            let (min, max) = mesh.bounds().unwrap();
            // Pieces are authored around 6-7 cm tall and shifted down by the frame.
            assert!(max.y - min.y > 0.04 && max.y - min.y < 0.08, "{name}");
            assert!(min.y < 0.0, "{name}");
        }
    }

    #[test]
    fn test_primitive_source_needs_no_files() {
        let source = MeshSource::Primitive(Primitive::Teapot);
        let search = SearchPath::new(Vec::new());
        assert_eq!(load_source(&source, &search).unwrap().name, "Teapot");
    }
}
