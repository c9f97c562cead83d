/// Geometry primitives for 3D rendering
use std::ops::Range;

use nalgebra::{Point3, Vector3};

/// A 3D vertex with position and normal
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub position: Point3<f32>,
    pub normal: Vector3<f32>,
}

impl Vertex {
    pub fn new(x: f32, y: f32, z: f32, nx: f32, ny: f32, nz: f32) -> Self {
        Self {
            position: Point3::new(x, y, z),
            normal: Vector3::new(nx, ny, nz),
        }
    }
}

/// A triangle face defined by three vertices
#[derive(Debug, Clone, PartialEq)]
pub struct Triangle {
    pub vertices: [Vertex; 3],
}

impl Triangle {
    pub fn new(v0: Vertex, v1: Vertex, v2: Vertex) -> Self {
        Self {
            vertices: [v0, v1, v2],
        }
    }

    /// Build a flat-shaded triangle; every vertex carries the face normal.
    pub fn from_positions(p0: Point3<f32>, p1: Point3<f32>, p2: Point3<f32>) -> Self {
        let normal = face_normal(&p0, &p1, &p2);
        let vertex = |position| Vertex { position, normal };
        Self::new(vertex(p0), vertex(p1), vertex(p2))
    }

    /// Calculate the face normal from the triangle's vertices
    pub fn calculate_normal(&self) -> Vector3<f32> {
        face_normal(
            &self.vertices[0].position,
            &self.vertices[1].position,
            &self.vertices[2].position,
        )
    }
}

/// Degenerate faces get a zero normal instead of NaNs.
fn face_normal(v0: &Point3<f32>, v1: &Point3<f32>, v2: &Point3<f32>) -> Vector3<f32> {
    let edge1 = v1 - v0;
    let edge2 = v2 - v0;

    edge1
        .cross(&edge2)
        .try_normalize(f32::EPSILON)
        .unwrap_or_else(Vector3::zeros)
}

/// A 3D mesh composed of triangles, grouped into material subsets.
///
/// Each subset is a contiguous range of `triangles` and is drawn with one call.
/// Subsets may be empty: a material that no face references still counts.
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub name: String,
    pub triangles: Vec<Triangle>,
    subsets: Vec<Range<usize>>,
}

impl Mesh {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            triangles: Vec::new(),
            subsets: Vec::new(),
        }
    }

    pub fn with_capacity(name: impl Into<String>, capacity: usize) -> Self {
        Self {
            name: name.into(),
            triangles: Vec::with_capacity(capacity),
            subsets: Vec::new(),
        }
    }

    /// Build a mesh from per-material triangle groups, in material order.
    pub fn from_subsets(name: impl Into<String>, groups: Vec<Vec<Triangle>>) -> Self {
        let total = groups.iter().map(Vec::len).sum();
        let mut mesh = Self::with_capacity(name, total);
        for group in groups {
            mesh.begin_subset();
            mesh.triangles.extend(group);
            mesh.close_subset();
        }
        mesh
    }

    /// Append a triangle to the current subset, opening the first one if needed.
    pub fn add_triangle(&mut self, triangle: Triangle) {
        if self.subsets.is_empty() {
            self.begin_subset();
        }
        self.triangles.push(triangle);
        self.close_subset();
    }

    /// Start a new (initially empty) subset; later triangles go into it.
    pub fn begin_subset(&mut self) {
        let start = self.triangles.len();
        self.subsets.push(start..start);
    }

    fn close_subset(&mut self) {
        if let Some(last) = self.subsets.last_mut() {
            last.end = self.triangles.len();
        }
    }

    pub fn subset_count(&self) -> usize {
        self.subsets.len()
    }

    /// Triangles of one subset; out-of-range subsets are empty.
    pub fn subset(&self, index: usize) -> &[Triangle] {
        match self.subsets.get(index) {
            Some(range) => &self.triangles[range.clone()],
            None => &[],
        }
    }

    /// Axis-aligned bounds as (min, max), `None` for an empty mesh.
    pub fn bounds(&self) -> Option<(Point3<f32>, Point3<f32>)> {
        let mut points = self
            .triangles
            .iter()
            .flat_map(|t| t.vertices.iter().map(|v| v.position));
        let first = points.next()?;
        Some(points.fold((first, first), |(min, max), p| {
            (min.inf(&p), max.sup(&p))
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tri(z: f32) -> Triangle {
        Triangle::from_positions(
            Point3::new(0.0, 0.0, z),
            Point3::new(1.0, 0.0, z),
            Point3::new(0.0, 1.0, z),
        )
    }

    #[test]
    fn test_add_triangle_opens_single_subset() {
        let mut mesh = Mesh::new("single");
        mesh.add_triangle(tri(0.0));
        mesh.add_triangle(tri(1.0));
        assert_eq!(mesh.subset_count(), 1);
        assert_eq!(mesh.subset(0).len(), 2);
        assert!(mesh.subset(1).is_empty());
    }

    #[test]
    fn test_subsets_are_contiguous_and_may_be_empty() {
        let mesh = Mesh::from_subsets(
            "groups",
            vec![vec![tri(0.0)], vec![], vec![tri(1.0), tri(2.0)]],
        );
        assert_eq!(mesh.subset_count(), 3);
        assert_eq!(mesh.subset(0).len(), 1);
        assert!(mesh.subset(1).is_empty());
        assert_eq!(mesh.subset(2)[1], tri(2.0));
    }

    #[test]
    fn test_face_normal_and_degenerate() {
        assert!((tri(0.0).calculate_normal() - Vector3::z()).norm() < 1e-6);
        let flat = Triangle::from_positions(Point3::origin(), Point3::origin(), Point3::origin());
        assert_eq!(flat.calculate_normal(), Vector3::zeros());
    }

    #[test]
    fn test_bounds() {
        let mut mesh = Mesh::new("b");
        assert!(mesh.bounds().is_none());
        mesh.add_triangle(tri(-1.0));
        mesh.add_triangle(tri(3.0));
        let (min, max) = mesh.bounds().unwrap();
        assert_eq!(min, Point3::new(0.0, 0.0, -1.0));
        assert_eq!(max, Point3::new(1.0, 1.0, 3.0));
    }
}
