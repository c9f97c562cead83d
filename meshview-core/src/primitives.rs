/// Procedural meshes: box, sphere, cylinder, torus and a lathed teapot
///
/// Every primitive is a single subset. Parameters follow the usual D3DX
/// conventions: cylinders run along Z, tori lie in the XY plane.
use std::f32::consts::{PI, TAU};

use nalgebra::{Point3, Vector3};

use crate::geometry::{Mesh, Triangle};

/// Description of a built-in mesh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Primitive {
    Box {
        width: f32,
        height: f32,
        depth: f32,
    },
    Sphere {
        radius: f32,
        slices: u32,
        stacks: u32,
    },
    Cylinder {
        radius1: f32,
        radius2: f32,
        length: f32,
        slices: u32,
        stacks: u32,
    },
    Teapot,
    Torus {
        inner_radius: f32,
        outer_radius: f32,
        sides: u32,
        rings: u32,
    },
}

impl Primitive {
    pub fn name(&self) -> &'static str {
        match self {
            Primitive::Box { .. } => "Box",
            Primitive::Sphere { .. } => "Sphere",
            Primitive::Cylinder { .. } => "Cylinder",
            Primitive::Teapot => "Teapot",
            Primitive::Torus { .. } => "Torus",
        }
    }

    pub fn build(&self) -> Mesh {
        let triangles = match *self {
            Primitive::Box {
                width,
                height,
                depth,
            } => cuboid(width, height, depth),
            Primitive::Sphere {
                radius,
                slices,
                stacks,
            } => sphere(radius, slices, stacks),
            Primitive::Cylinder {
                radius1,
                radius2,
                length,
                slices,
                stacks,
            } => cylinder(radius1, radius2, length, slices, stacks),
            Primitive::Teapot => teapot(),
            Primitive::Torus {
                inner_radius,
                outer_radius,
                sides,
                rings,
            } => torus(inner_radius, outer_radius, sides, rings),
        };
        Mesh::from_subsets(self.name(), vec![triangles])
    }
}

/// Triangulate a `rows` x `cols` grid of points produced by `point(row, col)`.
///
/// `point` is sampled on `0..=rows` and `0..=cols`. Zero-area triangles (poles,
/// cap centers) are dropped.
fn surface(rows: usize, cols: usize, point: impl Fn(usize, usize) -> Point3<f32>) -> Vec<Triangle> {
    let mut triangles = Vec::with_capacity(rows * cols * 2);
    for i in 0..rows {
        for j in 0..cols {
            let (p00, p01) = (point(i, j), point(i, j + 1));
            let (p10, p11) = (point(i + 1, j), point(i + 1, j + 1));
            for triangle in [
                Triangle::from_positions(p00, p10, p11),
                Triangle::from_positions(p00, p11, p01),
            ] {
                if triangle.calculate_normal() != Vector3::zeros() {
                    triangles.push(triangle);
                }
            }
        }
    }
    triangles
}

/// Revolve a `(radius, y)` profile around the Y axis.
pub fn lathe(profile: &[(f32, f32)], slices: u32) -> Vec<Triangle> {
    let slices = slices.max(3) as usize;
    if profile.len() < 2 {
        return Vec::new();
    }
    surface(profile.len() - 1, slices, |i, j| {
        let angle = TAU * j as f32 / slices as f32;
        let (radius, y) = profile[i];
        Point3::new(radius * angle.cos(), y, radius * angle.sin())
    })
}

/// Sweep a circle of per-point `radii` along `path`, using parallel-transported frames.
pub fn sweep_tube(path: &[Point3<f32>], radii: &[f32], sides: u32) -> Vec<Triangle> {
    let sides = sides.max(3) as usize;
    if path.len() < 2 || radii.len() != path.len() {
        return Vec::new();
    }

    let last = path.len() - 1;
    let tangents: Vec<Vector3<f32>> = (0..path.len())
        .map(|i| {
            let ahead = path[(i + 1).min(last)];
            let behind = path[i.saturating_sub(1)];
            (ahead - behind).normalize()
        })
        .collect();

    let reference = if tangents[0].x.abs() < 0.9 {
        Vector3::x()
    } else {
        Vector3::y()
    };
    let mut normal = (reference - tangents[0] * reference.dot(&tangents[0])).normalize();
    let mut frames = Vec::with_capacity(path.len());
    for tangent in &tangents {
        normal = (normal - tangent * normal.dot(tangent)).normalize();
        frames.push((normal, tangent.cross(&normal)));
    }

    surface(last, sides, |i, j| {
        let angle = TAU * j as f32 / sides as f32;
        let (normal, binormal) = frames[i];
        path[i] + (normal * angle.cos() + binormal * angle.sin()) * radii[i]
    })
}

pub fn cuboid(width: f32, height: f32, depth: f32) -> Vec<Triangle> {
    let (hx, hy, hz) = (width / 2.0, height / 2.0, depth / 2.0);
    let corner = |i: usize| {
        Point3::new(
            if i & 1 == 0 { -hx } else { hx },
            if i & 2 == 0 { -hy } else { hy },
            if i & 4 == 0 { -hz } else { hz },
        )
    };
    // Two triangles per face, corners indexed by sign bits (x=1, y=2, z=4).
    const FACES: [[usize; 4]; 6] = [
        [0, 2, 3, 1], // -z
        [4, 5, 7, 6], // +z
        [0, 4, 6, 2], // -x
        [1, 3, 7, 5], // +x
        [0, 1, 5, 4], // -y
        [2, 6, 7, 3], // +y
    ];
    FACES
        .iter()
        .flat_map(|[a, b, c, d]| {
            [
                Triangle::from_positions(corner(*a), corner(*b), corner(*c)),
                Triangle::from_positions(corner(*a), corner(*c), corner(*d)),
            ]
        })
        .collect()
}

pub fn sphere(radius: f32, slices: u32, stacks: u32) -> Vec<Triangle> {
    let stacks = stacks.max(2);
    let profile: Vec<(f32, f32)> = (0..=stacks)
        .map(|i| {
            let phi = PI * i as f32 / stacks as f32;
            // Poles exactly on the axis so their rows collapse cleanly.
            let ring = if i == 0 || i == stacks { 0.0 } else { radius * phi.sin() };
            (ring, radius * phi.cos())
        })
        .collect();
    lathe(&profile, slices)
}

pub fn cylinder(
    radius1: f32,
    radius2: f32,
    length: f32,
    slices: u32,
    stacks: u32,
) -> Vec<Triangle> {
    let stacks = stacks.max(1);
    let half = length / 2.0;
    let mut profile = vec![(0.0, -half)];
    profile.extend((0..=stacks).map(|i| {
        let t = i as f32 / stacks as f32;
        (radius1 + (radius2 - radius1) * t, -half + length * t)
    }));
    profile.push((0.0, half));

    // Lathe around Y, then turn the axis onto Z (radius1 end at -Z).
    lathe(&profile, slices)
        .into_iter()
        .map(|t| {
            let [a, b, c] = t
                .vertices
                .map(|v| Point3::new(v.position.x, -v.position.z, v.position.y));
            Triangle::from_positions(a, b, c)
        })
        .collect()
}

pub fn torus(inner_radius: f32, outer_radius: f32, sides: u32, rings: u32) -> Vec<Triangle> {
    let sides = sides.max(3) as usize;
    let rings = rings.max(3) as usize;
    surface(rings, sides, |i, j| {
        let u = TAU * i as f32 / rings as f32;
        let v = TAU * j as f32 / sides as f32;
        let r = outer_radius + inner_radius * v.cos();
        Point3::new(r * u.cos(), r * u.sin(), inner_radius * v.sin())
    })
}

/// Body and lid are lathed; spout and handle are swept tubes.
pub fn teapot() -> Vec<Triangle> {
    const BODY: [(f32, f32); 16] = [
        (0.0, 0.0),
        (0.9, 0.0),
        (1.2, 0.15),
        (1.4, 0.45),
        (1.5, 0.75),
        (1.45, 1.05),
        (1.3, 1.3),
        (1.15, 1.4),
        (1.1, 1.4),
        (0.9, 1.5),
        (0.5, 1.6),
        (0.15, 1.65),
        (0.2, 1.75),
        (0.15, 1.85),
        (0.05, 1.88),
        (0.0, 1.88),
    ];
    const SEGMENTS: usize = 12;

    let mut triangles = lathe(&BODY, 24);

    let spout: Vec<Point3<f32>> = (0..=SEGMENTS)
        .map(|i| {
            let t = i as f32 / SEGMENTS as f32;
            let a = Point3::new(1.3, 0.5, 0.0);
            let c = Point3::new(2.1, 0.5, 0.0);
            let b = Point3::new(2.4, 1.35, 0.0);
            Point3::from(
                a.coords * (1.0 - t).powi(2) + c.coords * 2.0 * t * (1.0 - t) + b.coords * t * t,
            )
        })
        .collect();
    let spout_radii: Vec<f32> = (0..=SEGMENTS)
        .map(|i| 0.28 - 0.16 * i as f32 / SEGMENTS as f32)
        .collect();
    triangles.extend(sweep_tube(&spout, &spout_radii, 10));

    let handle: Vec<Point3<f32>> = (0..=SEGMENTS)
        .map(|i| {
            let t = PI * i as f32 / SEGMENTS as f32;
            Point3::new(-1.4 - 0.65 * t.sin(), 0.75 + 0.42 * t.cos(), 0.0)
        })
        .collect();
    triangles.extend(sweep_tube(&handle, &[0.09; SEGMENTS + 1], 8));

    // Center vertically and bring the width down to roughly three units.
    let scale = 0.7;
    triangles
        .into_iter()
        .map(|t| {
            let [a, b, c] = t.vertices.map(|v| {
                Point3::new(
                    v.position.x * scale,
                    (v.position.y - 0.94) * scale,
                    v.position.z * scale,
                )
            });
            Triangle::from_positions(a, b, c)
        })
        .collect()
}
