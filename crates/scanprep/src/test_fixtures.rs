//! Shared mesh fixtures for unit tests.

use crate::types::{Mesh, Vertex};

/// Watertight unit cube: 8 vertices, 12 faces, CCW winding seen from outside.
pub(crate) fn unit_cube() -> Mesh {
    let mut mesh = Mesh::new();

    mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0)); // 0
    mesh.vertices.push(Vertex::from_coords(1.0, 0.0, 0.0)); // 1
    mesh.vertices.push(Vertex::from_coords(1.0, 1.0, 0.0)); // 2
    mesh.vertices.push(Vertex::from_coords(0.0, 1.0, 0.0)); // 3
    mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 1.0)); // 4
    mesh.vertices.push(Vertex::from_coords(1.0, 0.0, 1.0)); // 5
    mesh.vertices.push(Vertex::from_coords(1.0, 1.0, 1.0)); // 6
    mesh.vertices.push(Vertex::from_coords(0.0, 1.0, 1.0)); // 7

    mesh.faces.push([0, 2, 1]); // bottom
    mesh.faces.push([0, 3, 2]);
    mesh.faces.push([4, 5, 6]); // top
    mesh.faces.push([4, 6, 7]);
    mesh.faces.push([0, 1, 5]); // front
    mesh.faces.push([0, 5, 4]);
    mesh.faces.push([3, 7, 6]); // back
    mesh.faces.push([3, 6, 2]);
    mesh.faces.push([0, 4, 7]); // left
    mesh.faces.push([0, 7, 3]);
    mesh.faces.push([1, 2, 6]); // right
    mesh.faces.push([1, 6, 5]);

    mesh
}

/// Watertight tetrahedron: 4 vertices, 4 faces.
pub(crate) fn tetrahedron() -> Mesh {
    let mut mesh = Mesh::new();

    mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0));
    mesh.vertices.push(Vertex::from_coords(1.0, 0.0, 0.0));
    mesh.vertices.push(Vertex::from_coords(0.5, 1.0, 0.0));
    mesh.vertices.push(Vertex::from_coords(0.5, 0.5, 1.0));

    mesh.faces.push([0, 2, 1]); // bottom
    mesh.faces.push([0, 1, 3]);
    mesh.faces.push([1, 2, 3]);
    mesh.faces.push([2, 0, 3]);

    mesh
}

/// A lone triangle: three boundary edges, not watertight.
pub(crate) fn single_triangle() -> Mesh {
    let mut mesh = Mesh::new();

    mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0));
    mesh.vertices.push(Vertex::from_coords(1.0, 0.0, 0.0));
    mesh.vertices.push(Vertex::from_coords(0.0, 1.0, 0.0));
    mesh.faces.push([0, 1, 2]);

    mesh
}

/// Approximate float comparison for test assertions.
pub(crate) fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}
