//! Property tests for geometric invariants.

use proptest::prelude::*;
use scanprep::{analyze, center_on_bed, scale_to_size, Axis, Mesh, Vertex};

/// Axis-aligned box spanning the given extents from the origin.
fn make_box(sx: f64, sy: f64, sz: f64) -> Mesh {
    let mut mesh = Mesh::new();

    let corners = [
        (0.0, 0.0, 0.0),
        (sx, 0.0, 0.0),
        (sx, sy, 0.0),
        (0.0, sy, 0.0),
        (0.0, 0.0, sz),
        (sx, 0.0, sz),
        (sx, sy, sz),
        (0.0, sy, sz),
    ];
    for (x, y, z) in corners {
        mesh.vertices.push(Vertex::from_coords(x, y, z));
    }

    for face in [
        [0, 2, 1],
        [0, 3, 2],
        [4, 5, 6],
        [4, 6, 7],
        [0, 1, 5],
        [0, 5, 4],
        [3, 7, 6],
        [3, 6, 2],
        [0, 4, 7],
        [0, 7, 3],
        [1, 2, 6],
        [1, 6, 5],
    ] {
        mesh.faces.push(face);
    }

    mesh
}

fn extent_strategy() -> impl Strategy<Value = f64> {
    0.1f64..500.0
}

proptest! {
    #[test]
    fn scaling_hits_target_on_resolved_axis(
        sx in extent_strategy(),
        sy in extent_strategy(),
        sz in extent_strategy(),
        target in 1.0f64..1000.0,
    ) {
        let mesh = make_box(sx, sy, sz);
        let (scaled, axis, _) = scale_to_size(mesh, target, Axis::Auto).unwrap();
        let extents = scaled.extents();
        prop_assert!(((extents[axis] - target) / target).abs() < 1e-9);
    }

    #[test]
    fn scaling_preserves_proportions(
        sx in extent_strategy(),
        sy in extent_strategy(),
        target in 1.0f64..1000.0,
    ) {
        let mesh = make_box(sx, sy, 1.0);
        let ratio_before = sx / sy;
        let (scaled, _, _) = scale_to_size(mesh, target, Axis::X).unwrap();
        let extents = scaled.extents();
        let ratio_after = extents[0] / extents[1];
        prop_assert!((ratio_before - ratio_after).abs() < 1e-6 * ratio_before.max(1.0));
    }

    #[test]
    fn auto_axis_resolves_to_a_maximal_extent(
        sx in extent_strategy(),
        sy in extent_strategy(),
        sz in extent_strategy(),
    ) {
        let extents = [sx, sy, sz];
        let axis = Axis::Auto.resolve(&extents);
        for e in extents {
            prop_assert!(extents[axis] >= e);
        }
        // No earlier axis shares the winning extent.
        for earlier in 0..axis {
            prop_assert!(extents[earlier] < extents[axis]);
        }
    }

    #[test]
    fn centering_is_idempotent(
        sx in extent_strategy(),
        sy in extent_strategy(),
        sz in extent_strategy(),
        tx in -100.0f64..100.0,
        ty in -100.0f64..100.0,
        tz in -100.0f64..100.0,
    ) {
        let mut mesh = make_box(sx, sy, sz);
        mesh.translate(nalgebra::Vector3::new(tx, ty, tz));

        let once = center_on_bed(mesh);
        let reference: Vec<_> = once.vertices.iter().map(|v| v.position).collect();
        let twice = center_on_bed(once);

        for (v, p) in twice.vertices.iter().zip(reference) {
            prop_assert!((v.position - p).norm() < 1e-9);
        }

        let (min, max) = twice.bounds().unwrap();
        prop_assert!((min.x + max.x).abs() < 1e-9);
        prop_assert!((min.y + max.y).abs() < 1e-9);
        prop_assert!(min.z.abs() < 1e-9);
    }

    #[test]
    fn rigid_motion_does_not_change_diagnostics(
        tx in -100.0f64..100.0,
        ty in -100.0f64..100.0,
        tz in -100.0f64..100.0,
    ) {
        let mut mesh = make_box(10.0, 20.0, 30.0);
        mesh.translate(nalgebra::Vector3::new(tx, ty, tz));
        let report = analyze(&mesh).unwrap();
        prop_assert!(report.is_watertight);
        prop_assert_eq!(report.boundary_edge_count(), 0);
        prop_assert_eq!(report.component_count(), 1);
    }

    #[test]
    fn volume_scales_cubically(factor in 0.1f64..10.0) {
        let mut mesh = make_box(2.0, 3.0, 4.0);
        let before = mesh.volume();
        mesh.scale(factor);
        let after = mesh.volume();
        prop_assert!((after - before * factor.powi(3)).abs() < 1e-6 * after.max(1.0));
    }
}
