use approx::assert_relative_eq;
use mesh_cells::cell::{Cell, ContourOutput};
use mesh_cells::geometry::bounds::{hit_bbox, Bounds};
use mesh_cells::geometry::locator::{MergePoints, PointLocator};
use mesh_cells::geometry::quality::{cell_quality, tet_radius_ratio};
use mesh_cells::topology::CellType;

fn unit_pyramid() -> Cell {
    Cell::from_points(
        CellType::Pyramid,
        vec![
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [1.0, 1.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.5, 0.5, 1.0],
        ],
    )
    .unwrap()
}

#[test]
fn pyramid_location_position_round_trip() {
    let pyramid = Cell::from_points(
        CellType::Pyramid,
        vec![
            [0.0, 0.0, 0.0],
            [2.0, 0.1, 0.0],
            [2.2, 1.8, 0.1],
            [-0.1, 2.0, 0.0],
            [1.1, 0.9, 1.7],
        ],
    )
    .unwrap();
    for pc in [
        [0.5, 0.5, 0.5],
        [0.2, 0.7, 0.1],
        [0.9, 0.1, 0.3],
        [0.3, 0.3, 0.8],
    ] {
        let (x, weights) = pyramid.evaluate_location(0, pc);
        assert_relative_eq!(weights.iter().sum::<f64>(), 1.0, epsilon = 1e-12);
        let eval = pyramid.evaluate_position(x).unwrap();
        assert!(eval.inside, "{pc:?} should map back inside");
        for k in 0..3 {
            assert!((eval.pcoords[k] - pc[k]).abs() < 1e-3, "{pc:?} -> {:?}", eval.pcoords);
        }
    }
}

#[test]
fn hit_bbox_entry_at_segment_end() {
    let b = Bounds::from_array([0.0, 1.0, 0.0, 1.0, 0.0, 1.0]);
    let hit = hit_bbox(&b, [-1.0, 0.5, 0.5], [1.0, 0.0, 0.0]).unwrap();
    assert_relative_eq!(hit.t, 1.0);
    assert_eq!(hit.coord, [0.0, 0.5, 0.5]);
}

#[test]
fn hit_bbox_parallel_segment_misses() {
    let b = Bounds::from_array([0.0, 1.0, 0.0, 1.0, 0.0, 1.0]);
    assert!(hit_bbox(&b, [-1.0, 2.0, 0.5], [1.0, 0.0, 0.0]).is_none());
}

#[test]
fn pyramid_contour_through_lateral_midpoints() {
    let pyramid = unit_pyramid();
    let mut locator = MergePoints::new();
    let mut out = ContourOutput::new();
    pyramid
        .contour(0.5, &[0.0, 0.0, 0.0, 0.0, 1.0], &mut locator, &mut out, None)
        .unwrap();

    assert_eq!(out.polys.number_of_cells(), 1);
    let quad = out.polys.cell(0);
    assert_eq!(quad.len(), 4);
    let pts = locator.points();
    let mut got: Vec<[f64; 3]> = quad.iter().map(|&id| pts.point(id)).collect();
    got.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let want = [
        [0.25, 0.25, 0.5],
        [0.25, 0.75, 0.5],
        [0.75, 0.25, 0.5],
        [0.75, 0.75, 0.5],
    ];
    for (g, w) in got.iter().zip(&want) {
        for k in 0..3 {
            assert_relative_eq!(g[k], w[k], epsilon = 1e-12);
        }
    }
}

#[test]
fn regular_tet_radius_ratio_is_one() {
    let s = 2.0;
    let h = 3f64.sqrt() / 2.0 * s;
    let apex_z = (2.0f64 / 3.0).sqrt() * s;
    let p = [
        [0.0, 0.0, 0.0],
        [s, 0.0, 0.0],
        [s / 2.0, h, 0.0],
        [s / 2.0, h / 3.0, apex_z],
    ];
    assert_relative_eq!(tet_radius_ratio(p[0], p[1], p[2], p[3]).unwrap(), 1.0, epsilon = 1e-9);

    let tet = Cell::from_points(CellType::Tetra, p.to_vec()).unwrap();
    let q = cell_quality(&tet).unwrap();
    assert_relative_eq!(q.radius_ratio.unwrap(), 1.0, epsilon = 1e-9);
    assert!(q.jacobian_sign > 0.0);
    assert_relative_eq!(q.min_angle_deg, 60.0, epsilon = 1e-6);
}

#[test]
fn hexahedron_line_probe_and_boundary() {
    let hex = Cell::from_points(
        CellType::Hexahedron,
        vec![
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [1.0, 1.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 1.0],
            [1.0, 0.0, 1.0],
            [1.0, 1.0, 1.0],
            [0.0, 1.0, 1.0],
        ],
    )
    .unwrap();
    let hit = hex
        .intersect_with_line([0.5, 0.5, 2.0], [0.5, 0.5, -2.0], 1e-9)
        .unwrap();
    assert_relative_eq!(hit.t, 0.25, epsilon = 1e-9);
    assert_relative_eq!(hit.x[2], 1.0, epsilon = 1e-9);

    let (inside, face) = hex.cell_boundary(0, [0.5, 0.5, 0.05]);
    assert!(inside);
    assert_eq!(face, vec![0, 3, 2, 1]);
}
