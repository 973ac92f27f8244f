use approx::assert_relative_eq;
use mesh_cells::algs::contour::contour_dataset;
use mesh_cells::algs::probe::find_cell;
use mesh_cells::prelude::*;
use proptest::prelude::*;

/// `n` unit hexahedra stacked along z.
fn hex_column(n: usize) -> UnstructuredGrid {
    let mut grid = UnstructuredGrid::new();
    grid.allocate(n, 8);
    for k in 0..=n {
        let z = k as f64;
        for (x, y) in [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)] {
            grid.insert_next_point([x, y, z]);
        }
    }
    for k in 0..n {
        let b = 4 * k;
        let pts: Vec<usize> = (b..b + 8).collect();
        grid.insert_next_cell(CellType::Hexahedron, &pts).unwrap();
    }
    grid
}

proptest! {
    #[test]
    fn links_match_connectivity(
        cells in prop::collection::vec(prop::sample::subsequence((0usize..12).collect::<Vec<_>>(), 3), 1..40)
    ) {
        let mut grid = UnstructuredGrid::new();
        for i in 0..12 {
            grid.insert_next_point([i as f64, (i * i) as f64, 0.0]);
        }
        for c in &cells {
            grid.insert_next_cell(CellType::Triangle, c).unwrap();
        }
        grid.build_links().unwrap();
        let links = grid.links().unwrap();
        prop_assert!(links.validate_against(&grid).is_ok());
        for (id, c) in cells.iter().enumerate() {
            for p in c {
                prop_assert!(links.cells(*p).contains(&id));
            }
        }
    }
}

#[test]
fn hex_column_neighbors_and_probe() {
    let mut grid = hex_column(3);
    grid.build_links().unwrap();
    // top face of cell 0 is the bottom face of cell 1
    assert_eq!(grid.cell_neighbors(0, &[4, 5, 6, 7]).unwrap(), vec![1]);
    assert!(grid.cell_neighbors(0, &[0, 1, 2, 3]).unwrap().is_empty());
    assert!(grid.is_homogeneous());

    let loc = find_cell(&grid, [0.5, 0.5, 2.5], 1e-9).unwrap().unwrap();
    assert_eq!(loc.cell_id, 2);
    assert_relative_eq!(loc.eval.pcoords[2], 0.5, epsilon = 1e-9);
}

#[test]
fn hex_column_contour_carries_attributes() {
    let mut grid = hex_column(2);
    let z: Vec<f64> = (0..grid.number_of_points()).map(|p| grid.point(p)[2]).collect();
    grid.point_data_mut()
        .add_array(DataArray::from_values("z", 1, z.clone()).unwrap());
    grid.cell_data_mut()
        .add_array(DataArray::from_values("block", 1, vec![10.0, 20.0]).unwrap());

    let out = contour_dataset(&grid, &z, &[0.5, 1.5]).unwrap();
    assert!(out.polys().number_of_cells() >= 2);
    let block = out.cell_data().array("block").unwrap();
    assert_eq!(block.number_of_tuples(), out.number_of_cells());
    for id in 0..out.number_of_cells() {
        let zc = out.cell_bounds(id).center()[2];
        let want = if zc < 1.0 { 10.0 } else { 20.0 };
        assert_eq!(block.tuple(id), &[want]);
    }
    let zs = out.point_data().array("z").unwrap();
    for p in 0..out.number_of_points() {
        assert_relative_eq!(zs.tuple(p)[0], out.point(p)[2], epsilon = 1e-12);
    }
}

#[test]
fn poly_data_edit_and_compact() {
    let mut pd = PolyData::new();
    for p in [
        [0.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [1.0, 1.0, 0.0],
        [0.0, 1.0, 0.0],
        [2.0, 0.0, 0.0],
    ] {
        pd.insert_next_point(p);
    }
    pd.insert_next_cell(CellType::Triangle, &[0, 1, 2]).unwrap();
    pd.insert_next_cell(CellType::Triangle, &[0, 2, 3]).unwrap();
    pd.insert_next_cell(CellType::Line, &[1, 4]).unwrap();
    pd.build_links().unwrap();

    // the line was inserted last but lines come before polys
    assert_eq!(pd.cell_type(0), CellType::Line);
    assert!(pd.is_edge(0, 2).unwrap());
    assert!(pd.is_triangle(2, 0, 3).unwrap());
    assert_eq!(pd.cell_edge_neighbors(1, 0, 2).unwrap(), vec![2]);

    pd.remove_cell_reference(1).unwrap();
    pd.delete_cell(1).unwrap();
    assert_eq!(pd.remove_deleted_cells().unwrap(), 1);
    assert_eq!(pd.number_of_cells(), 2);
    assert_eq!(pd.cell_points(1), vec![0, 2, 3]);
    assert_eq!(pd.point_cells(1).unwrap(), &[0]);
    assert!(!pd.is_edge(0, 1).unwrap());
}

#[test]
fn datasets_survive_json() {
    let mut grid = hex_column(1);
    grid.cell_data_mut()
        .add_array(DataArray::from_values("id", 1, vec![1.0]).unwrap());
    grid.build_links().unwrap();
    let text = serde_json::to_string(&grid).unwrap();
    let back: UnstructuredGrid = serde_json::from_str(&text).unwrap();
    assert_eq!(back, grid);

    let mut pd = PolyData::new();
    pd.insert_next_point([0.5, 0.25, 0.0]);
    pd.insert_next_cell(CellType::Vertex, &[0]).unwrap();
    pd.build_cells();
    let text = serde_json::to_string(&pd).unwrap();
    let back: PolyData = serde_json::from_str(&text).unwrap();
    assert_eq!(back, pd);
    assert_eq!(back.cell_type(0), CellType::Vertex);
}

#[test]
fn repeated_point_ids_link_once() {
    let mut pd = PolyData::new();
    for p in [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]] {
        pd.insert_next_point(p);
    }
    pd.insert_next_cell(CellType::Triangle, &[0, 0, 1]).unwrap();
    pd.build_links().unwrap();
    assert_eq!(pd.point_cells(0).unwrap(), &[0]);
    assert!(pd.links().unwrap().validate_against(&pd).is_ok());

    let mut grid = UnstructuredGrid::new();
    for p in [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]] {
        grid.insert_next_point(p);
    }
    grid.insert_next_cell(CellType::Polygon, &[0, 1, 2, 0]).unwrap();
    grid.insert_next_cell(CellType::Triangle, &[0, 1, 2]).unwrap();
    grid.build_links().unwrap();
    assert_eq!(grid.point_cells(0).unwrap(), &[0, 1]);
    assert_eq!(grid.point_cells(2).unwrap(), &[0, 1]);
    assert!(grid.links().unwrap().validate_against(&grid).is_ok());
}
