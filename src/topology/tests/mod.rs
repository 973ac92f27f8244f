//! Cross-structure topology tests.

mod debug_invariants;

use super::{CellArray, CellLinks, CellType, CellTypes};

/// Mixed triangles and a quad sharing edges.
fn fan() -> (CellArray, CellTypes) {
    let mut ca = CellArray::new();
    let mut ct = CellTypes::new();
    for (ty, pts) in [
        (CellType::Triangle, &[0usize, 1, 2][..]),
        (CellType::Quad, &[1, 3, 4, 2][..]),
        (CellType::Triangle, &[2, 4, 5][..]),
    ] {
        ca.insert_next_cell(pts);
        ct.insert_next_cell(ty, Some(ca.last_location()));
    }
    (ca, ct)
}

#[test]
fn registry_locations_address_records() {
    let (ca, ct) = fan();
    assert_eq!(ct.number_of_types(), 3);
    let loc = ct.cell_location(1).unwrap();
    assert_eq!(ca.cell(loc), &[1, 3, 4, 2]);
    assert_eq!(ca.cell_size(ct.cell_location(2).unwrap()), 3);
    assert_eq!(ct.distinct_types(), vec![CellType::Triangle, CellType::Quad]);
}

#[test]
fn links_agree_with_traversal() {
    let (ca, _) = fan();
    let mut links = CellLinks::new();
    links.build_from_cell_array(6, &ca);
    for (cell_id, pts) in ca.iter().enumerate() {
        for &p in pts {
            assert_eq!(links.cells(p).iter().filter(|&&c| c == cell_id).count(), 1);
        }
    }
    let total: usize = (0..6).map(|p| links.ncells(p)).sum();
    assert_eq!(total, ca.number_of_connectivity_entries() - ca.number_of_cells());
}

#[test]
fn tombstoned_cell_keeps_its_slot() {
    let (_, mut ct) = fan();
    ct.delete_cell(1);
    assert!(ct.is_deleted(1));
    assert_eq!(ct.number_of_types(), 3);
    assert_eq!(ct.cell_type(2), CellType::Triangle);
    assert!(!ct.is_type(CellType::Quad));
}
