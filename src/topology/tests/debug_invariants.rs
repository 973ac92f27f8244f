#![cfg(any(debug_assertions, feature = "strict-invariants"))]

use crate::debug_invariants::DebugInvariants;
use crate::topology::{CellArray, CellLinks, CellType, CellTypes};

#[test]
#[should_panic]
fn truncated_record_panics_in_debug() {
    let mut ca = CellArray::new();
    // claims three points, provides two
    ca.write_slice(1, 3).copy_from_slice(&[3, 0, 1]);
    ca.debug_assert_invariants();
}

#[test]
#[should_panic]
fn record_count_mismatch_panics_in_debug() {
    let mut ca = CellArray::new();
    ca.write_slice(2, 3).copy_from_slice(&[2, 0, 1]);
    ca.debug_assert_invariants();
}

#[test]
#[should_panic]
fn shared_location_panics_in_debug() {
    let mut ct = CellTypes::new();
    ct.insert_next_cell(CellType::Triangle, Some(0));
    ct.insert_next_cell(CellType::Triangle, Some(0));
    ct.debug_assert_invariants();
}

#[test]
#[should_panic]
fn duplicate_link_panics_in_debug() {
    let mut links = CellLinks::new();
    links.allocate(1);
    links.add_cell_reference(4, 0);
    links.add_cell_reference(4, 0);
    links.debug_assert_invariants();
}

#[test]
fn tombstones_may_share_locations() {
    let mut ct = CellTypes::new();
    ct.insert_next_cell(CellType::Triangle, Some(0));
    ct.insert_next_cell(CellType::Triangle, Some(0));
    ct.delete_cell(1);
    assert!(ct.validate_invariants().is_ok());
}
