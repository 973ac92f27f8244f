use mesh_cells::topology::CellArray;
use proptest::prelude::*;

fn records() -> impl Strategy<Value = Vec<Vec<usize>>> {
    prop::collection::vec(prop::collection::vec(0usize..500, 1..9), 0..64)
}

proptest! {
    #[test]
    fn counts_follow_inserts(cells in records()) {
        let mut ca = CellArray::with_capacity(4, 3);
        for c in &cells {
            ca.insert_next_cell(c);
        }
        let words: usize = cells.iter().map(|c| c.len() + 1).sum();
        prop_assert_eq!(ca.number_of_cells(), cells.len());
        prop_assert_eq!(ca.number_of_connectivity_entries(), words);
        prop_assert_eq!(ca.max_cell_size(), cells.iter().map(Vec::len).max().unwrap_or(0));
    }

    #[test]
    fn traversal_reproduces_insertion_order(cells in records()) {
        let mut ca = CellArray::new();
        for c in &cells {
            ca.insert_next_cell(c);
        }
        let seen: Vec<Vec<usize>> = ca.iter().map(<[usize]>::to_vec).collect();
        prop_assert_eq!(seen, cells);
    }

    #[test]
    fn raw_buffer_round_trips(cells in records()) {
        let mut ca = CellArray::new();
        for c in &cells {
            ca.insert_next_cell(c);
        }
        let n = ca.number_of_cells();
        let back = CellArray::from_raw(n, ca.clone().into_raw()).unwrap();
        prop_assert_eq!(back.as_slice(), ca.as_slice());
        prop_assert_eq!(back.last_location(), ca.last_location());
    }
}

#[test]
fn reset_empties_but_keeps_working() {
    let mut ca = CellArray::new();
    ca.insert_next_cell(&[0, 1, 2]);
    ca.insert_next_cell(&[2, 3]);
    ca.reset();
    assert_eq!(ca.number_of_cells(), 0);
    assert_eq!(ca.number_of_connectivity_entries(), 0);
    assert_eq!(ca.iter().count(), 0);
    assert_eq!(ca.insert_next_cell(&[7]), 0);
    assert_eq!(ca.as_slice(), &[1, 7]);
}

#[test]
fn builder_patches_count() {
    let mut ca = CellArray::new();
    let mut b = ca.begin_cell();
    b.extend([4, 5, 6]);
    b.push(7);
    assert_eq!(b.finish(), 0);
    assert_eq!(ca.cell(0), &[4, 5, 6, 7]);
}

#[test]
fn from_raw_rejects_bad_layout() {
    assert!(CellArray::from_raw(1, vec![3, 0, 1]).is_err());
    assert!(CellArray::from_raw(2, vec![2, 0, 1]).is_err());
}
