use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use mesh_cells::data::{DataSet, UnstructuredGrid};
use mesh_cells::topology::{CellLinks, CellType};

/// `n x n x 1` block of unit hexahedra.
fn hex_slab(n: usize) -> UnstructuredGrid {
    let mut grid = UnstructuredGrid::new();
    grid.allocate(n * n, 8);
    for k in 0..2 {
        for j in 0..=n {
            for i in 0..=n {
                grid.insert_next_point([i as f64, j as f64, k as f64]);
            }
        }
    }
    let id = |i: usize, j: usize, k: usize| k * (n + 1) * (n + 1) + j * (n + 1) + i;
    for j in 0..n {
        for i in 0..n {
            let pts = [
                id(i, j, 0),
                id(i + 1, j, 0),
                id(i + 1, j + 1, 0),
                id(i, j + 1, 0),
                id(i, j, 1),
                id(i + 1, j, 1),
                id(i + 1, j + 1, 1),
                id(i, j + 1, 1),
            ];
            grid.insert_next_cell(CellType::Hexahedron, &pts)
                .expect("valid hexahedron");
        }
    }
    grid
}

fn bench_cell_links(c: &mut Criterion) {
    let mut group = c.benchmark_group("cell_links");

    for &n in &[32usize, 128usize] {
        let grid = hex_slab(n);

        group.bench_with_input(BenchmarkId::new("build_from_cell_array", n), &n, |b, _| {
            b.iter(|| {
                let mut links = CellLinks::new();
                links.build_from_cell_array(grid.number_of_points(), grid.connectivity());
                black_box(links);
            });
        });

        group.bench_with_input(BenchmarkId::new("build_generic", n), &n, |b, _| {
            b.iter(|| {
                let mut links = CellLinks::new();
                links.build(&grid);
                black_box(links);
            });
        });

        let mut linked = grid.clone();
        linked.build_links().expect("links build");
        group.bench_with_input(BenchmarkId::new("cell_neighbors", n), &n, |b, _| {
            b.iter(|| {
                let mut total = 0;
                for cell in (0..linked.number_of_cells()).step_by(7) {
                    let pts = linked.cell_points(cell);
                    total += linked
                        .cell_neighbors(cell, &pts[4..8])
                        .map_or(0, |v| v.len());
                }
                black_box(total);
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_cell_links);
criterion_main!(benches);
