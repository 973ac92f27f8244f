//! Contour case tables.
//!
//! A case index has one bit per cell point, set when the point's scalar is at
//! or above the iso-value. For each case the table lists the primitives to
//! emit as sequences of *cell edge indices*; the crossing point on each listed
//! edge becomes one vertex of the primitive.
//!
//! Tables are derived from the shape's edge and face lists once, on first use.
//! On every face the crossings are paired so that each run of above-value
//! corners is cut off by its own segment. The rule only depends on which
//! corners are above, so two cells sharing a face always pair the crossings
//! of that face the same way and the contour surface stays watertight.
//! Face segments are then chained into closed loops, one polygon per loop,
//! oriented so that the polygon normal points toward increasing scalar.

use super::{Cell, ContourContext};
use crate::geometry::math::{dot, lerp, newell_normal, sub};
use std::collections::HashMap;

/// Primitives per case, as lists of edge indices.
#[derive(Debug)]
pub(crate) struct CaseTable {
    cases: Vec<Vec<Vec<usize>>>,
}

impl CaseTable {
    /// Table for a polygon with `n` points and edges `(i, i + 1 mod n)`:
    /// every case yields line segments.
    pub(crate) fn polygon(n: usize) -> Self {
        let face: Vec<usize> = (0..n).collect();
        let cases = (0..1usize << n)
            .map(|case| {
                let above = |v: usize| case & (1 << v) != 0;
                face_segments(&face, above)
                    .into_iter()
                    .map(|[(a, _), (c, _)]| vec![a, c])
                    .collect()
            })
            .collect();
        Self { cases }
    }

    /// Table for a polyhedron: every case yields closed polygons.
    pub(crate) fn polyhedron(
        edges: &[[usize; 2]],
        faces: &[&[usize]],
        pcoords: &[[f64; 3]],
    ) -> Self {
        let n = pcoords.len();
        let edge_index: HashMap<(usize, usize), usize> = edges
            .iter()
            .enumerate()
            .flat_map(|(i, &[a, b])| [((a, b), i), ((b, a), i)])
            .collect();

        let cases = (0..1usize << n)
            .map(|case| {
                let above = |v: usize| case & (1 << v) != 0;

                // 1) face segments between crossing edges
                let mut neighbors: HashMap<usize, Vec<usize>> = HashMap::new();
                for face in faces {
                    let local: Vec<usize> = face.to_vec();
                    for [(a0, a1), (b0, b1)] in face_segments(&local, above) {
                        let ea = edge_index[&(local[a0], local[a1])];
                        let eb = edge_index[&(local[b0], local[b1])];
                        neighbors.entry(ea).or_default().push(eb);
                        neighbors.entry(eb).or_default().push(ea);
                    }
                }

                // 2) chain into loops
                let mut starts: Vec<usize> = neighbors.keys().copied().collect();
                starts.sort_unstable();
                let mut visited = vec![false; edges.len()];
                let mut loops = Vec::new();
                for start in starts {
                    if visited[start] {
                        continue;
                    }
                    let mut ring = vec![start];
                    visited[start] = true;
                    let mut prev = start;
                    let mut cur = neighbors[&start][0];
                    while cur != start {
                        visited[cur] = true;
                        ring.push(cur);
                        let next = neighbors[&cur]
                            .iter()
                            .copied()
                            .find(|&e| e != prev)
                            .unwrap_or(prev);
                        prev = cur;
                        cur = next;
                    }

                    // 3) orient toward increasing scalar
                    let mids: Vec<[f64; 3]> = ring
                        .iter()
                        .map(|&e| lerp(pcoords[edges[e][0]], pcoords[edges[e][1]], 0.5))
                        .collect();
                    let mut gradient = [0.0; 3];
                    for &e in &ring {
                        let [a, b] = edges[e];
                        let (lo, hi) = if above(a) { (b, a) } else { (a, b) };
                        let d = sub(pcoords[hi], pcoords[lo]);
                        for k in 0..3 {
                            gradient[k] += d[k];
                        }
                    }
                    if dot(newell_normal(&mids), gradient) < 0.0 {
                        ring.reverse();
                    }
                    loops.push(ring);
                }
                loops
            })
            .collect();
        Self { cases }
    }

    /// Primitives of `case`.
    #[inline]
    pub(crate) fn primitives(&self, case: usize) -> &[Vec<usize>] {
        &self.cases[case]
    }

    /// Contour `cell` through this table. `edges` maps the edge indices of the
    /// table to local point pairs.
    pub(crate) fn contour(
        &self,
        cell: &Cell,
        edges: &[[usize; 2]],
        value: f64,
        scalars: &[f64],
        ctx: &mut ContourContext<'_, '_>,
    ) {
        let case = case_index(value, scalars);
        let dim = cell.dimension();
        for prim in self.primitives(case) {
            let mut ids: Vec<_> = prim
                .iter()
                .map(|&e| {
                    let [a, b] = edges[e];
                    ctx.edge_point(cell, a, b, value, scalars)
                })
                .collect();
            ids.dedup();
            if ids.len() > 1 && ids.first() == ids.last() {
                ids.pop();
            }
            match dim {
                2 => {
                    if ids.len() == 2 {
                        ctx.emit_line([ids[0], ids[1]]);
                    }
                }
                _ => {
                    if ids.len() >= 3 {
                        ctx.emit_polygon(&ids);
                    }
                }
            }
        }
    }
}

/// Case index: bit `i` set when `scalars[i] >= value`.
#[inline]
pub(crate) fn case_index(value: f64, scalars: &[f64]) -> usize {
    scalars
        .iter()
        .enumerate()
        .filter(|(_, s)| **s >= value)
        .fold(0, |acc, (i, _)| acc | (1 << i))
}

/// Pair the crossing edges around one face loop.
///
/// Returns segments as pairs of boundary edges, each edge given as a pair of
/// positions into `face` (`(i, i + 1 mod k)`, oriented along the loop).
fn face_segments(face: &[usize], above: impl Fn(usize) -> bool) -> Vec<[(usize, usize); 2]> {
    let k = face.len();
    let Some(start) = (0..k).find(|&i| !above(face[i])) else {
        return Vec::new();
    };
    let mut segments = Vec::new();
    let mut entering = None;
    for step in 0..k {
        let i = (start + step) % k;
        let j = (i + 1) % k;
        match (above(face[i]), above(face[j])) {
            (false, true) => entering = Some((i, j)),
            (true, false) => {
                if let Some(e) = entering.take() {
                    segments.push([e, (i, j)]);
                }
            }
            _ => {}
        }
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quad_ambiguous_case_cuts_off_corners() {
        let table = CaseTable::polygon(4);
        // points 0 and 2 above
        let segs = table.primitives(0b0101);
        assert_eq!(segs.len(), 2);
        let mut sorted: Vec<Vec<usize>> = segs
            .iter()
            .map(|s| {
                let mut s = s.clone();
                s.sort_unstable();
                s
            })
            .collect();
        sorted.sort();
        // corner 0 sits between edges 3 and 0, corner 2 between edges 1 and 2
        assert_eq!(sorted, vec![vec![0, 3], vec![1, 2]]);
    }

    #[test]
    fn trivial_cases_are_empty() {
        let table = CaseTable::polygon(3);
        assert!(table.primitives(0).is_empty());
        assert!(table.primitives(0b111).is_empty());
        assert_eq!(table.primitives(0b001).len(), 1);
    }

    #[test]
    fn case_index_bits() {
        assert_eq!(case_index(0.5, &[0.0, 1.0, 0.5, 0.2]), 0b0110);
    }
}
