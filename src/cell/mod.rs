//! Cell geometry kernel.
//!
//! A [`Cell`] is an owned value: shape tag, the ordered point ids it was built
//! from and their coordinates. Every geometric query dispatches on the closed
//! [`CellType`] enum to the shape's module. Sub-cells (edges, faces, the
//! triangles of a strip, the segments of a poly-line) are returned as new
//! owned `Cell`s carrying the parent's global point ids, so results never alias
//! scratch state.
//!
//! ```
//! use mesh_cells::cell::Cell;
//! use mesh_cells::topology::CellType;
//!
//! let tet = Cell::from_points(
//!     CellType::Tetra,
//!     vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
//! )
//! .unwrap();
//! let eval = tet.evaluate_position([0.1, 0.2, 0.3]).unwrap();
//! assert!(eval.inside);
//! assert_eq!(tet.number_of_faces(), 4);
//! ```

pub(crate) mod case_table;
pub mod config;
mod hexahedron;
mod iso;
mod line;
mod poly_line;
mod poly_vertex;
mod polygon;
mod pyramid;
mod quad;
mod tetra;
mod triangle;
mod triangle_strip;
mod vertex;
mod wedge;

pub use config::SolverConfig;

use crate::data::attributes::Attributes;
use crate::geometry::bounds::Bounds;
use crate::geometry::locator::PointLocator;
use crate::geometry::math::lerp;
use crate::mesh_error::{EvalError, MeshError};
use crate::topology::{CellArray, CellType, IdType};
use iso::Shape;
use once_cell::unsync::OnceCell;

/// Result of inverting a cell's coordinate map at a point.
#[derive(Clone, Debug, PartialEq)]
pub struct PositionEval {
    /// Whether the point lies in the cell (within tolerance).
    pub inside: bool,
    /// Closest point of the cell; the query point itself when inside.
    pub closest_point: [f64; 3],
    /// Sub-cell the answer refers to (composite shapes), otherwise 0.
    pub sub_id: usize,
    /// Parametric coordinates of the query point.
    pub pcoords: [f64; 3],
    /// Squared distance from the query point to `closest_point`.
    pub dist2: f64,
    /// Interpolation weights at `pcoords`, one per cell point.
    pub weights: Vec<f64>,
}

/// A segment/cell intersection.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LineHit {
    /// Segment parameter in `[0, 1]`.
    pub t: f64,
    /// Intersection point.
    pub x: [f64; 3],
    /// Parametric coordinates of `x` in the (sub-)cell.
    pub pcoords: [f64; 3],
    pub sub_id: usize,
}

/// Simplex decomposition of a cell.
#[derive(Clone, Debug, PartialEq)]
pub struct Triangulation {
    /// Shape of every simplex.
    pub simplex: CellType,
    /// Global point ids, `simplex` point count per simplex.
    pub point_ids: Vec<IdType>,
    /// Coordinates matching `point_ids`.
    pub points: Vec<[f64; 3]>,
}

impl Triangulation {
    fn new(simplex: CellType) -> Self {
        Self {
            simplex,
            point_ids: Vec::new(),
            points: Vec::new(),
        }
    }

    fn width(&self) -> usize {
        self.simplex.fixed_point_count().unwrap_or(1)
    }

    /// Number of simplices.
    pub fn number_of_simplices(&self) -> usize {
        self.point_ids.len() / self.width()
    }

    /// Point ids of each simplex.
    pub fn simplices(&self) -> impl Iterator<Item = &[IdType]> + '_ {
        self.point_ids.chunks_exact(self.width())
    }
}

/// Primitives produced by contouring, with the cell data copied for each.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ContourOutput {
    pub verts: CellArray,
    pub lines: CellArray,
    pub polys: CellArray,
    /// Cell data of `verts`, indexed like `verts`.
    pub vert_data: Attributes,
    /// Cell data of `lines`, indexed like `lines`.
    pub line_data: Attributes,
    /// Cell data of `polys`, indexed like `polys`.
    pub poly_data: Attributes,
}

impl ContourOutput {
    /// Empty output without cell data arrays.
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty output whose cell data arrays mirror `cell_data`.
    pub fn with_cell_data_like(cell_data: &Attributes) -> Self {
        let mut out = Self::default();
        out.vert_data.interpolate_allocate(cell_data);
        out.line_data.interpolate_allocate(cell_data);
        out.poly_data.interpolate_allocate(cell_data);
        out
    }

    /// Total number of emitted primitives.
    pub fn number_of_cells(&self) -> usize {
        self.verts.number_of_cells() + self.lines.number_of_cells() + self.polys.number_of_cells()
    }
}

/// Attribute plumbing for [`Cell::contour`].
pub struct ContourAttributes<'a> {
    /// Point data of the input, indexed by global point id.
    pub in_point_data: &'a Attributes,
    /// Point data of the output, indexed by locator id.
    pub out_point_data: &'a mut Attributes,
    /// Cell data of the input.
    pub in_cell_data: &'a Attributes,
    /// Id of the contoured cell in the input.
    pub cell_id: IdType,
}

/// Everything a shape needs while contouring.
pub(crate) struct ContourContext<'c, 'a> {
    locator: &'c mut dyn PointLocator,
    output: &'c mut ContourOutput,
    attributes: Option<&'c mut ContourAttributes<'a>>,
}

impl ContourContext<'_, '_> {
    /// Output point where the iso-value crosses edge `a-b` (local indices).
    ///
    /// The crossing is interpolated from the lower-scalar endpoint (ties broken
    /// by global id) so that both cells sharing an edge compute bit-identical
    /// coordinates and the locator merges them.
    pub(crate) fn edge_point(
        &mut self,
        cell: &Cell,
        a: usize,
        b: usize,
        value: f64,
        scalars: &[f64],
    ) -> IdType {
        let ids = &cell.point_ids;
        let a_first = scalars[a] < scalars[b] || (scalars[a] == scalars[b] && ids[a] <= ids[b]);
        let (lo, hi) = if a_first { (a, b) } else { (b, a) };
        let ds = scalars[hi] - scalars[lo];
        let t = if ds == 0.0 {
            0.0
        } else {
            (value - scalars[lo]) / ds
        };
        let x = lerp(cell.points[lo], cell.points[hi], t);
        let (id, new) = self.locator.insert_unique_point(x);
        if new {
            if let Some(attrs) = self.attributes.as_deref_mut() {
                attrs
                    .out_point_data
                    .interpolate_edge(attrs.in_point_data, id, ids[lo], ids[hi], t);
            }
        }
        id
    }

    /// Output point for cell point `i` itself.
    pub(crate) fn vertex_point(&mut self, cell: &Cell, i: usize) -> IdType {
        let (id, new) = self.locator.insert_unique_point(cell.points[i]);
        if new {
            if let Some(attrs) = self.attributes.as_deref_mut() {
                attrs
                    .out_point_data
                    .copy_data(attrs.in_point_data, cell.point_ids[i], id);
            }
        }
        id
    }

    fn copy_cell_data(&mut self, kind: usize, dst: IdType) {
        if let Some(attrs) = self.attributes.as_deref() {
            let out = match kind {
                0 => &mut self.output.vert_data,
                1 => &mut self.output.line_data,
                _ => &mut self.output.poly_data,
            };
            out.copy_data(attrs.in_cell_data, attrs.cell_id, dst);
        }
    }

    pub(crate) fn emit_vertex(&mut self, id: IdType) {
        let dst = self.output.verts.insert_next_cell(&[id]);
        self.copy_cell_data(0, dst);
    }

    pub(crate) fn emit_line(&mut self, ids: [IdType; 2]) {
        if ids[0] == ids[1] {
            return;
        }
        let dst = self.output.lines.insert_next_cell(&ids);
        self.copy_cell_data(1, dst);
    }

    /// Emit a closed polygon; loops longer than a quad are fanned into
    /// triangles.
    pub(crate) fn emit_polygon(&mut self, ids: &[IdType]) {
        if ids.len() < 3 {
            return;
        }
        if ids.len() <= 4 {
            let dst = self.output.polys.insert_next_cell(ids);
            self.copy_cell_data(2, dst);
            return;
        }
        for i in 1..ids.len() - 1 {
            let dst = self.output.polys.insert_next_cell(&[ids[0], ids[i], ids[i + 1]]);
            self.copy_cell_data(2, dst);
        }
    }
}

/// An owned cell: shape, point ids and point coordinates.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Cell {
    cell_type: CellType,
    point_ids: Vec<IdType>,
    points: Vec<[f64; 3]>,
    bounds: OnceCell<Bounds>,
}

impl Cell {
    /// Cell of `cell_type` over `point_ids` located at `points`.
    pub fn new(
        cell_type: CellType,
        point_ids: Vec<IdType>,
        points: Vec<[f64; 3]>,
    ) -> Result<Self, MeshError> {
        if point_ids.len() != points.len() {
            return Err(MeshError::CellSizeMismatch {
                expected: point_ids.len(),
                found: points.len(),
            });
        }
        cell_type.validate_point_count(points.len())?;
        Ok(Self::new_unchecked(cell_type, point_ids, points))
    }

    /// Cell over `points` with local ids `0..n`.
    pub fn from_points(cell_type: CellType, points: Vec<[f64; 3]>) -> Result<Self, MeshError> {
        let ids = (0..points.len()).collect();
        Self::new(cell_type, ids, points)
    }

    /// The tombstone cell.
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn new_unchecked(
        cell_type: CellType,
        point_ids: Vec<IdType>,
        points: Vec<[f64; 3]>,
    ) -> Self {
        Self {
            cell_type,
            point_ids,
            points,
            bounds: OnceCell::new(),
        }
    }

    /// Sub-cell of `cell_type` over the local point indices `local`.
    pub(crate) fn sub_cell(&self, cell_type: CellType, local: &[usize]) -> Cell {
        Cell::new_unchecked(
            cell_type,
            local.iter().map(|&i| self.point_ids[i]).collect(),
            local.iter().map(|&i| self.points[i]).collect(),
        )
    }

    #[inline]
    pub fn cell_type(&self) -> CellType {
        self.cell_type
    }

    /// Topological dimension.
    #[inline]
    pub fn dimension(&self) -> u8 {
        self.cell_type.dimension()
    }

    #[inline]
    pub fn point_ids(&self) -> &[IdType] {
        &self.point_ids
    }

    #[inline]
    pub fn points(&self) -> &[[f64; 3]] {
        &self.points
    }

    #[inline]
    pub fn number_of_points(&self) -> usize {
        self.points.len()
    }

    /// Whether the interpolation is linear in the parametric coordinates.
    pub fn is_linear(&self) -> bool {
        self.cell_type.is_linear()
    }

    /// Bounding box of the cell's points, computed once.
    pub fn bounds(&self) -> Bounds {
        *self.bounds.get_or_init(|| Bounds::from_points(&self.points))
    }

    /// Squared diagonal of the bounding box.
    pub fn length2(&self) -> f64 {
        self.bounds().length2()
    }

    fn shape(&self) -> Option<&'static Shape> {
        match self.cell_type {
            CellType::Vertex => Some(&vertex::SHAPE),
            CellType::Line => Some(&line::SHAPE),
            CellType::Triangle => Some(&triangle::SHAPE),
            CellType::Quad => Some(&quad::SHAPE),
            CellType::Tetra => Some(&tetra::SHAPE),
            CellType::Pyramid => Some(&pyramid::SHAPE),
            CellType::Wedge => Some(&wedge::SHAPE),
            CellType::Hexahedron => Some(&hexahedron::SHAPE),
            _ => None,
        }
    }

    /// Parametric center.
    pub fn parametric_center(&self) -> [f64; 3] {
        match self.shape() {
            Some(shape) => shape.center,
            None => match self.cell_type {
                CellType::Polygon | CellType::TriangleStrip => [0.5, 0.5, 0.0],
                CellType::PolyLine => [0.5, 0.0, 0.0],
                _ => [0.0; 3],
            },
        }
    }

    /// Parametric coordinates of the points of fixed-size shapes.
    pub fn parametric_coords(&self) -> Option<&'static [[f64; 3]]> {
        self.shape().map(|s| s.pcoords)
    }

    /// How far `pcoords` lies outside the parametric domain (0 inside).
    pub fn parametric_distance(&self, pcoords: [f64; 3]) -> f64 {
        let out = |v: f64| {
            if v < 0.0 {
                -v
            } else if v > 1.0 {
                v - 1.0
            } else {
                0.0
            }
        };
        let dims = self.dimension() as usize;
        let mut d = (0..dims.max(1)).map(|i| out(pcoords[i])).fold(0.0, f64::max);
        let simplex_sum = match self.cell_type {
            CellType::Triangle | CellType::TriangleStrip => Some(pcoords[0] + pcoords[1]),
            CellType::Tetra => Some(pcoords[0] + pcoords[1] + pcoords[2]),
            CellType::Wedge => Some(pcoords[0] + pcoords[1]),
            _ => None,
        };
        if let Some(sum) = simplex_sum {
            d = d.max(out(sum));
        }
        d
    }

    /// Number of edges.
    pub fn number_of_edges(&self) -> usize {
        match self.cell_type {
            CellType::Polygon | CellType::TriangleStrip => self.points.len(),
            _ => self.shape().map_or(0, |s| s.edges.len()),
        }
    }

    /// Number of faces (3D shapes only).
    pub fn number_of_faces(&self) -> usize {
        self.shape().map_or(0, |s| s.faces.len())
    }

    /// Local point indices of edge `i`.
    fn edge_local(&self, i: usize) -> Option<[usize; 2]> {
        let n = self.points.len();
        match self.cell_type {
            CellType::Polygon => (i < n).then(|| [i, (i + 1) % n]),
            CellType::TriangleStrip => triangle_strip::edge_local(n, i),
            _ => self.shape().and_then(|s| s.edges.get(i).copied()),
        }
    }

    /// Edge `i` as a line cell.
    pub fn edge(&self, i: usize) -> Option<Cell> {
        self.edge_local(i)
            .map(|local| self.sub_cell(CellType::Line, &local))
    }

    /// Face `i` as a triangle or quad cell.
    pub fn face(&self, i: usize) -> Option<Cell> {
        let face = self.shape()?.faces.get(i)?;
        let ty = if face.len() == 3 {
            CellType::Triangle
        } else {
            CellType::Quad
        };
        Some(self.sub_cell(ty, face))
    }

    /// Invert the coordinate map at `x` with the default solver settings.
    pub fn evaluate_position(&self, x: [f64; 3]) -> Result<PositionEval, EvalError> {
        self.evaluate_position_with(x, &SolverConfig::default())
    }

    /// Invert the coordinate map at `x`.
    pub fn evaluate_position_with(
        &self,
        x: [f64; 3],
        config: &SolverConfig,
    ) -> Result<PositionEval, EvalError> {
        match self.cell_type {
            CellType::Empty => Err(EvalError::EmptyCell),
            CellType::Vertex => vertex::evaluate_position(self, x),
            CellType::PolyVertex => poly_vertex::evaluate_position(self, x),
            CellType::Line => line::evaluate_position(self, x),
            CellType::PolyLine => poly_line::evaluate_position(self, x),
            CellType::Triangle => triangle::evaluate_position(self, x),
            CellType::TriangleStrip => triangle_strip::evaluate_position(self, x),
            CellType::Quad => quad::evaluate_position(self, x, config),
            CellType::Polygon => polygon::evaluate_position(self, x),
            CellType::Tetra => tetra::evaluate_position(self, x),
            CellType::Pyramid => iso::evaluate_position(self, &pyramid::SHAPE, x, config),
            CellType::Wedge => iso::evaluate_position(self, &wedge::SHAPE, x, config),
            CellType::Hexahedron => iso::evaluate_position(self, &hexahedron::SHAPE, x, config),
        }
    }

    /// Forward map: position and weights at `pcoords` of sub-cell `sub_id`.
    pub fn evaluate_location(&self, sub_id: usize, pcoords: [f64; 3]) -> ([f64; 3], Vec<f64>) {
        match self.cell_type {
            CellType::Empty => ([0.0; 3], Vec::new()),
            CellType::PolyVertex => poly_vertex::evaluate_location(self, sub_id),
            CellType::PolyLine => poly_line::evaluate_location(self, sub_id, pcoords),
            CellType::TriangleStrip => triangle_strip::evaluate_location(self, sub_id, pcoords),
            CellType::Polygon => polygon::evaluate_location(self, pcoords),
            _ => match self.shape() {
                Some(shape) => iso::location(shape, &self.points, pcoords),
                None => ([0.0; 3], Vec::new()),
            },
        }
    }

    /// Interpolation weights at `pcoords`.
    pub fn interpolation_functions(&self, pcoords: [f64; 3]) -> Vec<f64> {
        match self.shape() {
            Some(shape) => {
                let mut w = vec![0.0; shape.pcoords.len()];
                (shape.functions)(pcoords, &mut w);
                w
            }
            None => self.evaluate_location(0, pcoords).1,
        }
    }

    /// Parametric derivatives of the interpolation weights, laid out as all
    /// `d/dr`, then all `d/ds`, then all `d/dt`. `None` for shapes without a
    /// closed-form parametric map.
    pub fn interpolation_derivs(&self, pcoords: [f64; 3]) -> Option<Vec<f64>> {
        let shape = self.shape()?;
        let mut d = vec![0.0; 3 * shape.pcoords.len()];
        (shape.derivs)(pcoords, &mut d);
        Some(d)
    }

    /// Nearest boundary feature to `pcoords`, and whether `pcoords` is inside
    /// the parametric domain.
    pub fn cell_boundary(&self, sub_id: usize, pcoords: [f64; 3]) -> (bool, Vec<IdType>) {
        match self.cell_type {
            CellType::Empty => (false, Vec::new()),
            CellType::Vertex => vertex::cell_boundary(self, pcoords),
            CellType::PolyVertex => poly_vertex::cell_boundary(self, sub_id, pcoords),
            CellType::Line => line::cell_boundary(self, pcoords),
            CellType::PolyLine => poly_line::cell_boundary(self, sub_id, pcoords),
            CellType::Triangle => triangle::cell_boundary(self, pcoords),
            CellType::TriangleStrip => triangle_strip::cell_boundary(self, sub_id, pcoords),
            CellType::Quad => quad::cell_boundary(self, pcoords),
            CellType::Polygon => polygon::cell_boundary(self, pcoords),
            CellType::Tetra => tetra::cell_boundary(self, pcoords),
            CellType::Pyramid => pyramid::cell_boundary(self, pcoords),
            CellType::Wedge => wedge::cell_boundary(self, pcoords),
            CellType::Hexahedron => hexahedron::cell_boundary(self, pcoords),
        }
    }

    /// Contour the cell at `value`.
    ///
    /// `scalars` holds one value per cell point. Crossing points go through
    /// `locator`; primitives are appended to `output`. With `attributes`, point
    /// data is interpolated onto new points and the cell's data copied onto
    /// every emitted primitive.
    pub fn contour(
        &self,
        value: f64,
        scalars: &[f64],
        locator: &mut dyn PointLocator,
        output: &mut ContourOutput,
        attributes: Option<&mut ContourAttributes<'_>>,
    ) -> Result<(), MeshError> {
        if scalars.len() != self.points.len() {
            return Err(MeshError::CellSizeMismatch {
                expected: self.points.len(),
                found: scalars.len(),
            });
        }
        let mut ctx = ContourContext {
            locator,
            output,
            attributes,
        };
        self.contour_into(value, scalars, &mut ctx);
        Ok(())
    }

    pub(crate) fn contour_into(&self, value: f64, scalars: &[f64], ctx: &mut ContourContext<'_, '_>) {
        match self.cell_type {
            CellType::Empty => {}
            CellType::Vertex => vertex::contour(self, value, scalars, ctx),
            CellType::PolyVertex => poly_vertex::contour(self, value, scalars, ctx),
            CellType::Line => line::contour(self, value, scalars, ctx),
            CellType::PolyLine => poly_line::contour(self, value, scalars, ctx),
            CellType::Triangle => triangle::contour(self, value, scalars, ctx),
            CellType::TriangleStrip => triangle_strip::contour(self, value, scalars, ctx),
            CellType::Quad => quad::contour(self, value, scalars, ctx),
            CellType::Polygon => polygon::contour(self, value, scalars, ctx),
            CellType::Tetra => tetra::contour(self, value, scalars, ctx),
            CellType::Pyramid => pyramid::contour(self, value, scalars, ctx),
            CellType::Wedge => wedge::contour(self, value, scalars, ctx),
            CellType::Hexahedron => hexahedron::contour(self, value, scalars, ctx),
        }
    }

    /// Intersect the segment `p1-p2` with the cell. Among all hits the one
    /// with the smallest segment parameter wins.
    pub fn intersect_with_line(&self, p1: [f64; 3], p2: [f64; 3], tol: f64) -> Option<LineHit> {
        match self.cell_type {
            CellType::Empty => None,
            CellType::Vertex => vertex::intersect_with_line(self, p1, p2, tol),
            CellType::PolyVertex => poly_vertex::intersect_with_line(self, p1, p2, tol),
            CellType::Line => line::intersect_with_line(self, p1, p2, tol),
            CellType::PolyLine => poly_line::intersect_with_line(self, p1, p2, tol),
            CellType::Triangle => triangle::intersect_with_line(self, p1, p2, tol),
            CellType::TriangleStrip => triangle_strip::intersect_with_line(self, p1, p2, tol),
            CellType::Quad => quad::intersect_with_line(self, p1, p2, tol),
            CellType::Polygon => polygon::intersect_with_line(self, p1, p2, tol),
            CellType::Tetra | CellType::Pyramid | CellType::Wedge | CellType::Hexahedron => {
                iso::intersect_faces(self, p1, p2, tol)
            }
        }
    }

    /// Decompose the cell into simplices. `index` selects between alternative
    /// decompositions where a shape has more than one.
    pub fn triangulate(&self, index: usize) -> Result<Triangulation, MeshError> {
        match self.cell_type {
            CellType::Empty => Err(MeshError::UnsupportedCellType(CellType::Empty)),
            CellType::Vertex | CellType::PolyVertex => {
                let singles: Vec<[usize; 1]> = (0..self.points.len()).map(|i| [i]).collect();
                Ok(self.simplices(CellType::Vertex, &singles))
            }
            CellType::Line | CellType::PolyLine => {
                let segs: Vec<[usize; 2]> =
                    (0..self.points.len() - 1).map(|i| [i, i + 1]).collect();
                Ok(self.simplices(CellType::Line, &segs))
            }
            CellType::Triangle => Ok(self.simplices(CellType::Triangle, &[[0, 1, 2]])),
            CellType::TriangleStrip => Ok(self.simplices(
                CellType::Triangle,
                &triangle_strip::sub_triangles(self.points.len()),
            )),
            CellType::Quad => Ok(self.simplices(CellType::Triangle, &quad::split(self, index))),
            CellType::Polygon => {
                let tris = polygon::ear_clip(self)?;
                Ok(self.simplices(CellType::Triangle, &tris))
            }
            CellType::Tetra => Ok(self.simplices(CellType::Tetra, &[[0, 1, 2, 3]])),
            CellType::Pyramid => Ok(self.simplices(CellType::Tetra, &pyramid::TETS)),
            CellType::Wedge => Ok(self.simplices(CellType::Tetra, &wedge::TETS)),
            CellType::Hexahedron => Ok(self.simplices(
                CellType::Tetra,
                hexahedron::tets(index),
            )),
        }
    }

    fn simplices<const K: usize>(&self, simplex: CellType, local: &[[usize; K]]) -> Triangulation {
        let mut out = Triangulation::new(simplex);
        for s in local {
            for &i in s {
                out.point_ids.push(self.point_ids[i]);
                out.points.push(self.points[i]);
            }
        }
        out
    }

    /// Physical-space gradients of `dim`-component point `values` at
    /// `pcoords` of sub-cell `sub_id`.
    ///
    /// `values[i * dim + k]` is component `k` at point `i`; the result holds
    /// `[d/dx, d/dy, d/dz]` for each component in turn.
    pub fn derivatives(
        &self,
        sub_id: usize,
        pcoords: [f64; 3],
        values: &[f64],
        dim: usize,
    ) -> Result<Vec<f64>, EvalError> {
        if values.len() < self.points.len() * dim {
            return Err(EvalError::ValueCount {
                expected: self.points.len() * dim,
                found: values.len(),
            });
        }
        match self.cell_type {
            CellType::Empty => Err(EvalError::EmptyCell),
            CellType::Vertex | CellType::PolyVertex => Ok(vec![0.0; 3 * dim]),
            CellType::Line => line::derivatives(self, values, dim),
            CellType::PolyLine => poly_line::derivatives(self, sub_id, values, dim),
            CellType::Triangle | CellType::Quad => {
                iso::derivatives_2d(self, self.shape_or_err()?, pcoords, values, dim)
            }
            CellType::TriangleStrip => {
                triangle_strip::derivatives(self, sub_id, pcoords, values, dim)
            }
            CellType::Polygon => polygon::derivatives(self, pcoords, values, dim),
            CellType::Tetra | CellType::Pyramid | CellType::Wedge | CellType::Hexahedron => {
                iso::derivatives_3d(self, self.shape_or_err()?, pcoords, values, dim)
            }
        }
    }

    fn shape_or_err(&self) -> Result<&'static Shape, EvalError> {
        self.shape().ok_or(EvalError::DegenerateCell)
    }
}

/// Gather the `dim`-component values of the local points `local`.
pub(crate) fn gather_values(values: &[f64], dim: usize, local: &[usize]) -> Vec<f64> {
    local
        .iter()
        .flat_map(|&i| values[i * dim..(i + 1) * dim].iter().copied())
        .collect()
}

/// Keep the closer of two evaluations, preferring inside ones.
pub(crate) fn better(best: Option<PositionEval>, cand: PositionEval) -> Option<PositionEval> {
    match best {
        Some(b) if (b.inside && !cand.inside) || (b.inside == cand.inside && b.dist2 <= cand.dist2) => {
            Some(b)
        }
        _ => Some(cand),
    }
}

/// Keep the hit with the smaller segment parameter.
pub(crate) fn nearer(best: Option<LineHit>, cand: Option<LineHit>) -> Option<LineHit> {
    match (best, cand) {
        (Some(b), Some(c)) if c.t < b.t => Some(c),
        (None, c) => c,
        (b, _) => b,
    }
}
