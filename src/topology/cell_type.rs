//! Cell type tags for mesh cells.
//!
//! The tag is stored as a single byte in the registry; the discriminants are
//! stable and form part of the raw layout contract.

use crate::mesh_error::MeshError;
use serde::{Deserialize, Serialize};

/// Topological shape of a cell.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum CellType {
    /// Tombstone: a deleted registry slot, or a cell with no geometry.
    #[default]
    Empty = 0,
    /// 0D single point.
    Vertex = 1,
    /// 0D set of points.
    PolyVertex = 2,
    /// 1D segment.
    Line = 3,
    /// 1D chain of segments.
    PolyLine = 4,
    /// 2D simplex.
    Triangle = 5,
    /// 2D strip of triangles sharing edges.
    TriangleStrip = 6,
    /// 2D planar polygon with `n >= 3` points.
    Polygon = 7,
    /// 2D bilinear quadrilateral.
    Quad = 9,
    /// 3D simplex.
    Tetra = 10,
    /// 3D trilinear hexahedron.
    Hexahedron = 12,
    /// 3D wedge / triangular prism.
    Wedge = 13,
    /// 3D pyramid with a quadrilateral base.
    Pyramid = 14,
}

static_assertions::assert_eq_size!(CellType, u8);

impl CellType {
    /// Every non-empty shape, in tag order.
    pub const ALL: [CellType; 12] = [
        CellType::Vertex,
        CellType::PolyVertex,
        CellType::Line,
        CellType::PolyLine,
        CellType::Triangle,
        CellType::TriangleStrip,
        CellType::Polygon,
        CellType::Quad,
        CellType::Tetra,
        CellType::Hexahedron,
        CellType::Wedge,
        CellType::Pyramid,
    ];

    /// Raw byte tag.
    #[inline]
    pub const fn tag(self) -> u8 {
        self as u8
    }

    /// Topological dimension of the cell (0 for `Empty`).
    pub const fn dimension(self) -> u8 {
        match self {
            CellType::Empty | CellType::Vertex | CellType::PolyVertex => 0,
            CellType::Line | CellType::PolyLine => 1,
            CellType::Triangle
            | CellType::TriangleStrip
            | CellType::Polygon
            | CellType::Quad => 2,
            CellType::Tetra | CellType::Hexahedron | CellType::Wedge | CellType::Pyramid => 3,
        }
    }

    /// Number of points for fixed-size shapes, `None` for variable-size ones.
    pub const fn fixed_point_count(self) -> Option<usize> {
        match self {
            CellType::Vertex => Some(1),
            CellType::Line => Some(2),
            CellType::Triangle => Some(3),
            CellType::Quad => Some(4),
            CellType::Tetra => Some(4),
            CellType::Pyramid => Some(5),
            CellType::Wedge => Some(6),
            CellType::Hexahedron => Some(8),
            CellType::Empty
            | CellType::PolyVertex
            | CellType::PolyLine
            | CellType::TriangleStrip
            | CellType::Polygon => None,
        }
    }

    /// Minimum number of points a well-formed cell of this type carries.
    pub const fn min_point_count(self) -> usize {
        match self {
            CellType::Empty => 0,
            CellType::Vertex | CellType::PolyVertex => 1,
            CellType::Line | CellType::PolyLine => 2,
            CellType::Triangle | CellType::TriangleStrip | CellType::Polygon => 3,
            CellType::Quad | CellType::Tetra => 4,
            CellType::Pyramid => 5,
            CellType::Wedge => 6,
            CellType::Hexahedron => 8,
        }
    }

    /// Whether the interpolation functions are linear in the parametric
    /// coordinates (no Newton iteration needed to invert them).
    pub const fn is_linear(self) -> bool {
        !matches!(
            self,
            CellType::Quad | CellType::Hexahedron | CellType::Wedge | CellType::Pyramid
        )
    }

    /// Whether this cell is assembled from simpler sub-cells.
    pub const fn is_composite(self) -> bool {
        matches!(
            self,
            CellType::PolyVertex | CellType::PolyLine | CellType::TriangleStrip | CellType::Polygon
        )
    }

    /// Check a point count against this type.
    pub fn validate_point_count(self, found: usize) -> Result<(), MeshError> {
        match self.fixed_point_count() {
            Some(expected) if expected != found => Err(MeshError::InvalidPointCount {
                cell_type: self,
                expected,
                found,
            }),
            None if found < self.min_point_count() => Err(MeshError::InvalidPointCount {
                cell_type: self,
                expected: self.min_point_count(),
                found,
            }),
            _ => Ok(()),
        }
    }
}

impl TryFrom<u8> for CellType {
    type Error = MeshError;

    fn try_from(tag: u8) -> Result<Self, Self::Error> {
        if tag == 0 {
            return Ok(CellType::Empty);
        }
        CellType::ALL
            .iter()
            .copied()
            .find(|t| t.tag() == tag)
            .ok_or(MeshError::InvalidCellTypeTag(tag))
    }
}

impl From<CellType> for u8 {
    fn from(t: CellType) -> u8 {
        t.tag()
    }
}
