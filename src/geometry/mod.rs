//! Geometry utilities: axis-aligned bounds, vector math, point merging and
//! cell quality measures.

pub mod bounds;
pub mod locator;
pub mod math;
pub mod quality;

pub use bounds::{hit_bbox, Bounds, BoxHit};
pub use locator::{MergePoints, PointLocator};
