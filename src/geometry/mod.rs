//! Lattice geometry: points, directions, and the derived structure of a
//! finite grid (edges, vertices, straight lines, shape placements).

pub mod lattice;
pub mod point;
pub mod pointset;

pub use lattice::{Bearing, HexagonalLattice, Lattice, SquareLattice, Transform};
pub use point::{Point, Vector};
pub use pointset::PointSet;
