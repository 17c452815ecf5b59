//! Cell lattices and their symmetry groups.
//!
//! A lattice describes how cells tile the plane: which displacements reach
//! an edge-sharing or vertex-sharing neighbor, which directions form
//! straight lines, and which rigid transforms map the tiling to itself.
//!
//! Both bundled lattices use pure integer coordinates. The hexagonal
//! lattice uses a doubled coordinate scheme where cell centers sit at
//! points with `dy % 3 == 0` rows; the price is that not every integer
//! point is a cell, which is what [`Lattice::in_basis`] checks.

use crate::geometry::point::{Point, Vector};
use itertools::Itertools;
use std::collections::BTreeSet;

/// A rigid transform of the plane that maps the lattice to itself.
///
/// Entries are stored doubled so the hexagonal 60-degree rotation, whose
/// matrix has half-integer entries, stays exact. Applying a transform to a
/// lattice point always yields an integer result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Transform {
    xx2: i64,
    xy2: i64,
    yx2: i64,
    yy2: i64,
}

impl Transform {
    pub const IDENTITY: Self = Self::from_doubled(2, 0, 0, 2);

    const fn from_doubled(xx2: i64, xy2: i64, yx2: i64, yy2: i64) -> Self {
        Self { xx2, xy2, yx2, yy2 }
    }

    #[must_use]
    pub fn apply(self, p: Point) -> Point {
        let x2 = self.xx2 * p.x + self.xy2 * p.y;
        let y2 = self.yx2 * p.x + self.yy2 * p.y;
        debug_assert!(x2 % 2 == 0 && y2 % 2 == 0, "transform left the lattice");
        Point::new(y2 / 2, x2 / 2)
    }

    /// The composition applying `other` first, then `self`.
    #[must_use]
    fn compose(self, other: Self) -> Self {
        let entry = |a: i64, b: i64, c: i64, d: i64| {
            let doubled = a * b + c * d;
            debug_assert!(doubled % 2 == 0, "composition left the lattice group");
            doubled / 2
        };
        Self {
            xx2: entry(self.xx2, other.xx2, self.xy2, other.yx2),
            xy2: entry(self.xx2, other.xy2, self.xy2, other.yy2),
            yx2: entry(self.yx2, other.xx2, self.yy2, other.yx2),
            yy2: entry(self.yx2, other.xy2, self.yy2, other.yy2),
        }
    }
}

/// A straight-line direction in a lattice.
///
/// The bundled lattices are uniform, so following a bearing is a plain
/// translation by its direction vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Bearing(Vector);

impl Bearing {
    #[must_use]
    pub const fn new(v: Vector) -> Self {
        Self(v)
    }

    /// The vector to the next point along this bearing.
    #[must_use]
    pub const fn direction(self) -> Vector {
        self.0
    }

    #[must_use]
    pub const fn next(self, p: Point) -> Point {
        p.translate(self.0)
    }

    #[must_use]
    pub const fn negate(self) -> Self {
        Self(self.0.negate())
    }
}

/// A shape: a sorted list of cells, canonically anchored at the origin.
pub type Shape = Vec<Point>;

pub trait Lattice: std::fmt::Debug {
    /// Displacements to cells sharing an edge, in sorted order.
    fn edge_sharing_directions(&self) -> Vec<Vector>;

    /// Displacements to cells sharing at least a vertex, in sorted order.
    fn vertex_sharing_directions(&self) -> Vec<Vector>;

    /// All straight-line directions, each sign separately.
    fn bearings(&self) -> Vec<Bearing>;

    /// Whether translating by `v` maps cell centers to cell centers.
    fn in_basis(&self, v: Vector) -> bool;

    /// Generators of the point group (reflections and rotations).
    fn point_group_generators(&self) -> Vec<Transform>;

    /// Cell-window templates for the vertices of the cell at the origin.
    ///
    /// Each template lists the cells around one vertex, anchored so the
    /// origin cell is a member. A vertex is identified by its full window,
    /// which keeps the hexagonal lattice free of fractional coordinates.
    fn vertex_window_templates(&self) -> Vec<Vec<Vector>>;

    /// Unordered pairs of mutually opposite edge directions.
    fn opposite_directions(&self) -> Vec<(Vector, Vector)> {
        self.edge_sharing_directions()
            .into_iter()
            .filter(|v| *v < v.negate())
            .map(|v| (v, v.negate()))
            .collect()
    }

    /// Every transform in the point group, identity included.
    fn point_group(&self) -> Vec<Transform> {
        let mut group = BTreeSet::from([Transform::IDENTITY]);
        for g in self.point_group_generators() {
            let mut powers = Vec::new();
            let mut ge = g;
            while ge != Transform::IDENTITY {
                powers.push(ge);
                ge = ge.compose(g);
            }
            for h in group.clone() {
                for ge in &powers {
                    group.insert(h.compose(*ge));
                }
            }
        }
        group.into_iter().collect()
    }

    /// The cell windows of every vertex of the cell at `p`, each sorted.
    fn vertex_windows(&self, p: Point) -> Vec<Vec<Point>> {
        let mut windows = Vec::new();
        for template in self.vertex_window_templates() {
            for anchor in &template {
                let window: Vec<Point> = template
                    .iter()
                    .map(|t| p.translate(*t) + anchor.negate())
                    .sorted()
                    .collect();
                windows.push(window);
            }
        }
        windows
    }

    /// All distinct shapes of `size` edge-connected cells.
    ///
    /// With `include_rotations_and_reflections` every orientation is a
    /// separate shape (fixed polyominoes); otherwise shapes are canonized
    /// up to the point group (free polyominoes). Each shape is translated
    /// so its first cell is the origin, and the result is globally sorted.
    fn polyominoes(&self, size: usize, include_rotations_and_reflections: bool) -> Vec<Shape> {
        let transforms = if include_rotations_and_reflections {
            vec![Transform::IDENTITY]
        } else {
            self.point_group()
        };
        let directions = self.edge_sharing_directions();
        let mut found: BTreeSet<Shape> = BTreeSet::new();
        let mut shape = vec![Point::new(0, 0)];
        grow(self, &mut shape, size, &transforms, &directions, &mut found);
        found.into_iter().collect()
    }
}

fn grow(
    lattice: &(impl Lattice + ?Sized),
    shape: &mut Shape,
    size: usize,
    transforms: &[Transform],
    directions: &[Vector],
    found: &mut BTreeSet<Shape>,
) {
    if shape.len() == size {
        let canonized = transforms
            .iter()
            .map(|transform| {
                let mut transformed: Shape =
                    shape.iter().map(|p| transform.apply(*p)).sorted().collect();
                let v = transformed[0].direction_to(Point::new(0, 0));
                debug_assert!(lattice.in_basis(v));
                for p in &mut transformed {
                    *p = p.translate(v);
                }
                transformed
            })
            .min()
            .unwrap_or_default();
        found.insert(canonized);
        return;
    }

    for i in 0..shape.len() {
        for v in directions {
            let q = shape[i].translate(*v);
            if !shape.contains(&q) {
                shape.push(q);
                grow(lattice, shape, size, transforms, directions, found);
                shape.pop();
            }
        }
    }
}

/// The standard square grid. Every integer point is a cell.
#[derive(Debug, Clone, Copy, Default)]
pub struct SquareLattice;

impl Lattice for SquareLattice {
    fn edge_sharing_directions(&self) -> Vec<Vector> {
        let mut dirs = vec![Vector::N, Vector::E, Vector::S, Vector::W];
        dirs.sort();
        dirs
    }

    fn vertex_sharing_directions(&self) -> Vec<Vector> {
        let mut dirs = vec![
            Vector::N,
            Vector::NE,
            Vector::E,
            Vector::SE,
            Vector::S,
            Vector::SW,
            Vector::W,
            Vector::NW,
        ];
        dirs.sort();
        dirs
    }

    fn bearings(&self) -> Vec<Bearing> {
        [Vector::E, Vector::S]
            .into_iter()
            .flat_map(|v| [Bearing::new(v), Bearing::new(v.negate())])
            .collect()
    }

    fn in_basis(&self, _v: Vector) -> bool {
        true
    }

    fn point_group_generators(&self) -> Vec<Transform> {
        vec![
            // reflect across the vertical axis
            Transform::from_doubled(-2, 0, 0, 2),
            // rotate 90 degrees
            Transform::from_doubled(0, -2, 2, 0),
        ]
    }

    fn vertex_window_templates(&self) -> Vec<Vec<Vector>> {
        vec![vec![
            Vector::new(0, 0),
            Vector::new(0, 1),
            Vector::new(1, 0),
            Vector::new(1, 1),
        ]]
    }
}

/// A hexagonal grid in doubled coordinates.
///
/// Cell centers sit on rows three apart, with alternate rows offset one
/// column. Edge neighbors are at `(0, +-2)` and `(+-3, +-1)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct HexagonalLattice;

impl HexagonalLattice {
    const DIRECTIONS: [Vector; 6] = [
        Vector::new(0, 2),
        Vector::new(0, -2),
        Vector::new(3, 1),
        Vector::new(3, -1),
        Vector::new(-3, 1),
        Vector::new(-3, -1),
    ];
}

impl Lattice for HexagonalLattice {
    fn edge_sharing_directions(&self) -> Vec<Vector> {
        let mut dirs = Self::DIRECTIONS.to_vec();
        dirs.sort();
        dirs
    }

    fn vertex_sharing_directions(&self) -> Vec<Vector> {
        // Hexagons only meet at edges, never at a lone vertex.
        self.edge_sharing_directions()
    }

    fn bearings(&self) -> Vec<Bearing> {
        [Vector::new(0, 2), Vector::new(3, 1), Vector::new(3, -1)]
            .into_iter()
            .flat_map(|v| [Bearing::new(v), Bearing::new(v.negate())])
            .collect()
    }

    fn in_basis(&self, v: Vector) -> bool {
        v.dy % 3 == 0 && (v.dx - v.dy / 3) % 2 == 0
    }

    fn point_group_generators(&self) -> Vec<Transform> {
        vec![
            // reflect across the vertical axis
            Transform::from_doubled(-2, 0, 0, 2),
            // rotate 60 degrees; half-integer entries, hence the doubling
            Transform::from_doubled(1, -1, 3, 1),
        ]
    }

    fn vertex_window_templates(&self) -> Vec<Vec<Vector>> {
        vec![
            vec![Vector::new(0, 0), Vector::new(0, 2), Vector::new(3, 1)],
            vec![Vector::new(0, 0), Vector::new(0, 2), Vector::new(-3, 1)],
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_square_point_group_has_eight_elements() {
        assert_eq!(SquareLattice.point_group().len(), 8);
    }

    #[test]
    fn test_hexagonal_point_group_has_twelve_elements() {
        assert_eq!(HexagonalLattice.point_group().len(), 12);
    }

    #[test]
    fn test_hexagonal_rotation_maps_neighbors_to_neighbors() {
        let rotate = HexagonalLattice.point_group_generators()[1];
        let images: Vec<Point> = HexagonalLattice::DIRECTIONS
            .iter()
            .map(|v| rotate.apply(Point::new(0, 0).translate(*v)))
            .collect();
        for image in images {
            let v = Point::new(0, 0).direction_to(image);
            assert!(HexagonalLattice::DIRECTIONS.contains(&v), "{v}");
        }
    }

    #[test]
    fn test_free_polyomino_counts() {
        let lattice = SquareLattice;
        assert_eq!(lattice.polyominoes(1, false).len(), 1);
        assert_eq!(lattice.polyominoes(2, false).len(), 1);
        assert_eq!(lattice.polyominoes(3, false).len(), 2);
        assert_eq!(lattice.polyominoes(4, false).len(), 5);
        assert_eq!(lattice.polyominoes(5, false).len(), 12);
    }

    #[test]
    fn test_fixed_polyomino_counts() {
        let lattice = SquareLattice;
        assert_eq!(lattice.polyominoes(2, true).len(), 2);
        assert_eq!(lattice.polyominoes(3, true).len(), 6);
        assert_eq!(lattice.polyominoes(4, true).len(), 19);
    }

    #[test]
    fn test_polyominoes_are_anchored_and_sorted() {
        for shape in SquareLattice.polyominoes(4, false) {
            assert_eq!(shape[0], Point::new(0, 0));
            assert!(shape.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn test_hexagonal_free_triominoes() {
        // Three edge-connected hexagons form a bar, a bend, or a triangle.
        assert_eq!(HexagonalLattice.polyominoes(3, false).len(), 3);
    }

    #[test]
    fn test_square_vertex_windows() {
        let windows = SquareLattice.vertex_windows(Point::new(1, 1));
        assert_eq!(windows.len(), 4);
        for window in &windows {
            assert!(window.contains(&Point::new(1, 1)));
            assert_eq!(window.len(), 4);
        }
    }

    #[test]
    fn test_hexagonal_vertex_windows() {
        let windows = HexagonalLattice.vertex_windows(Point::new(0, 0));
        assert_eq!(windows.len(), 6);
        for window in &windows {
            assert!(window.contains(&Point::new(0, 0)));
            assert_eq!(window.len(), 3);
        }
    }
}
