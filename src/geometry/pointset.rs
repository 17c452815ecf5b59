use crate::collections::ValueMap;
use crate::geometry::lattice::{Bearing, Lattice, Shape, SquareLattice};
use crate::geometry::point::{Point, Vector};
use std::rc::Rc;

/// A finite, ordered set of cells bound to a lattice.
///
/// All derived structure of a grid comes from here: adjacency restricted to
/// the set, straight lines with their entry points, fully surrounded
/// vertices, and exhaustive shape placements.
#[derive(Debug, Clone)]
pub struct PointSet {
    lattice: Rc<dyn Lattice>,
    map: ValueMap<Point, usize>,
}

impl PointSet {
    pub fn new(lattice: Rc<dyn Lattice>, points: impl IntoIterator<Item = Point>) -> Self {
        let mut points: Vec<Point> = points.into_iter().collect();
        points.sort_unstable();
        points.dedup();
        let map = points.into_iter().enumerate().map(|(i, p)| (p, i)).collect();
        Self { lattice, map }
    }

    /// A `height` by `width` rectangle on the square lattice.
    #[must_use]
    pub fn square(height: i64, width: i64) -> Self {
        let points = (0..height).flat_map(|y| (0..width).map(move |x| Point::new(y, x)));
        Self::new(Rc::new(SquareLattice), points)
    }

    #[must_use]
    pub fn lattice(&self) -> &Rc<dyn Lattice> {
        &self.lattice
    }

    pub fn iter(&self) -> impl Iterator<Item = Point> + '_ {
        self.map.keys().copied()
    }

    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        self.map.contains_key(&p)
    }

    /// The rank of `p` in the set's order, if present.
    #[must_use]
    pub fn index(&self, p: Point) -> Option<usize> {
        self.map.get(&p).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// In-set cells sharing an edge with `p`.
    #[must_use]
    pub fn edge_sharing_points(&self, p: Point) -> Vec<Point> {
        self.lattice
            .edge_sharing_directions()
            .into_iter()
            .map(|v| p.translate(v))
            .filter(|q| self.contains(*q))
            .collect()
    }

    /// In-set `(q, v)` pairs where `v` points from `p` to its neighbor `q`.
    #[must_use]
    pub fn edge_sharing_neighbors(&self, p: Point) -> Vec<(Point, Vector)> {
        self.lattice
            .edge_sharing_directions()
            .into_iter()
            .filter_map(|v| {
                let q = p.translate(v);
                self.contains(q).then_some((q, v))
            })
            .collect()
    }

    /// In-set cells sharing at least a vertex with `p`.
    #[must_use]
    pub fn vertex_sharing_points(&self, p: Point) -> Vec<Point> {
        self.lattice
            .vertex_sharing_directions()
            .into_iter()
            .map(|v| p.translate(v))
            .filter(|q| self.contains(*q))
            .collect()
    }

    /// All `(p, q, v)` with both endpoints in the set and `v` from `p` to
    /// `q`. Each adjacency appears in both directions.
    #[must_use]
    pub fn edges(&self) -> Vec<(Point, Point, Vector)> {
        self.iter()
            .flat_map(|p| {
                self.edge_sharing_neighbors(p)
                    .into_iter()
                    .map(move |(q, v)| (p, q, v))
            })
            .collect()
    }

    /// The in-set cells from `p` along `bearing`, stopping at the set
    /// boundary or at the first cell failing `good`.
    pub fn line_from(
        &self,
        p: Point,
        bearing: Bearing,
        mut good: impl FnMut(Point) -> bool,
    ) -> Vec<Point> {
        let mut line = Vec::new();
        let mut p = p;
        while self.contains(p) && good(p) {
            line.push(p);
            p = bearing.next(p);
        }
        line
    }

    /// All maximal straight runs of cells, as `(line, before, bearing)`
    /// where `before` is the out-of-set point just before the run starts.
    #[must_use]
    pub fn lines(&self) -> Vec<(Vec<Point>, Point, Bearing)> {
        let mut lines = Vec::new();
        for p in self.iter() {
            for bearing in self.lattice.bearings() {
                let q = bearing.negate().next(p);
                if !self.contains(q) {
                    lines.push((self.line_from(p, bearing, |_| true), q, bearing));
                }
            }
        }
        lines
    }

    /// Every placement of one of `shapes` lying fully inside the set.
    ///
    /// The result maps each cell to the placements covering it, as
    /// `(placement, instance, kind)`: `instance` is the index of the source
    /// shape and `kind` is unique per distinct placement.
    pub fn placements(
        &self,
        shapes: &[Shape],
        include_rotations_and_reflections: bool,
    ) -> ValueMap<Point, Vec<(Shape, usize, usize)>> {
        let transforms = if include_rotations_and_reflections {
            self.lattice.point_group()
        } else {
            vec![crate::geometry::lattice::Transform::IDENTITY]
        };
        let mut placements: ValueMap<Shape, usize> = ValueMap::new();
        for (instance, shape) in shapes.iter().enumerate() {
            for transform in &transforms {
                let mut transformed: Shape = shape.iter().map(|p| transform.apply(*p)).collect();
                transformed.sort_unstable();
                for p in self.iter() {
                    let v = transformed[0].direction_to(p);
                    if !self.lattice.in_basis(v) {
                        continue;
                    }
                    let placement: Shape = transformed.iter().map(|q| q.translate(v)).collect();
                    if placement.iter().all(|q| self.contains(*q)) {
                        placements.insert(placement, instance);
                    }
                }
            }
        }
        let mut by_point = ValueMap::from_keys(self.iter(), |_| Vec::new());
        for (kind, (placement, instance)) in placements.iter().enumerate() {
            for p in placement {
                by_point
                    .get_mut(p)
                    .expect("placement cell in set")
                    .push((placement.clone(), *instance, kind));
            }
        }
        by_point
    }

    /// All vertices fully surrounded by in-set cells, each given as the
    /// sorted window of cells around it.
    #[must_use]
    pub fn vertices(&self) -> Vec<Vec<Point>> {
        let mut vertices = Vec::new();
        for p in self.iter() {
            for window in self.lattice.vertex_windows(p) {
                // Count each window once, at its smallest member.
                if window[0] == p && window.iter().all(|q| self.contains(*q)) {
                    vertices.push(window);
                }
            }
        }
        vertices.sort_unstable();
        vertices
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::lattice::HexagonalLattice;

    #[test]
    fn test_index_follows_sorted_order() {
        let points = PointSet::square(2, 2);
        assert_eq!(points.index(Point::new(0, 0)), Some(0));
        assert_eq!(points.index(Point::new(1, 1)), Some(3));
        assert_eq!(points.index(Point::new(2, 2)), None);
    }

    #[test]
    fn test_edges_both_directions() {
        let points = PointSet::square(3, 3);
        let edges = points.edges();
        assert_eq!(edges.len(), 24);
        assert!(edges.contains(&(Point::new(0, 0), Point::new(0, 1), Vector::E)));
        assert!(edges.contains(&(Point::new(0, 1), Point::new(0, 0), Vector::W)));
    }

    #[test]
    fn test_lines_cover_rows_and_columns() {
        let points = PointSet::square(3, 4);
        let lines = points.lines();
        // Each row and column appears once per direction.
        assert_eq!(lines.len(), 14);
        assert!(lines
            .iter()
            .all(|(line, before, _)| !line.is_empty() && !points.contains(*before)));
        assert!(lines.iter().any(|(line, _, _)| line.len() == 4));
    }

    #[test]
    fn test_line_from_stops_at_predicate() {
        let points = PointSet::square(1, 5);
        let line = points.line_from(Point::new(0, 0), Bearing::new(Vector::E), |p| p.x != 3);
        assert_eq!(
            line,
            vec![Point::new(0, 0), Point::new(0, 1), Point::new(0, 2)]
        );
    }

    #[test]
    fn test_line_from_outside_is_empty() {
        let points = PointSet::square(2, 2);
        let line = points.line_from(Point::new(5, 5), Bearing::new(Vector::E), |_| true);
        assert!(line.is_empty());
    }

    #[test]
    fn test_vertices_of_square_grid() {
        let points = PointSet::square(3, 3);
        let vertices = points.vertices();
        assert_eq!(vertices.len(), 4);
        for window in vertices {
            assert_eq!(window.len(), 4);
        }
    }

    #[test]
    fn test_domino_placements() {
        let points = PointSet::square(2, 2);
        let domino = vec![Point::new(0, 0), Point::new(0, 1)];
        let placements = points.placements(&[domino], true);
        // Two horizontal and two vertical placements, each covering a cell.
        let at_origin = &placements[&Point::new(0, 0)];
        assert_eq!(at_origin.len(), 2);
        let kinds: std::collections::BTreeSet<usize> = placements
            .values()
            .flatten()
            .map(|(_, _, kind)| *kind)
            .collect();
        assert_eq!(kinds.len(), 4);
    }

    #[test]
    fn test_hexagonal_neighbors() {
        let lattice = Rc::new(HexagonalLattice);
        let points = PointSet::new(
            lattice,
            [
                Point::new(0, 0),
                Point::new(0, 2),
                Point::new(3, 1),
                Point::new(3, 3),
            ],
        );
        assert_eq!(points.edge_sharing_points(Point::new(0, 0)).len(), 2);
        assert_eq!(points.vertices().len(), 2);
    }
}
