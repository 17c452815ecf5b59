//! The puzzle and solution records rule modules work with.
//!
//! A [`Puzzle`] is the full clue state of a board: the cell set plus
//! every kind of marking a puzzle variant can carry (numbers, symbols,
//! borders, pre-drawn lines, region cages). A [`Solution`] is the same
//! shape of record holding what the solver fills in. Rule modules read
//! the former and write the latter; neither knows anything about
//! formulas or the engine.

use crate::collections::{UnionFind, ValueMap, ValueSet};
use crate::geometry::{Point, PointSet, Vector};

/// A pictorial clue: a shape name and a style index.
///
/// Shape names and styles follow the conventions of common puzzle file
/// formats, where a trailing `_B` or style 2 marks the filled variant of
/// a shape and style 1 the outlined one.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Symbol {
    pub shape: String,
    pub style: i64,
}

impl Symbol {
    pub fn new(shape: impl Into<String>, style: i64) -> Self {
        Self {
            shape: shape.into(),
            style,
        }
    }

    #[must_use]
    pub fn white_circle() -> Self {
        Self::new("circle_M", 1)
    }

    #[must_use]
    pub fn black_circle() -> Self {
        Self::new("circle_M", 2)
    }

    #[must_use]
    pub fn star() -> Self {
        Self::new("star", 2)
    }

    #[must_use]
    pub fn is_black(&self) -> bool {
        self.shape.ends_with("_B") || self.style == 2
    }

    #[must_use]
    pub fn is_white(&self) -> bool {
        self.style == 1
    }

    #[must_use]
    pub fn is_circle(&self) -> bool {
        self.shape.starts_with("circle_")
    }

    #[must_use]
    pub fn is_square(&self) -> bool {
        self.shape.starts_with("square_")
    }
}

/// The clue state of a board.
///
/// Every marking lives in its own field keyed by position; a variant
/// uses the handful of fields its rules care about and ignores the rest.
/// Edge markings are keyed by `(cell, direction)`, pairwise markings by
/// the two cells they sit between, and junction markings by the sorted
/// window of cells around the vertex.
#[derive(Debug, Clone)]
pub struct Puzzle {
    pub points: PointSet,
    pub height: i64,
    pub width: i64,
    pub parameters: ValueMap<String, String>,
    pub shaded: ValueSet<Point>,
    pub texts: ValueMap<Point, String>,
    pub symbols: ValueMap<Point, Symbol>,
    pub edge_texts: ValueMap<(Point, Vector), String>,
    pub borders: ValueSet<(Point, Point)>,
    pub junction_texts: ValueMap<Vec<Point>, String>,
    pub junction_symbols: ValueMap<Vec<Point>, Symbol>,
    pub lines: ValueSet<(Point, Point)>,
    pub walls: ValueSet<(Point, Vector)>,
    pub arrows: Vec<Vec<Point>>,
    pub cages: Vec<Vec<Point>>,
    pub thermo: Vec<Vec<Point>>,
}

impl Puzzle {
    /// An empty rectangular board on the square lattice.
    #[must_use]
    pub fn rectangle(height: i64, width: i64) -> Self {
        Self::with_points(PointSet::square(height, width), height, width)
    }

    #[must_use]
    pub fn with_points(points: PointSet, height: i64, width: i64) -> Self {
        Self {
            points,
            height,
            width,
            parameters: ValueMap::new(),
            shaded: ValueSet::new(),
            texts: ValueMap::new(),
            symbols: ValueMap::new(),
            edge_texts: ValueMap::new(),
            borders: ValueSet::new(),
            junction_texts: ValueMap::new(),
            junction_symbols: ValueMap::new(),
            lines: ValueSet::new(),
            walls: ValueSet::new(),
            arrows: Vec::new(),
            cages: Vec::new(),
            thermo: Vec::new(),
        }
    }

    /// Whether a border sits between two adjacent cells, in either order.
    #[must_use]
    pub fn has_border(&self, p: Point, q: Point) -> bool {
        self.borders.contains(&(p, q)) || self.borders.contains(&(q, p))
    }

    /// The unshaded cells grouped into regions: two cells share a region
    /// when they are connected without crossing a border or a shaded cell.
    #[must_use]
    pub fn regions(&self) -> Vec<Vec<Point>> {
        let mut components = UnionFind::new();
        for (p, q, _) in self.points.edges() {
            if !self.shaded.contains(&p) && !self.shaded.contains(&q) && !self.has_border(p, q) {
                components.union(&p, &q);
            }
        }
        let mut by_root: ValueMap<Point, Vec<Point>> = ValueMap::new();
        for p in self.points.iter() {
            if self.shaded.contains(&p) {
                continue;
            }
            let root = components.find(&p);
            match by_root.get_mut(&root) {
                Some(region) => region.push(p),
                None => {
                    by_root.insert(root, vec![p]);
                }
            }
        }
        by_root.into_iter().map(|(_, region)| region).collect()
    }
}

/// What the solver fills in: the same kinds of markings as a [`Puzzle`],
/// holding only the solved parts of the answer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Solution {
    pub shaded: ValueSet<Point>,
    pub texts: ValueMap<Point, String>,
    pub symbols: ValueMap<Point, Symbol>,
    pub edge_texts: ValueMap<(Point, Vector), String>,
    pub borders: ValueSet<(Point, Point)>,
    pub lines: ValueSet<(Point, Point)>,
}

impl Solution {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}
