use core::fmt;
use core::ops::{Add, Neg, Sub};

/// A cell coordinate, row-major: `y` grows downward, `x` grows rightward.
///
/// The derived `Ord` sorts by row then column, which fixes the canonical
/// order of every derived structure (edges, shapes, variable declaration).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Point {
    pub y: i64,
    pub x: i64,
}

impl Point {
    #[must_use]
    pub const fn new(y: i64, x: i64) -> Self {
        Self { y, x }
    }

    #[must_use]
    pub const fn translate(self, v: Vector) -> Self {
        Self {
            y: self.y + v.dy,
            x: self.x + v.dx,
        }
    }

    /// The displacement from `self` to `p`.
    #[must_use]
    pub const fn direction_to(self, p: Self) -> Vector {
        Vector {
            dy: p.y - self.y,
            dx: p.x - self.x,
        }
    }
}

impl Add<Vector> for Point {
    type Output = Self;

    fn add(self, v: Vector) -> Self {
        self.translate(v)
    }
}

impl Sub for Point {
    type Output = Vector;

    fn sub(self, p: Self) -> Vector {
        p.direction_to(self)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.y, self.x)
    }
}

/// An integer displacement between cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Vector {
    pub dy: i64,
    pub dx: i64,
}

impl Vector {
    pub const E: Self = Self::new(0, 1);
    pub const NE: Self = Self::new(-1, 1);
    pub const N: Self = Self::new(-1, 0);
    pub const NW: Self = Self::new(-1, -1);
    pub const W: Self = Self::new(0, -1);
    pub const SW: Self = Self::new(1, -1);
    pub const S: Self = Self::new(1, 0);
    pub const SE: Self = Self::new(1, 1);

    #[must_use]
    pub const fn new(dy: i64, dx: i64) -> Self {
        Self { dy, dx }
    }

    #[must_use]
    pub const fn negate(self) -> Self {
        Self {
            dy: -self.dy,
            dx: -self.dx,
        }
    }

    #[must_use]
    pub const fn scale(self, s: i64) -> Self {
        Self {
            dy: self.dy * s,
            dx: self.dx * s,
        }
    }

    #[must_use]
    pub const fn dot(self, v: Self) -> i64 {
        self.dx * v.dx + self.dy * v.dy
    }

    #[must_use]
    pub const fn cross(self, v: Self) -> i64 {
        self.dx * v.dy - self.dy * v.dx
    }
}

impl Neg for Vector {
    type Output = Self;

    fn neg(self) -> Self {
        self.negate()
    }
}

impl Add for Vector {
    type Output = Self;

    fn add(self, v: Self) -> Self {
        Self {
            dy: self.dy + v.dy,
            dx: self.dx + v.dx,
        }
    }
}

impl fmt::Display for Vector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.dy, self.dx)
    }
}
