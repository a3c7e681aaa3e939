//! Geometric primitives for diagram layout and positioning.
//!
//! # Coordinate system
//!
//! Trellis uses a coordinate system consistent with SVG:
//!
//! ```text
//!   (0,0) ────────► +X
//!     │
//!     │
//!     ▼
//!    +Y
//! ```
//!
//! - **Origin**: top-left corner at `(0, 0)`
//! - **X-axis**: increases rightward
//! - **Y-axis**: increases downward

/// A 2D point in diagram coordinate space.
///
/// Points use `f32` coordinates and provide operations for basic vector
/// math. The coordinate system has origin at top-left with Y increasing
/// downward (see [module documentation](self)).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    x: f32,
    y: f32,
}

impl Point {
    /// Creates a new point with the specified coordinates.
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Returns the x-coordinate of the point.
    pub fn x(self) -> f32 {
        self.x
    }

    /// Returns the y-coordinate of the point.
    pub fn y(self) -> f32 {
        self.y
    }

    /// Adds another point to this point, returning a new point.
    pub fn add_point(self, other: Point) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }

    /// Subtracts another point from this point, returning a new point.
    pub fn sub_point(self, other: Point) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }

    /// Calculates the midpoint between this point and another point.
    pub fn midpoint(self, other: Point) -> Self {
        Self {
            x: (self.x + other.x) / 2.0,
            y: (self.y + other.y) / 2.0,
        }
    }

    /// Euclidean distance to another point.
    pub fn distance(self, other: Point) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Squared distance of this point from an infinite line through
    /// `a` and `b`. Degenerates to point distance when `a == b`.
    pub fn distance_to_line_sq(self, a: Point, b: Point) -> f32 {
        let dx = b.x - a.x;
        let dy = b.y - a.y;
        let len_sq = dx * dx + dy * dy;
        if len_sq == 0.0 {
            let ex = self.x - a.x;
            let ey = self.y - a.y;
            return ex * ex + ey * ey;
        }
        let cross = dx * (self.y - a.y) - dy * (self.x - a.x);
        (cross * cross) / len_sq
    }
}

/// Width and height dimensions.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Size {
    width: f32,
    height: f32,
}

impl Size {
    /// Creates a new size with the specified dimensions.
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Returns the width.
    pub fn width(self) -> f32 {
        self.width
    }

    /// Returns the height.
    pub fn height(self) -> f32 {
        self.height
    }

    /// Grows the size by insets on all four sides.
    pub fn grow(self, insets: Insets) -> Self {
        Self {
            width: self.width + insets.horizontal(),
            height: self.height + insets.vertical(),
        }
    }
}

/// A rectangular bounding box defined by origin and size.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Bounds {
    origin: Point,
    size: Size,
}

impl Bounds {
    /// Creates bounds from a top-left origin and a size.
    pub fn new(origin: Point, size: Size) -> Self {
        Self { origin, size }
    }

    /// Creates bounds centered on a point.
    pub fn from_center(center: Point, size: Size) -> Self {
        Self {
            origin: Point::new(
                center.x() - size.width() / 2.0,
                center.y() - size.height() / 2.0,
            ),
            size,
        }
    }

    /// Top-left corner.
    pub fn origin(self) -> Point {
        self.origin
    }

    /// Dimensions of the box.
    pub fn size(self) -> Size {
        self.size
    }

    pub fn min_x(self) -> f32 {
        self.origin.x()
    }

    pub fn min_y(self) -> f32 {
        self.origin.y()
    }

    pub fn max_x(self) -> f32 {
        self.origin.x() + self.size.width()
    }

    pub fn max_y(self) -> f32 {
        self.origin.y() + self.size.height()
    }

    /// Geometric center of the box.
    pub fn center(self) -> Point {
        Point::new(
            self.origin.x() + self.size.width() / 2.0,
            self.origin.y() + self.size.height() / 2.0,
        )
    }

    /// The smallest bounds containing both boxes.
    pub fn union(self, other: Bounds) -> Bounds {
        let min_x = self.min_x().min(other.min_x());
        let min_y = self.min_y().min(other.min_y());
        let max_x = self.max_x().max(other.max_x());
        let max_y = self.max_y().max(other.max_y());
        Bounds::new(
            Point::new(min_x, min_y),
            Size::new(max_x - min_x, max_y - min_y),
        )
    }

    /// Shifts the box by an offset without changing its size.
    pub fn translate(self, offset: Point) -> Bounds {
        Bounds::new(self.origin.add_point(offset), self.size)
    }

    /// Expands the box outward by insets.
    pub fn expand(self, insets: Insets) -> Bounds {
        Bounds::new(
            Point::new(self.origin.x() - insets.left(), self.origin.y() - insets.top()),
            self.size.grow(insets),
        )
    }
}

/// Padding or margin values for four sides.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Insets {
    top: f32,
    right: f32,
    bottom: f32,
    left: f32,
}

impl Insets {
    pub fn new(top: f32, right: f32, bottom: f32, left: f32) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    /// The same inset on all four sides.
    pub fn uniform(value: f32) -> Self {
        Self::new(value, value, value, value)
    }

    pub fn top(self) -> f32 {
        self.top
    }

    pub fn right(self) -> f32 {
        self.right
    }

    pub fn bottom(self) -> f32 {
        self.bottom
    }

    pub fn left(self) -> f32 {
        self.left
    }

    /// Combined left and right insets.
    pub fn horizontal(self) -> f32 {
        self.left + self.right
    }

    /// Combined top and bottom insets.
    pub fn vertical(self) -> f32 {
        self.top + self.bottom
    }
}
