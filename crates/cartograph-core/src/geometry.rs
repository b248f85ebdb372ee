//! Geometric primitives for layout and rendering.
//!
//! Coordinates follow the SVG convention: origin at the top-left corner of the
//! canvas, X increasing rightward and Y increasing downward.

/// A 2D point (or displacement vector) in canvas coordinates.
///
/// # Examples
///
/// ```
/// # use cartograph_core::geometry::Point;
/// let p1 = Point::new(10.0, 20.0);
/// let p2 = Point::new(5.0, 5.0);
///
/// let sum = p1.add_point(p2);
/// assert_eq!(sum.x(), 15.0);
///
/// let mid = p1.midpoint(p2);
/// assert_eq!(mid.y(), 12.5);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    x: f32,
    y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Point at `radius` from the origin in direction `angle` (radians).
    pub fn from_polar(radius: f32, angle: f32) -> Self {
        Self {
            x: radius * angle.cos(),
            y: radius * angle.sin(),
        }
    }

    pub fn x(self) -> f32 {
        self.x
    }

    pub fn y(self) -> f32 {
        self.y
    }

    pub fn add_point(self, other: Point) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }

    pub fn sub_point(self, other: Point) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }

    pub fn midpoint(self, other: Point) -> Self {
        Self {
            x: (self.x + other.x) / 2.0,
            y: (self.y + other.y) / 2.0,
        }
    }

    /// Euclidean length of this point taken as a vector.
    pub fn hypot(self) -> f32 {
        self.x.hypot(self.y)
    }

    /// Angle of this point taken as a vector, in radians.
    pub fn angle(self) -> f32 {
        self.y.atan2(self.x)
    }

    pub fn scale(self, factor: f32) -> Self {
        Self {
            x: self.x * factor,
            y: self.y * factor,
        }
    }

    /// Clamps each coordinate into `[min, max]` of the matching axis.
    pub fn clamp(self, min: Point, max: Point) -> Self {
        Self {
            x: self.x.clamp(min.x, max.x),
            y: self.y.clamp(min.y, max.y),
        }
    }
}

/// Width and height of a canvas or element.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Size {
    width: f32,
    height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn width(self) -> f32 {
        self.width
    }

    pub fn height(self) -> f32 {
        self.height
    }

    /// The smaller of the two dimensions.
    pub fn min_dimension(self) -> f32 {
        self.width.min(self.height)
    }

    /// Center point of a canvas of this size anchored at the origin.
    pub fn center(self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }
}
