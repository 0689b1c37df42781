//! Geometric primitives for layout data.
//!
//! This module provides the value types used to carry positions, sizes and
//! bounding boxes between the layout engine output and rendering builders.
//!
//! # Overview
//!
//! - [`Point`] - A 2D coordinate
//! - [`Size`] - Non-negative width and height
//! - [`Bounds`] - A rectangle defined by minimum and maximum coordinates
//!
//! # Coordinate System
//!
//! Values parsed from the layout engine use the engine's native system: points
//! (72 per inch) with the origin at the bottom-left and Y increasing upward.
//!
//! ```text
//!    +Y
//!     ▲
//!     │
//!     │
//!   (0,0) ────────► +X
//! ```
//!
//! Screen-oriented consumers (SVG, canvases) flip the Y axis with
//! [`Point::flip_y`] or [`Bounds::flip_y`], passing the total graph height.

/// Number of points in one inch, the unit conversion used by Graphviz.
pub const POINTS_PER_INCH: f32 = 72.0;

/// A 2D point.
///
/// Points use `f32` coordinates and provide operations for basic vector math.
///
/// # Examples
///
/// ```
/// # use dotweave_core::geometry::Point;
/// let p1 = Point::new(10.0, 20.0);
/// let p2 = Point::new(5.0, 5.0);
///
/// let mid = p1.midpoint(p2);
/// assert_eq!(mid.x(), 7.5);
/// assert_eq!(mid.y(), 12.5);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    x: f32,
    y: f32,
}

impl Point {
    /// Creates a new point with the specified coordinates
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Returns the x-coordinate of the point
    pub fn x(self) -> f32 {
        self.x
    }

    /// Returns the y-coordinate of the point
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

    /// Subtracts another point from this point, returning a new point
    pub fn sub_point(self, other: Point) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }

    /// Calculates the midpoint between this point and another point
    pub fn midpoint(self, other: Point) -> Self {
        Self {
            x: (self.x + other.x) / 2.0,
            y: (self.y + other.y) / 2.0,
        }
    }

    /// Euclidean distance to another point.
    pub fn distance(self, other: Point) -> f32 {
        self.sub_point(other).hypot()
    }

    /// Calculates the hypotenuse (Euclidean distance from origin)
    pub fn hypot(self) -> f32 {
        self.x.hypot(self.y)
    }

    /// Multiplies both coordinates by the given factor.
    pub fn scale(self, factor: f32) -> Self {
        Self {
            x: self.x * factor,
            y: self.y * factor,
        }
    }

    /// Mirrors the point vertically inside a canvas of the given height.
    ///
    /// Converts between bottom-left origin (engine output) and top-left origin
    /// (screen) coordinates. Applying it twice with the same height yields the
    /// original point.
    ///
    /// # Examples
    ///
    /// ```
    /// # use dotweave_core::geometry::Point;
    /// let engine = Point::new(37.0, 93.0);
    /// let screen = engine.flip_y(112.0);
    /// assert_eq!(screen, Point::new(37.0, 19.0));
    /// ```
    pub fn flip_y(self, height: f32) -> Self {
        Self {
            x: self.x,
            y: height - self.y,
        }
    }
}

/// Non-negative width and height.
///
/// Negative or NaN components are clamped to zero on construction, so a
/// `Size` never describes a negative extent. Code that requires a strictly
/// positive extent checks [`Size::is_positive`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Size {
    width: f32,
    height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width: width.max(0.0),
            height: height.max(0.0),
        }
    }

    /// Creates a size from inch measurements, converting to points.
    ///
    /// ```
    /// # use dotweave_core::geometry::Size;
    /// let size = Size::from_inches(1.0, 0.5);
    /// assert_eq!(size.width(), 72.0);
    /// assert_eq!(size.height(), 36.0);
    /// ```
    pub fn from_inches(width: f32, height: f32) -> Self {
        Self::new(width * POINTS_PER_INCH, height * POINTS_PER_INCH)
    }

    /// Returns the width dimension of this size
    pub fn width(self) -> f32 {
        self.width
    }

    /// Returns the height dimension of this size
    pub fn height(self) -> f32 {
        self.height
    }

    /// Width in inches.
    pub fn width_inches(self) -> f32 {
        self.width / POINTS_PER_INCH
    }

    /// Height in inches.
    pub fn height_inches(self) -> f32 {
        self.height / POINTS_PER_INCH
    }

    /// Returns true when both dimensions are strictly greater than zero.
    pub fn is_positive(self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }

    /// Returns a new Size with the maximum width and height between this size and another
    pub fn max(self, other: Size) -> Self {
        Self {
            width: self.width.max(other.width),
            height: self.height.max(other.height),
        }
    }

    /// Grows both dimensions by `padding` on every side.
    pub fn pad(self, padding: f32) -> Self {
        Self::new(self.width + padding * 2.0, self.height + padding * 2.0)
    }
}

/// A rectangle defined by minimum and maximum coordinates.
///
/// In engine coordinates `min_y` is the bottom edge; after
/// [`flip_y`](Bounds::flip_y) it is the top edge.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Bounds {
    min_x: f32,
    min_y: f32,
    max_x: f32,
    max_y: f32,
}

impl Bounds {
    /// Creates bounds from two opposite corners, normalizing their order.
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self {
            min_x: x0.min(x1),
            min_y: y0.min(y1),
            max_x: x0.max(x1),
            max_y: y0.max(y1),
        }
    }

    /// Creates a new bounds from a center point and a size
    pub fn new_from_center(center: Point, size: Size) -> Self {
        let half_width = size.width / 2.0;
        let half_height = size.height / 2.0;
        Self {
            min_x: center.x - half_width,
            min_y: center.y - half_height,
            max_x: center.x + half_width,
            max_y: center.y + half_height,
        }
    }

    /// Returns the minimum x-coordinate of the bounds
    pub fn min_x(self) -> f32 {
        self.min_x
    }

    /// Returns the minimum y-coordinate of the bounds
    pub fn min_y(self) -> f32 {
        self.min_y
    }

    /// Returns the maximum x-coordinate of the bounds
    pub fn max_x(self) -> f32 {
        self.max_x
    }

    /// Returns the maximum y-coordinate of the bounds
    pub fn max_y(self) -> f32 {
        self.max_y
    }

    /// Returns the width of the bounds
    pub fn width(self) -> f32 {
        self.max_x - self.min_x
    }

    /// Returns the height of the bounds
    pub fn height(self) -> f32 {
        self.max_y - self.min_y
    }

    /// Returns the center point of the bounds
    pub fn center(self) -> Point {
        Point::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    /// Returns the corner with the smallest coordinates as a Point
    pub fn min_point(self) -> Point {
        Point::new(self.min_x, self.min_y)
    }

    /// Converts bounds to a Size object
    pub fn to_size(self) -> Size {
        Size::new(self.width(), self.height())
    }

    /// Returns true if the point lies inside or on the edge of the bounds.
    pub fn contains(self, point: Point) -> bool {
        self.min_x <= point.x && point.x <= self.max_x && self.min_y <= point.y && point.y <= self.max_y
    }

    /// Merges two bounds into the smallest bounds containing both.
    pub fn merge(&self, other: &Self) -> Self {
        Self {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    /// Mirrors the bounds vertically inside a canvas of the given height.
    ///
    /// ```
    /// # use dotweave_core::geometry::Bounds;
    /// // A cluster box in engine coordinates (left, bottom, right, top).
    /// let bb = Bounds::new(8.0, 8.0, 90.0, 120.0);
    /// let screen = bb.flip_y(200.0);
    /// assert_eq!(screen.min_y(), 80.0);
    /// assert_eq!(screen.max_y(), 192.0);
    /// assert_eq!(screen.height(), bb.height());
    /// ```
    pub fn flip_y(self, height: f32) -> Self {
        Self {
            min_x: self.min_x,
            min_y: height - self.max_y,
            max_x: self.max_x,
            max_y: height - self.min_y,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_new() {
        let point = Point::new(3.5, 4.2);
        assert_eq!(point.x(), 3.5);
        assert_eq!(point.y(), 4.2);
    }

    #[test]
    fn test_point_equality() {
        assert_eq!(Point::new(1.0, 2.0), Point::new(1.0, 2.0));
        assert_ne!(Point::new(1.0, 2.0), Point::new(2.0, 1.0));
    }

    #[test]
    fn test_point_distance() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3.0, 4.0);
        assert_eq!(a.distance(b), 5.0);
        assert_eq!(b.distance(a), 5.0);
    }

    #[test]
    fn test_point_flip_y() {
        let p = Point::new(10.0, 30.0);
        assert_eq!(p.flip_y(100.0), Point::new(10.0, 70.0));
        assert_eq!(p.flip_y(100.0).flip_y(100.0), p);
    }

    #[test]
    fn test_size_clamps_negative() {
        let size = Size::new(-5.0, 10.0);
        assert_eq!(size.width(), 0.0);
        assert_eq!(size.height(), 10.0);
        assert!(!size.is_positive());
    }

    #[test]
    fn test_size_clamps_nan() {
        let size = Size::new(f32::NAN, 1.0);
        assert_eq!(size.width(), 0.0);
        assert!(!size.is_positive());
    }

    #[test]
    fn test_size_inches_roundtrip() {
        let size = Size::from_inches(0.5, 2.0);
        assert_eq!(size.width(), 36.0);
        assert_eq!(size.height(), 144.0);
        assert_eq!(size.width_inches(), 0.5);
        assert_eq!(size.height_inches(), 2.0);
    }

    #[test]
    fn test_size_pad() {
        let size = Size::new(10.0, 20.0).pad(4.0);
        assert_eq!(size, Size::new(18.0, 28.0));
    }

    #[test]
    fn test_bounds_new_normalizes_corners() {
        let bounds = Bounds::new(74.0, 112.0, 0.0, 0.0);
        assert_eq!(bounds.min_x(), 0.0);
        assert_eq!(bounds.min_y(), 0.0);
        assert_eq!(bounds.max_x(), 74.0);
        assert_eq!(bounds.max_y(), 112.0);
        assert_eq!(bounds.to_size(), Size::new(74.0, 112.0));
    }

    #[test]
    fn test_bounds_new_from_center() {
        let bounds = Bounds::new_from_center(Point::new(37.0, 93.0), Size::new(66.0, 38.0));
        assert_eq!(bounds.min_x(), 4.0);
        assert_eq!(bounds.min_y(), 74.0);
        assert_eq!(bounds.max_x(), 70.0);
        assert_eq!(bounds.max_y(), 112.0);
        assert_eq!(bounds.center(), Point::new(37.0, 93.0));
    }

    #[test]
    fn test_bounds_contains() {
        let bounds = Bounds::new(0.0, 0.0, 10.0, 10.0);
        assert!(bounds.contains(Point::new(5.0, 5.0)));
        assert!(bounds.contains(Point::new(10.0, 0.0)));
        assert!(!bounds.contains(Point::new(10.5, 5.0)));
    }

    #[test]
    fn test_bounds_merge() {
        let a = Bounds::new(0.0, 0.0, 10.0, 10.0);
        let b = Bounds::new(5.0, -5.0, 20.0, 8.0);
        let merged = a.merge(&b);
        assert_eq!(merged, Bounds::new(0.0, -5.0, 20.0, 10.0));
    }
}
