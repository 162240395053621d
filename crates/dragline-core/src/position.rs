//! Position math over `kurbo::Point`.
//!
//! Every operation returns a new value; positions are never mutated in place.

use kurbo::Point;

/// The zero position.
pub fn origin() -> Point {
    Point::ZERO
}

/// Add two positions component-wise.
pub fn add(a: Point, b: Point) -> Point {
    Point::new(a.x + b.x, a.y + b.y)
}

/// Subtract `b` from `a` component-wise.
pub fn subtract(a: Point, b: Point) -> Point {
    Point::new(a.x - b.x, a.y - b.y)
}

/// Invert both components, mapping `0.0` to `0.0` rather than `-0.0`.
pub fn negate(p: Point) -> Point {
    Point::new(negate_component(p.x), negate_component(p.y))
}

fn negate_component(value: f64) -> f64 {
    if value == 0.0 { 0.0 } else { -value }
}

/// Check two positions for component-wise equality.
pub fn is_equal(a: Point, b: Point) -> bool {
    a.x == b.x && a.y == b.y
}

/// Euclidean distance between two positions.
pub fn distance(a: Point, b: Point) -> f64 {
    a.distance(b)
}
