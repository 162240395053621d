//! Axis descriptors making displacement math direction-agnostic.

use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// The main axis of a droppable list.
///
/// A vertical list reorders along `y`; a horizontal list along `x`. All
/// impact math goes through these projections so it never needs to know
/// which direction the list actually flows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    Vertical,
    Horizontal,
}

impl Axis {
    /// The main-axis component of a point.
    pub fn line(&self, point: Point) -> f64 {
        match self {
            Axis::Vertical => point.y,
            Axis::Horizontal => point.x,
        }
    }

    /// The cross-axis component of a point.
    pub fn cross_line(&self, point: Point) -> f64 {
        match self {
            Axis::Vertical => point.x,
            Axis::Horizontal => point.y,
        }
    }

    /// The main-axis start edge of a rect.
    pub fn start(&self, rect: Rect) -> f64 {
        match self {
            Axis::Vertical => rect.y0,
            Axis::Horizontal => rect.x0,
        }
    }

    /// The main-axis end edge of a rect.
    pub fn end(&self, rect: Rect) -> f64 {
        match self {
            Axis::Vertical => rect.y1,
            Axis::Horizontal => rect.x1,
        }
    }

    /// The main-axis size of a rect.
    pub fn size(&self, rect: Rect) -> f64 {
        match self {
            Axis::Vertical => rect.height(),
            Axis::Horizontal => rect.width(),
        }
    }

    /// The cross-axis start edge of a rect.
    pub fn cross_axis_start(&self, rect: Rect) -> f64 {
        match self {
            Axis::Vertical => rect.x0,
            Axis::Horizontal => rect.y0,
        }
    }

    /// The cross-axis end edge of a rect.
    pub fn cross_axis_end(&self, rect: Rect) -> f64 {
        match self {
            Axis::Vertical => rect.x1,
            Axis::Horizontal => rect.y1,
        }
    }

    /// The cross-axis size of a rect.
    pub fn cross_axis_size(&self, rect: Rect) -> f64 {
        match self {
            Axis::Vertical => rect.width(),
            Axis::Horizontal => rect.height(),
        }
    }

    /// The midpoint of a rect along the main axis.
    pub fn center(&self, rect: Rect) -> f64 {
        self.line(rect.center())
    }

    /// A point with `value` on the main axis and zero on the cross axis.
    pub fn patch(&self, value: f64) -> Point {
        self.patch_with(value, 0.0)
    }

    /// A point with `value` on the main axis and `cross` on the cross axis.
    pub fn patch_with(&self, value: f64, cross: f64) -> Point {
        match self {
            Axis::Vertical => Point::new(cross, value),
            Axis::Horizontal => Point::new(value, cross),
        }
    }

    /// Grow a rect's end edge along the main axis by `amount`.
    pub fn grow_end(&self, rect: Rect, amount: f64) -> Rect {
        match self {
            Axis::Vertical => Rect::new(rect.x0, rect.y0, rect.x1, rect.y1 + amount),
            Axis::Horizontal => Rect::new(rect.x0, rect.y0, rect.x1 + amount, rect.y1),
        }
    }
}
