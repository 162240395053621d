//! Box model geometry captured from measured elements.
//!
//! A [`BoxModel`] is a snapshot of one element's boxes at measurement time.
//! It is never mutated after capture; a fresh measurement produces a fresh
//! value.

use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// Per-edge spacing (margin, border, or padding).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Spacing {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Spacing {
    pub const ZERO: Spacing = Spacing {
        top: 0.0,
        right: 0.0,
        bottom: 0.0,
        left: 0.0,
    };

    pub fn new(top: f64, right: f64, bottom: f64, left: f64) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    pub fn uniform(value: f64) -> Self {
        Self::new(value, value, value, value)
    }
}

/// Grow a rect outward by a spacing.
pub fn expand(rect: Rect, spacing: Spacing) -> Rect {
    Rect::new(
        rect.x0 - spacing.left,
        rect.y0 - spacing.top,
        rect.x1 + spacing.right,
        rect.y1 + spacing.bottom,
    )
}

/// Shrink a rect inward by a spacing.
pub fn contract(rect: Rect, spacing: Spacing) -> Rect {
    Rect::new(
        rect.x0 + spacing.left,
        rect.y0 + spacing.top,
        rect.x1 - spacing.right,
        rect.y1 - spacing.bottom,
    )
}

/// Intersect `subject` with `frame`, returning `None` when nothing remains.
pub fn clip(frame: Rect, subject: Rect) -> Option<Rect> {
    let result = frame.intersect(subject);
    if result.area() > 0.0 { Some(result) } else { None }
}

/// Inclusive point-in-rect test. `Rect::contains` is half-open, which would
/// drop hits exactly on the end edges.
pub fn rect_contains(rect: Rect, point: Point) -> bool {
    point.x >= rect.x0 && point.x <= rect.x1 && point.y >= rect.y0 && point.y <= rect.y1
}

/// The measured boxes of a single element.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoxModel {
    pub margin_box: Rect,
    pub border_box: Rect,
    pub padding_box: Rect,
    pub content_box: Rect,
    pub margin: Spacing,
    pub border: Spacing,
    pub padding: Spacing,
}

impl BoxModel {
    /// Build a box model outward and inward from a measured border box.
    pub fn from_border_box(border_box: Rect, margin: Spacing, border: Spacing, padding: Spacing) -> Self {
        let padding_box = contract(border_box, border);
        Self {
            margin_box: expand(border_box, margin),
            border_box,
            padding_box,
            content_box: contract(padding_box, padding),
            margin,
            border,
            padding,
        }
    }

    /// A box model with no margin, border, or padding.
    pub fn tight(border_box: Rect) -> Self {
        Self::from_border_box(border_box, Spacing::ZERO, Spacing::ZERO, Spacing::ZERO)
    }

    /// Center of the border box.
    pub fn center(&self) -> Point {
        self.border_box.center()
    }

    /// Shift every box by `by`, e.g. from viewport coordinates into page
    /// coordinates using the window scroll.
    pub fn offset(&self, by: Vec2) -> Self {
        Self {
            margin_box: self.margin_box + by,
            border_box: self.border_box + by,
            padding_box: self.padding_box + by,
            content_box: self.content_box + by,
            margin: self.margin,
            border: self.border,
            padding: self.padding,
        }
    }
}
