//! Rectangle math shared by the placement engine and the coordinate
//! transform.
//!
//! All functions here are pure. Clamping and the vertical-axis flip live in
//! this crate so there is exactly one implementation of each, regardless of
//! which component needs them.

use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle in a caller-documented coordinate space
/// (wrapper space or PDF user space, depending on context).
///
/// Invariant: `width > 0` and `height > 0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Whether `other` lies entirely within `self` (edges inclusive).
    pub fn contains(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.x + other.width <= self.x + self.width
            && other.y + other.height <= self.y + self.height
    }

    /// Clamp this rect so it lies entirely within `bounds`, independently
    /// per axis. When the rect is larger than the bounds on an axis it is
    /// pinned to the low edge: the low bound is applied last and wins.
    pub fn clamp_into(&self, bounds: &Rect) -> Rect {
        Rect {
            x: clamp_axis(self.x, bounds.x, bounds.x + bounds.width - self.width),
            y: clamp_axis(self.y, bounds.y, bounds.y + bounds.height - self.height),
            width: self.width,
            height: self.height,
        }
    }

    /// Shrink by `padding` on all four sides.
    pub fn inset(&self, padding: f64) -> Rect {
        Rect {
            x: self.x + padding,
            y: self.y + padding,
            width: self.width - padding * 2.0,
            height: self.height - padding * 2.0,
        }
    }
}

/// `max(low, min(high, v))`: the low bound is applied last so it has
/// priority when `low > high`.
fn clamp_axis(v: f64, low: f64, high: f64) -> f64 {
    v.min(high).max(low)
}

/// Flip a fractional vertical position from a top-left-origin space into a
/// bottom-left-origin space. Computed from the rect's *bottom* edge
/// (`y_frac + h_frac`), so a rect spanning the full height maps to 0.
pub fn flip_y_frac(y_frac: f64, h_frac: f64) -> f64 {
    1.0 - (y_frac + h_frac)
}
