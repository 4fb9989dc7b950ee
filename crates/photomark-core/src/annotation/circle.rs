//! Circle highlight annotation.

use super::Rgba;
use kurbo::{BezPath, Circle, Point, Rect, Shape};
use serde::{Deserialize, Serialize};

/// An outlined circle in image space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CircleAnnotation {
    pub center: Point,
    /// Radius in image pixels.
    pub radius: f64,
    pub color: Rgba,
    /// Outline width in image pixels.
    pub width: f64,
}

impl CircleAnnotation {
    pub fn new(center: Point, radius: f64, color: Rgba, width: f64) -> Self {
        Self {
            center,
            radius: radius.max(0.0),
            color,
            width,
        }
    }

    /// Get as a kurbo Circle.
    pub fn as_kurbo(&self) -> Circle {
        Circle::new(self.center, self.radius)
    }

    /// Painted area including the outline width.
    pub fn bounds(&self) -> Rect {
        let reach = self.radius + self.width / 2.0;
        Rect::new(
            self.center.x - reach,
            self.center.y - reach,
            self.center.x + reach,
            self.center.y + reach,
        )
    }

    pub fn to_path(&self) -> BezPath {
        self.as_kurbo().to_path(0.1)
    }
}
