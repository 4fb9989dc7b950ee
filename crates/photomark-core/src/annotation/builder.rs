//! In-progress annotation used for live preview while a gesture runs.

use super::{Annotation, CircleAnnotation, StrokeAnnotation};
use crate::tools::{Brush, Tool};
use kurbo::Point;

/// Circles dragged out to less than this radius (image pixels) are not
/// committed: a click without a drag leaves no mark.
pub const MIN_CIRCLE_RADIUS: f64 = 1.0;

/// Transient, uncommitted annotation.
#[derive(Debug, Clone, PartialEq)]
pub enum Builder {
    Stroke { points: Vec<Point>, is_eraser: bool },
    Circle { center: Point, radius: f64 },
}

impl Builder {
    /// Start a builder for `tool` at the initial image-space point.
    pub fn start(tool: Tool, point: Point) -> Self {
        match tool {
            Tool::Draw => Builder::Stroke {
                points: vec![point],
                is_eraser: false,
            },
            Tool::Erase => Builder::Stroke {
                points: vec![point],
                is_eraser: true,
            },
            Tool::Circle => Builder::Circle {
                center: point,
                radius: 0.0,
            },
        }
    }

    /// Feed the next pointer position.
    pub fn extend(&mut self, point: Point) {
        match self {
            Builder::Stroke { points, .. } => points.push(point),
            Builder::Circle { center, radius } => *radius = center.distance(point),
        }
    }

    /// The annotation this builder would commit right now, for preview.
    pub fn preview(&self, brush: Brush) -> Annotation {
        match self {
            Builder::Stroke { points, is_eraser } => {
                StrokeAnnotation::new(points.clone(), brush.color, brush.width, *is_eraser).into()
            }
            Builder::Circle { center, radius } => {
                CircleAnnotation::new(*center, *radius, brush.color, brush.width).into()
            }
        }
    }

    /// Promote to an immutable annotation.
    ///
    /// Returns `None` for a circle smaller than [`MIN_CIRCLE_RADIUS`].
    pub fn finish(self, brush: Brush) -> Option<Annotation> {
        match self {
            Builder::Stroke { points, is_eraser } => Some(
                StrokeAnnotation::new(points, brush.color, brush.width, is_eraser).into(),
            ),
            Builder::Circle { radius, .. } if radius < MIN_CIRCLE_RADIUS => {
                log::debug!("Discarding degenerate circle (radius {radius:.2})");
                None
            }
            Builder::Circle { center, radius } => {
                Some(CircleAnnotation::new(center, radius, brush.color, brush.width).into())
            }
        }
    }
}
