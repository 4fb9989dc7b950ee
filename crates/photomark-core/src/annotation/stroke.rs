//! Freehand stroke annotation.

use super::Rgba;
use kurbo::{BezPath, Point, Rect};
use serde::{Deserialize, Serialize};

/// A freehand stroke (ink or eraser) through image-space points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrokeAnnotation {
    /// Points in image space, never empty once committed.
    pub points: Vec<Point>,
    pub color: Rgba,
    /// Line width in image pixels.
    pub width: f64,
    /// Eraser strokes remove whatever was painted before them.
    #[serde(default)]
    pub is_eraser: bool,
}

impl StrokeAnnotation {
    pub fn new(points: Vec<Point>, color: Rgba, width: f64, is_eraser: bool) -> Self {
        Self {
            points,
            color,
            width,
            is_eraser,
        }
    }

    /// Get the number of points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the path is empty.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// True if every point coincides, so the stroke paints a single dot.
    pub fn is_dot(&self) -> bool {
        match self.points.split_first() {
            Some((first, rest)) => rest.iter().all(|p| p == first),
            None => false,
        }
    }

    /// Bounding box of the points, without the stroke width.
    pub fn point_bounds(&self) -> Rect {
        let Some((first, rest)) = self.points.split_first() else {
            return Rect::ZERO;
        };
        rest.iter()
            .fold(Rect::from_points(*first, *first), |rect, p| rect.union_pt(*p))
    }

    /// Painted area: point bounds inflated by half the line width.
    pub fn bounds(&self) -> Rect {
        if self.points.is_empty() {
            return Rect::ZERO;
        }
        let half = self.width / 2.0;
        self.point_bounds().inflate(half, half)
    }

    /// Polyline through all points.
    pub fn to_path(&self) -> BezPath {
        let mut path = BezPath::new();

        if let Some((first, rest)) = self.points.split_first() {
            path.move_to(*first);
            for point in rest {
                path.line_to(*point);
            }
        }

        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds() {
        let stroke = StrokeAnnotation::new(
            vec![
                Point::new(0.0, 0.0),
                Point::new(100.0, 50.0),
                Point::new(50.0, 100.0),
            ],
            Rgba::black(),
            10.0,
            false,
        );

        let bounds = stroke.bounds();
        assert!((bounds.x0 + 5.0).abs() < f64::EPSILON);
        assert!((bounds.y0 + 5.0).abs() < f64::EPSILON);
        assert!((bounds.x1 - 105.0).abs() < f64::EPSILON);
        assert!((bounds.y1 - 105.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_dot() {
        let dot = StrokeAnnotation::new(vec![Point::new(3.0, 3.0)], Rgba::black(), 4.0, false);
        assert!(dot.is_dot());
        assert_eq!(dot.bounds(), Rect::new(1.0, 1.0, 5.0, 5.0));

        let line = StrokeAnnotation::new(
            vec![Point::new(3.0, 3.0), Point::new(4.0, 3.0)],
            Rgba::black(),
            4.0,
            false,
        );
        assert!(!line.is_dot());
    }

    #[test]
    fn test_to_path() {
        let stroke = StrokeAnnotation::new(
            vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0), Point::new(10.0, 10.0)],
            Rgba::black(),
            1.0,
            true,
        );
        assert_eq!(stroke.to_path().elements().len(), 3);
        assert_eq!(stroke.len(), 3);
    }
}
