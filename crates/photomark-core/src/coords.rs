//! Mapping from display (client) coordinates to image-space pixels.

use kurbo::{Point, Rect, Size};

/// Source of the canvas element's geometry at the time of an event.
///
/// In a browser this is `canvas.width/height` plus `getBoundingClientRect()`;
/// tests supply synthetic values through [`StaticMetrics`].
pub trait ViewportMetrics {
    /// Intrinsic (backing store) size of the canvas in pixels.
    fn canvas_size(&self) -> Size;

    /// Rectangle the canvas currently occupies on screen, in display pixels.
    fn displayed_rect(&self) -> Rect;
}

/// Fixed metrics, for headless use.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StaticMetrics {
    pub canvas_size: Size,
    pub displayed_rect: Rect,
}

impl StaticMetrics {
    pub fn new(canvas_size: Size, displayed_rect: Rect) -> Self {
        Self {
            canvas_size,
            displayed_rect,
        }
    }
}

impl ViewportMetrics for StaticMetrics {
    fn canvas_size(&self) -> Size {
        self.canvas_size
    }

    fn displayed_rect(&self) -> Rect {
        self.displayed_rect
    }
}

/// Convert a client-space point into canvas pixel space.
///
/// The scale is taken from the metrics on every call, so a point drawn at a
/// given spot over the image lands on the same image pixel regardless of
/// zoom, pan or device pixel ratio. Returns `None` when the canvas has no
/// on-screen area.
pub fn to_image_space(metrics: &dyn ViewportMetrics, client: Point) -> Option<Point> {
    let rect = metrics.displayed_rect();
    let size = metrics.canvas_size();
    if rect.width().abs() < f64::EPSILON || rect.height().abs() < f64::EPSILON {
        return None;
    }
    let scale_x = size.width / rect.width();
    let scale_y = size.height / rect.height();
    Some(Point::new(
        (client.x - rect.x0) * scale_x,
        (client.y - rect.y0) * scale_y,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewport::Viewport;

    fn assert_close(actual: Point, expected: (f64, f64)) {
        assert!(
            (actual.x - expected.0).abs() < 1e-9 && (actual.y - expected.1).abs() < 1e-9,
            "expected {:?}, got {:?}",
            expected,
            actual
        );
    }

    fn corners(rect: Rect) -> [Point; 4] {
        [
            Point::new(rect.x0, rect.y0),
            Point::new(rect.x1, rect.y0),
            Point::new(rect.x0, rect.y1),
            Point::new(rect.x1, rect.y1),
        ]
    }

    fn check_corners(zoom: f64) {
        let canvas = Size::new(1600.0, 1200.0);
        let layout = Rect::new(20.0, 40.0, 420.0, 340.0);
        let mut viewport = Viewport::new();
        viewport.set_zoom(zoom);
        let metrics = StaticMetrics::new(canvas, viewport.displayed_rect(layout));

        let expected = [(0.0, 0.0), (1600.0, 0.0), (0.0, 1200.0), (1600.0, 1200.0)];
        for (corner, expected) in corners(metrics.displayed_rect).into_iter().zip(expected) {
            assert_close(to_image_space(&metrics, corner).unwrap(), expected);
        }
    }

    #[test]
    fn test_corners_at_zoom_one() {
        check_corners(1.0);
    }

    #[test]
    fn test_corners_at_zoom_two_and_a_half() {
        check_corners(2.5);
    }

    #[test]
    fn test_point_stable_under_zoom() {
        let canvas = Size::new(800.0, 600.0);
        let layout = Rect::new(0.0, 0.0, 400.0, 300.0);
        let mut viewport = Viewport::new();

        let metrics = StaticMetrics::new(canvas, viewport.displayed_rect(layout));
        let client = Point::new(100.0, 75.0);
        let at_one = to_image_space(&metrics, client).unwrap();

        // The same image pixel viewed at zoom 3 sits at a different client position.
        viewport.set_zoom(3.0);
        let zoomed = viewport.displayed_rect(layout);
        let metrics = StaticMetrics::new(canvas, zoomed);
        let client = Point::new(
            zoomed.x0 + (client.x - layout.x0) * 3.0,
            zoomed.y0 + (client.y - layout.y0) * 3.0,
        );
        let at_three = to_image_space(&metrics, client).unwrap();
        assert_close(at_three, (at_one.x, at_one.y));
        assert_close(at_one, (200.0, 150.0));
    }

    #[test]
    fn test_degenerate_rect() {
        let metrics = StaticMetrics::new(Size::new(10.0, 10.0), Rect::new(5.0, 5.0, 5.0, 20.0));
        assert!(to_image_space(&metrics, Point::new(5.0, 6.0)).is_none());
    }
}
