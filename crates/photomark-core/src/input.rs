//! Raw input events delivered to the editor.
//!
//! Positions are client (display-space) coordinates; the editor maps them to
//! image space per event through the coordinate mapper.

use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MouseButton {
    #[default]
    Left,
    Right,
    Middle,
}

/// Unified pointer, touch and wheel events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputEvent {
    PointerDown {
        position: Point,
        #[serde(default)]
        button: MouseButton,
    },
    PointerMove {
        position: Point,
    },
    PointerUp {
        position: Point,
        #[serde(default)]
        button: MouseButton,
    },
    /// Touches currently on the surface after the start.
    TouchStart {
        touches: Vec<Point>,
    },
    TouchMove {
        touches: Vec<Point>,
    },
    /// Touches still on the surface after the release.
    TouchEnd {
        touches: Vec<Point>,
    },
    TouchCancel,
    /// Wheel scroll; positive `delta_y` scrolls down (zooms out).
    Wheel {
        position: Point,
        delta_y: f64,
    },
}

impl InputEvent {
    /// Number of wheel notches encoded by a raw `delta_y`.
    ///
    /// Any non-zero delta counts as one notch in its direction, matching the
    /// fixed step per wheel event.
    pub fn wheel_direction(delta_y: f64) -> f64 {
        if delta_y < 0.0 {
            1.0
        } else if delta_y > 0.0 {
            -1.0
        } else {
            0.0
        }
    }
}

/// Midpoint and separation of the first two touches.
pub(crate) fn touch_pair(touches: &[Point]) -> Option<(Point, f64)> {
    match touches {
        [a, b, ..] => Some((a.midpoint(*b), a.distance(*b))),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_touch_pair() {
        let (center, distance) =
            touch_pair(&[Point::new(0.0, 0.0), Point::new(30.0, 40.0)]).unwrap();
        assert_eq!(center, Point::new(15.0, 20.0));
        assert!((distance - 50.0).abs() < f64::EPSILON);
        assert!(touch_pair(&[Point::ZERO]).is_none());
    }

    #[test]
    fn test_wheel_direction() {
        assert_eq!(InputEvent::wheel_direction(-120.0), 1.0);
        assert_eq!(InputEvent::wheel_direction(3.0), -1.0);
        assert_eq!(InputEvent::wheel_direction(0.0), 0.0);
    }

    #[test]
    fn test_event_json() {
        let event: InputEvent = serde_json::from_str(
            r#"{"type":"pointer_down","position":{"x":4.0,"y":2.0}}"#,
        )
        .unwrap();
        assert_eq!(
            event,
            InputEvent::PointerDown {
                position: Point::new(4.0, 2.0),
                button: MouseButton::Left,
            }
        );
    }
}
