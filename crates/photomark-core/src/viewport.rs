//! Viewport module for the zoom/pan view of the canvas element.

use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Smallest zoom the viewport accepts.
pub const MIN_ZOOM: f64 = 0.5;
/// Largest zoom the viewport accepts.
pub const MAX_ZOOM: f64 = 5.0;
/// Zoom change applied per mouse-wheel notch.
pub const WHEEL_ZOOM_STEP: f64 = 0.1;

/// CSS transition used when no gesture is in flight.
const EASE_OUT_TRANSITION: &str = "transform 0.1s ease-out";

/// Viewport owns the zoom scalar and pan offset of the displayed canvas.
///
/// The canvas itself is always rasterized at the base image's intrinsic
/// resolution; the viewport only decides how that raster is placed on
/// screen. Pan is expressed in display pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Current zoom, always within `[MIN_ZOOM, MAX_ZOOM]`.
    zoom: f64,
    /// Current pan offset in display pixels.
    pan: Vec2,
    /// Whether a pan or pinch gesture is currently driving the transform.
    #[serde(skip)]
    gesture_active: bool,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            pan: Vec2::ZERO,
            gesture_active: false,
        }
    }
}

impl Viewport {
    /// Create a viewport at zoom 1 with no pan.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn pan(&self) -> Vec2 {
        self.pan
    }

    /// Set the zoom, clamped to the allowed range.
    ///
    /// Returns true if the stored zoom changed.
    pub fn set_zoom(&mut self, zoom: f64) -> bool {
        if !zoom.is_finite() {
            return false;
        }
        let clamped = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        if (clamped - self.zoom).abs() < f64::EPSILON {
            return false;
        }
        self.zoom = clamped;
        true
    }

    /// Adjust the zoom by an additive step (wheel zoom).
    ///
    /// The zoom is not anchored at the cursor: only the scale changes.
    pub fn zoom_by(&mut self, step: f64) -> bool {
        self.set_zoom(self.zoom + step)
    }

    /// Set the pan offset. Returns true if it changed.
    pub fn set_pan(&mut self, pan: Vec2) -> bool {
        if !(pan.x.is_finite() && pan.y.is_finite()) || pan == self.pan {
            return false;
        }
        self.pan = pan;
        true
    }

    /// Reset to zoom 1 with no pan.
    pub fn reset(&mut self) {
        self.zoom = 1.0;
        self.pan = Vec2::ZERO;
        self.gesture_active = false;
    }

    /// Mark the start of a pan/pinch gesture (suppresses transitions).
    pub fn begin_gesture(&mut self) {
        self.gesture_active = true;
    }

    /// Mark the end of a pan/pinch gesture.
    pub fn end_gesture(&mut self) {
        self.gesture_active = false;
    }

    pub fn is_gesture_active(&self) -> bool {
        self.gesture_active
    }

    /// The CSS transform applied to the canvas element.
    pub fn css_transform(&self) -> CssTransform {
        CssTransform {
            scale: self.zoom,
            translate: self.pan / self.zoom,
        }
    }

    /// The CSS `transition` value for the canvas element.
    pub fn css_transition(&self) -> &'static str {
        if self.gesture_active {
            "none"
        } else {
            EASE_OUT_TRANSITION
        }
    }

    /// The on-screen rectangle of the canvas element under the current
    /// transform, given its untransformed layout rectangle.
    ///
    /// With `transform-origin: center`, a layout point `p` lands at
    /// `c + zoom * (p - c) + pan` where `c` is the layout center.
    pub fn displayed_rect(&self, layout: Rect) -> Rect {
        let center = layout.center();
        let map = |p: Point| center + (p - center) * self.zoom + self.pan;
        Rect::from_points(
            map(Point::new(layout.x0, layout.y0)),
            map(Point::new(layout.x1, layout.y1)),
        )
    }
}

/// `scale(s) translate(x, y)` as applied to the canvas element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CssTransform {
    pub scale: f64,
    pub translate: Vec2,
}

impl CssTransform {
    /// Transform origin paired with this transform.
    pub const ORIGIN: &'static str = "center";
}

impl fmt::Display for CssTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "scale({}) translate({}px, {}px)",
            self.scale, self.translate.x, self.translate.y
        )
    }
}
