//! Gesture recognizer: classifies raw input into draw, pan and pinch gestures.
//!
//! The recognizer owns a single [`GestureState`] value, so two gestures can
//! never be live at once. A second touch always preempts whatever is running.

use crate::annotation::{Annotation, Builder};
use crate::coords::{ViewportMetrics, to_image_space};
use crate::input::{InputEvent, MouseButton, touch_pair};
use crate::tools::{Brush, InteractionMode, Tool};
use crate::viewport::{Viewport, WHEEL_ZOOM_STEP};
use kurbo::{Point, Vec2};

/// Values captured when a pinch starts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PinchBaseline {
    pub start_distance: f64,
    pub start_center: Point,
    pub start_zoom: f64,
    pub start_pan: Vec2,
}

/// The one live gesture.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum GestureState {
    #[default]
    Idle,
    /// `brush` is captured at pointer-down and styles the whole gesture.
    Drawing {
        tool: Tool,
        brush: Brush,
        builder: Builder,
    },
    /// `anchor` is the pointer position minus the pan at gesture start.
    Panning { anchor: Vec2 },
    Pinching(PinchBaseline),
}

/// Result of feeding one event to the recognizer.
#[derive(Debug, Clone, PartialEq)]
pub enum GestureOutcome {
    /// Nothing changed.
    Ignored,
    /// A pan or pinch began; nothing visible changed yet.
    Started,
    /// The live builder changed.
    Preview,
    /// The builder was promoted; the caller appends it to the log.
    Committed(Annotation),
    /// Zoom or pan changed.
    ViewportChanged,
    /// The builder was discarded without committing.
    Cancelled,
    /// A pan or pinch finished.
    Ended,
}

impl GestureOutcome {
    /// Whether the canvas has to be repainted after this outcome.
    pub fn needs_redraw(&self) -> bool {
        matches!(
            self,
            GestureOutcome::Preview
                | GestureOutcome::Committed(_)
                | GestureOutcome::ViewportChanged
                | GestureOutcome::Cancelled
        )
    }
}

/// Editor settings consulted while recognizing gestures.
pub struct GestureContext<'a> {
    pub mode: InteractionMode,
    pub tool: Tool,
    pub brush: Brush,
    pub metrics: &'a dyn ViewportMetrics,
}

/// Finite state machine over [`GestureState`].
#[derive(Debug, Clone, Default)]
pub struct GestureRecognizer {
    state: GestureState,
}

impl GestureRecognizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &GestureState {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == GestureState::Idle
    }

    /// The in-progress annotation, if a drawing gesture is live.
    pub fn preview(&self) -> Option<Annotation> {
        match &self.state {
            GestureState::Drawing { brush, builder, .. } => Some(builder.preview(*brush)),
            _ => None,
        }
    }

    /// Feed one input event.
    pub fn handle(
        &mut self,
        event: &InputEvent,
        ctx: &GestureContext<'_>,
        viewport: &mut Viewport,
    ) -> GestureOutcome {
        match event {
            InputEvent::PointerDown { position, button } => {
                if *button != MouseButton::Left {
                    return GestureOutcome::Ignored;
                }
                self.begin(*position, ctx, viewport)
            }
            InputEvent::PointerMove { position } => self.track(*position, ctx, viewport),
            InputEvent::PointerUp { button, .. } => {
                if *button != MouseButton::Left {
                    return GestureOutcome::Ignored;
                }
                self.release(viewport)
            }
            InputEvent::TouchStart { touches } => match touches.as_slice() {
                [] => GestureOutcome::Ignored,
                [single] => self.begin(*single, ctx, viewport),
                _ => self.start_pinch(touches, viewport),
            },
            InputEvent::TouchMove { touches } => {
                if matches!(self.state, GestureState::Pinching(_)) {
                    self.pinch(touches, viewport)
                } else if let Some(first) = touches.first() {
                    self.track(*first, ctx, viewport)
                } else {
                    GestureOutcome::Ignored
                }
            }
            InputEvent::TouchEnd { touches } => match self.state {
                GestureState::Pinching(_) if touches.len() < 2 => self.cancel(viewport),
                GestureState::Pinching(_) => GestureOutcome::Ignored,
                _ if touches.is_empty() => self.release(viewport),
                _ => GestureOutcome::Ignored,
            },
            InputEvent::TouchCancel => self.cancel(viewport),
            InputEvent::Wheel { delta_y, .. } => {
                // A pan drag only moves the image, so zooming during it is fine.
                let free = matches!(self.state, GestureState::Idle | GestureState::Panning { .. });
                if ctx.mode != InteractionMode::Pan || !free {
                    return GestureOutcome::Ignored;
                }
                let step = InputEvent::wheel_direction(*delta_y) * WHEEL_ZOOM_STEP;
                if step != 0.0 && viewport.zoom_by(step) {
                    GestureOutcome::ViewportChanged
                } else {
                    GestureOutcome::Ignored
                }
            }
        }
    }

    /// Abort whatever is live. A drawing builder is discarded.
    pub fn cancel(&mut self, viewport: &mut Viewport) -> GestureOutcome {
        match std::mem::take(&mut self.state) {
            GestureState::Idle => GestureOutcome::Ignored,
            GestureState::Drawing { .. } => {
                log::debug!("Drawing gesture cancelled");
                GestureOutcome::Cancelled
            }
            GestureState::Panning { .. } | GestureState::Pinching(_) => {
                viewport.end_gesture();
                GestureOutcome::Ended
            }
        }
    }

    fn begin(
        &mut self,
        position: Point,
        ctx: &GestureContext<'_>,
        viewport: &mut Viewport,
    ) -> GestureOutcome {
        if !self.is_idle() {
            return GestureOutcome::Ignored;
        }
        match ctx.mode {
            InteractionMode::Pan => {
                self.state = GestureState::Panning {
                    anchor: position.to_vec2() - viewport.pan(),
                };
                viewport.begin_gesture();
                GestureOutcome::Started
            }
            InteractionMode::Annotate => {
                let Some(point) = to_image_space(ctx.metrics, position) else {
                    return GestureOutcome::Ignored;
                };
                log::debug!("{} gesture started at {:?}", ctx.tool.name(), point);
                self.state = GestureState::Drawing {
                    tool: ctx.tool,
                    brush: ctx.brush,
                    builder: Builder::start(ctx.tool, point),
                };
                GestureOutcome::Preview
            }
        }
    }

    fn track(
        &mut self,
        position: Point,
        ctx: &GestureContext<'_>,
        viewport: &mut Viewport,
    ) -> GestureOutcome {
        match &mut self.state {
            GestureState::Drawing { builder, .. } => match to_image_space(ctx.metrics, position) {
                Some(point) => {
                    builder.extend(point);
                    GestureOutcome::Preview
                }
                None => GestureOutcome::Ignored,
            },
            GestureState::Panning { anchor } => {
                if viewport.set_pan(position.to_vec2() - *anchor) {
                    GestureOutcome::ViewportChanged
                } else {
                    GestureOutcome::Ignored
                }
            }
            GestureState::Idle | GestureState::Pinching(_) => GestureOutcome::Ignored,
        }
    }

    fn release(&mut self, viewport: &mut Viewport) -> GestureOutcome {
        match std::mem::take(&mut self.state) {
            GestureState::Drawing { brush, builder, .. } => match builder.finish(brush) {
                Some(annotation) => GestureOutcome::Committed(annotation),
                None => GestureOutcome::Cancelled,
            },
            GestureState::Panning { .. } => {
                viewport.end_gesture();
                GestureOutcome::Ended
            }
            // A lifted pointer never ends a pinch; touch-end does.
            state @ GestureState::Pinching(_) => {
                self.state = state;
                GestureOutcome::Ignored
            }
            GestureState::Idle => GestureOutcome::Ignored,
        }
    }

    fn start_pinch(&mut self, touches: &[Point], viewport: &mut Viewport) -> GestureOutcome {
        let Some((center, distance)) = touch_pair(touches) else {
            return GestureOutcome::Ignored;
        };
        let previous = std::mem::replace(
            &mut self.state,
            GestureState::Pinching(PinchBaseline {
                start_distance: distance,
                start_center: center,
                start_zoom: viewport.zoom(),
                start_pan: viewport.pan(),
            }),
        );
        viewport.begin_gesture();
        if matches!(previous, GestureState::Drawing { .. }) {
            log::debug!("Second touch preempted drawing; builder discarded");
            GestureOutcome::Cancelled
        } else {
            GestureOutcome::Started
        }
    }

    fn pinch(&mut self, touches: &[Point], viewport: &mut Viewport) -> GestureOutcome {
        let GestureState::Pinching(baseline) = self.state else {
            return GestureOutcome::Ignored;
        };
        let Some((center, distance)) = touch_pair(touches) else {
            return GestureOutcome::Ignored;
        };
        let zoom = if baseline.start_distance > f64::EPSILON {
            baseline.start_zoom * (distance / baseline.start_distance)
        } else {
            baseline.start_zoom
        };
        let pan = baseline.start_pan + (center - baseline.start_center);
        let zoom_changed = viewport.set_zoom(zoom);
        let pan_changed = viewport.set_pan(pan);
        if zoom_changed || pan_changed {
            GestureOutcome::ViewportChanged
        } else {
            GestureOutcome::Ignored
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::Rgba;
    use crate::coords::StaticMetrics;
    use crate::viewport::{MAX_ZOOM, MIN_ZOOM};
    use kurbo::{Rect, Size};

    // Canvas of 200x100 shown at half size.
    fn metrics() -> StaticMetrics {
        StaticMetrics::new(Size::new(200.0, 100.0), Rect::new(0.0, 0.0, 100.0, 50.0))
    }

    fn ctx(metrics: &StaticMetrics, mode: InteractionMode, tool: Tool) -> GestureContext<'_> {
        GestureContext {
            mode,
            tool,
            brush: Brush::default(),
            metrics,
        }
    }

    fn down(x: f64, y: f64) -> InputEvent {
        InputEvent::PointerDown {
            position: Point::new(x, y),
            button: MouseButton::Left,
        }
    }

    fn moved(x: f64, y: f64) -> InputEvent {
        InputEvent::PointerMove {
            position: Point::new(x, y),
        }
    }

    fn up(x: f64, y: f64) -> InputEvent {
        InputEvent::PointerUp {
            position: Point::new(x, y),
            button: MouseButton::Left,
        }
    }

    fn touches(points: &[(f64, f64)]) -> Vec<Point> {
        points.iter().map(|&(x, y)| Point::new(x, y)).collect()
    }

    #[test]
    fn test_draw_stroke_in_image_space() {
        let m = metrics();
        let ctx = ctx(&m, InteractionMode::Annotate, Tool::Draw);
        let mut viewport = Viewport::new();
        let mut recognizer = GestureRecognizer::new();

        let outcome = recognizer.handle(&down(10.0, 10.0), &ctx, &mut viewport);
        assert_eq!(outcome, GestureOutcome::Preview);
        let outcome = recognizer.handle(&moved(20.0, 10.0), &ctx, &mut viewport);
        assert_eq!(outcome, GestureOutcome::Preview);
        let outcome = recognizer.handle(&up(20.0, 10.0), &ctx, &mut viewport);
        let GestureOutcome::Committed(Annotation::Stroke(stroke)) = outcome else {
            panic!("expected committed stroke, got {outcome:?}");
        };
        assert_eq!(stroke.points, vec![Point::new(20.0, 20.0), Point::new(40.0, 20.0)]);
        assert!(recognizer.is_idle());
    }

    #[test]
    fn test_circle_commit() {
        let m = metrics();
        let ctx = ctx(&m, InteractionMode::Annotate, Tool::Circle);
        let mut viewport = Viewport::new();
        let mut recognizer = GestureRecognizer::new();

        recognizer.handle(&down(10.0, 10.0), &ctx, &mut viewport);
        recognizer.handle(&moved(13.0, 14.0), &ctx, &mut viewport);
        let outcome = recognizer.handle(&up(13.0, 14.0), &ctx, &mut viewport);
        let GestureOutcome::Committed(Annotation::Circle(circle)) = outcome else {
            panic!("expected committed circle, got {outcome:?}");
        };
        assert_eq!(circle.center, Point::new(20.0, 20.0));
        assert!((circle.radius - 10.0).abs() < 1e-10);
    }

    #[test]
    fn test_click_without_drag_leaves_no_circle() {
        let m = metrics();
        let ctx = ctx(&m, InteractionMode::Annotate, Tool::Circle);
        let mut viewport = Viewport::new();
        let mut recognizer = GestureRecognizer::new();

        recognizer.handle(&down(10.0, 10.0), &ctx, &mut viewport);
        let outcome = recognizer.handle(&up(10.0, 10.0), &ctx, &mut viewport);
        assert_eq!(outcome, GestureOutcome::Cancelled);
    }

    #[test]
    fn test_second_pointer_down_ignored_while_drawing() {
        let m = metrics();
        let ctx = ctx(&m, InteractionMode::Annotate, Tool::Draw);
        let mut viewport = Viewport::new();
        let mut recognizer = GestureRecognizer::new();

        recognizer.handle(&down(10.0, 10.0), &ctx, &mut viewport);
        let outcome = recognizer.handle(&down(30.0, 30.0), &ctx, &mut viewport);
        assert_eq!(outcome, GestureOutcome::Ignored);
        let GestureState::Drawing {
            builder: Builder::Stroke { points, .. },
            ..
        } = recognizer.state()
        else {
            panic!("expected drawing state");
        };
        assert_eq!(points.len(), 1);
    }

    #[test]
    fn test_right_button_ignored() {
        let m = metrics();
        let ctx = ctx(&m, InteractionMode::Annotate, Tool::Draw);
        let mut viewport = Viewport::new();
        let mut recognizer = GestureRecognizer::new();
        let event = InputEvent::PointerDown {
            position: Point::new(1.0, 1.0),
            button: MouseButton::Right,
        };
        assert_eq!(recognizer.handle(&event, &ctx, &mut viewport), GestureOutcome::Ignored);
        assert!(recognizer.is_idle());
    }

    #[test]
    fn test_pan_follows_pointer() {
        let m = metrics();
        let ctx = ctx(&m, InteractionMode::Pan, Tool::Draw);
        let mut viewport = Viewport::new();
        viewport.set_pan(Vec2::new(5.0, 5.0));
        let mut recognizer = GestureRecognizer::new();

        let outcome = recognizer.handle(&down(100.0, 100.0), &ctx, &mut viewport);
        assert_eq!(outcome, GestureOutcome::Started);
        assert_eq!(viewport.css_transition(), "none");
        assert_eq!(
            recognizer.handle(&moved(130.0, 90.0), &ctx, &mut viewport),
            GestureOutcome::ViewportChanged
        );
        assert_eq!(viewport.pan(), Vec2::new(35.0, -5.0));
        assert_eq!(recognizer.handle(&up(130.0, 90.0), &ctx, &mut viewport), GestureOutcome::Ended);
        assert!(!viewport.is_gesture_active());
    }

    #[test]
    fn test_second_touch_preempts_drawing() {
        let m = metrics();
        let ctx = ctx(&m, InteractionMode::Annotate, Tool::Draw);
        let mut viewport = Viewport::new();
        let mut recognizer = GestureRecognizer::new();

        let start = InputEvent::TouchStart {
            touches: touches(&[(10.0, 10.0)]),
        };
        let moved = InputEvent::TouchMove {
            touches: touches(&[(15.0, 10.0)]),
        };
        recognizer.handle(&start, &ctx, &mut viewport);
        recognizer.handle(&moved, &ctx, &mut viewport);
        let outcome = recognizer.handle(
            &InputEvent::TouchStart { touches: touches(&[(15.0, 10.0), (45.0, 10.0)]) },
            &ctx,
            &mut viewport,
        );
        assert_eq!(outcome, GestureOutcome::Cancelled);
        assert!(matches!(recognizer.state(), GestureState::Pinching(_)));
        assert!(recognizer.preview().is_none());

        // Lifting every finger never commits the discarded stroke.
        let lifted = InputEvent::TouchEnd {
            touches: touches(&[(15.0, 10.0)]),
        };
        let end = recognizer.handle(&lifted, &ctx, &mut viewport);
        assert_eq!(end, GestureOutcome::Ended);
        let lifted = InputEvent::TouchEnd {
            touches: Vec::new(),
        };
        let end = recognizer.handle(&lifted, &ctx, &mut viewport);
        assert_eq!(end, GestureOutcome::Ignored);
        assert!(recognizer.is_idle());
    }

    #[test]
    fn test_pinch_zoom_and_pan() {
        let m = metrics();
        let ctx = ctx(&m, InteractionMode::Annotate, Tool::Draw);
        let mut viewport = Viewport::new();
        let mut recognizer = GestureRecognizer::new();

        recognizer.handle(
            &InputEvent::TouchStart { touches: touches(&[(0.0, 0.0), (100.0, 0.0)]) },
            &ctx,
            &mut viewport,
        );
        let outcome = recognizer.handle(
            &InputEvent::TouchMove { touches: touches(&[(10.0, 20.0), (210.0, 20.0)]) },
            &ctx,
            &mut viewport,
        );
        assert_eq!(outcome, GestureOutcome::ViewportChanged);
        assert!((viewport.zoom() - 2.0).abs() < 1e-10);
        assert_eq!(viewport.pan(), Vec2::new(60.0, 20.0));
    }

    #[test]
    fn test_pinch_zoom_clamped() {
        let m = metrics();
        let ctx = ctx(&m, InteractionMode::Annotate, Tool::Draw);
        let mut viewport = Viewport::new();
        let mut recognizer = GestureRecognizer::new();

        recognizer.handle(
            &InputEvent::TouchStart { touches: touches(&[(0.0, 0.0), (10.0, 0.0)]) },
            &ctx,
            &mut viewport,
        );
        recognizer.handle(
            &InputEvent::TouchMove { touches: touches(&[(0.0, 0.0), (1000.0, 0.0)]) },
            &ctx,
            &mut viewport,
        );
        assert_eq!(viewport.zoom(), MAX_ZOOM);
        recognizer.handle(
            &InputEvent::TouchMove { touches: touches(&[(0.0, 0.0), (0.1, 0.0)]) },
            &ctx,
            &mut viewport,
        );
        assert_eq!(viewport.zoom(), MIN_ZOOM);
    }

    #[test]
    fn test_wheel_only_in_pan_mode() {
        let m = metrics();
        let mut viewport = Viewport::new();
        let mut recognizer = GestureRecognizer::new();
        let wheel = InputEvent::Wheel {
            position: Point::new(10.0, 10.0),
            delta_y: -100.0,
        };

        let annotate = ctx(&m, InteractionMode::Annotate, Tool::Draw);
        assert_eq!(recognizer.handle(&wheel, &annotate, &mut viewport), GestureOutcome::Ignored);
        assert!((viewport.zoom() - 1.0).abs() < f64::EPSILON);

        let pan = ctx(&m, InteractionMode::Pan, Tool::Draw);
        assert_eq!(recognizer.handle(&wheel, &pan, &mut viewport), GestureOutcome::ViewportChanged);
        assert!((viewport.zoom() - 1.1).abs() < 1e-10);
        assert_eq!(viewport.pan(), Vec2::ZERO);
    }

    #[test]
    fn test_wheel_zooms_during_pan_drag() {
        let m = metrics();
        let pan = ctx(&m, InteractionMode::Pan, Tool::Draw);
        let mut viewport = Viewport::new();
        let mut recognizer = GestureRecognizer::new();
        let wheel = InputEvent::Wheel {
            position: Point::new(50.0, 50.0),
            delta_y: -3.0,
        };

        recognizer.handle(&down(50.0, 50.0), &pan, &mut viewport);
        recognizer.handle(&moved(60.0, 50.0), &pan, &mut viewport);
        let outcome = recognizer.handle(&wheel, &pan, &mut viewport);
        assert_eq!(outcome, GestureOutcome::ViewportChanged);
        assert!((viewport.zoom() - 1.1).abs() < 1e-10);
        assert!(matches!(recognizer.state(), GestureState::Panning { .. }));

        // The drag keeps its anchor after the zoom step.
        recognizer.handle(&moved(70.0, 50.0), &pan, &mut viewport);
        assert_eq!(viewport.pan(), Vec2::new(20.0, 0.0));
        assert_eq!(recognizer.handle(&up(70.0, 50.0), &pan, &mut viewport), GestureOutcome::Ended);
    }

    #[test]
    fn test_brush_fixed_at_pointer_down() {
        let m = metrics();
        let mut ctx = ctx(&m, InteractionMode::Annotate, Tool::Draw);
        let mut viewport = Viewport::new();
        let mut recognizer = GestureRecognizer::new();

        recognizer.handle(&down(10.0, 10.0), &ctx, &mut viewport);
        ctx.brush = Brush {
            color: Rgba::opaque(0, 0, 255),
            width: 30.0,
        };
        recognizer.handle(&moved(20.0, 10.0), &ctx, &mut viewport);
        let preview = recognizer.preview().unwrap();
        assert_eq!(preview.width(), Brush::default().width);

        let outcome = recognizer.handle(&up(20.0, 10.0), &ctx, &mut viewport);
        let GestureOutcome::Committed(Annotation::Stroke(stroke)) = outcome else {
            panic!("expected committed stroke, got {outcome:?}");
        };
        assert_eq!(stroke.color, Brush::default().color);
        assert_eq!(stroke.width, Brush::default().width);
    }

    #[test]
    fn test_wheel_clamps_at_max() {
        let m = metrics();
        let pan = ctx(&m, InteractionMode::Pan, Tool::Draw);
        let mut viewport = Viewport::new();
        viewport.set_zoom(4.95);
        let mut recognizer = GestureRecognizer::new();
        let wheel = InputEvent::Wheel {
            position: Point::ZERO,
            delta_y: -1.0,
        };
        recognizer.handle(&wheel, &pan, &mut viewport);
        assert_eq!(viewport.zoom(), MAX_ZOOM);
        assert_eq!(recognizer.handle(&wheel, &pan, &mut viewport), GestureOutcome::Ignored);
    }

    #[test]
    fn test_touch_cancel_discards_builder() {
        let m = metrics();
        let ctx = ctx(&m, InteractionMode::Annotate, Tool::Erase);
        let mut viewport = Viewport::new();
        let mut recognizer = GestureRecognizer::new();

        let start = InputEvent::TouchStart {
            touches: touches(&[(1.0, 1.0)]),
        };
        recognizer.handle(&start, &ctx, &mut viewport);
        let outcome = recognizer.handle(&InputEvent::TouchCancel, &ctx, &mut viewport);
        assert_eq!(outcome, GestureOutcome::Cancelled);
        assert!(recognizer.is_idle());
    }
}
