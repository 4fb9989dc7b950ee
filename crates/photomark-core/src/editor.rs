//! Editor instance bound to one open image.
//!
//! The editor owns the annotation log, the viewport and the gesture
//! recognizer. Every change to the log, the viewport or the live preview ends
//! in exactly one call to [`RedrawTarget::redraw`]; there is no implicit
//! subscription.

use crate::annotation::{Annotation, AnnotationLog, Rgba};
use crate::coords::ViewportMetrics;
use crate::gesture::{GestureContext, GestureOutcome, GestureRecognizer, GestureState};
use crate::input::InputEvent;
use crate::tools::{Brush, InteractionMode, Tool};
use crate::viewport::Viewport;
use kurbo::Vec2;

/// Everything a repaint needs.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    pub log: &'a AnnotationLog,
    /// In-progress annotation, painted last and never part of the log.
    pub preview: Option<&'a Annotation>,
    pub viewport: &'a Viewport,
}

/// The pixel surface the editor paints into.
pub trait RedrawTarget {
    /// Decoded base image type.
    type Image;

    /// Install a new base image. The previous one, if any, is released.
    fn set_base(&mut self, image: Self::Image);

    /// Drop the base image and any pixels derived from it.
    fn release_base(&mut self);

    /// Repaint the whole surface from the base image and `frame`.
    fn redraw(&mut self, frame: &Frame<'_>);
}

/// Identifies one image-load request.
///
/// Only the ticket from the most recent [`Editor::begin_load`] can complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    pub image_index: usize,
    generation: u64,
}

/// Captured when a save starts; used to ignore late upload results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveTicket {
    pub image_index: usize,
    generation: u64,
}

/// Annotation editor for a single image at a time.
#[derive(Debug)]
pub struct Editor<T: RedrawTarget> {
    target: T,
    log: AnnotationLog,
    viewport: Viewport,
    gesture: GestureRecognizer,
    mode: InteractionMode,
    tool: Tool,
    brush: Brush,
    image_index: Option<usize>,
    /// Bumped whenever the bound image changes or the editor closes.
    generation: u64,
    loaded: bool,
    redraws: u64,
}

impl<T: RedrawTarget> Editor<T> {
    /// Create an editor with no image bound.
    pub fn new(target: T) -> Self {
        Self {
            target,
            log: AnnotationLog::new(),
            viewport: Viewport::new(),
            gesture: GestureRecognizer::new(),
            mode: InteractionMode::default(),
            tool: Tool::default(),
            brush: Brush::default(),
            image_index: None,
            generation: 0,
            loaded: false,
            redraws: 0,
        }
    }

    /// Start loading the image at `image_index`.
    ///
    /// Supersedes any load still in flight and discards the state bound to
    /// the previous image.
    pub fn begin_load(&mut self, image_index: usize) -> LoadTicket {
        self.unbind();
        self.image_index = Some(image_index);
        log::info!("Loading image {image_index}");
        LoadTicket {
            image_index,
            generation: self.generation,
        }
    }

    /// Whether `ticket` still belongs to the latest load.
    pub fn is_current_load(&self, ticket: LoadTicket) -> bool {
        ticket.generation == self.generation && self.image_index == Some(ticket.image_index)
    }

    /// Finish a load. Stale tickets are dropped and return false.
    pub fn complete_load(&mut self, ticket: LoadTicket, image: T::Image) -> bool {
        if !self.is_current_load(ticket) {
            log::warn!(
                "Discarding stale load for image {} (superseded)",
                ticket.image_index
            );
            return false;
        }
        self.target.set_base(image);
        self.loaded = true;
        self.on_mutation();
        true
    }

    /// Begin and complete a load in one step.
    pub fn load_image(&mut self, image_index: usize, image: T::Image) {
        let ticket = self.begin_load(image_index);
        self.complete_load(ticket, image);
    }

    /// Close the editor, releasing the base image and the log.
    pub fn close(&mut self) {
        self.unbind();
        self.image_index = None;
    }

    fn unbind(&mut self) {
        self.generation += 1;
        self.gesture.cancel(&mut self.viewport);
        self.log.clear();
        self.viewport.reset();
        self.target.release_base();
        self.loaded = false;
    }

    /// Feed an input event. Returns true if the canvas was repainted.
    pub fn handle_event(&mut self, event: &InputEvent, metrics: &dyn ViewportMetrics) -> bool {
        if !self.loaded {
            return false;
        }
        let ctx = GestureContext {
            mode: self.mode,
            tool: self.tool,
            brush: self.brush,
            metrics,
        };
        let outcome = self.gesture.handle(event, &ctx, &mut self.viewport);
        self.apply(outcome)
    }

    fn apply(&mut self, outcome: GestureOutcome) -> bool {
        let redraw = outcome.needs_redraw();
        if let GestureOutcome::Committed(annotation) = outcome {
            log::debug!("Committed annotation #{}", self.log.len());
            self.log.push(annotation);
        }
        if redraw {
            self.on_mutation();
        }
        redraw
    }

    /// Abort the live gesture, if any.
    pub fn cancel_gesture(&mut self) -> bool {
        let outcome = self.gesture.cancel(&mut self.viewport);
        self.apply(outcome)
    }

    pub fn set_mode(&mut self, mode: InteractionMode) {
        if mode != self.mode {
            self.cancel_gesture();
            self.mode = mode;
        }
    }

    pub fn set_tool(&mut self, tool: Tool) {
        if tool != self.tool {
            self.cancel_gesture();
            self.tool = tool;
        }
    }

    /// Set the brush color. A gesture already in progress keeps its brush.
    pub fn set_color(&mut self, color: Rgba) {
        self.brush.color = color;
    }

    /// Set the line width; non-positive or non-finite widths are ignored.
    pub fn set_width(&mut self, width: f64) {
        if width.is_finite() && width > 0.0 {
            self.brush.width = width;
        }
    }

    pub fn set_zoom(&mut self, zoom: f64) {
        if self.viewport.set_zoom(zoom) {
            self.on_mutation();
        }
    }

    pub fn set_pan(&mut self, pan: Vec2) {
        if self.viewport.set_pan(pan) {
            self.on_mutation();
        }
    }

    /// Return to zoom 1 with no pan.
    pub fn reset_view(&mut self) {
        if self.viewport != Viewport::new() {
            self.viewport.reset();
            self.on_mutation();
        }
    }

    /// Discard every annotation and repaint the bare base image.
    pub fn clear_annotations(&mut self) {
        self.gesture.cancel(&mut self.viewport);
        self.log.clear();
        if self.loaded {
            self.on_mutation();
        }
    }

    /// Replace the log with one restored from storage and repaint.
    ///
    /// Any live gesture is dropped. Ignored when no image is loaded.
    pub fn restore_annotations(&mut self, annotations: AnnotationLog) {
        if !self.loaded {
            log::warn!("Ignoring restored annotations: no image loaded");
            return;
        }
        self.gesture.cancel(&mut self.viewport);
        self.log = annotations;
        self.on_mutation();
    }

    /// Capture a save ticket, or `None` when no image is loaded.
    pub fn begin_save(&self) -> Option<SaveTicket> {
        match (self.loaded, self.image_index) {
            (true, Some(image_index)) => Some(SaveTicket {
                image_index,
                generation: self.generation,
            }),
            _ => None,
        }
    }

    /// Whether an upload started with `ticket` should still be reported.
    pub fn is_current_save(&self, ticket: SaveTicket) -> bool {
        ticket.generation == self.generation
    }

    fn on_mutation(&mut self) {
        if !self.loaded {
            return;
        }
        let preview = self.gesture.preview();
        self.target.redraw(&Frame {
            log: &self.log,
            preview: preview.as_ref(),
            viewport: &self.viewport,
        });
        self.redraws += 1;
    }

    pub fn annotations(&self) -> &AnnotationLog {
        &self.log
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn gesture_state(&self) -> &GestureState {
        self.gesture.state()
    }

    pub fn mode(&self) -> InteractionMode {
        self.mode
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn brush(&self) -> Brush {
        self.brush
    }

    pub fn image_index(&self) -> Option<usize> {
        self.image_index
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Number of repaints issued so far.
    pub fn redraw_count(&self) -> u64 {
        self.redraws
    }

    pub fn target(&self) -> &T {
        &self.target
    }
}
