//! PhotoMark Core Library
//!
//! Platform-agnostic core of the PhotoMark photo annotation engine: the
//! annotation model, gesture recognition, viewport math and the image
//! acquisition chain. Rasterization lives in `photomark-render`.

pub mod annotation;
pub mod coords;
pub mod editor;
pub mod error;
pub mod gesture;
pub mod input;
pub mod storage;
pub mod tools;
pub mod viewport;

pub use annotation::{Annotation, AnnotationLog, Builder, CircleAnnotation, Rgba, StrokeAnnotation};
pub use coords::{StaticMetrics, ViewportMetrics, to_image_space};
pub use editor::{Editor, Frame, LoadTicket, RedrawTarget, SaveTicket};
pub use error::{EditorError, EditorResult};
pub use gesture::{GestureOutcome, GestureRecognizer, GestureState};
pub use input::{InputEvent, MouseButton};
pub use tools::{Brush, InteractionMode, Tool};
pub use viewport::{MAX_ZOOM, MIN_ZOOM, Viewport};
