//! Painter's-algorithm compositing of annotations onto a pixmap.
//!
//! The output is a pure function of the base image and the log order:
//! every repaint starts from a copy of the base and replays each annotation
//! with its own blend mode, so the same inputs always give the same bytes.

use kurbo::{BezPath, PathEl};
use photomark_core::annotation::{Annotation, CircleAnnotation, Rgba, StrokeAnnotation};
use tiny_skia::{
    BlendMode, FillRule, LineCap, LineJoin, Paint, Path, PathBuilder, Pixmap, Stroke, Transform,
};

/// Repaint `target` from `base`, then the log, then the live preview.
///
/// `target` must have the same dimensions as `base`.
pub fn composite<'a>(
    target: &mut Pixmap,
    base: &Pixmap,
    annotations: impl IntoIterator<Item = &'a Annotation>,
    preview: Option<&Annotation>,
) {
    debug_assert_eq!(
        (target.width(), target.height()),
        (base.width(), base.height()),
        "surface and base image sizes differ"
    );
    target.data_mut().copy_from_slice(base.data());
    for annotation in annotations {
        paint_annotation(target, annotation);
    }
    if let Some(preview) = preview {
        paint_annotation(target, preview);
    }
}

/// Paint one annotation on top of whatever the pixmap holds.
pub fn paint_annotation(pixmap: &mut Pixmap, annotation: &Annotation) {
    match annotation {
        Annotation::Stroke(stroke) => paint_stroke(pixmap, stroke),
        Annotation::Circle(circle) => paint_circle(pixmap, circle),
    }
}

fn paint_for(color: Rgba, blend_mode: BlendMode) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(color.r, color.g, color.b, color.a);
    paint.anti_alias = true;
    paint.blend_mode = blend_mode;
    paint
}

fn round_stroke(width: f64) -> Stroke {
    Stroke {
        width: width as f32,
        line_cap: LineCap::Round,
        line_join: LineJoin::Round,
        ..Default::default()
    }
}

fn paint_stroke(pixmap: &mut Pixmap, stroke: &StrokeAnnotation) {
    if stroke.is_empty() || stroke.width <= 0.0 {
        return;
    }
    // Erasing removes coverage completely whatever the brush alpha.
    let paint = if stroke.is_eraser {
        paint_for(Rgba::black(), BlendMode::DestinationOut)
    } else {
        paint_for(stroke.color, BlendMode::SourceOver)
    };

    // A zero-length polyline paints its round cap: a dot of diameter `width`.
    if stroke.is_dot() {
        let center = stroke.points[0];
        if let Some(dot) =
            PathBuilder::from_circle(center.x as f32, center.y as f32, (stroke.width / 2.0) as f32)
        {
            pixmap.fill_path(&dot, &paint, FillRule::Winding, Transform::identity(), None);
        }
        return;
    }

    if let Some(path) = to_skia_path(&stroke.to_path()) {
        pixmap.stroke_path(
            &path,
            &paint,
            &round_stroke(stroke.width),
            Transform::identity(),
            None,
        );
    }
}

fn paint_circle(pixmap: &mut Pixmap, circle: &CircleAnnotation) {
    if circle.radius <= 0.0 || circle.width <= 0.0 {
        return;
    }
    let paint = paint_for(circle.color, BlendMode::SourceOver);
    if let Some(path) = to_skia_path(&circle.to_path()) {
        pixmap.stroke_path(
            &path,
            &paint,
            &round_stroke(circle.width),
            Transform::identity(),
            None,
        );
    }
}

/// Convert a kurbo path into a tiny-skia path.
fn to_skia_path(path: &BezPath) -> Option<Path> {
    let mut pb = PathBuilder::new();
    for el in path.elements() {
        match *el {
            PathEl::MoveTo(p) => pb.move_to(p.x as f32, p.y as f32),
            PathEl::LineTo(p) => pb.line_to(p.x as f32, p.y as f32),
            PathEl::QuadTo(p1, p2) => {
                pb.quad_to(p1.x as f32, p1.y as f32, p2.x as f32, p2.y as f32)
            }
            PathEl::CurveTo(p1, p2, p3) => pb.cubic_to(
                p1.x as f32,
                p1.y as f32,
                p2.x as f32,
                p2.y as f32,
                p3.x as f32,
                p3.y as f32,
            ),
            PathEl::ClosePath => pb.close(),
        }
    }
    pb.finish()
}
