//! Annotation records and the append-only annotation log.

mod builder;
mod circle;
mod list;
mod stroke;

pub use builder::{Builder, MIN_CIRCLE_RADIUS};
pub use circle::CircleAnnotation;
pub use list::AnnotationLog;
pub use stroke::StrokeAnnotation;

use kurbo::Rect;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// RGBA8 color used by annotations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    pub const fn red() -> Self {
        Self::opaque(255, 0, 0)
    }

    pub const fn black() -> Self {
        Self::opaque(0, 0, 0)
    }
}

impl Default for Rgba {
    fn default() -> Self {
        Self::red()
    }
}

/// Invalid `#rrggbb` / `#rrggbbaa` string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid hex color: {0:?}")]
pub struct ParseColorError(pub String);

impl FromStr for Rgba {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseColorError(s.to_string());
        let hex = s.strip_prefix('#').ok_or_else(err)?;
        if !hex.is_ascii() || !(hex.len() == 6 || hex.len() == 8) {
            return Err(err());
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| err());
        let a = if hex.len() == 8 { channel(6)? } else { 255 };
        Ok(Self::new(channel(0)?, channel(2)?, channel(4)?, a))
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)?;
        if self.a != 255 {
            write!(f, "{:02x}", self.a)?;
        }
        Ok(())
    }
}

/// A committed annotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Annotation {
    Stroke(StrokeAnnotation),
    Circle(CircleAnnotation),
}

impl Annotation {
    /// Area of the image touched when this annotation is painted,
    /// including the stroke width.
    pub fn bounds(&self) -> Rect {
        match self {
            Annotation::Stroke(s) => s.bounds(),
            Annotation::Circle(c) => c.bounds(),
        }
    }

    pub fn width(&self) -> f64 {
        match self {
            Annotation::Stroke(s) => s.width,
            Annotation::Circle(c) => c.width,
        }
    }

    /// Whether this annotation removes pixels instead of painting them.
    pub fn is_eraser(&self) -> bool {
        matches!(self, Annotation::Stroke(s) if s.is_eraser)
    }

    /// Check the geometry of an annotation that did not come from a
    /// builder, e.g. one read back from JSON.
    pub fn validate(&self) -> Result<(), InvalidAnnotation> {
        let width = self.width();
        if !(width.is_finite() && width > 0.0) {
            return Err(InvalidAnnotation::Width(width));
        }
        match self {
            Annotation::Stroke(s) => {
                if s.points.is_empty() {
                    return Err(InvalidAnnotation::NoPoints);
                }
                if !s.points.iter().all(|p| p.is_finite()) {
                    return Err(InvalidAnnotation::NonFinitePoint);
                }
            }
            Annotation::Circle(c) => {
                if !c.center.is_finite() {
                    return Err(InvalidAnnotation::NonFinitePoint);
                }
                if !(c.radius.is_finite() && c.radius >= 0.0) {
                    return Err(InvalidAnnotation::Radius(c.radius));
                }
            }
        }
        Ok(())
    }
}

/// Geometry a committed annotation can never have.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidAnnotation {
    #[error("stroke has no points")]
    NoPoints,
    #[error("non-finite coordinate")]
    NonFinitePoint,
    #[error("invalid line width {0}")]
    Width(f64),
    #[error("invalid circle radius {0}")]
    Radius(f64),
}

impl From<StrokeAnnotation> for Annotation {
    fn from(stroke: StrokeAnnotation) -> Self {
        Annotation::Stroke(stroke)
    }
}

impl From<CircleAnnotation> for Annotation {
    fn from(circle: CircleAnnotation) -> Self {
        Annotation::Circle(circle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Point;

    #[test]
    fn test_parse_hex() {
        assert_eq!("#00ff88".parse::<Rgba>().unwrap(), Rgba::opaque(0, 255, 136));
        assert_eq!("#ff000080".parse::<Rgba>().unwrap(), Rgba::new(255, 0, 0, 128));
        assert!("00ff88".parse::<Rgba>().is_err());
        assert!("#00ff8".parse::<Rgba>().is_err());
        assert!("#zzzzzz".parse::<Rgba>().is_err());
    }

    #[test]
    fn test_display_hex() {
        assert_eq!(Rgba::opaque(0, 255, 136).to_string(), "#00ff88");
        assert_eq!(Rgba::new(1, 2, 3, 4).to_string(), "#01020304");
    }

    #[test]
    fn test_validate_rejects_bad_geometry() {
        let empty = Annotation::from(StrokeAnnotation::new(Vec::new(), Rgba::red(), 2.0, false));
        assert_eq!(empty.validate(), Err(InvalidAnnotation::NoPoints));

        let mut circle = CircleAnnotation::new(Point::new(1.0, 1.0), 3.0, Rgba::red(), 2.0);
        assert!(Annotation::from(circle.clone()).validate().is_ok());
        circle.radius = -4.0;
        assert_eq!(
            Annotation::from(circle).validate(),
            Err(InvalidAnnotation::Radius(-4.0))
        );

        let thin = Annotation::from(StrokeAnnotation::new(
            vec![Point::new(f64::NAN, 0.0)],
            Rgba::red(),
            0.0,
            false,
        ));
        assert_eq!(thin.validate(), Err(InvalidAnnotation::Width(0.0)));
    }

    #[test]
    fn test_annotation_json_tag() {
        let circle: Annotation =
            CircleAnnotation::new(Point::new(1.0, 2.0), 3.0, Rgba::black(), 4.0).into();
        let json = serde_json::to_string(&circle).unwrap();
        assert!(json.contains(r#""kind":"circle""#));
        let back: Annotation = serde_json::from_str(&json).unwrap();
        assert_eq!(back, circle);
        assert!(!back.is_eraser());
    }
}
