//! Tool and mode selection for the editor.

use crate::annotation::Rgba;
use serde::{Deserialize, Serialize};

/// Default line width in image pixels.
pub const DEFAULT_WIDTH: f64 = 5.0;

/// Annotation tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tool {
    /// Freehand ink.
    #[default]
    Draw,
    /// Outlined circle dragged out from its center.
    Circle,
    /// Freehand eraser.
    Erase,
}

impl Tool {
    /// Get display name for this tool.
    pub fn name(self) -> &'static str {
        match self {
            Tool::Draw => "Draw",
            Tool::Circle => "Circle",
            Tool::Erase => "Erase",
        }
    }
}

/// What a single-pointer drag does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionMode {
    /// Drags draw with the active tool.
    #[default]
    Annotate,
    /// Drags pan the view; the wheel zooms.
    Pan,
}

/// Color and width applied to new annotations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Brush {
    pub color: Rgba,
    pub width: f64,
}

impl Default for Brush {
    fn default() -> Self {
        Self {
            color: Rgba::red(),
            width: DEFAULT_WIDTH,
        }
    }
}
