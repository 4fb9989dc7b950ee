//! Raster surface the editor paints into.

use crate::compositor;
use photomark_core::annotation::AnnotationLog;
use photomark_core::editor::{Frame, RedrawTarget};
use thiserror::Error;
use tiny_skia::{ColorU8, IntSize, Pixmap};

/// Renderer errors.
#[derive(Debug, Error)]
pub enum RendererError {
    #[error("No image loaded")]
    NoImage,
    #[error("Surface allocation failed for {width}x{height}")]
    Surface { width: u32, height: u32 },
}

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RendererError>;

/// Decoded base image in premultiplied RGBA at intrinsic resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct BaseImage {
    pixmap: Pixmap,
}

impl BaseImage {
    /// Build from straight (non-premultiplied) RGBA8 rows.
    ///
    /// Returns `None` for zero or mismatched dimensions.
    pub fn from_rgba8(width: u32, height: u32, rgba: &[u8]) -> Option<Self> {
        let size = IntSize::from_wh(width, height)?;
        if rgba.len() != width as usize * height as usize * 4 {
            return None;
        }
        let data = rgba
            .chunks_exact(4)
            .flat_map(|px| {
                let c = ColorU8::from_rgba(px[0], px[1], px[2], px[3]).premultiply();
                [c.red(), c.green(), c.blue(), c.alpha()]
            })
            .collect();
        Pixmap::from_vec(data, size).map(|pixmap| Self { pixmap })
    }

    /// Wrap an already premultiplied pixmap.
    pub fn from_pixmap(pixmap: Pixmap) -> Self {
        Self { pixmap }
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }
}

/// Canvas pixel buffer sized to the base image.
///
/// Holds the decoded base and the composited surface; the viewport never
/// affects these pixels, only how the host displays them.
#[derive(Debug, Default)]
pub struct RasterCanvas {
    base: Option<BaseImage>,
    surface: Option<Pixmap>,
}

impl RasterCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    /// Surface dimensions, if an image is bound.
    pub fn size(&self) -> Option<(u32, u32)> {
        self.surface.as_ref().map(|s| (s.width(), s.height()))
    }

    pub fn base(&self) -> Option<&BaseImage> {
        self.base.as_ref()
    }

    /// The composited surface.
    pub fn surface(&self) -> RenderResult<&Pixmap> {
        self.surface.as_ref().ok_or(RendererError::NoImage)
    }
}

impl RedrawTarget for RasterCanvas {
    type Image = BaseImage;

    fn set_base(&mut self, image: BaseImage) {
        log::debug!("Binding base image {}x{}", image.width(), image.height());
        self.surface = Some(image.pixmap.clone());
        self.base = Some(image);
    }

    fn release_base(&mut self) {
        self.base = None;
        self.surface = None;
    }

    fn redraw(&mut self, frame: &Frame<'_>) {
        let (Some(base), Some(surface)) = (&self.base, &mut self.surface) else {
            return;
        };
        compositor::composite(surface, base.pixmap(), frame.log, frame.preview);
    }
}

/// Composite `log` over `base` into a fresh pixmap.
pub fn render_log(base: &BaseImage, log: &AnnotationLog) -> RenderResult<Pixmap> {
    let mut surface = Pixmap::new(base.width(), base.height()).ok_or(RendererError::Surface {
        width: base.width(),
        height: base.height(),
    })?;
    compositor::composite(&mut surface, base.pixmap(), log, None);
    Ok(surface)
}
