//! PhotoMark Render Library
//!
//! Raster compositing for PhotoMark: decodes base images, repaints the
//! annotation log with tiny-skia and flattens the result to JPEG.

pub mod compositor;
pub mod decode;
pub mod export;
mod renderer;

pub use decode::{DecodeError, ImageFormat, decode_bitmap};
pub use export::{
    CompletedSave, DOWNLOAD_QUALITY, DirectorySink, DownloadSink, ExportError, JPEG_MIME,
    PendingSave, SAVE_QUALITY, SaveTarget, download, encode_jpeg, export_filename, flatten_rgb,
    prepare_save, save_request, upload,
};
pub use renderer::{BaseImage, RasterCanvas, RenderResult, RendererError, render_log};
