//! Flattening the canvas to JPEG for saving and downloading.

use crate::renderer::{RasterCanvas, RendererError};
use base64::{Engine, engine::general_purpose::STANDARD};
use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, ImageEncoder, RgbImage};
use photomark_core::EditorError;
use photomark_core::editor::{Editor, SaveTicket};
use photomark_core::storage::{AnnotatedImageUploader, FetchError, UploadAck, UploadRequest};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tiny_skia::Pixmap;

/// JPEG quality used when saving back to the project.
pub const SAVE_QUALITY: f32 = 0.95;
/// JPEG quality used for local downloads.
pub const DOWNLOAD_QUALITY: f32 = 0.92;
/// MIME type of every export.
pub const JPEG_MIME: &str = "image/jpeg";

/// Export errors.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Nothing to export: {0}")]
    Render(#[from] RendererError),
    #[error("JPEG encoding failed: {0}")]
    Encode(#[from] image::ImageError),
    #[error("Upload failed: {0}")]
    Upload(#[from] FetchError),
    #[error("Download failed: {0}")]
    Download(#[from] io::Error),
}

impl From<ExportError> for EditorError {
    fn from(err: ExportError) -> Self {
        EditorError::ExportFailure(err.to_string())
    }
}

/// Map a 0..=1 quality to the encoder's 1..=100 scale.
fn quality_percent(quality: f32) -> u8 {
    (quality.clamp(0.0, 1.0) * 100.0).round().max(1.0) as u8
}

/// Composite premultiplied pixels over opaque white.
///
/// Erased regions are transparent on the canvas and JPEG has no alpha, so
/// they come out white.
pub fn flatten_rgb(pixmap: &Pixmap) -> RgbImage {
    let mut rgb = Vec::with_capacity(pixmap.pixels().len() * 3);
    for px in pixmap.pixels() {
        let under = 255 - px.alpha();
        rgb.extend_from_slice(&[
            px.red().saturating_add(under),
            px.green().saturating_add(under),
            px.blue().saturating_add(under),
        ]);
    }
    RgbImage::from_raw(pixmap.width(), pixmap.height(), rgb)
        .unwrap_or_else(|| RgbImage::new(pixmap.width(), pixmap.height()))
}

/// Encode the pixmap as a baseline JPEG at `quality` (0..=1).
pub fn encode_jpeg(pixmap: &Pixmap, quality: f32) -> Result<Vec<u8>, ExportError> {
    let rgb = flatten_rgb(pixmap);
    let mut bytes = Vec::new();
    JpegEncoder::new_with_quality(&mut bytes, quality_percent(quality)).write_image(
        rgb.as_raw(),
        rgb.width(),
        rgb.height(),
        ExtendedColorType::Rgb8,
    )?;
    log::debug!(
        "Encoded {}x{} JPEG at quality {quality}: {} bytes",
        rgb.width(),
        rgb.height(),
        bytes.len()
    );
    Ok(bytes)
}

/// Default download name: `annotated-<original stem>.jpg`.
pub fn export_filename(original: &str) -> String {
    let stem = Path::new(original)
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("image");
    format!("annotated-{stem}.jpg")
}

/// Where a save lands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveTarget {
    pub project_id: String,
    pub job_id: Option<String>,
    pub filename: String,
}

/// Flatten `canvas` into an upload payload.
///
/// Saves normally use [`SAVE_QUALITY`].
pub fn save_request(
    canvas: &RasterCanvas,
    target: &SaveTarget,
    quality: f32,
) -> Result<UploadRequest, ExportError> {
    let jpeg = encode_jpeg(canvas.surface()?, quality)?;
    Ok(UploadRequest {
        project_id: target.project_id.clone(),
        job_id: target.job_id.clone(),
        filename: target.filename.clone(),
        mime_type: JPEG_MIME.to_string(),
        base64_data: STANDARD.encode(jpeg),
    })
}

/// A flattened save waiting for its upload.
#[derive(Debug, Clone)]
pub struct PendingSave {
    pub ticket: SaveTicket,
    pub request: UploadRequest,
}

/// Capture the editor's current canvas for saving.
///
/// The editor's log is left untouched whatever the outcome.
pub fn prepare_save(
    editor: &Editor<RasterCanvas>,
    target: &SaveTarget,
    quality: f32,
) -> Result<PendingSave, ExportError> {
    let ticket = editor.begin_save().ok_or(RendererError::NoImage)?;
    let request = save_request(editor.target(), target, quality)?;
    Ok(PendingSave { ticket, request })
}

/// Outcome of an upload, tagged with the save that started it.
#[derive(Debug)]
pub struct CompletedSave {
    pub ticket: SaveTicket,
    pub result: Result<UploadAck, ExportError>,
}

impl CompletedSave {
    /// Report the result only if `editor` is still on the same image.
    ///
    /// Results for a closed or switched editor are logged and dropped.
    pub fn report(self, editor: &Editor<RasterCanvas>) -> Option<Result<UploadAck, EditorError>> {
        if !editor.is_current_save(self.ticket) {
            log::info!(
                "Ignoring save result for image {}: editor moved on",
                self.ticket.image_index
            );
            return None;
        }
        Some(self.result.map_err(EditorError::from))
    }
}

/// Hand the payload to the uploader.
pub async fn upload(pending: PendingSave, uploader: &dyn AnnotatedImageUploader) -> CompletedSave {
    let PendingSave { ticket, request } = pending;
    let filename = request.filename.clone();
    let result = uploader.upload(request).await.map_err(ExportError::from);
    match &result {
        Ok(_) => log::info!("Saved {filename}"),
        Err(e) => log::error!("Save of {filename} failed: {e}"),
    }
    CompletedSave { ticket, result }
}

/// Receives a finished download.
pub trait DownloadSink {
    /// Deliver `bytes` under `filename`, returning where they landed.
    fn deliver(&mut self, filename: &str, mime_type: &str, bytes: &[u8]) -> io::Result<PathBuf>;
}

/// Writes downloads into a directory.
///
/// Bytes go to a temporary file first and are renamed into place, so a
/// failed write never leaves a truncated download behind.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

/// Removes the partial file unless the download was committed.
struct PartialFile {
    path: PathBuf,
    committed: bool,
}

impl Drop for PartialFile {
    fn drop(&mut self) {
        if !self.committed {
            let _ = fs::remove_file(&self.path);
        }
    }
}

impl DownloadSink for DirectorySink {
    fn deliver(&mut self, filename: &str, mime_type: &str, bytes: &[u8]) -> io::Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;
        let target = self.dir.join(filename);
        let mut partial = PartialFile {
            path: self.dir.join(format!(".{filename}.part")),
            committed: false,
        };
        fs::write(&partial.path, bytes)?;
        fs::rename(&partial.path, &target)?;
        partial.committed = true;
        log::info!(
            "Downloaded {} ({mime_type}, {} bytes)",
            target.display(),
            bytes.len()
        );
        Ok(target)
    }
}

/// Flatten `canvas` and hand it to `sink`.
///
/// Downloads normally use [`DOWNLOAD_QUALITY`].
pub fn download(
    canvas: &RasterCanvas,
    sink: &mut dyn DownloadSink,
    filename: &str,
    quality: f32,
) -> Result<PathBuf, ExportError> {
    let jpeg = encode_jpeg(canvas.surface()?, quality)?;
    Ok(sink.deliver(filename, JPEG_MIME, &jpeg)?)
}
