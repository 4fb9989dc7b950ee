//! Subcommand implementations.

use crate::config::AppConfig;
use crate::error::CliError;
use clap::Args;
use kurbo::{Rect, Size, Vec2};
use photomark_core::editor::Editor;
use photomark_core::input::InputEvent;
use photomark_core::storage::{
    self, AnnotatedImageUploader, BitmapFetcher, ImageSource, PresignedUrlProvider, UploadAck,
};
use photomark_core::tools::{InteractionMode, Tool};
use photomark_core::{AnnotationLog, EditorError, StaticMetrics};
use photomark_render::{
    BaseImage, DirectorySink, RasterCanvas, SaveTarget, decode_bitmap, download, export_filename,
    prepare_save, upload,
};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Args, Debug, Clone)]
pub struct RenderArgs {
    /// Base image (PNG, JPEG or WebP).
    #[arg(long)]
    pub image: PathBuf,
    /// Annotation log as JSON.
    #[arg(long)]
    pub annotations: PathBuf,
    /// Output JPEG; defaults to `annotated-<name>.jpg` in the download directory.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct AnnotateArgs {
    #[arg(long)]
    pub image: PathBuf,
    /// Recorded input script as a JSON array.
    #[arg(long)]
    pub events: PathBuf,
    /// Laid-out size of the displayed image at zoom 1, e.g. `400x300`.
    /// Defaults to the image's own size.
    #[arg(long)]
    pub display: Option<String>,
    #[arg(long)]
    pub out: Option<PathBuf>,
    /// Also write the resulting annotation log here.
    #[arg(long)]
    pub log_out: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct FetchArgs {
    #[arg(long)]
    pub file_id: String,
    /// Previously issued preview URL, tried first.
    #[arg(long)]
    pub preview_url: Option<String>,
    /// Previously issued full-size URL.
    #[arg(long)]
    pub full_url: Option<String>,
    #[arg(long)]
    pub out: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct SaveArgs {
    #[arg(long)]
    pub image: PathBuf,
    #[arg(long)]
    pub annotations: PathBuf,
    #[arg(long)]
    pub project: String,
    #[arg(long)]
    pub job: Option<String>,
    /// Upload filename; defaults to `annotated-<name>.jpg`.
    #[arg(long)]
    pub filename: Option<String>,
}

/// One step of a recorded annotate script.
///
/// Steps are either raw input events (tagged by `type`) or editor
/// commands (tagged by `command`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ScriptStep {
    Event(InputEvent),
    Command(EditorCommand),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum EditorCommand {
    SetTool { tool: Tool },
    SetMode { mode: InteractionMode },
    SetColor { color: String },
    SetWidth { width: f64 },
    SetZoom { zoom: f64 },
    SetPan { x: f64, y: f64 },
    ResetView,
    Clear,
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, CliError> {
    let text = fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| CliError::Json {
        path: path.to_path_buf(),
        source,
    })
}

fn read_image(path: &Path) -> Result<BaseImage, CliError> {
    let bytes = fs::read(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(decode_bitmap(&bytes)?)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Split an explicit output path into a sink and filename, or fall back to
/// the download directory.
fn output_for(config: &AppConfig, out: Option<&Path>, image: &Path) -> (DirectorySink, String) {
    match out {
        Some(out) => {
            let dir = out
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or(Path::new("."));
            (DirectorySink::new(dir), file_name(out))
        }
        None => (
            DirectorySink::new(&config.download_dir),
            export_filename(&file_name(image)),
        ),
    }
}

/// Parse `WIDTHxHEIGHT`.
pub fn parse_display(value: &str) -> Result<Size, CliError> {
    let err = || CliError::DisplaySize(value.to_string());
    let (w, h) = value.split_once(['x', 'X']).ok_or_else(err)?;
    let w: f64 = w.trim().parse().map_err(|_| err())?;
    let h: f64 = h.trim().parse().map_err(|_| err())?;
    if !(w.is_finite() && h.is_finite() && w > 0.0 && h > 0.0) {
        return Err(err());
    }
    Ok(Size::new(w, h))
}

fn editor_for(config: &AppConfig, image: BaseImage) -> Result<Editor<RasterCanvas>, CliError> {
    let brush = config.brush()?;
    let mut editor = Editor::new(RasterCanvas::new());
    editor.set_color(brush.color);
    editor.set_width(brush.width);
    editor.load_image(0, image);
    Ok(editor)
}

/// Composite a stored annotation log over an image and write a JPEG.
pub fn render(config: &AppConfig, args: &RenderArgs) -> Result<PathBuf, CliError> {
    let image = read_image(&args.image)?;
    let annotations: AnnotationLog = read_json(&args.annotations)?;
    let mut editor = editor_for(config, image)?;
    editor.restore_annotations(annotations);

    let (mut sink, filename) = output_for(config, args.out.as_deref(), &args.image);
    Ok(download(
        editor.target(),
        &mut sink,
        &filename,
        config.download_quality,
    )?)
}

/// Replay `steps` through `editor`.
///
/// The image is laid out at `layout` (origin top-left) and the viewport's
/// zoom and pan are applied to it before each event is mapped.
pub fn replay(
    editor: &mut Editor<RasterCanvas>,
    steps: &[ScriptStep],
    layout: Size,
) -> Result<(), CliError> {
    let (width, height) = editor.target().size().ok_or(photomark_render::RendererError::NoImage)?;
    let canvas_size = Size::new(f64::from(width), f64::from(height));
    let layout = Rect::from_origin_size((0.0, 0.0), layout);

    for step in steps {
        match step {
            ScriptStep::Event(event) => {
                let metrics =
                    StaticMetrics::new(canvas_size, editor.viewport().displayed_rect(layout));
                editor.handle_event(event, &metrics);
            }
            ScriptStep::Command(command) => apply_command(editor, command)?,
        }
    }
    // An unfinished gesture never reaches the log.
    editor.cancel_gesture();
    Ok(())
}

fn apply_command(
    editor: &mut Editor<RasterCanvas>,
    command: &EditorCommand,
) -> Result<(), CliError> {
    match command {
        EditorCommand::SetTool { tool } => editor.set_tool(*tool),
        EditorCommand::SetMode { mode } => editor.set_mode(*mode),
        EditorCommand::SetColor { color } => editor.set_color(color.parse()?),
        EditorCommand::SetWidth { width } => editor.set_width(*width),
        EditorCommand::SetZoom { zoom } => editor.set_zoom(*zoom),
        EditorCommand::SetPan { x, y } => editor.set_pan(Vec2::new(*x, *y)),
        EditorCommand::ResetView => editor.reset_view(),
        EditorCommand::Clear => editor.clear_annotations(),
    }
    Ok(())
}

/// Replay a recorded input script against an image and write the result.
pub fn annotate(config: &AppConfig, args: &AnnotateArgs) -> Result<PathBuf, CliError> {
    let image = read_image(&args.image)?;
    let intrinsic = Size::new(f64::from(image.width()), f64::from(image.height()));
    let layout = args
        .display
        .as_deref()
        .map(parse_display)
        .transpose()?
        .unwrap_or(intrinsic);
    let steps: Vec<ScriptStep> = read_json(&args.events)?;

    let mut editor = editor_for(config, image)?;
    replay(&mut editor, &steps, layout)?;
    log::info!(
        "Replayed {} steps: {} annotations, {} repaints",
        steps.len(),
        editor.annotations().len(),
        editor.redraw_count()
    );

    if let Some(log_out) = &args.log_out {
        let json = serde_json::to_string_pretty(editor.annotations()).map_err(|source| {
            CliError::Json {
                path: log_out.clone(),
                source,
            }
        })?;
        fs::write(log_out, json).map_err(|source| CliError::Read {
            path: log_out.clone(),
            source,
        })?;
    }

    let (mut sink, filename) = output_for(config, args.out.as_deref(), &args.image);
    Ok(download(
        editor.target(),
        &mut sink,
        &filename,
        config.download_quality,
    )?)
}

/// Resolve an image through the fallback chain and store the bytes.
pub async fn fetch(
    fetcher: &dyn BitmapFetcher,
    urls: &dyn PresignedUrlProvider,
    args: &FetchArgs,
) -> Result<PathBuf, CliError> {
    let source = ImageSource {
        file_id: args.file_id.clone(),
        cached_preview_url: args.preview_url.clone(),
        cached_full_url: args.full_url.clone(),
    };
    let bytes = storage::acquire(fetcher, urls, &source)
        .await
        .map_err(EditorError::from)?;
    let image = decode_bitmap(&bytes)?;
    log::info!(
        "Fetched {} ({}x{})",
        source.file_id,
        image.width(),
        image.height()
    );
    fs::write(&args.out, &bytes).map_err(|source| CliError::Read {
        path: args.out.clone(),
        source,
    })?;
    Ok(args.out.clone())
}

/// Flatten an annotated image at save quality and upload it.
pub async fn save(
    config: &AppConfig,
    uploader: &dyn AnnotatedImageUploader,
    args: &SaveArgs,
) -> Result<UploadAck, CliError> {
    let image = read_image(&args.image)?;
    let annotations: AnnotationLog = read_json(&args.annotations)?;
    let mut editor = editor_for(config, image)?;
    editor.restore_annotations(annotations);

    let target = SaveTarget {
        project_id: args.project.clone(),
        job_id: args.job.clone(),
        filename: args
            .filename
            .clone()
            .unwrap_or_else(|| export_filename(&file_name(&args.image))),
    };
    let pending = prepare_save(&editor, &target, config.save_quality)?;
    match upload(pending, uploader).await.report(&editor) {
        Some(result) => Ok(result?),
        None => {
            let reason = "editor closed before upload finished".into();
            Err(EditorError::ExportFailure(reason).into())
        }
    }
}
