//! Capturing a note's rendered view as a bitmap.

#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_possible_wrap
)] // pixel math

use std::io;
use std::path::PathBuf;

use image::imageops::{self, FilterType};
use image::{DynamicImage, GenericImageView, Rgba, RgbaImage, RgbImage};
use serde::{Deserialize, Serialize};

use crate::{Error, Note, Result};

/// Fixed layout used when capturing a view for paginated export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureOptions {
    /// Layout width of the view in CSS pixels (A4 width at 96 DPI).
    pub view_width_px: u32,
    /// Device pixels per layout pixel.
    pub scale: f64,
    /// Padding around the content in layout pixels.
    pub padding_px: u32,
    /// Background painted behind transparent content.
    pub background: [u8; 3],
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            view_width_px: 794,
            scale: 2.0,
            padding_px: 40,
            background: [0x11, 0x18, 0x27],
        }
    }
}

impl CaptureOptions {
    /// Width of the captured bitmap in device pixels.
    pub fn output_width_px(&self) -> u32 {
        scaled(self.view_width_px, self.scale)
    }

    fn padding_device_px(&self) -> u32 {
        scaled(self.padding_px, self.scale)
    }
}

fn scaled(value: u32, scale: f64) -> u32 {
    (f64::from(value) * scale).round().max(0.0) as u32
}

/// A captured bitmap of a note's rendered view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedView {
    pub image: RgbImage,
}

impl RenderedView {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

/// Source of rendered views.
///
/// Implementations return [`Error::ViewUnavailable`] when no rendered view
/// exists for the note.
#[allow(async_fn_in_trait)]
pub trait ViewCapture {
    async fn capture(&self, note: &Note, options: &CaptureOptions) -> Result<RenderedView>;
}

/// Captures from a pre-rendered image of the view stored on disk.
#[derive(Debug, Clone, Default)]
pub struct ImageFileCapture {
    path: Option<PathBuf>,
}

impl ImageFileCapture {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }
}

impl ViewCapture for ImageFileCapture {
    async fn capture(&self, note: &Note, options: &CaptureOptions) -> Result<RenderedView> {
        let Some(path) = self.path.clone() else {
            return Err(Error::ViewUnavailable(format!(
                "no rendered view supplied for note {}",
                note.id
            )));
        };

        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                return Err(Error::ViewUnavailable(format!(
                    "{} does not exist",
                    path.display()
                )));
            }
            Err(error) => return Err(error.into()),
        };

        let options = options.clone();
        let image = tokio::task::spawn_blocking(move || {
            let source = image::load_from_memory(&bytes)?;
            compose_view(&source, &options)
        })
        .await
        .map_err(|error| Error::Document(format!("Capture task failed: {error}")))??;

        tracing::debug!(
            "Captured view {}x{} from {}",
            image.width(),
            image.height(),
            path.display()
        );
        Ok(RenderedView { image })
    }
}

/// Fit `source` into the fixed capture width, pad it, and flatten it onto the
/// background color.
pub fn compose_view(source: &DynamicImage, options: &CaptureOptions) -> Result<RgbImage> {
    let (source_width, source_height) = source.dimensions();
    if source_width == 0 {
        return Err(Error::InvalidInput(
            "Rendered view has zero width".to_string(),
        ));
    }

    let width = options.output_width_px();
    let padding = options.padding_device_px();
    let inner_width = width.saturating_sub(padding * 2);
    if inner_width == 0 {
        return Err(Error::InvalidInput(format!(
            "Capture width {width}px leaves no room inside {padding}px padding"
        )));
    }

    let inner_height = (f64::from(source_height) * f64::from(inner_width)
        / f64::from(source_width))
    .round() as u32;
    let content = imageops::resize(&source.to_rgba8(), inner_width, inner_height, FilterType::Triangle);

    let [r, g, b] = options.background;
    let mut canvas = RgbaImage::from_pixel(width, inner_height + padding * 2, Rgba([r, g, b, 255]));
    imageops::overlay(&mut canvas, &content, i64::from(padding), i64::from(padding));

    Ok(DynamicImage::ImageRgba8(canvas).to_rgb8())
}
