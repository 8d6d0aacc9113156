use crate::fit;
use crate::overlay::OverlayGeometry;
use eframe::egui::{pos2, vec2, Rect, Vec2};
use image::codecs::png::PngEncoder;
use image::imageops::{self, FilterType};
use image::{ColorType, ImageEncoder, Pixel, Rgba, RgbaImage};
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

pub const EXPORT_FILE_NAME: &str = "tshirt-design.png";

const CANVAS_FILL: Rgba<u8> = Rgba([255, 255, 255, 255]);

// Translucent light gray laid over the shirt while no logo is placed
const PLACEHOLDER_WASH: Rgba<u8> = Rgba([249, 250, 251, 191]);

// Dashed outline of the placeholder prompt, in points
const PLACEHOLDER_OUTLINE: Rgba<u8> = Rgba([209, 213, 219, 255]);
const OUTLINE_INSET: f32 = 4.0;
const OUTLINE_WIDTH: f32 = 2.0;
const OUTLINE_DASH: f32 = 6.0;
const OUTLINE_GAP: f32 = 4.0;

// Design area border. Exports start from a button click, so no file drag is
// in progress and the border is always the idle color.
const BORDER_COLOR: Rgba<u8> = Rgba([229, 231, 235, 255]);
const BORDER_WIDTH: f32 = 2.0;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Image encoding error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Export task failed: {0}")]
    JoinError(#[from] tokio::task::JoinError),
}

#[derive(Debug, Clone)]
pub struct PlacedLogo {
    /// `None` when the logo couldn't be decoded; nothing gets drawn for it.
    pub image: Option<Arc<RgbaImage>>,
    pub geometry: OverlayGeometry,
}

/// The design area as currently shown: container size in points, the pixel
/// scale to render at, and the layers on top of it.
#[derive(Debug, Clone)]
pub struct SceneSnapshot {
    pub size: Vec2,
    pub scale: f32,
    pub background: Option<Arc<RgbaImage>>,
    pub logo: Option<PlacedLogo>,
}

impl SceneSnapshot {
    fn effective_scale(&self) -> f32 {
        if self.scale.is_finite() && self.scale > 0.0 {
            self.scale
        } else {
            1.0
        }
    }

    pub fn pixel_size(&self) -> (u32, u32) {
        let scale = self.effective_scale();
        (
            (self.size.x * scale).round().max(1.0) as u32,
            (self.size.y * scale).round().max(1.0) as u32,
        )
    }
}

/// Flattens the scene into one RGBA image, layered like the design area on
/// screen: background, logo or placeholder, then the border. The placeholder
/// prompt text is not drawn.
pub fn rasterize(scene: &SceneSnapshot) -> RgbaImage {
    let scale = scene.effective_scale();
    let (width, height) = scene.pixel_size();
    let mut canvas = RgbaImage::from_pixel(width, height, CANVAS_FILL);

    if let Some(background) = &scene.background {
        let (drawn, offset) = fit::cover_placement(image_size(background), vec2(width as f32, height as f32));
        draw_scaled(&mut canvas, background, drawn, offset);
    }

    match &scene.logo {
        Some(PlacedLogo {
            image: Some(logo),
            geometry,
        }) => {
            let frame = Rect::from_min_size(
                pos2(geometry.x * scale, geometry.y * scale),
                vec2(geometry.width * scale, geometry.height * scale),
            );
            let target = fit::contain_rect(image_size(logo), frame);
            draw_scaled(&mut canvas, logo, target.size(), target.min.to_vec2());
        }
        Some(PlacedLogo { image: None, .. }) => {
            log::debug!("Logo has no pixels, leaving it out of the export");
        }
        None => {
            for pixel in canvas.pixels_mut() {
                pixel.blend(&PLACEHOLDER_WASH);
            }
            draw_dashed_outline(&mut canvas, scale);
        }
    }

    draw_border(&mut canvas, scale);
    canvas
}

fn draw_border(canvas: &mut RgbaImage, scale: f32) {
    let (width, height) = canvas.dimensions();
    let band = ((BORDER_WIDTH * scale).round() as u32).max(1);
    for (x, y, pixel) in canvas.enumerate_pixels_mut() {
        if x < band || y < band || x + band >= width || y + band >= height {
            *pixel = BORDER_COLOR;
        }
    }
}

/// Strokes a dashed rectangle inset from the canvas edge. The dash pattern
/// runs clockwise from the top-left corner and carries on around corners.
fn draw_dashed_outline(canvas: &mut RgbaImage, scale: f32) {
    let (width, height) = canvas.dimensions();
    let left = OUTLINE_INSET * scale;
    let top = OUTLINE_INSET * scale;
    let right = width as f32 - OUTLINE_INSET * scale;
    let bottom = height as f32 - OUTLINE_INSET * scale;
    if right <= left || bottom <= top {
        return;
    }

    let half = OUTLINE_WIDTH * scale / 2.0;
    let dash = OUTLINE_DASH * scale;
    let period = (OUTLINE_DASH + OUTLINE_GAP) * scale;
    let (span_x, span_y) = (right - left, bottom - top);
    let on_x = |x: f32| x >= left - half && x <= right + half;
    let on_y = |y: f32| y >= top - half && y <= bottom + half;

    for (px, py, pixel) in canvas.enumerate_pixels_mut() {
        let (x, y) = (px as f32 + 0.5, py as f32 + 0.5);
        let distance = if (y - top).abs() <= half && on_x(x) {
            (x - left).clamp(0.0, span_x)
        } else if (x - right).abs() <= half && on_y(y) {
            span_x + (y - top).clamp(0.0, span_y)
        } else if (y - bottom).abs() <= half && on_x(x) {
            span_x + span_y + (right - x).clamp(0.0, span_x)
        } else if (x - left).abs() <= half && on_y(y) {
            2.0 * span_x + span_y + (bottom - y).clamp(0.0, span_y)
        } else {
            continue;
        };

        if distance % period < dash {
            *pixel = PLACEHOLDER_OUTLINE;
        }
    }
}

fn image_size(image: &RgbaImage) -> Vec2 {
    vec2(image.width() as f32, image.height() as f32)
}

fn draw_scaled(canvas: &mut RgbaImage, source: &RgbaImage, size: Vec2, offset: Vec2) {
    let width = size.x.round().max(1.0) as u32;
    let height = size.y.round().max(1.0) as u32;
    let scaled = if (width, height) == source.dimensions() {
        source.clone()
    } else {
        imageops::resize(source, width, height, FilterType::Triangle)
    };
    imageops::overlay(canvas, &scaled, offset.x.round() as i64, offset.y.round() as i64);
}

pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, ExportError> {
    let mut bytes = Vec::new();
    PngEncoder::new(&mut bytes).write_image(
        image.as_raw(),
        image.width(),
        image.height(),
        ColorType::Rgba8,
    )?;
    Ok(bytes)
}

/// Rasterizes the scene and writes it as [`EXPORT_FILE_NAME`] in `dir`,
/// replacing any earlier export.
///
/// Without a scene (the design area hasn't been laid out yet) this does
/// nothing and returns `Ok(None)`.
pub async fn export_design(
    scene: Option<SceneSnapshot>,
    dir: PathBuf,
) -> Result<Option<PathBuf>, ExportError> {
    let Some(scene) = scene else {
        log::debug!("Export requested before the design area exists, skipping");
        return Ok(None);
    };

    let png = tokio::task::spawn_blocking(move || encode_png(&rasterize(&scene))).await??;

    tokio::fs::create_dir_all(&dir).await?;
    let path = dir.join(EXPORT_FILE_NAME);
    tokio::fs::write(&path, &png).await?;
    log::info!("Exported {} bytes to {}", png.len(), path.display());

    Ok(Some(path))
}
