use base64::{engine::general_purpose::STANDARD, Engine as _};
use eframe::egui::DroppedFile;
use image::{ImageFormat, RgbaImage};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

/// Extensions offered by the file picker. Drops are not filtered.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp", "bmp", "ico", "tiff"];

const FALLBACK_MIME: &str = "application/octet-stream";

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Decode task failed: {0}")]
    JoinError(#[from] tokio::task::JoinError),
}

/// Where a logo comes from: a file on disk, or the content of a drop that
/// carries bytes instead of a path.
#[derive(Debug, Clone)]
pub enum LogoSource {
    Path(PathBuf),
    Bytes { name: String, bytes: Arc<[u8]> },
}

impl LogoSource {
    pub fn from_dropped(file: &DroppedFile) -> Option<Self> {
        if let Some(path) = &file.path {
            return Some(LogoSource::Path(path.clone()));
        }
        file.bytes.as_ref().map(|bytes| LogoSource::Bytes {
            name: file.name.clone(),
            bytes: bytes.clone(),
        })
    }

    pub fn name(&self) -> String {
        match self {
            LogoSource::Path(path) => path
                .file_name()
                .unwrap_or_default()
                .to_string_lossy()
                .to_string(),
            LogoSource::Bytes { name, .. } => name.clone(),
        }
    }
}

/// Only the first entry of a drop is ever used.
pub fn first_source(files: &[DroppedFile]) -> Option<LogoSource> {
    files.first().and_then(LogoSource::from_dropped)
}

/// An uploaded logo: the raw file content plus whatever could be decoded
/// from it. Content that isn't an image still makes an asset; it just has
/// no pixels and renders as a broken image.
#[derive(Clone)]
pub struct LogoAsset {
    pub name: String,
    pub mime: &'static str,
    bytes: Arc<[u8]>,
    image: Option<Arc<RgbaImage>>,
}

impl LogoAsset {
    pub fn from_bytes(name: String, bytes: Arc<[u8]>) -> Self {
        let format = image::guess_format(&bytes).ok();
        let image = image::load_from_memory(&bytes)
            .map(|decoded| Arc::new(decoded.to_rgba8()))
            .map_err(|e| log::warn!("{} is not a displayable image: {}", name, e))
            .ok();

        Self {
            mime: format.map(mime_type).unwrap_or(FALLBACK_MIME),
            name,
            bytes,
            image,
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn image(&self) -> Option<&Arc<RgbaImage>> {
        self.image.as_ref()
    }

    pub fn is_renderable(&self) -> bool {
        self.image.is_some()
    }

    /// Inline `data:` URI for the original file content.
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime, STANDARD.encode(&self.bytes))
    }
}

impl fmt::Debug for LogoAsset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogoAsset")
            .field("name", &self.name)
            .field("mime", &self.mime)
            .field("len", &self.bytes.len())
            .field("dimensions", &self.image.as_ref().map(|img| img.dimensions()))
            .finish()
    }
}

fn mime_type(format: ImageFormat) -> &'static str {
    match format {
        ImageFormat::Png => "image/png",
        ImageFormat::Jpeg => "image/jpeg",
        ImageFormat::Gif => "image/gif",
        ImageFormat::WebP => "image/webp",
        ImageFormat::Bmp => "image/bmp",
        ImageFormat::Ico => "image/x-icon",
        ImageFormat::Tiff => "image/tiff",
        _ => FALLBACK_MIME,
    }
}

/// Reads and decodes a logo off the UI thread.
pub async fn load_logo(source: LogoSource) -> Result<LogoAsset, LoadError> {
    let name = source.name();
    let bytes: Arc<[u8]> = match source {
        LogoSource::Path(path) => {
            log::info!("Reading logo from {}", path.display());
            tokio::fs::read(&path).await?.into()
        }
        LogoSource::Bytes { bytes, .. } => bytes,
    };
    log::debug!("Read {} bytes for {}", bytes.len(), name);

    let asset = tokio::task::spawn_blocking(move || LogoAsset::from_bytes(name, bytes)).await?;
    Ok(asset)
}
