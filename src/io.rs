//! File-backed collaborators built on the `image` crate.
//!
//! [`FileSource`] decodes PNG/JPEG files into rasters and [`PngFileSink`]
//! encodes results as PNG. The pipeline itself never sees container formats.

use std::path::{Path, PathBuf};

use log::debug;

use crate::error::{EffectError, Result};
use crate::raster::RasterBuffer;
use crate::session::{ImageRequest, ImageSink, ImageSource, Transport};

/// Reads source images from the local filesystem.
///
/// Request URLs are paths, optionally prefixed with `file://`. Relay
/// transports are not meaningful for local files and are rejected.
#[derive(Debug, Clone, Default)]
pub struct FileSource {
    root: Option<PathBuf>,
}

impl FileSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve relative request paths against `root`.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: Some(root.into()) }
    }

    fn resolve(&self, url: &str) -> PathBuf {
        let path = Path::new(url.strip_prefix("file://").unwrap_or(url));
        match &self.root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path.to_path_buf(),
        }
    }
}

impl ImageSource for FileSource {
    fn fetch(&self, request: &ImageRequest) -> Result<RasterBuffer> {
        let failed = |reason: String| EffectError::FetchFailed {
            url: request.url.clone(),
            reason,
        };
        if request.transport != Transport::Direct {
            return Err(failed("local files cannot be fetched through a relay".into()));
        }

        let path = self.resolve(&request.url);
        debug!("decoding {}", path.display());
        let decoded = image::open(&path).map_err(|e| failed(e.to_string()))?.into_rgba8();
        let (width, height) = decoded.dimensions();
        RasterBuffer::new(width, height, decoded.into_raw())
    }
}

/// Writes PNG files into a directory.
#[derive(Debug, Clone)]
pub struct PngFileSink {
    dir: PathBuf,
}

impl PngFileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }
}

impl ImageSink for PngFileSink {
    fn save(&self, raster: &RasterBuffer, name: &str) -> Result<()> {
        let path = self.path_for(name);
        let buffer = image::RgbaImage::from_raw(
            raster.width(),
            raster.height(),
            raster.as_bytes().to_vec(),
        )
        .ok_or_else(|| EffectError::ExportFailed(format!("{name}: raster size mismatch")))?;

        buffer
            .save_with_format(&path, image::ImageFormat::Png)
            .map_err(|e| EffectError::ExportFailed(format!("{}: {e}", path.display())))?;
        debug!("wrote {}", path.display());
        Ok(())
    }
}
