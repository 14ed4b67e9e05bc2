use crate::services::generation::{GenerationService, QrArtifact};
use anyhow::{Context, Result};
use camino::Utf8Path;
use image::RgbaImage;
use std::fs;

/// Build the timestamped export filename, `qr-code-<millis>.<ext>`.
pub fn export_filename(extension: &str) -> String {
    format!(
        "qr-code-{}.{}",
        chrono::Utc::now().timestamp_millis(),
        extension
    )
}

/// Serializes the current artifact to PNG or SVG files.
///
/// Purely an I/O action: exports never touch counters or state. The PNG
/// path writes the already-composited surface (logo overlay included when
/// enabled); the SVG path re-invokes the encoder in vector mode with the
/// artifact's stored URL and style.
pub struct ExportService {
    generation: GenerationService,
}

impl ExportService {
    pub fn new() -> Self {
        Self {
            generation: GenerationService::new(),
        }
    }

    /// Write a raster surface as a PNG file.
    pub fn write_png(&self, surface: &RgbaImage, path: &Utf8Path) -> Result<()> {
        surface
            .save_with_format(path.as_std_path(), image::ImageFormat::Png)
            .with_context(|| format!("Failed to write PNG: {}", path))?;

        tracing::info!("Exported PNG to {}", path);
        Ok(())
    }

    /// Re-encode the artifact as SVG markup and write it.
    pub fn write_svg(&self, artifact: &QrArtifact, path: &Utf8Path) -> Result<()> {
        let markup = self
            .generation
            .render_svg(&artifact.source_url, &artifact.style)
            .context("Failed to render SVG markup")?;

        fs::write(path.as_std_path(), markup)
            .with_context(|| format!("Failed to write SVG: {}", path))?;

        tracing::info!("Exported SVG to {}", path);
        Ok(())
    }
}

impl Default for ExportService {
    fn default() -> Self {
        Self::new()
    }
}
