use crate::models::StyleConfig;
use crate::services::color::hex_to_rgb;
use image::{imageops, Rgba, RgbaImage};
use qrcode::render::svg;
use qrcode::{EcLevel, QrCode};
use thiserror::Error;

/// Smallest drawable core edge, one pixel per module of the smallest
/// QR version. Keeps a degenerate size/margin combination renderable.
const MIN_CORE_EDGE: u32 = 21;

/// Errors that can occur while generating a code
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("No URL entered")]
    EmptyInput,

    #[error("Invalid color: {0}")]
    InvalidColor(String),

    #[error("Encoding failed: {0}")]
    Encoding(#[from] qrcode::types::QrError),
}

/// The rendered output of encoding a URL plus its style configuration.
///
/// Created by [`GenerationService::generate`] on each success; immutable
/// once created and superseded (not mutated) by the next generation. The
/// state manager owns the current artifact behind an `Arc`; download,
/// zoom and logo consumers hold read-only snapshots.
#[derive(Debug, Clone)]
pub struct QrArtifact {
    pub source_url: String,
    pub style: StyleConfig,
    pub pixels: RgbaImage,
}

impl QrArtifact {
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }
}

/// Trim the raw input and give it an https scheme when none is present.
///
/// Returns None for an input that is empty after trimming.
pub fn normalize_url(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if trimmed.starts_with("http") {
        Some(trimmed.to_string())
    } else {
        Some(format!("https://{}", trimmed))
    }
}

/// Service for encoding URLs into styled QR rasters and SVG markup.
///
/// Symbol encoding is delegated entirely to the `qrcode` crate; this
/// service owns URL normalization, color decoding and the margin padding
/// around the rendered symbol.
///
/// # Design Philosophy
///
/// - **Stateless**: All operations take explicit parameters; no hidden state
/// - **Framework-agnostic**: No GUI dependencies, works with any UI or CLI
/// - **Deterministic**: Identical input and style produce identical pixels
pub struct GenerationService;

impl GenerationService {
    pub fn new() -> Self {
        Self
    }

    /// Encode a raw input into a styled raster artifact.
    ///
    /// The raw input is normalized first; the rendered symbol is scaled to
    /// the configured pixel size minus the margin, then padded with the
    /// background color so the artifact edge equals the configured size.
    pub fn generate(
        &self,
        raw_input: &str,
        style: &StyleConfig,
    ) -> Result<QrArtifact, GenerationError> {
        let url = normalize_url(raw_input).ok_or(GenerationError::EmptyInput)?;
        let pixels = self.render_raster(&url, style)?;

        tracing::debug!(
            "Generated {}x{} code for {} (EC {})",
            pixels.width(),
            pixels.height(),
            url,
            style.error_correction.as_str()
        );

        Ok(QrArtifact {
            source_url: url,
            style: style.clone(),
            pixels,
        })
    }

    /// Render the symbol for `url` into an RGBA buffer per `style`.
    fn render_raster(
        &self,
        url: &str,
        style: &StyleConfig,
    ) -> Result<RgbaImage, GenerationError> {
        let dark = decode_color(&style.foreground_color)?;
        let light = decode_color(&style.background_color)?;

        let code = QrCode::with_error_correction_level(
            url.as_bytes(),
            ec_level(style.error_correction),
        )?;

        let core_edge = style
            .pixel_size
            .saturating_sub(style.margin * 2)
            .max(MIN_CORE_EDGE);

        let rendered: RgbaImage = code
            .render::<Rgba<u8>>()
            .quiet_zone(false)
            .min_dimensions(core_edge, core_edge)
            .dark_color(dark)
            .light_color(light)
            .build();

        // The renderer rounds up to whole modules; scale back so the core
        // plus margin lands exactly on the configured pixel size.
        let core = if rendered.width() != core_edge {
            imageops::resize(&rendered, core_edge, core_edge, imageops::FilterType::Nearest)
        } else {
            rendered
        };

        if style.margin == 0 {
            return Ok(core);
        }

        let edge = core_edge + style.margin * 2;
        let mut canvas = RgbaImage::from_pixel(edge, edge, light);
        imageops::overlay(&mut canvas, &core, style.margin as i64, style.margin as i64);
        Ok(canvas)
    }

    /// Render SVG markup for `url` per `style`.
    ///
    /// Used by the vector export path, which re-invokes the encoder with
    /// the artifact's stored URL and style rather than tracing the raster.
    pub fn render_svg(&self, url: &str, style: &StyleConfig) -> Result<String, GenerationError> {
        // Colors reach the markup verbatim, so make sure they are hex
        decode_color(&style.foreground_color)?;
        decode_color(&style.background_color)?;

        let code = QrCode::with_error_correction_level(
            url.as_bytes(),
            ec_level(style.error_correction),
        )?;

        let markup = code
            .render::<svg::Color>()
            .quiet_zone(style.margin > 0)
            .min_dimensions(style.pixel_size, style.pixel_size)
            .dark_color(svg::Color(&style.foreground_color))
            .light_color(svg::Color(&style.background_color))
            .build();

        Ok(markup)
    }
}

impl Default for GenerationService {
    fn default() -> Self {
        Self::new()
    }
}

fn ec_level(level: crate::models::ErrorCorrection) -> EcLevel {
    use crate::models::ErrorCorrection;
    match level {
        ErrorCorrection::L => EcLevel::L,
        ErrorCorrection::M => EcLevel::M,
        ErrorCorrection::Q => EcLevel::Q,
        ErrorCorrection::H => EcLevel::H,
    }
}

fn decode_color(hex: &str) -> Result<Rgba<u8>, GenerationError> {
    let [r, g, b] =
        hex_to_rgb(hex).ok_or_else(|| GenerationError::InvalidColor(hex.to_string()))?;
    Ok(Rgba([r, g, b, 255]))
}
