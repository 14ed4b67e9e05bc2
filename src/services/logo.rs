//! Logo upload validation and compositing.
//!
//! The compositor overlays an uploaded raster, circularly clipped with a
//! white ring border, onto a generated QR raster. It is a pure function
//! over its inputs and never mutates the original surface.

use crate::models::{LogoAsset, MAX_LOGO_BYTES};
use camino::Utf8Path;
use image::{imageops, Pixel, Rgba, RgbaImage};
use std::fs;
use thiserror::Error;

/// Logo square edge as a fraction of the smaller QR dimension.
const LOGO_FRACTION: f32 = 0.2;

/// Stroke width of the white separating ring.
const RING_WIDTH: f32 = 4.0;

/// Ring radius offset beyond the logo radius.
const RING_OFFSET: f32 = 2.0;

/// Errors that can occur while loading an uploaded logo
#[derive(Error, Debug)]
pub enum LogoError {
    #[error("Not an image file")]
    NotAnImage,

    #[error("Image larger than 5 MB")]
    TooLarge,

    #[error("Failed to read logo: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to decode logo: {0}")]
    Decode(#[from] image::ImageError),
}

/// Validate and decode an uploaded logo file.
///
/// The file must carry an image MIME type and stay within
/// [`MAX_LOGO_BYTES`]; both checks run before any decoding work.
pub fn load_logo(path: &Utf8Path) -> Result<LogoAsset, LogoError> {
    let mime = mime_guess::from_path(path.as_std_path()).first_or_octet_stream();
    if mime.type_() != mime_guess::mime::IMAGE {
        return Err(LogoError::NotAnImage);
    }

    let len = fs::metadata(path.as_std_path())?.len();
    if len > MAX_LOGO_BYTES {
        return Err(LogoError::TooLarge);
    }

    let image = image::open(path.as_std_path())?.to_rgba8();
    let file_name = path
        .file_name()
        .unwrap_or("logo")
        .to_string();

    tracing::info!("Loaded logo {} ({} bytes)", file_name, len);

    Ok(LogoAsset { image, file_name })
}

/// Overlay the logo onto a generated QR raster.
///
/// Pass-through when disabled or when no asset is loaded: the returned
/// buffer is pixel-identical to the input. Otherwise the logo is drawn
/// centered inside a circular clip sized at 20 % of the smaller QR
/// dimension, and a 4-px white ring is stroked, unclipped, just outside
/// the clip to separate the logo from the modules.
pub fn apply_logo(qr: &RgbaImage, logo: Option<&LogoAsset>, enabled: bool) -> RgbaImage {
    let asset = match logo {
        Some(asset) if enabled => asset,
        _ => return qr.clone(),
    };

    let (width, height) = qr.dimensions();
    let logo_size = (width.min(height) as f32 * LOGO_FRACTION).round() as u32;
    if logo_size == 0 {
        return qr.clone();
    }

    let scaled = imageops::resize(
        &asset.image,
        logo_size,
        logo_size,
        imageops::FilterType::Triangle,
    );

    let mut out = qr.clone();
    let cx = width as f32 / 2.0;
    let cy = height as f32 / 2.0;
    let radius = logo_size as f32 / 2.0;
    let x0 = (width - logo_size) / 2;
    let y0 = (height - logo_size) / 2;

    // Logo inside the circular clip
    for dy in 0..logo_size {
        for dx in 0..logo_size {
            let px = x0 + dx;
            let py = y0 + dy;
            if distance(px, py, cx, cy) <= radius {
                let src = *scaled.get_pixel(dx, dy);
                out.get_pixel_mut(px, py).blend(&src);
            }
        }
    }

    // White ring, unclipped
    let ring_radius = radius + RING_OFFSET;
    let outer = ring_radius + RING_WIDTH / 2.0;
    let x_min = (cx - outer).floor().max(0.0) as u32;
    let x_max = ((cx + outer).ceil() as u32).min(width.saturating_sub(1));
    let y_min = (cy - outer).floor().max(0.0) as u32;
    let y_max = ((cy + outer).ceil() as u32).min(height.saturating_sub(1));

    for py in y_min..=y_max {
        for px in x_min..=x_max {
            if (distance(px, py, cx, cy) - ring_radius).abs() <= RING_WIDTH / 2.0 {
                out.put_pixel(px, py, Rgba([255, 255, 255, 255]));
            }
        }
    }

    out
}

fn distance(px: u32, py: u32, cx: f32, cy: f32) -> f32 {
    let dx = px as f32 + 0.5 - cx;
    let dy = py as f32 + 0.5 - cy;
    (dx * dx + dy * dy).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn checkerboard(edge: u32) -> RgbaImage {
        RgbaImage::from_fn(edge, edge, |x, y| {
            if (x + y) % 2 == 0 {
                Rgba([0, 0, 0, 255])
            } else {
                Rgba([255, 255, 255, 255])
            }
        })
    }

    fn red_logo(edge: u32) -> LogoAsset {
        LogoAsset {
            image: RgbaImage::from_pixel(edge, edge, Rgba([200, 30, 30, 255])),
            file_name: "logo.png".to_string(),
        }
    }

    #[test]
    fn test_pass_through_when_disabled() {
        let qr = checkerboard(120);
        let logo = red_logo(64);

        let out = apply_logo(&qr, Some(&logo), false);
        assert_eq!(out.as_raw(), qr.as_raw());
    }

    #[test]
    fn test_pass_through_when_no_logo() {
        let qr = checkerboard(120);
        let out = apply_logo(&qr, None, true);
        assert_eq!(out.as_raw(), qr.as_raw());
    }

    #[test]
    fn test_composite_preserves_dimensions_and_input() {
        let qr = checkerboard(300);
        let original = qr.clone();
        let logo = red_logo(64);

        let out = apply_logo(&qr, Some(&logo), true);

        assert_eq!(out.dimensions(), (300, 300));
        // Input untouched
        assert_eq!(qr.as_raw(), original.as_raw());
        // Output actually changed
        assert_ne!(out.as_raw(), qr.as_raw());
    }

    #[test]
    fn test_logo_lands_in_center_only() {
        let qr = checkerboard(300);
        let logo = red_logo(64);

        let out = apply_logo(&qr, Some(&logo), true);

        // Center pixel takes the logo color
        assert_eq!(out.get_pixel(150, 150), &Rgba([200, 30, 30, 255]));
        // Corners stay untouched
        assert_eq!(out.get_pixel(0, 0), qr.get_pixel(0, 0));
        assert_eq!(out.get_pixel(299, 299), qr.get_pixel(299, 299));
    }

    #[test]
    fn test_white_ring_is_stroked() {
        // All-black input makes the ring stand out unambiguously
        let qr = RgbaImage::from_pixel(300, 300, Rgba([0, 0, 0, 255]));
        let logo = red_logo(64);

        let out = apply_logo(&qr, Some(&logo), true);

        // logo_size = 60, radius = 30, ring at radius 32
        assert_eq!(out.get_pixel(150 + 32, 150), &Rgba([255, 255, 255, 255]));
        assert_eq!(out.get_pixel(150, 150 - 32), &Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn test_load_logo_rejects_non_image() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        fs::write(&path, b"plain text").unwrap();

        let utf8 = Utf8Path::from_path(&path).unwrap();
        assert!(matches!(load_logo(utf8), Err(LogoError::NotAnImage)));
    }

    #[test]
    fn test_load_logo_rejects_oversized_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.png");
        let mut file = fs::File::create(&path).unwrap();
        // 6 MB of zeros, over the 5 MB cap
        let chunk = vec![0u8; 1024 * 1024];
        for _ in 0..6 {
            file.write_all(&chunk).unwrap();
        }
        drop(file);

        let utf8 = Utf8Path::from_path(&path).unwrap();
        assert!(matches!(load_logo(utf8), Err(LogoError::TooLarge)));
    }

    #[test]
    fn test_load_logo_accepts_small_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logo.png");
        RgbaImage::from_pixel(16, 16, Rgba([10, 20, 30, 255]))
            .save(&path)
            .unwrap();

        let utf8 = Utf8Path::from_path(&path).unwrap();
        let asset = load_logo(utf8).unwrap();
        assert_eq!(asset.file_name, "logo.png");
        assert_eq!(asset.image.dimensions(), (16, 16));
    }
}
