use crate::models::config::Theme;
use crate::services::generation::QrArtifact;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Maximum number of concurrent QR generations.
///
/// **IMPORTANT:** This is hardcoded to 1 because the UI exposes a single
/// preview surface and a single "current artifact" slot. The generate
/// control is disabled while a generation is in flight, and completions
/// carry a sequence number so a stale completion can never overwrite a
/// newer artifact (see [`crate::state::StateManager::install_artifact`]).
pub const MAX_CONCURRENT_GENERATIONS: usize = 1;

/// Pixel-size slider bounds.
pub const PIXEL_SIZE_MIN: u32 = 100;
pub const PIXEL_SIZE_MAX: u32 = 1000;

/// Margin slider bounds (pixels of padding around the symbol).
pub const MARGIN_MIN: u32 = 0;
pub const MARGIN_MAX: u32 = 50;

/// Preview zoom bounds and step, in percent.
pub const ZOOM_MIN: u32 = 50;
pub const ZOOM_MAX: u32 = 200;
pub const ZOOM_STEP: u32 = 10;

/// Maximum accepted logo upload size in bytes (5 MB).
pub const MAX_LOGO_BYTES: u64 = 5 * 1024 * 1024;

/// QR error-correction level (increasing robustness, decreasing capacity).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ErrorCorrection {
    L,
    M,
    Q,
    #[default]
    H,
}

impl ErrorCorrection {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCorrection::L => "L",
            ErrorCorrection::M => "M",
            ErrorCorrection::Q => "Q",
            ErrorCorrection::H => "H",
        }
    }

    /// Parse a stored level, falling back to the default on anything else.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_uppercase().as_str() {
            "L" => ErrorCorrection::L,
            "M" => ErrorCorrection::M,
            "Q" => ErrorCorrection::Q,
            _ => ErrorCorrection::H,
        }
    }

    /// Index into the UI selector (L, M, Q, H).
    pub fn index(self) -> usize {
        match self {
            ErrorCorrection::L => 0,
            ErrorCorrection::M => 1,
            ErrorCorrection::Q => 2,
            ErrorCorrection::H => 3,
        }
    }

    pub fn from_index(index: usize) -> Self {
        match index {
            0 => ErrorCorrection::L,
            1 => ErrorCorrection::M,
            2 => ErrorCorrection::Q,
            _ => ErrorCorrection::H,
        }
    }
}

/// Visual/encoding parameters governing a generation.
///
/// Colors are always well-formed 6-digit hex after validation
/// (see [`crate::services::color::ColorValidator`]); size and margin stay
/// within the slider bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleConfig {
    pub foreground_color: String,
    pub background_color: String,
    pub pixel_size: u32,
    pub margin: u32,
    pub error_correction: ErrorCorrection,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            foreground_color: "#3b82f6".to_string(),
            background_color: "#0f172a".to_string(),
            pixel_size: 300,
            margin: 20,
            error_correction: ErrorCorrection::H,
        }
    }
}

impl StyleConfig {
    /// Clamp size and margin into the slider bounds.
    ///
    /// Values arriving from the UI are range-bounded by construction; this
    /// guards values loaded from presets on disk.
    pub fn clamp_bounds(&mut self) {
        if self.pixel_size < PIXEL_SIZE_MIN || self.pixel_size > PIXEL_SIZE_MAX {
            tracing::warn!(
                "Preset pixel size {} out of range, clamping",
                self.pixel_size
            );
            self.pixel_size = self.pixel_size.clamp(PIXEL_SIZE_MIN, PIXEL_SIZE_MAX);
        }
        if self.margin > MARGIN_MAX {
            tracing::warn!("Preset margin {} out of range, clamping", self.margin);
            self.margin = MARGIN_MAX;
        }
    }
}

/// A raster logo loaded from disk, drawn over generated codes when the
/// overlay is enabled.
#[derive(Debug, Clone)]
pub struct LogoAsset {
    pub image: image::RgbaImage,
    pub file_name: String,
}

/// Single source of truth for all application state.
///
/// # Thread Safety
///
/// `AppState` is wrapped in `Arc<RwLock<AppState>>` by
/// [`crate::state::StateManager`] to provide thread-safe access across the
/// application. Never access `AppState` directly - always use
/// [`StateManager`](crate::state::StateManager) methods:
/// - [`read()`](crate::state::StateManager::read) for read-only access
/// - [`update()`](crate::state::StateManager::update) for mutations with automatic change events
#[derive(Clone, Debug)]
pub struct AppState {
    // Style and input
    pub style: StyleConfig,
    pub url_input: String,
    pub shorten_enabled: bool,

    // Runtime state
    pub is_generating: bool,
    pub is_shortening: bool,
    pub generation_failed: bool,

    // Generation sequencing: `started_seq` counts triggers, `completed_seq`
    // records the newest completion whose artifact was installed.
    pub started_seq: u64,
    pub completed_seq: u64,

    // The single current artifact slot. Superseded, never mutated; readers
    // hold cheap Arc snapshots that stay valid until dropped.
    pub current_artifact: Option<Arc<QrArtifact>>,

    // Shortening result, cleared when a new request starts
    pub short_url: Option<String>,

    // Logo overlay
    pub logo: Option<LogoAsset>,
    pub include_logo: bool,

    // View state
    pub zoom_percent: u32,
    pub theme: Theme,

    // Session statistics
    pub total_generated: u64,
    pub last_generated: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            style: StyleConfig::default(),
            url_input: String::new(),
            shorten_enabled: false,

            is_generating: false,
            is_shortening: false,
            generation_failed: false,

            started_seq: 0,
            completed_seq: 0,

            current_artifact: None,
            short_url: None,

            logo: None,
            include_logo: false,

            zoom_percent: 100,
            theme: Theme::Dark,

            total_generated: 0,
            last_generated: None,
        }
    }
}

impl AppState {
    /// Whether a generated code is available for download/zoom/logo use.
    pub fn has_artifact(&self) -> bool {
        self.current_artifact.is_some()
    }

    /// Human-readable last-generated label; "Never" until the first success.
    pub fn last_generated_label(&self) -> String {
        self.last_generated
            .clone()
            .unwrap_or_else(|| "Never".to_string())
    }

    /// Step the zoom level up, clamped to the maximum.
    pub fn zoom_in(&mut self) {
        self.zoom_percent = (self.zoom_percent + ZOOM_STEP).min(ZOOM_MAX);
    }

    /// Step the zoom level down, clamped to the minimum.
    pub fn zoom_out(&mut self) {
        self.zoom_percent = self.zoom_percent.saturating_sub(ZOOM_STEP).max(ZOOM_MIN);
    }

    /// Set the zoom level from the slider, clamped into bounds.
    pub fn set_zoom(&mut self, percent: u32) {
        self.zoom_percent = percent.clamp(ZOOM_MIN, ZOOM_MAX);
    }

    /// Restore the default style and clear the optional extras.
    ///
    /// The artifact, counters and theme survive a reset; the logo and the
    /// shortening state do not.
    pub fn reset_settings(&mut self) {
        self.style = StyleConfig::default();
        self.shorten_enabled = false;
        self.short_url = None;
        self.logo = None;
        self.include_logo = false;
    }
}
