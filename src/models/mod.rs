//! Data models for the QRStudio application.
//!
//! This module contains all the core data structures used throughout the application:
//! - [`AppState`]: The central state container holding the style configuration, the current
//!   artifact slot, shortening results, view state and session counters
//! - [`StyleConfig`] / [`ErrorCorrection`]: The visual/encoding parameters governing a generation
//! - [`SettingsConfig`] / [`ThemeConfig`] / [`PresetsConfig`]: The YAML documents persisted
//!   under the data directory (see [`crate::config::SettingsStore`])
//! - [`ToastKind`]: The fixed kind → glyph/color mapping for transient notifications
//! - [`MAX_CONCURRENT_GENERATIONS`]: Concurrency limit constant (always 1; a single preview
//!   surface and artifact slot exist)
//!
//! # Architecture Note
//!
//! The models are designed to be:
//! - **Serializable**: All persisted structs derive `Serialize`/`Deserialize` for YAML round-trips
//! - **Cloneable**: AppState is wrapped in `Arc<RwLock<>>` by [`StateManager`](crate::state::StateManager)
//!   for thread-safe access
//! - **Immutable**: State updates go through StateManager's `update()` method to ensure consistency

pub mod app_state;
pub mod config;
pub mod toast;

pub use app_state::{
    AppState, ErrorCorrection, LogoAsset, StyleConfig, MARGIN_MAX, MARGIN_MIN, MAX_CONCURRENT_GENERATIONS,
    MAX_LOGO_BYTES, PIXEL_SIZE_MAX, PIXEL_SIZE_MIN, ZOOM_MAX, ZOOM_MIN, ZOOM_STEP,
};
pub use config::{
    Preset, PresetsConfig, SettingsConfig, StudioSettings, Theme, ThemeConfig, MAX_SAVED_PRESETS,
};
pub use toast::{ToastKind, TOAST_DISPLAY_MS, TOAST_FADE_MS};
