//! Services module - Pure business logic for QR generation, styling and sharing.
//!
//! This module contains all the core business logic for turning a user-supplied URL into a
//! styled, exportable QR code. The services are **framework-agnostic** and have no dependencies
//! on the UI layer, making them testable and reusable.
//!
//! # Components
//!
//! - [`ColorValidator`]: Normalizes user-entered color strings to well-formed hex values
//!   (strict hex pass-through, CSS named colors, fixed fallback)
//! - [`GenerationService`]: URL normalization and delegation to the external `qrcode` encoder,
//!   producing [`QrArtifact`] rasters and SVG markup with the configured style
//! - [`apply_logo`] / [`load_logo`]: Upload validation (type, 5 MB cap) and the circular-clip
//!   logo overlay with its white separating ring
//! - [`ShortenerService`]: Ordered fallback across external shortening endpoints, first
//!   success wins, aggregate error after exhaustion
//! - [`ExportService`]: PNG/SVG file writes with timestamped names
//!
//! # Design Philosophy
//!
//! The services layer is designed to be:
//! - **Pure**: No side effects beyond file I/O and the shortening GETs
//! - **Async where it must be**: Only the shortening requests await; encoding is synchronous
//! - **Testable**: No hidden dependencies, all inputs are explicit parameters
//! - **Framework-agnostic**: No Slint, no GUI code, only business logic
//!
//! # Encoder Integration
//!
//! QR symbol encoding is delegated entirely to the `qrcode` crate: the services pass the
//! normalized URL and style through and never implement matrix generation, error-correction
//! encoding or rasterization themselves.

pub mod color;
pub mod export;
pub mod generation;
pub mod logo;
pub mod shortening;

pub use color::{hex_to_rgb, ColorValidator, DEFAULT_COLOR};
pub use export::{export_filename, ExportService};
pub use generation::{normalize_url, GenerationError, GenerationService, QrArtifact};
pub use logo::{apply_logo, load_logo, LogoError};
pub use shortening::{
    accept_response, build_request_url, FetchedText, HttpTextFetcher, ShortenError,
    ShortenEndpoint, ShortenerService, TextFetcher, ENDPOINTS,
};
