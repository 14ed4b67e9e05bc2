// GUI Controller - Bridges the Slint window with state management
//
// This module contains the StudioController which coordinates between:
// - Slint UI (MainWindow)
// - StateManager (application state)
// - Services (generation, shortening, logo, export)
// - UiDispatcher (async/GUI coordination)
//
// It handles:
// - Setting up UI callbacks → async tasks
// - Subscribing to state changes → UI updates
// - Native file dialogs
// - The toast overlay

use crate::config::SettingsStore;
use crate::metrics::Metrics;
use crate::models::{
    AppState, ErrorCorrection, Preset, PresetsConfig, ThemeConfig, Theme, ToastKind,
    TOAST_DISPLAY_MS, TOAST_FADE_MS,
};
use crate::services::color::{hex_to_rgb, ColorValidator};
use crate::services::export::{export_filename, ExportService};
use crate::services::generation::{normalize_url, GenerationService, QrArtifact};
use crate::services::logo::{apply_logo, load_logo, LogoError};
use crate::services::shortening::{HttpTextFetcher, ShortenerService};
use crate::state::{StateChange, StateManager};
use crate::ui::bridge::UiDispatcher;
use anyhow::{Context, Result};
use camino::Utf8PathBuf;
use slint::{ComponentHandle, Model, ModelRc, VecModel};
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::{Duration, Instant};

// Include the generated Slint code
slint::include_modules!();

/// GUI controller that wires the Slint window to application state and logic
///
/// This is the main coordinator for the GUI layer. It:
/// - Creates and manages the UiDispatcher for tokio/Slint coordination
/// - Sets up Slint callbacks to trigger state updates and async operations
/// - Subscribes to StateManager events and updates the UI accordingly
/// - Shows native file dialogs using the `rfd` crate
pub struct StudioController {
    /// The Slint window
    ui: MainWindow,

    /// Dispatcher coordinating between tokio and Slint
    _dispatcher: UiDispatcher<MainWindow>,

    /// Shared state manager
    _state_manager: Arc<StateManager>,

    /// Settings store for the persisted documents
    _settings_store: Arc<SettingsStore>,
}

impl StudioController {
    /// Create a new controller.
    ///
    /// # Arguments
    /// * `state_manager` - Shared application state manager
    /// * `settings_store` - Store for the persisted YAML documents
    /// * `metrics` - Shared metrics counters
    /// * `tokio_handle` - Handle to the tokio runtime for spawning async tasks
    pub fn new(
        state_manager: Arc<StateManager>,
        settings_store: Arc<SettingsStore>,
        metrics: Arc<Metrics>,
        tokio_handle: tokio::runtime::Handle,
    ) -> Result<Self> {
        let ui = MainWindow::new().context("Failed to create Slint UI")?;

        let dispatcher = UiDispatcher::new(&ui, tokio_handle);

        ui.set_toasts(ModelRc::new(VecModel::<ToastItem>::default()));

        // Saved presets live on the UI thread; the store is the durable copy
        let presets = Rc::new(RefCell::new(
            settings_store.load_presets().unwrap_or_default(),
        ));
        Self::refresh_preset_names(&ui, &presets.borrow());

        // Initialize UI with current state
        Self::apply_state(&ui, &state_manager.snapshot());

        Self::setup_callbacks(
            &ui,
            &dispatcher,
            &state_manager,
            &settings_store,
            &metrics,
            &presets,
        );

        Self::setup_state_subscription(&dispatcher, &state_manager, &metrics);

        Self::push_toast(&ui, "Welcome to QRStudio! 🎨", ToastKind::Info);

        tracing::info!("GUI controller initialized");

        Ok(Self {
            ui,
            _dispatcher: dispatcher,
            _state_manager: state_manager,
            _settings_store: settings_store,
        })
    }

    /// Run the GUI (blocks until the window is closed).
    pub fn run(self) -> Result<(), slint::PlatformError> {
        tracing::info!("Starting GUI event loop");
        self.ui.run()
    }

    // ===== UI synchronization =====

    /// Push every state field into the window.
    ///
    /// Called once at startup and again after a settings reset.
    fn apply_state(ui: &MainWindow, state: &AppState) {
        ui.set_fg_color_text(state.style.foreground_color.clone().into());
        ui.set_bg_color_text(state.style.background_color.clone().into());
        ui.set_fg_swatch(color_from_hex(&state.style.foreground_color));
        ui.set_bg_swatch(color_from_hex(&state.style.background_color));
        ui.set_size_value(state.style.pixel_size as f32);
        ui.set_margin_value(state.style.margin as f32);
        ui.set_ec_index(state.style.error_correction.index() as i32);

        ui.set_shorten_enabled(state.shorten_enabled);
        ui.set_is_shortening(state.is_shortening);
        ui.set_short_url(state.short_url.clone().unwrap_or_default().into());

        ui.set_is_generating(state.is_generating);
        ui.set_generation_failed(state.generation_failed);
        ui.set_zoom_value(state.zoom_percent as f32);
        ui.set_dark_theme(state.theme == Theme::Dark);

        ui.set_include_logo(state.include_logo);
        ui.set_logo_file_name(
            state
                .logo
                .as_ref()
                .map(|l| l.file_name.clone())
                .unwrap_or_default()
                .into(),
        );

        ui.set_total_generated(state.total_generated.to_string().into());
        ui.set_last_generated(state.last_generated_label().into());

        if let Some(artifact) = &state.current_artifact {
            ui.set_preview_image(artifact_image(artifact));
            ui.set_has_artifact(true);
            ui.set_preview_url(artifact.source_url.clone().into());
            ui.set_preview_size(format!("{}×{}px", artifact.width(), artifact.height()).into());
        } else {
            ui.set_has_artifact(false);
            ui.set_preview_url("".into());
            ui.set_preview_size("".into());
        }

        tracing::debug!("UI synchronized with state");
    }

    /// Rebuild the preset-name list shown in the window.
    fn refresh_preset_names(ui: &MainWindow, presets: &PresetsConfig) {
        let names: Vec<slint::SharedString> = presets
            .presets
            .iter()
            .map(|p| p.name.clone().into())
            .collect();
        ui.set_preset_names(ModelRc::new(VecModel::from(names)));
    }

    // ===== Toast overlay =====

    /// Append a transient notification and schedule its removal.
    fn push_toast(ui: &MainWindow, message: &str, kind: ToastKind) {
        let model = ui.get_toasts();
        let Some(toasts) = model
            .as_any()
            .downcast_ref::<VecModel<ToastItem>>()
        else {
            return;
        };

        toasts.push(ToastItem {
            message: message.into(),
            kind: kind.as_str().into(),
            glyph: kind.glyph().into(),
        });

        let ui_weak = ui.as_weak();
        slint::Timer::single_shot(
            Duration::from_millis(TOAST_DISPLAY_MS + TOAST_FADE_MS),
            move || {
                if let Some(ui) = ui_weak.upgrade() {
                    let model = ui.get_toasts();
                    if let Some(toasts) = model.as_any().downcast_ref::<VecModel<ToastItem>>() {
                        if toasts.row_count() > 0 {
                            toasts.remove(0);
                        }
                    }
                }
            },
        );
    }

    // ===== Callback wiring =====

    fn setup_callbacks(
        ui: &MainWindow,
        dispatcher: &UiDispatcher<MainWindow>,
        state_manager: &Arc<StateManager>,
        settings_store: &Arc<SettingsStore>,
        metrics: &Arc<Metrics>,
        presets: &Rc<RefCell<PresetsConfig>>,
    ) {
        let validator = Arc::new(ColorValidator::new());

        let ui_weak = ui.as_weak();
        let state = state_manager.clone();
        let dispatcher_clone = dispatcher.clone();
        let store = settings_store.clone();
        let metrics_clone = metrics.clone();

        // Generate (button and Enter key share the callback)
        ui.on_generate_requested(move || {
            if let Some(ui) = ui_weak.upgrade() {
                Self::trigger_generation(&ui, &state, &dispatcher_clone, &store, &metrics_clone);
            }
        });

        let ui_weak = ui.as_weak();
        let state = state_manager.clone();
        let dispatcher_clone = dispatcher.clone();
        let store = settings_store.clone();
        let metrics_clone = metrics.clone();

        // Quick links fill the input and generate immediately
        ui.on_quick_link_selected(move |link| {
            if let Some(ui) = ui_weak.upgrade() {
                ui.set_url_text(link);
                Self::trigger_generation(&ui, &state, &dispatcher_clone, &store, &metrics_clone);
            }
        });

        let ui_weak = ui.as_weak();
        let state = state_manager.clone();
        let dispatcher_clone = dispatcher.clone();
        let metrics_clone = metrics.clone();

        // Shorten the current URL through the external services
        ui.on_shorten_requested(move || {
            let Some(ui) = ui_weak.upgrade() else { return };

            let raw = ui.get_url_text().to_string();
            let Some(target) = normalize_url(&raw) else {
                Self::push_toast(&ui, "Please enter a URL first", ToastKind::Error);
                return;
            };
            ui.set_url_text(target.clone().into());

            if !state.begin_shortening() {
                return;
            }
            metrics_clone.record_shorten_request();

            let state = state.clone();
            let dispatcher = dispatcher_clone.clone();
            let metrics = metrics_clone.clone();
            dispatcher_clone.spawn_async(move || async move {
                let service = ShortenerService::new(HttpTextFetcher::new());
                match service.shorten(&target).await {
                    Ok(short_url) => {
                        state.finish_shortening(Some(short_url));
                        dispatcher.update_ui(|ui| {
                            Self::push_toast(ui, "URL shortened successfully!", ToastKind::Success);
                        });
                    }
                    Err(e) => {
                        tracing::error!("URL shortening error: {}", e);
                        metrics.record_shorten_failure();
                        state.finish_shortening(None);
                        dispatcher.update_ui(|ui| {
                            Self::push_toast(
                                ui,
                                "Could not shorten URL. Please try again.",
                                ToastKind::Error,
                            );
                        });
                    }
                }
            });
        });

        let ui_weak = ui.as_weak();
        let state = state_manager.clone();
        let dispatcher_clone = dispatcher.clone();
        let store = settings_store.clone();
        let metrics_clone = metrics.clone();

        // Copy the short URL into the input and regenerate
        ui.on_use_short_url(move || {
            let Some(ui) = ui_weak.upgrade() else { return };

            match state.read(|s| s.short_url.clone()) {
                Some(short_url) => {
                    ui.set_url_text(short_url.into());
                    Self::trigger_generation(&ui, &state, &dispatcher_clone, &store, &metrics_clone);
                    Self::push_toast(&ui, "Using shortened URL", ToastKind::Info);
                }
                None => {
                    Self::push_toast(&ui, "No shortened URL available", ToastKind::Error);
                }
            }
        });

        let ui_weak = ui.as_weak();
        let state = state_manager.clone();

        // Clipboard write with a manual-selection fallback
        ui.on_copy_short_url(move || {
            let Some(ui) = ui_weak.upgrade() else { return };
            let Some(short_url) = state.read(|s| s.short_url.clone()) else {
                return;
            };

            let copied = arboard::Clipboard::new().and_then(|mut cb| cb.set_text(short_url));
            match copied {
                Ok(()) => Self::push_toast(&ui, "Copied to clipboard!", ToastKind::Success),
                Err(e) => {
                    tracing::warn!("Clipboard write failed: {}", e);
                    Self::push_toast(
                        &ui,
                        "Copy failed - select the short URL text manually",
                        ToastKind::Warning,
                    );
                }
            }
        });

        let state = state_manager.clone();

        ui.on_shorten_toggled(move |enabled| {
            state.update(|s| s.shorten_enabled = enabled);
        });

        // Color text fields: validate and write the normalized value back
        let ui_weak = ui.as_weak();
        let state = state_manager.clone();
        let validator_clone = validator.clone();

        ui.on_fg_color_edited(move |text| {
            let Some(ui) = ui_weak.upgrade() else { return };
            let normalized = validator_clone.normalize(&text);
            state.update_style(|style| style.foreground_color = normalized.clone());
            ui.set_fg_color_text(normalized.clone().into());
            ui.set_fg_swatch(color_from_hex(&normalized));
        });

        let ui_weak = ui.as_weak();
        let state = state_manager.clone();
        let validator_clone = validator.clone();

        ui.on_bg_color_edited(move |text| {
            let Some(ui) = ui_weak.upgrade() else { return };
            let normalized = validator_clone.normalize(&text);
            state.update_style(|style| style.background_color = normalized.clone());
            ui.set_bg_color_text(normalized.clone().into());
            ui.set_bg_swatch(color_from_hex(&normalized));
        });

        // Color dots: design changes regenerate when an input is present
        let ui_weak = ui.as_weak();
        let state = state_manager.clone();
        let dispatcher_clone = dispatcher.clone();
        let store = settings_store.clone();
        let metrics_clone = metrics.clone();

        ui.on_fg_color_picked(move |color| {
            let Some(ui) = ui_weak.upgrade() else { return };
            let hex = hex_from_color(color);
            state.update_style(|style| style.foreground_color = hex.clone());
            ui.set_fg_color_text(hex.clone().into());
            ui.set_fg_swatch(color);
            Self::regenerate_if_input(&ui, &state, &dispatcher_clone, &store, &metrics_clone);
        });

        let ui_weak = ui.as_weak();
        let state = state_manager.clone();
        let dispatcher_clone = dispatcher.clone();
        let store = settings_store.clone();
        let metrics_clone = metrics.clone();

        ui.on_bg_color_picked(move |color| {
            let Some(ui) = ui_weak.upgrade() else { return };
            let hex = hex_from_color(color);
            state.update_style(|style| style.background_color = hex.clone());
            ui.set_bg_color_text(hex.clone().into());
            ui.set_bg_swatch(color);
            Self::regenerate_if_input(&ui, &state, &dispatcher_clone, &store, &metrics_clone);
        });

        let state = state_manager.clone();

        ui.on_size_changed(move |size| {
            state.update_style(|style| style.pixel_size = size.max(0) as u32);
        });

        let state = state_manager.clone();

        ui.on_margin_changed(move |margin| {
            state.update_style(|style| style.margin = margin.max(0) as u32);
        });

        let ui_weak = ui.as_weak();
        let state = state_manager.clone();
        let dispatcher_clone = dispatcher.clone();
        let store = settings_store.clone();
        let metrics_clone = metrics.clone();

        ui.on_size_preset_selected(move |size| {
            let Some(ui) = ui_weak.upgrade() else { return };
            ui.set_size_value(size as f32);
            state.update_style(|style| style.pixel_size = size.max(0) as u32);
            Self::regenerate_if_input(&ui, &state, &dispatcher_clone, &store, &metrics_clone);
        });

        let ui_weak = ui.as_weak();
        let state = state_manager.clone();
        let dispatcher_clone = dispatcher.clone();
        let store = settings_store.clone();
        let metrics_clone = metrics.clone();

        ui.on_ec_changed(move |index| {
            let Some(ui) = ui_weak.upgrade() else { return };
            state.update_style(|style| {
                style.error_correction = ErrorCorrection::from_index(index.max(0) as usize);
            });
            Self::regenerate_if_input(&ui, &state, &dispatcher_clone, &store, &metrics_clone);
        });

        // Downloads
        let ui_weak = ui.as_weak();
        let state = state_manager.clone();
        let metrics_clone = metrics.clone();

        ui.on_download_png(move || {
            let Some(ui) = ui_weak.upgrade() else { return };
            let snapshot = state.snapshot();
            let Some(artifact) = snapshot.current_artifact.clone() else {
                Self::push_toast(&ui, "Please generate a QR code first", ToastKind::Error);
                return;
            };

            let Some(path) = Self::show_save_dialog("Save PNG", &export_filename("png")) else {
                return;
            };

            let surface = apply_logo(&artifact.pixels, snapshot.logo.as_ref(), snapshot.include_logo);
            match ExportService::new().write_png(&surface, &path) {
                Ok(()) => {
                    metrics_clone.record_png_export();
                    Self::push_toast(&ui, "PNG downloaded successfully!", ToastKind::Success);
                }
                Err(e) => {
                    tracing::error!("PNG export failed: {:?}", e);
                    Self::push_toast(&ui, "Failed to download QR code", ToastKind::Error);
                }
            }
        });

        let ui_weak = ui.as_weak();
        let state = state_manager.clone();
        let metrics_clone = metrics.clone();

        ui.on_download_svg(move || {
            let Some(ui) = ui_weak.upgrade() else { return };
            let Some(artifact) = state.read(|s| s.current_artifact.clone()) else {
                Self::push_toast(&ui, "Please generate a QR code first", ToastKind::Error);
                return;
            };

            let Some(path) = Self::show_save_dialog("Save SVG", &export_filename("svg")) else {
                return;
            };

            match ExportService::new().write_svg(&artifact, &path) {
                Ok(()) => {
                    metrics_clone.record_svg_export();
                    Self::push_toast(&ui, "SVG downloaded successfully!", ToastKind::Success);
                }
                Err(e) => {
                    tracing::error!("SVG export failed: {:?}", e);
                    Self::push_toast(&ui, "Failed to download QR code", ToastKind::Error);
                }
            }
        });

        // Logo upload
        let ui_weak = ui.as_weak();
        let state = state_manager.clone();

        ui.on_upload_logo(move || {
            let Some(ui) = ui_weak.upgrade() else { return };

            let picked = rfd::FileDialog::new()
                .set_title("Select logo image")
                .add_filter("Images", &["png", "jpg", "jpeg", "gif", "webp", "bmp"])
                .pick_file();
            let Some(picked) = picked else { return };

            let Ok(path) = Utf8PathBuf::try_from(picked) else {
                Self::push_toast(&ui, "Could not read the selected path", ToastKind::Error);
                return;
            };

            match load_logo(&path) {
                Ok(asset) => {
                    state.set_logo(asset);
                    Self::push_toast(&ui, "Logo uploaded successfully!", ToastKind::Success);
                }
                Err(LogoError::NotAnImage) => {
                    Self::push_toast(&ui, "Please select an image file", ToastKind::Error);
                }
                Err(LogoError::TooLarge) => {
                    Self::push_toast(&ui, "Image size should be less than 5MB", ToastKind::Error);
                }
                Err(e) => {
                    tracing::error!("Logo load failed: {}", e);
                    Self::push_toast(&ui, "Could not load the logo image", ToastKind::Error);
                }
            }
        });

        let state = state_manager.clone();

        ui.on_remove_logo(move || {
            state.clear_logo();
        });

        let state = state_manager.clone();

        ui.on_include_logo_toggled(move |enabled| {
            state.update(|s| s.include_logo = enabled);
        });

        // Zoom
        let state = state_manager.clone();
        ui.on_zoom_in(move || {
            state.zoom_in();
        });

        let state = state_manager.clone();
        ui.on_zoom_out(move || {
            state.zoom_out();
        });

        let state = state_manager.clone();
        ui.on_zoom_changed(move |percent| {
            state.set_zoom(percent.max(0) as u32);
        });

        // Theme
        let state = state_manager.clone();
        let store = settings_store.clone();

        ui.on_theme_toggled(move || {
            let theme = state.toggle_theme();
            if let Err(e) = store.save_theme(&ThemeConfig { theme }) {
                tracing::error!("Failed to persist theme: {:?}", e);
            }
        });

        // Reset
        let ui_weak = ui.as_weak();
        let state = state_manager.clone();
        let dispatcher_clone = dispatcher.clone();
        let store = settings_store.clone();
        let metrics_clone = metrics.clone();

        ui.on_reset_requested(move || {
            let Some(ui) = ui_weak.upgrade() else { return };

            state.reset_settings();
            if let Err(e) = store.save_settings(&state.to_settings()) {
                tracing::error!("Failed to persist settings after reset: {:?}", e);
            }

            Self::regenerate_if_input(&ui, &state, &dispatcher_clone, &store, &metrics_clone);
            Self::push_toast(&ui, "Settings reset to defaults", ToastKind::Info);
        });

        // Presets
        let ui_weak = ui.as_weak();
        let state = state_manager.clone();
        let store = settings_store.clone();
        let presets_clone = presets.clone();

        ui.on_save_preset(move || {
            let Some(ui) = ui_weak.upgrade() else { return };

            let style = state.read(|s| s.style.clone());
            let preset = Preset {
                name: format!("Preset {}", chrono::Local::now().format("%H:%M:%S")),
                foreground_color: style.foreground_color,
                background_color: style.background_color,
                pixel_size: style.pixel_size,
                margin: style.margin,
                error_correction: style.error_correction.as_str().to_string(),
            };

            let mut presets = presets_clone.borrow_mut();
            presets.push_capped(preset);
            if let Err(e) = store.save_presets(&presets) {
                tracing::error!("Failed to persist presets: {:?}", e);
            }
            Self::refresh_preset_names(&ui, &presets);

            Self::push_toast(&ui, "Preset saved successfully!", ToastKind::Success);
        });

        let ui_weak = ui.as_weak();
        let state = state_manager.clone();
        let dispatcher_clone = dispatcher.clone();
        let store = settings_store.clone();
        let metrics_clone = metrics.clone();
        let presets_clone = presets.clone();
        let validator_clone = validator.clone();

        ui.on_preset_selected(move |index| {
            let Some(ui) = ui_weak.upgrade() else { return };

            let preset = presets_clone
                .borrow()
                .presets
                .get(index.max(0) as usize)
                .cloned();
            let Some(preset) = preset else { return };

            let fg = validator_clone.normalize(&preset.foreground_color);
            let bg = validator_clone.normalize(&preset.background_color);
            state.update_style(|style| {
                style.foreground_color = fg;
                style.background_color = bg;
                style.pixel_size = preset.pixel_size;
                style.margin = preset.margin;
                style.error_correction = ErrorCorrection::parse(&preset.error_correction);
                style.clamp_bounds();
            });

            Self::regenerate_if_input(&ui, &state, &dispatcher_clone, &store, &metrics_clone);
            Self::push_toast(&ui, &format!("Applied {}", preset.name), ToastKind::Info);
        });

        tracing::debug!("UI callbacks configured");
    }

    // ===== Generation orchestration =====

    /// Validate the input, normalize it, and run a generation on the runtime.
    ///
    /// The loading flag is cleared on every path, success or failure; the
    /// trigger stays disabled in between.
    fn trigger_generation(
        ui: &MainWindow,
        state: &Arc<StateManager>,
        dispatcher: &UiDispatcher<MainWindow>,
        store: &Arc<SettingsStore>,
        metrics: &Arc<Metrics>,
    ) {
        let raw = ui.get_url_text().to_string();
        let Some(url) = normalize_url(&raw) else {
            Self::push_toast(ui, "Please enter a URL", ToastKind::Error);
            return;
        };

        // The effective URL is written back into the field
        ui.set_url_text(url.clone().into());
        state.update(|s| s.url_input = url.clone());

        let Some(seq) = state.begin_generation() else {
            // One generation at a time; the button is disabled meanwhile
            return;
        };

        let style = state.read(|s| s.style.clone());
        let state = state.clone();
        let dispatcher_for_task = dispatcher.clone();
        let store = store.clone();
        let metrics = metrics.clone();

        dispatcher.spawn_async(move || async move {
            let service = GenerationService::new();
            let started = Instant::now();

            match service.generate(&url, &style) {
                Ok(artifact) => {
                    metrics.record_encoding_time(started.elapsed());

                    let timestamp = chrono::Local::now().format("%H:%M").to_string();
                    if state.install_artifact(seq, artifact, timestamp) {
                        metrics.record_generated();

                        if let Err(e) = store.save_settings(&state.to_settings()) {
                            tracing::error!("Failed to persist settings: {:?}", e);
                        }

                        dispatcher_for_task.update_ui(|ui| {
                            Self::push_toast(
                                ui,
                                "QR Code generated successfully!",
                                ToastKind::Success,
                            );
                        });
                    }
                }
                Err(e) => {
                    tracing::error!("Error generating QR code: {}", e);
                    metrics.record_generation_failed();
                    state.fail_generation();
                    dispatcher_for_task.update_ui(|ui| {
                        Self::push_toast(
                            ui,
                            "Failed to generate QR code. Please check your URL.",
                            ToastKind::Error,
                        );
                    });
                }
            }
        });
    }

    /// Regenerate after a design change, but only when an input is present.
    fn regenerate_if_input(
        ui: &MainWindow,
        state: &Arc<StateManager>,
        dispatcher: &UiDispatcher<MainWindow>,
        store: &Arc<SettingsStore>,
        metrics: &Arc<Metrics>,
    ) {
        if !ui.get_url_text().trim().is_empty() {
            Self::trigger_generation(ui, state, dispatcher, store, metrics);
        }
    }

    /// Show a native save dialog with a suggested filename.
    fn show_save_dialog(title: &str, suggested_name: &str) -> Option<Utf8PathBuf> {
        rfd::FileDialog::new()
            .set_title(title)
            .set_file_name(suggested_name)
            .save_file()
            .and_then(|path| {
                Utf8PathBuf::try_from(path)
                    .map_err(|e| {
                        tracing::error!("Failed to convert path to UTF-8: {}", e);
                        e
                    })
                    .ok()
            })
    }

    // ===== State subscription =====

    /// Subscribe to state changes and update the UI accordingly.
    ///
    /// Spawns a background thread that listens for state change events and
    /// marshals the matching UI updates through the dispatcher.
    fn setup_state_subscription(
        dispatcher: &UiDispatcher<MainWindow>,
        state_manager: &Arc<StateManager>,
        metrics: &Arc<Metrics>,
    ) {
        let dispatcher = dispatcher.clone();
        let state_manager = state_manager.clone();
        let metrics = metrics.clone();
        let mut rx = state_manager.subscribe();

        std::thread::spawn(move || {
            tracing::debug!("State subscription thread started");

            loop {
                match rx.blocking_recv() {
                    Ok(change) => {
                        tracing::trace!("State change received: {:?}", change);
                        metrics.record_ui_update();

                        match change {
                            StateChange::StyleChanged => {
                                let style = state_manager.read(|s| s.style.clone());
                                dispatcher.update_ui(move |ui| {
                                    ui.set_fg_color_text(style.foreground_color.clone().into());
                                    ui.set_bg_color_text(style.background_color.clone().into());
                                    ui.set_fg_swatch(color_from_hex(&style.foreground_color));
                                    ui.set_bg_swatch(color_from_hex(&style.background_color));
                                    ui.set_size_value(style.pixel_size as f32);
                                    ui.set_margin_value(style.margin as f32);
                                    ui.set_ec_index(style.error_correction.index() as i32);
                                });
                            }

                            StateChange::GenerationStarted { seq } => {
                                tracing::debug!("Generation {} started", seq);
                                dispatcher.update_ui(|ui| {
                                    ui.set_is_generating(true);
                                });
                            }

                            StateChange::GenerationFinished { total_generated } => {
                                let last = state_manager.read(|s| s.last_generated_label());
                                dispatcher.update_ui(move |ui| {
                                    ui.set_is_generating(false);
                                    ui.set_total_generated(total_generated.to_string().into());
                                    ui.set_last_generated(last.into());
                                });
                            }

                            StateChange::GenerationFailed => {
                                dispatcher.update_ui(|ui| {
                                    ui.set_generation_failed(true);
                                });
                            }

                            StateChange::ArtifactReplaced { url, width } => {
                                tracing::info!("Artifact replaced: {} ({}px)", url, width);
                                let artifact = state_manager.read(|s| s.current_artifact.clone());
                                dispatcher.update_ui(move |ui| {
                                    if let Some(artifact) = artifact {
                                        ui.set_preview_image(artifact_image(&artifact));
                                        ui.set_has_artifact(true);
                                        ui.set_generation_failed(false);
                                        ui.set_preview_url(artifact.source_url.clone().into());
                                        ui.set_preview_size(
                                            format!(
                                                "{}×{}px",
                                                artifact.width(),
                                                artifact.height()
                                            )
                                            .into(),
                                        );
                                    }
                                });
                            }

                            StateChange::ShortUrlChanged { short_url } => {
                                dispatcher.update_ui(move |ui| {
                                    ui.set_short_url(short_url.unwrap_or_default().into());
                                });
                            }

                            StateChange::ShorteningStateChanged { in_flight } => {
                                dispatcher.update_ui(move |ui| {
                                    ui.set_is_shortening(in_flight);
                                });
                            }

                            StateChange::ZoomChanged { percent } => {
                                dispatcher.update_ui(move |ui| {
                                    ui.set_zoom_value(percent as f32);
                                });
                            }

                            StateChange::ThemeChanged { theme } => {
                                dispatcher.update_ui(move |ui| {
                                    ui.set_dark_theme(theme == Theme::Dark);
                                });
                            }

                            StateChange::LogoChanged { loaded } => {
                                let snapshot = state_manager.snapshot();
                                dispatcher.update_ui(move |ui| {
                                    ui.set_include_logo(snapshot.include_logo);
                                    ui.set_logo_file_name(
                                        snapshot
                                            .logo
                                            .as_ref()
                                            .map(|l| l.file_name.clone())
                                            .unwrap_or_default()
                                            .into(),
                                    );
                                });
                                tracing::debug!("Logo changed, loaded={}", loaded);
                            }

                            StateChange::SettingsReset => {
                                let snapshot = state_manager.snapshot();
                                dispatcher.update_ui(move |ui| {
                                    StudioController::apply_state(ui, &snapshot);
                                });
                            }
                        }
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => {
                        tracing::info!(
                            "State broadcast channel closed - shutting down subscription thread"
                        );
                        break;
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(
                            "State subscription lagged - {} events were skipped",
                            skipped
                        );
                        // Continue receiving - this is a recoverable error
                    }
                }
            }

            tracing::debug!("State subscription thread terminated gracefully");
        });
    }
}

/// Convert an artifact's raster into a Slint image for the preview.
fn artifact_image(artifact: &QrArtifact) -> slint::Image {
    let buffer = slint::SharedPixelBuffer::<slint::Rgba8Pixel>::clone_from_slice(
        artifact.pixels.as_raw(),
        artifact.width(),
        artifact.height(),
    );
    slint::Image::from_rgba8(buffer)
}

/// Decode a validated hex color for the swatches.
fn color_from_hex(hex: &str) -> slint::Color {
    let [r, g, b] = hex_to_rgb(hex).unwrap_or([0x3b, 0x82, 0xf6]);
    slint::Color::from_rgb_u8(r, g, b)
}

/// Format a Slint color back to the 6-digit hex the text fields show.
fn hex_from_color(color: slint::Color) -> String {
    format!(
        "#{:02x}{:02x}{:02x}",
        color.red(),
        color.green(),
        color.blue()
    )
}
