//! QRStudio - Desktop studio for generating, styling and exporting QR codes
//!
//! Main entry point for the GUI application.
//!
//! # Overview
//!
//! This binary crate provides the Slint GUI frontend for QRStudio. It initializes:
//! - Logging infrastructure (file rotation + console output)
//! - Tokio async runtime (for shortening requests and file I/O)
//! - State management ([`StateManager`])
//! - Persisted settings ([`SettingsStore`])
//! - GUI controller ([`StudioController`] - bridges the Slint window with business logic)
//!
//! The application uses a hybrid threading model:
//! - **Main thread**: Runs the Slint event loop (blocking, synchronous)
//! - **Tokio workers**: Handle async operations (shortening GETs, encoding, exports)
//! - **State listener**: Background std::thread for reactive UI updates
//!
//! # Execution Flow
//!
//! 1. Initialize logging → logs/qrstudio_<date>.log
//! 2. Create tokio runtime with 4 worker threads
//! 3. Create StateManager (Arc<RwLock<AppState>>)
//! 4. Load YAML documents from QRStudio Data/
//!    - QRStudio Settings.yaml → colors, total-generated counter
//!    - QRStudio Theme.yaml → dark/light preference
//!    - QRStudio Presets.yaml → saved style snapshots
//! 5. Create StudioController (wires the window to state and runtime)
//! 6. Run Slint event loop (blocks until window closed)
//! 7. Log metrics summary, shutdown tokio runtime with 5s timeout

use anyhow::Result;
use qrstudio::metrics::Metrics;
use qrstudio::ui::StudioController;
use qrstudio::{SettingsStore, StateManager, APP_NAME, VERSION};
use std::sync::Arc;

/// Main entry point for the QRStudio GUI application
///
/// # Errors
///
/// This function can fail if:
/// - Logging initialization fails (disk space, permissions)
/// - Tokio runtime creation fails (system resources)
/// - Persisted documents are present but invalid YAML
/// - Slint UI initialization fails (graphics drivers, display)
fn main() -> Result<()> {
    // Setup logging with both file and console output
    let _log_guard = qrstudio::logging::setup_logging("logs", "qrstudio", false, true)?;

    tracing::info!("Starting {} v{}", APP_NAME, VERSION);

    // Create tokio runtime for async operations
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .worker_threads(4)
        .thread_name("qrstudio-worker")
        .build()?;

    tracing::info!("Tokio runtime initialized with {} worker threads", 4);

    // Create state manager for application state
    let state_manager = Arc::new(StateManager::new());
    tracing::info!("State manager initialized");

    // Load the persisted documents
    let settings_store = Arc::new(SettingsStore::new("QRStudio Data")?);
    let settings = settings_store.load_settings()?;
    let theme = settings_store.load_theme()?;

    tracing::info!(
        "Loaded settings - fg: {}, bg: {}, total generated: {}",
        settings.studio.foreground_color,
        settings.studio.background_color,
        settings.studio.total_generated
    );

    state_manager.load_from_settings(&settings, theme.theme);

    // Shared metrics, summarized at shutdown
    let metrics = Arc::new(Metrics::new());

    // Create the GUI controller
    // This wires up the Slint window with state management and the tokio runtime
    let controller = StudioController::new(
        state_manager.clone(),
        settings_store.clone(),
        metrics.clone(),
        runtime.handle().clone(),
    )?;

    tracing::info!("GUI controller initialized, launching window");

    // Run the GUI (blocks until window is closed)
    // The tokio runtime stays alive in the background to handle async tasks
    let result = controller.run();

    tracing::info!("GUI closed, shutting down");

    // Persist the latest settings snapshot on the way out
    if let Err(e) = settings_store.save_settings(&state_manager.to_settings()) {
        tracing::error!("Failed to persist settings at shutdown: {:?}", e);
    }

    metrics.log_summary();

    // Shutdown the tokio runtime gracefully
    runtime.shutdown_timeout(std::time::Duration::from_secs(5));

    tracing::info!("Application shutdown complete");

    result.map_err(|e| {
        tracing::error!("GUI error: {}", e);
        anyhow::anyhow!("GUI error: {}", e)
    })
}
