// UiDispatcher - Coordinates between the tokio async runtime and the Slint event loop
//
// Two event loops run side by side:
// 1. Slint's single-threaded GUI event loop
// 2. Tokio's multi-threaded async runtime for network and file I/O
//
// The dispatcher provides:
// - Safe UI updates from tokio tasks via upgrade_in_event_loop
// - Spawning async tasks from Slint callbacks
// - Thread-safe marshaling between the two event loops

use slint::{ComponentHandle, Weak};
use std::future::Future;
use tokio::sync::mpsc;

/// Cloneable handle marshaling work between tokio and the Slint event loop.
///
/// - UI updates from background tokio tasks go through [`update_ui()`](Self::update_ui)
/// - Slint callbacks trigger async work through [`spawn_async()`](Self::spawn_async)
///
/// # Example
/// ```ignore
/// let dispatcher = UiDispatcher::new(&ui, runtime.handle().clone());
///
/// // From a Slint callback, spawn an async task
/// let d = dispatcher.clone();
/// dispatcher.spawn_async(move || async move {
///     let short_url = shorten(&url).await;
///     d.update_ui(move |ui| ui.set_short_url(short_url.into()));
/// });
/// ```
pub struct UiDispatcher<T: ComponentHandle> {
    /// Weak reference to the UI component to prevent circular references
    ui_weak: Weak<T>,

    /// Handle to the tokio runtime for spawning async tasks
    tokio_handle: tokio::runtime::Handle,

    /// Channel for sending UI update requests from tokio tasks to the Slint event loop.
    /// Bounded to 100 updates to prevent unbounded memory growth if the UI lags.
    ui_update_tx: mpsc::Sender<Box<dyn FnOnce(&T) + Send>>,
}

// Manual Clone implementation to avoid requiring T: Clone
impl<T: ComponentHandle> Clone for UiDispatcher<T> {
    fn clone(&self) -> Self {
        Self {
            ui_weak: self.ui_weak.clone(),
            tokio_handle: self.tokio_handle.clone(),
            ui_update_tx: self.ui_update_tx.clone(),
        }
    }
}

impl<T: ComponentHandle + 'static> UiDispatcher<T> {
    /// Create a new dispatcher.
    ///
    /// Starts a background handler thread that drains UI update requests
    /// and marshals them onto the Slint event loop.
    pub fn new(ui: &T, tokio_handle: tokio::runtime::Handle) -> Self {
        let ui_weak = ui.as_weak();
        let (ui_update_tx, mut ui_update_rx) = mpsc::channel::<Box<dyn FnOnce(&T) + Send>>(100);

        let ui_weak_clone = ui_weak.clone();
        std::thread::spawn(move || {
            tracing::debug!("UiDispatcher handler thread started");

            while let Some(update_fn) = ui_update_rx.blocking_recv() {
                // Queue the update to run on Slint's event loop thread
                let result = ui_weak_clone.upgrade_in_event_loop(move |ui| {
                    update_fn(&ui);
                });

                if let Err(e) = result {
                    tracing::warn!("Failed to queue UI update to event loop: {:?}", e);
                    // The event loop has stopped; terminate the handler thread
                    break;
                }
            }

            tracing::debug!("UiDispatcher handler thread terminated");
        });

        Self {
            ui_weak,
            tokio_handle,
            ui_update_tx,
        }
    }

    /// Schedule a UI update from any thread (typically from tokio tasks).
    ///
    /// The update is queued and executed on the next event loop iteration.
    pub fn update_ui<F>(&self, update: F)
    where
        F: FnOnce(&T) + Send + 'static,
    {
        match self.ui_update_tx.try_send(Box::new(update)) {
            Ok(_) => {}
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!("UI update channel full - skipping update to prevent backpressure");
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                tracing::warn!("Failed to send UI update - handler thread has stopped");
            }
        }
    }

    /// Spawn an async task on the tokio runtime from a Slint callback.
    ///
    /// Keeps the UI responsive during network and file I/O.
    pub fn spawn_async<F, Fut>(&self, future_factory: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.tokio_handle.spawn(async move {
            future_factory().await;
        });
    }

    /// Get a weak reference to the UI component.
    pub fn ui_weak(&self) -> &Weak<T> {
        &self.ui_weak
    }
}
