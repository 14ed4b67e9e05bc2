// State management module
//
// This module provides the StateManager which wraps AppState with thread-safe access
// using Arc<RwLock<T>> and emits change events for GUI updates.

use crate::models::{AppState, LogoAsset, SettingsConfig, StyleConfig, Theme};
use crate::services::generation::QrArtifact;
use std::sync::{Arc, RwLock};
use tokio::sync::broadcast;

/// Change events emitted when state is modified
///
/// These events are emitted to notify interested parties (primarily the GUI)
/// about state changes without requiring them to poll the state.
#[derive(Clone, Debug, PartialEq)]
pub enum StateChange {
    /// The style configuration was edited
    StyleChanged,

    /// A generation was triggered
    GenerationStarted {
        seq: u64,
    },

    /// The in-flight generation ended (successfully or not)
    GenerationFinished {
        total_generated: u64,
    },

    /// The in-flight generation failed; the preview shows a placeholder
    GenerationFailed,

    /// A new artifact was installed into the current slot
    ArtifactReplaced {
        url: String,
        width: u32,
    },

    /// The shortening result changed (set on success, cleared on a new request)
    ShortUrlChanged {
        short_url: Option<String>,
    },

    /// A shortening request started or ended
    ShorteningStateChanged {
        in_flight: bool,
    },

    /// The preview zoom level changed
    ZoomChanged {
        percent: u32,
    },

    /// The UI theme was toggled
    ThemeChanged {
        theme: Theme,
    },

    /// A logo was loaded or removed
    LogoChanged {
        loaded: bool,
    },

    /// Settings were reset to defaults
    SettingsReset,
}

/// Thread-safe state manager with event emission
///
/// This is the central state management component that:
/// - Provides thread-safe access to [`AppState`] via `Arc<RwLock<T>>`
/// - Detects state changes and emits [`StateChange`] events
/// - Owns the single current-artifact slot (single writer; readers hold
///   `Arc` snapshots)
/// - Supports subscribing to state changes via tokio broadcast channels
///
/// # Usage
///
/// Always use `StateManager` instead of accessing [`AppState`] directly:
/// - [`read()`](Self::read) for reading state without cloning
/// - [`update()`](Self::update) for mutations with automatic event emission
/// - [`subscribe()`](Self::subscribe) for listening to state changes
pub struct StateManager {
    /// The application state protected by RwLock for thread-safe access
    state: Arc<RwLock<AppState>>,

    /// Broadcast channel for emitting state change events
    state_tx: broadcast::Sender<StateChange>,
}

impl StateManager {
    /// Create a new StateManager with default state
    pub fn new() -> Self {
        let (state_tx, _) = broadcast::channel(100);
        Self {
            state: Arc::new(RwLock::new(AppState::default())),
            state_tx,
        }
    }

    /// Get a read-only snapshot of the current state
    ///
    /// This clones the entire state, so it's safe to use without holding locks.
    /// For checking individual fields, prefer [`read()`](Self::read) with a closure.
    pub fn snapshot(&self) -> AppState {
        self.state.read().unwrap().clone()
    }

    /// Execute a function with read access to the state
    pub fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&AppState) -> R,
    {
        let state = self.state.read().unwrap();
        f(&state)
    }

    /// Update the state and emit change events
    ///
    /// This is the primary way to modify state. It:
    /// 1. Captures the old state
    /// 2. Applies the update function
    /// 3. Detects what changed
    /// 4. Emits appropriate events
    ///
    /// # Returns
    /// A vector of StateChange events that were emitted
    pub fn update<F>(&self, update_fn: F) -> Vec<StateChange>
    where
        F: FnOnce(&mut AppState),
    {
        let mut state = self.state.write().unwrap();
        let old_state = state.clone();

        update_fn(&mut state);

        let changes = self.detect_changes(&old_state, &state);

        for change in &changes {
            // Ignore send errors - it's OK if no one is listening
            let _ = self.state_tx.send(change.clone());
        }

        changes
    }

    /// Subscribe to state change events
    pub fn subscribe(&self) -> broadcast::Receiver<StateChange> {
        self.state_tx.subscribe()
    }

    /// Detect what changed between two states and generate events
    fn detect_changes(&self, old: &AppState, new: &AppState) -> Vec<StateChange> {
        let mut changes = Vec::new();

        if old.style != new.style {
            changes.push(StateChange::StyleChanged);
        }

        if old.is_generating != new.is_generating {
            if new.is_generating {
                changes.push(StateChange::GenerationStarted {
                    seq: new.started_seq,
                });
            } else {
                changes.push(StateChange::GenerationFinished {
                    total_generated: new.total_generated,
                });
            }
        }

        if !old.generation_failed && new.generation_failed {
            changes.push(StateChange::GenerationFailed);
        }

        let artifact_replaced = match (&old.current_artifact, &new.current_artifact) {
            (Some(a), Some(b)) => !Arc::ptr_eq(a, b),
            (None, Some(_)) => true,
            _ => false,
        };
        if artifact_replaced {
            let artifact = new.current_artifact.as_ref().unwrap();
            changes.push(StateChange::ArtifactReplaced {
                url: artifact.source_url.clone(),
                width: artifact.width(),
            });
        }

        if old.short_url != new.short_url {
            changes.push(StateChange::ShortUrlChanged {
                short_url: new.short_url.clone(),
            });
        }

        if old.is_shortening != new.is_shortening {
            changes.push(StateChange::ShorteningStateChanged {
                in_flight: new.is_shortening,
            });
        }

        if old.zoom_percent != new.zoom_percent {
            changes.push(StateChange::ZoomChanged {
                percent: new.zoom_percent,
            });
        }

        if old.theme != new.theme {
            changes.push(StateChange::ThemeChanged { theme: new.theme });
        }

        let logo_name = |state: &AppState| state.logo.as_ref().map(|l| l.file_name.clone());
        if logo_name(old) != logo_name(new) {
            changes.push(StateChange::LogoChanged {
                loaded: new.logo.is_some(),
            });
        }

        changes
    }

    // Convenience methods for common state updates

    /// Try to start a generation.
    ///
    /// Returns the sequence number of the new generation, or None when one
    /// is already in flight (the trigger is disabled for its duration).
    pub fn begin_generation(&self) -> Option<u64> {
        let mut seq = None;
        self.update(|state| {
            if !state.is_generating {
                state.is_generating = true;
                state.generation_failed = false;
                state.started_seq += 1;
                seq = Some(state.started_seq);
            }
        });
        seq
    }

    /// Install a completed generation.
    ///
    /// The artifact only lands if no later completion has already landed,
    /// so the displayed artifact always corresponds to the most recently
    /// completed call. Returns whether the artifact was installed.
    pub fn install_artifact(&self, seq: u64, artifact: QrArtifact, timestamp: String) -> bool {
        let mut installed = false;
        self.update(|state| {
            state.is_generating = false;
            if seq > state.completed_seq {
                state.completed_seq = seq;
                state.current_artifact = Some(Arc::new(artifact));
                state.generation_failed = false;
                state.total_generated += 1;
                state.last_generated = Some(timestamp);
                installed = true;
            }
        });
        installed
    }

    /// Record a failed generation and clear the loading flag.
    ///
    /// The prior artifact (if any) stays untouched; counters do not move.
    pub fn fail_generation(&self) -> Vec<StateChange> {
        self.update(|state| {
            state.is_generating = false;
            state.generation_failed = true;
        })
    }

    /// Edit the style configuration.
    pub fn update_style<F>(&self, style_fn: F) -> Vec<StateChange>
    where
        F: FnOnce(&mut StyleConfig),
    {
        self.update(|state| style_fn(&mut state.style))
    }

    /// Try to start a shortening request; clears the previous result.
    ///
    /// Returns false when a request is already in flight.
    pub fn begin_shortening(&self) -> bool {
        let mut started = false;
        self.update(|state| {
            if !state.is_shortening {
                state.is_shortening = true;
                state.short_url = None;
                started = true;
            }
        });
        started
    }

    /// Record the outcome of a shortening request.
    pub fn finish_shortening(&self, short_url: Option<String>) -> Vec<StateChange> {
        self.update(|state| {
            state.is_shortening = false;
            state.short_url = short_url;
        })
    }

    /// Set the zoom level from the slider.
    pub fn set_zoom(&self, percent: u32) -> Vec<StateChange> {
        self.update(|state| state.set_zoom(percent))
    }

    /// Step the zoom level.
    pub fn zoom_in(&self) -> Vec<StateChange> {
        self.update(|state| state.zoom_in())
    }

    pub fn zoom_out(&self) -> Vec<StateChange> {
        self.update(|state| state.zoom_out())
    }

    /// Flip the theme preference.
    pub fn toggle_theme(&self) -> Theme {
        self.update(|state| state.theme = state.theme.toggled());
        self.read(|state| state.theme)
    }

    /// Install an uploaded logo.
    pub fn set_logo(&self, asset: LogoAsset) -> Vec<StateChange> {
        self.update(|state| state.logo = Some(asset))
    }

    /// Remove the uploaded logo.
    pub fn clear_logo(&self) -> Vec<StateChange> {
        self.update(|state| {
            state.logo = None;
            state.include_logo = false;
        })
    }

    /// Reset style and extras to defaults, keeping counters and theme.
    pub fn reset_settings(&self) -> Vec<StateChange> {
        let mut changes = self.update(|state| {
            state.reset_settings();
        });

        let reset_event = StateChange::SettingsReset;
        let _ = self.state_tx.send(reset_event.clone());
        changes.push(reset_event);

        changes
    }

    /// Load persisted settings into the state.
    ///
    /// Colors are expected to be pre-validated by the caller.
    pub fn load_from_settings(&self, settings: &SettingsConfig, theme: Theme) -> Vec<StateChange> {
        self.update(|state| {
            state.style.foreground_color = settings.studio.foreground_color.clone();
            state.style.background_color = settings.studio.background_color.clone();
            state.total_generated = settings.studio.total_generated;
            state.theme = theme;

            tracing::info!(
                "Loaded settings: fg={}, bg={}, total_generated={}, theme={}",
                state.style.foreground_color,
                state.style.background_color,
                state.total_generated,
                state.theme.as_str()
            );
        })
    }

    /// Snapshot the persistable fields for the settings store.
    pub fn to_settings(&self) -> SettingsConfig {
        self.read(|state| {
            let mut config = SettingsConfig::default();
            config.studio.foreground_color = state.style.foreground_color.clone();
            config.studio.background_color = state.style.background_color.clone();
            config.studio.total_generated = state.total_generated;
            config
        })
    }

    /// Get an Arc reference to the state for use in worker threads
    pub fn state_arc(&self) -> Arc<RwLock<AppState>> {
        Arc::clone(&self.state)
    }
}

impl Default for StateManager {
    fn default() -> Self {
        Self::new()
    }
}

// Make StateManager cloneable for sharing across threads
impl Clone for StateManager {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            state_tx: self.state_tx.clone(),
        }
    }
}
