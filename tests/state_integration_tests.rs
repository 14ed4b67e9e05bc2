//! Integration tests for StateManager with state change events
//!
//! These tests verify that the StateManager correctly:
//! - Runs the generation workflow (begin → install/fail) with sequencing
//! - Emits change events for subscribers
//! - Handles the shortening lifecycle
//! - Keeps counters monotonic across resets

use qrstudio::models::{SettingsConfig, StyleConfig, Theme};
use qrstudio::services::GenerationService;
use qrstudio::{StateChange, StateManager};
use std::sync::Arc;

fn generate(url: &str) -> qrstudio::services::QrArtifact {
    GenerationService::new()
        .generate(url, &StyleConfig::default())
        .unwrap()
}

#[test]
fn test_generation_workflow_state_transitions() {
    let state = Arc::new(StateManager::new());

    // Initial state
    assert!(!state.read(|s| s.is_generating));
    assert!(!state.read(|s| s.has_artifact()));

    // Trigger
    let seq = state.begin_generation().unwrap();
    assert!(state.read(|s| s.is_generating));

    // Complete
    let installed = state.install_artifact(seq, generate("example.com"), "09:15".to_string());
    assert!(installed);

    assert!(!state.read(|s| s.is_generating));
    assert!(state.read(|s| s.has_artifact()));
    assert_eq!(state.read(|s| s.total_generated), 1);
    assert_eq!(state.read(|s| s.last_generated_label()), "09:15");
}

#[test]
fn test_only_one_generation_in_flight() {
    let state = StateManager::new();

    let first = state.begin_generation();
    assert!(first.is_some());

    // The trigger is refused while one is in flight
    assert!(state.begin_generation().is_none());

    state.fail_generation();

    // And accepted again afterwards
    assert!(state.begin_generation().is_some());
}

#[test]
fn test_displayed_artifact_is_most_recently_completed() {
    let state = StateManager::new();

    let seq_a = state.begin_generation().unwrap();
    state.install_artifact(seq_a, generate("example.com"), "09:00".to_string());

    let seq_b = state.begin_generation().unwrap();
    state.install_artifact(seq_b, generate("example.org"), "09:01".to_string());

    // A stale completion for seq_a must not displace seq_b's artifact
    assert!(!state.install_artifact(seq_a, generate("example.net"), "09:02".to_string()));

    let current = state.read(|s| s.current_artifact.clone()).unwrap();
    assert_eq!(current.source_url, "https://example.org");
    assert_eq!(state.read(|s| s.total_generated), 2);
}

#[test]
fn test_failed_generation_leaves_prior_artifact() {
    let state = StateManager::new();

    let seq = state.begin_generation().unwrap();
    state.install_artifact(seq, generate("example.com"), "09:00".to_string());

    state.begin_generation().unwrap();
    state.fail_generation();

    assert!(state.read(|s| s.generation_failed));
    assert!(state.read(|s| s.has_artifact()));
    assert_eq!(state.read(|s| s.total_generated), 1);

    // A later success clears the placeholder state
    let seq = state.begin_generation().unwrap();
    state.install_artifact(seq, generate("example.org"), "09:05".to_string());
    assert!(!state.read(|s| s.generation_failed));
}

#[test]
fn test_subscribers_see_generation_events() {
    let state = StateManager::new();
    let mut rx = state.subscribe();

    let seq = state.begin_generation().unwrap();
    state.install_artifact(seq, generate("example.com"), "09:00".to_string());

    let mut events = Vec::new();
    while let Ok(change) = rx.try_recv() {
        events.push(change);
    }

    assert!(events
        .iter()
        .any(|c| matches!(c, StateChange::GenerationStarted { seq: 1 })));
    assert!(events
        .iter()
        .any(|c| matches!(c, StateChange::GenerationFinished { total_generated: 1 })));
    assert!(events
        .iter()
        .any(|c| matches!(c, StateChange::ArtifactReplaced { .. })));
}

#[test]
fn test_shortening_lifecycle() {
    let state = StateManager::new();
    let mut rx = state.subscribe();

    assert!(state.begin_shortening());
    state.finish_shortening(Some("https://is.gd/abc123".to_string()));

    let mut events = Vec::new();
    while let Ok(change) = rx.try_recv() {
        events.push(change);
    }

    assert!(events.contains(&StateChange::ShorteningStateChanged { in_flight: true }));
    assert!(events.contains(&StateChange::ShortUrlChanged {
        short_url: Some("https://is.gd/abc123".to_string())
    }));

    // A new request clears the previous result before any response lands
    assert!(state.begin_shortening());
    assert_eq!(state.read(|s| s.short_url.clone()), None);
}

#[test]
fn test_reset_keeps_counters_and_theme() {
    let state = StateManager::new();

    let seq = state.begin_generation().unwrap();
    state.install_artifact(seq, generate("example.com"), "09:00".to_string());
    state.toggle_theme();
    state.update_style(|style| {
        style.foreground_color = "#22c55e".to_string();
        style.pixel_size = 800;
    });

    state.reset_settings();

    assert_eq!(state.read(|s| s.style.clone()), StyleConfig::default());
    assert_eq!(state.read(|s| s.total_generated), 1);
    assert_eq!(state.read(|s| s.theme), Theme::Light);
    // The artifact survives; only style and extras reset
    assert!(state.read(|s| s.has_artifact()));
}

#[test]
fn test_counter_is_monotonic_across_settings_loads() {
    let state = StateManager::new();

    let mut config = SettingsConfig::default();
    config.studio.total_generated = 41;
    state.load_from_settings(&config, Theme::Dark);

    let seq = state.begin_generation().unwrap();
    state.install_artifact(seq, generate("example.com"), "09:00".to_string());

    assert_eq!(state.read(|s| s.total_generated), 42);
    assert_eq!(state.to_settings().studio.total_generated, 42);
}

#[test]
fn test_clone_shares_underlying_state() {
    let state1 = StateManager::new();
    let state2 = state1.clone();

    state1.set_zoom(170);

    assert_eq!(state2.read(|s| s.zoom_percent), 170);
}
