// UI module - GUI logic and event loop bridge
//
// This module contains:
// - UiDispatcher: Coordinates between tokio async runtime and Slint event loop
// - StudioController: Main controller that wires up the window with state management

pub mod bridge;
pub mod controller;

pub use bridge::UiDispatcher;
pub use controller::StudioController;
