//! # User Interface Module
//!
//! The viewer's controls and info panel. The same [`ViewerStatus`] snapshot
//! drives two front ends:
//!
//! - native builds draw a Dear ImGui overlay through [`UiManager`] and
//!   [`panel`]
//! - web builds sync existing DOM elements through [`dom`]
//!
//! Both report button presses back as [`UiAction`]s which the app applies
//! with [`Viewer::handle_ui_action`].
//!
//! [`ViewerStatus`]: crate::viewer::ViewerStatus
//! [`Viewer::handle_ui_action`]: crate::viewer::Viewer::handle_ui_action

#[cfg(target_arch = "wasm32")]
pub mod dom;
#[cfg(not(target_arch = "wasm32"))]
pub mod manager;
#[cfg(not(target_arch = "wasm32"))]
pub mod panel;

#[cfg(not(target_arch = "wasm32"))]
pub use manager::UiManager;

/// Text shown when the viewer fails to start
pub const ERROR_MESSAGE: &str = "Unable to start the 3D viewer.";

/// A button press coming from the UI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiAction {
    ToggleRotation,
    ResetCamera,
    CloseInfoPanel,
}

/// Label of the rotation toggle for the current setting
pub fn rotation_button_label(auto_rotate_enabled: bool) -> &'static str {
    if auto_rotate_enabled {
        "Pause Rotation"
    } else {
        "Resume Rotation"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotation_label() {
        assert_eq!(rotation_button_label(true), "Pause Rotation");
        assert_eq!(rotation_button_label(false), "Resume Rotation");
    }
}
