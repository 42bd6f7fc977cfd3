//! ImGui panels: viewer controls and the part info panel

use crate::viewer::ViewerStatus;

use super::{rotation_button_label, UiAction};

/// Controls window plus the info panel while a part is selected
///
/// Button presses are pushed onto `actions` for the app to apply after the
/// frame is built.
pub fn viewer_panel(ui: &imgui::Ui, status: &ViewerStatus, actions: &mut Vec<UiAction>) {
    let display_size = ui.io().display_size;
    // Guard against invalid display size that could cause crashes
    if display_size[0] <= 0.0 || display_size[1] <= 0.0 {
        return;
    }

    ui.window("Viewer")
        .position([20.0, 20.0], imgui::Condition::FirstUseEver)
        .always_auto_resize(true)
        .collapsible(false)
        .build(|| {
            if ui.button(rotation_button_label(status.auto_rotate_enabled)) {
                actions.push(UiAction::ToggleRotation);
            }
            ui.same_line();
            if ui.button("Reset Camera") {
                actions.push(UiAction::ResetCamera);
            }
            if status.paused {
                ui.text_disabled("Paused (P to resume)");
            }
        });

    if !status.info_panel.visible {
        return;
    }

    let panel_width = (display_size[0] * 0.25).clamp(240.0, 360.0);
    ui.window("Part Info")
        .position(
            [display_size[0] - panel_width - 20.0, 20.0],
            imgui::Condition::Always,
        )
        .size([panel_width, 0.0], imgui::Condition::Always)
        .resizable(false)
        .collapsible(false)
        .build(|| {
            ui.text(&status.info_panel.name);
            ui.separator();
            if let Some(part_type) = status.info_panel.part_type {
                ui.text_disabled(part_type.tag());
            }
            ui.text_wrapped(status.info_panel.description());
            ui.spacing();
            if ui.button("Close") {
                actions.push(UiAction::CloseInfoPanel);
            }
        });
}
