//! Immediate-mode UI helpers for the Macroquad rendering backend.
//!
//! This module hosts all uses of `macroquad::ui` so the rest of the adapter can
//! remain agnostic of Macroquad's UI types.

use macroquad::{
    color::{Color, WHITE},
    math::{RectOffset, Vec2},
    ui::{hash, Ui},
};
use pinch_puzzle_core::GridSize;
use pinch_puzzle_rendering::HudPresentation;

/// Interactions captured from the control panel during the current frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct ControlPanelUiResult {
    /// Size button pressed this frame, if any.
    pub(crate) size_selected: Option<GridSize>,
    /// Whether the reset button was pressed.
    pub(crate) reset: bool,
    /// Whether the pause button was pressed.
    pub(crate) toggle_pause: bool,
}

/// Snapshot of the control panel's layout and data for the current frame.
#[derive(Clone, Copy, Debug)]
pub(crate) struct ControlPanelUiContext<'a> {
    /// Top-left corner of the panel in screen coordinates.
    pub(crate) origin: Vec2,
    /// Panel dimensions in screen space.
    pub(crate) size: Vec2,
    /// Background colour applied to the window skin.
    pub(crate) background: Color,
    /// HUD values displayed by the panel.
    pub(crate) hud: &'a HudPresentation,
}

/// Renders the control panel's widgets and reports which buttons were pressed.
pub(crate) fn draw_control_panel_ui(
    ui: &mut Ui,
    context: ControlPanelUiContext<'_>,
) -> ControlPanelUiResult {
    let mut skin = ui.default_skin();
    skin.margin = 0.0;

    let window_style = ui
        .style_builder()
        .color(context.background)
        .color_hovered(context.background)
        .color_clicked(context.background)
        .color_selected(context.background)
        .color_selected_hovered(context.background)
        .color_inactive(context.background)
        .text_color(WHITE)
        .margin(RectOffset::new(16.0, 16.0, 16.0, 16.0))
        .build();
    skin.window_style = window_style;

    let label_style = ui
        .style_builder()
        .text_color(WHITE)
        .text_color_hovered(WHITE)
        .text_color_clicked(WHITE)
        .margin(RectOffset::new(0.0, 0.0, 4.0, 4.0))
        .build();
    skin.label_style = label_style;

    let button_style = ui
        .style_builder()
        .text_color(WHITE)
        .text_color_hovered(WHITE)
        .text_color_clicked(WHITE)
        .color(Color::from_rgba(70, 70, 70, 255))
        .color_hovered(Color::from_rgba(96, 96, 96, 255))
        .color_clicked(Color::from_rgba(56, 56, 56, 255))
        .color_selected(Color::from_rgba(70, 70, 70, 255))
        .color_selected_hovered(Color::from_rgba(96, 96, 96, 255))
        .color_inactive(Color::from_rgba(56, 56, 56, 200))
        .margin(RectOffset::new(0.0, 0.0, 8.0, 8.0))
        .build();
    skin.button_style = button_style;

    ui.push_skin(&skin);

    let hud = context.hud;
    let mut result = ControlPanelUiResult::default();
    let _ = ui.window(hash!("control_panel"), context.origin, context.size, |ui| {
        ui.label(None, &format!("Time: {}s", hud.elapsed_label()));
        ui.label(None, &format!("Moves: {}", hud.moves));

        for (size, active) in hud.size_options() {
            let edge = size.get();
            let caption = if active {
                format!("[{edge} x {edge}]")
            } else {
                format!("{edge} x {edge}")
            };
            if ui.button(None, caption.as_str()) {
                result.size_selected = Some(size);
            }
        }

        result.reset = ui.button(None, "Reset");
        result.toggle_pause = ui.button(None, hud.pause_label());

        if let Some(notice) = &hud.tracking_notice {
            ui.label(None, notice);
        }
    });

    ui.pop_skin();
    result
}
