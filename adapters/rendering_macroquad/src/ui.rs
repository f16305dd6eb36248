//! Immediate-mode UI helpers for the Macroquad rendering backend.
//!
//! This module hosts all uses of `macroquad::ui` so the rest of the adapter can
//! remain agnostic of Macroquad's UI types.

use macroquad::{
    color::{Color, WHITE},
    math::{RectOffset, Vec2},
    ui::{hash, Ui},
};

/// Outcome of drawing the popups during the current frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct PopupUiResult {
    /// Whether the close button was pressed during this frame.
    pub(crate) close_pressed: bool,
}

/// Layout and content of the two popups for the current frame.
#[derive(Clone, Copy, Debug)]
pub(crate) struct PopupUiContext<'a> {
    /// Top-left corner of the summary popup.
    pub(crate) left_origin: Vec2,
    /// Top-left corner of the ticket history popup.
    pub(crate) right_origin: Vec2,
    /// Size shared by both popups.
    pub(crate) size: Vec2,
    /// Window background.
    pub(crate) background: Color,
    /// Lines of the summary popup, title first.
    pub(crate) left_lines: &'a [String],
    /// Lines of the ticket history popup.
    pub(crate) right_lines: &'a [String],
}

/// Draws the summary and ticket history popups of the raised node.
pub(crate) fn draw_popup_ui(ui: &mut Ui, context: PopupUiContext<'_>) -> PopupUiResult {
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
        .margin(RectOffset::new(12.0, 12.0, 12.0, 12.0))
        .build();
    skin.window_style = window_style;

    let label_style = ui
        .style_builder()
        .text_color(WHITE)
        .text_color_hovered(WHITE)
        .text_color_clicked(WHITE)
        .margin(RectOffset::new(0.0, 0.0, 2.0, 2.0))
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
        .margin(RectOffset::new(8.0, 8.0, 4.0, 4.0))
        .build();
    skin.button_style = button_style;

    ui.push_skin(&skin);

    let mut close_pressed = false;
    let _ = ui.window(
        hash!("sprint_summary"),
        context.left_origin,
        context.size,
        |ui| {
            for line in context.left_lines {
                ui.label(None, line);
            }
            close_pressed = ui.button(None, "Close");
        },
    );
    let _ = ui.window(
        hash!("ticket_history"),
        context.right_origin,
        context.size,
        |ui| {
            ui.label(None, "Tickets");
            for line in context.right_lines {
                ui.label(None, line);
            }
        },
    );

    ui.pop_skin();

    PopupUiResult { close_pressed }
}
