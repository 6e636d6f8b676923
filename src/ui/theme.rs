use eframe::egui::{self, Color32, Visuals};

use crate::chart::palette::Rgb;
use crate::config::Theme;

pub fn color32(c: Rgb) -> Color32 {
    Color32::from_rgb(c.red, c.green, c.blue)
}

/// Install the configured theme as egui visuals.
pub fn apply(ctx: &egui::Context, theme: &Theme) {
    let mut visuals = if theme.dark {
        Visuals::dark()
    } else {
        Visuals::light()
    };
    visuals.panel_fill = color32(theme.background);
    visuals.window_fill = color32(theme.background);
    visuals.faint_bg_color = color32(theme.secondary_background);
    visuals.extreme_bg_color = color32(theme.secondary_background);
    visuals.override_text_color = Some(color32(theme.text));
    visuals.selection.bg_fill = color32(theme.primary);
    visuals.hyperlink_color = color32(theme.primary);
    ctx.set_visuals(visuals);
}
