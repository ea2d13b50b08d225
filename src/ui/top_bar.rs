//! Top bar UI: app title, build statistics, and status.

use crate::state::AppState;
use eframe::egui::{self, Color32, RichText};

pub fn render_top_bar(ctx: &egui::Context, state: &AppState) {
    egui::TopBottomPanel::top("top_bar")
        .exact_height(36.0)
        .show(ctx, |ui| {
            ui.horizontal_centered(|ui| {
                ui.label(
                    RichText::new("Province Map")
                        .strong()
                        .size(16.0)
                        .color(Color32::WHITE),
                );

                ui.separator();

                let stats = &state.build_stats;
                ui.label(
                    RichText::new(format!(
                        "{} regions | {} cities | {} lines | build #{} in {}",
                        stats.shapes,
                        stats.anchors,
                        stats.flight_lines,
                        stats.build_count,
                        stats.format_build_time()
                    ))
                    .monospace()
                    .size(12.0)
                    .color(Color32::GRAY),
                );

                ui.separator();

                ui.label(
                    RichText::new(&state.status_message)
                        .size(13.0)
                        .color(Color32::GRAY),
                );
            });
        });
}
