//! Left panel UI: scene controls and build issues.

use crate::state::AppState;
use eframe::egui::{self, Color32, RichText};
use province_map::geo::InvalidVertexPolicy;
use province_map::{ProjectionChoice, SceneBuild};

pub fn render_left_panel(ctx: &egui::Context, state: &mut AppState, build: Option<&SceneBuild>) {
    egui::SidePanel::left("left_panel")
        .resizable(true)
        .default_width(250.0)
        .min_width(200.0)
        .max_width(400.0)
        .show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                render_projection_controls(ui, state);
                ui.add_space(10.0);
                render_layer_controls(ui, state, build);
                ui.add_space(10.0);
                render_camera_controls(ui, state);
                ui.add_space(10.0);
                render_issues(ui, build);
            });
        });
}

fn render_projection_controls(ui: &mut egui::Ui, state: &mut AppState) {
    ui.heading("Projection");
    ui.separator();

    let config = &mut state.config;
    let is_detailed = matches!(config.projection, ProjectionChoice::Detailed);
    let is_contextual = matches!(config.projection, ProjectionChoice::Contextual { .. });

    if ui.radio(is_detailed, "Detailed (Chengdu)").clicked() {
        config.projection = ProjectionChoice::Detailed;
    }
    if ui.radio(is_contextual, "Contextual").clicked() && !is_contextual {
        config.projection = ProjectionChoice::default();
    }

    match &mut config.projection {
        ProjectionChoice::Contextual { scale } => {
            ui.add(
                egui::Slider::new(scale, 10.0..=2000.0)
                    .logarithmic(true)
                    .text("Scale"),
            );
        }
        ProjectionChoice::Custom(projection) => {
            ui.label(
                RichText::new(format!(
                    "Custom {:?} at {:.3}, {:.3}",
                    projection.kind, projection.center[0], projection.center[1]
                ))
                .small(),
            );
        }
        ProjectionChoice::Detailed => {}
    }

    ui.add_space(5.0);
    let policy = &mut config.build.invalid_vertices;
    egui::ComboBox::from_label("Invalid vertices")
        .selected_text(policy_label(*policy))
        .show_ui(ui, |ui| {
            for option in [InvalidVertexPolicy::Drop, InvalidVertexPolicy::ZeroFill] {
                ui.selectable_value(policy, option, policy_label(option));
            }
        });
}

fn policy_label(policy: InvalidVertexPolicy) -> &'static str {
    match policy {
        InvalidVertexPolicy::Drop => "Drop",
        InvalidVertexPolicy::ZeroFill => "Zero fill",
    }
}

fn render_layer_controls(ui: &mut egui::Ui, state: &mut AppState, build: Option<&SceneBuild>) {
    ui.heading("Layers");
    ui.separator();

    let layers = &mut state.layer_state;
    ui.checkbox(&mut layers.outlines, "Region borders");
    ui.checkbox(&mut layers.labels, "City labels");
    ui.checkbox(&mut layers.grid, "Grid");

    ui.add_space(5.0);
    let lines = &mut state.config.flight_lines;
    ui.checkbox(&mut lines.enabled, "Flight lines");
    ui.add_enabled_ui(lines.enabled, |ui| {
        ui.checkbox(&mut layers.flight_lines, "Show flow");
        ui.add(egui::Slider::new(&mut lines.speed, 0.0..=2.0).text("Speed"));

        let selected = lines.hub.clone().unwrap_or_else(|| "First city".to_string());
        egui::ComboBox::from_label("Hub")
            .selected_text(selected)
            .show_ui(ui, |ui| {
                ui.selectable_value(&mut lines.hub, None, "First city");
                for anchor in build.map(|b| b.anchors.as_slice()).unwrap_or_default() {
                    ui.selectable_value(
                        &mut lines.hub,
                        Some(anchor.name.clone()),
                        anchor.name.as_str(),
                    );
                }
            });
    });
}

fn render_camera_controls(ui: &mut egui::Ui, state: &mut AppState) {
    ui.heading("Camera");
    ui.separator();

    ui.add(
        egui::Slider::new(&mut state.config.camera.duration_secs, 0.0..=5.0)
            .text("Duration (s)"),
    );
    if ui.button("Replay transition").clicked() {
        state.replay_camera = true;
    }

    if let Some(path) = state.config_path.clone() {
        ui.add_space(5.0);
        if ui.button("Save configuration").clicked() {
            state.status_message = match state.config.save_to_path(&path) {
                Ok(()) => format!("Saved {}", path.display()),
                Err(e) => format!("Save failed: {}", e),
            };
        }
    }
}

fn render_issues(ui: &mut egui::Ui, build: Option<&SceneBuild>) {
    let issues = build.map(|b| b.issues.as_slice()).unwrap_or_default();

    egui::CollapsingHeader::new(format!("Build issues ({})", issues.len()))
        .default_open(false)
        .show(ui, |ui| {
            if issues.is_empty() {
                ui.label(
                    RichText::new("\u{2713} No issues")
                        .small()
                        .color(Color32::from_rgb(100, 200, 100)),
                );
                return;
            }
            for issue in issues {
                ui.label(
                    RichText::new(issue.to_string())
                        .small()
                        .color(Color32::from_rgb(230, 180, 90)),
                );
            }
        });
}
