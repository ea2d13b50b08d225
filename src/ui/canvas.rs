//! Central canvas UI: map scene visualization area.

use crate::state::AppState;
use eframe::egui::{
    self, Align2, Color32, FontId, Painter, Pos2, Rect, RichText, Sense, Stroke, Vec2,
};
use glam::DVec2;
use province_map::geo::Projector;
use province_map::scene::{flow_phase, FlightLine};
use province_map::{GridConfig, SceneBuild};

const BACKGROUND: Color32 = Color32::from_rgb(20, 20, 35);
const OUTLINE_COLOR: Color32 = Color32::from_rgb(120, 190, 255);
const LABEL_COLOR: Color32 = Color32::from_rgb(230, 230, 240);
const FLIGHT_LINE_COLOR: Color32 = Color32::from_rgb(255, 170, 60);
const GRID_FALLBACK_COLOR: Color32 = Color32::from_gray(0x6f);

/// Fraction of the canvas the map occupies at zoom 1.
const FIT_MARGIN: f32 = 0.9;

/// Maps centered scene coordinates to screen positions.
#[derive(Debug, Clone, Copy)]
struct ViewTransform {
    origin: Pos2,
    pixels_per_unit: f32,
}

impl ViewTransform {
    fn new(rect: Rect, build: Option<&SceneBuild>, zoom: f32, pan_offset: Vec2) -> Self {
        let fit = build
            .and_then(|b| b.centered_bounds())
            .map(|bounds| {
                let size = bounds.size();
                let fit = (rect.width() / size.x as f32).min(rect.height() / size.y as f32);
                if fit.is_finite() {
                    fit
                } else {
                    1.0
                }
            })
            .unwrap_or(1.0);

        Self {
            origin: rect.center() + pan_offset,
            pixels_per_unit: fit * FIT_MARGIN * zoom,
        }
    }

    fn to_screen(self, point: DVec2) -> Pos2 {
        Pos2::new(
            self.origin.x + point.x as f32 * self.pixels_per_unit,
            self.origin.y + point.y as f32 * self.pixels_per_unit,
        )
    }

    fn to_scene(self, pos: Pos2) -> DVec2 {
        DVec2::new(
            ((pos.x - self.origin.x) / self.pixels_per_unit) as f64,
            ((pos.y - self.origin.y) / self.pixels_per_unit) as f64,
        )
    }
}

/// Render the map canvas.
pub fn render_canvas(
    ctx: &egui::Context,
    state: &mut AppState,
    build: Option<&SceneBuild>,
    projector: Option<&Projector>,
    elapsed_secs: f64,
) {
    egui::CentralPanel::default().show(ctx, |ui| {
        let available_size = ui.available_size();
        let (response, painter) = ui.allocate_painter(available_size, Sense::click_and_drag());
        let rect = response.rect;

        painter.rect_filled(rect, 0.0, BACKGROUND);

        let view = ViewTransform::new(
            rect,
            build,
            state.viz_state.effective_zoom(),
            state.viz_state.pan_offset,
        );

        if state.layer_state.grid {
            render_grid(&painter, &rect, view, state);
        }

        if let Some(build) = build {
            render_scene(&painter, build, view, state, elapsed_secs);
        } else {
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                "No scene",
                FontId::proportional(16.0),
                Color32::GRAY,
            );
        }

        state.viz_state.cursor_geo = match (response.hover_pos(), build, projector) {
            (Some(pos), Some(build), Some(projector)) => {
                let scene = view.to_scene(pos);
                projector.unproject(scene - build.centering().offset())
            }
            _ => None,
        };

        draw_overlay_info(ui, &rect, state);
        handle_canvas_interaction(&response, &rect, state);
    });
}

fn render_scene(
    painter: &Painter,
    build: &SceneBuild,
    view: ViewTransform,
    state: &AppState,
    elapsed_secs: f64,
) {
    let layers = &state.layer_state;
    if layers.outlines {
        let stroke = Stroke::new(1.5, OUTLINE_COLOR);
        for edge_loop in build.outline() {
            if edge_loop.len() < 2 {
                continue;
            }
            let points: Vec<Pos2> = edge_loop.iter().map(|p| view.to_screen(*p)).collect();
            painter.add(egui::Shape::line(points, stroke));
        }
    }

    if layers.flight_lines {
        let phase = flow_phase(elapsed_secs, state.config.flight_lines.speed);
        for line in &build.flight_lines {
            render_flight_line(painter, line, view, phase);
        }
    }

    if layers.labels {
        for anchor in &build.anchors {
            let pos = view.to_screen(anchor.planar());
            painter.circle_filled(pos, 2.5, LABEL_COLOR);
            painter.text(
                Pos2::new(pos.x + 5.0, pos.y - 5.0),
                Align2::LEFT_BOTTOM,
                &anchor.name,
                FontId::proportional(11.0),
                LABEL_COLOR,
            );
        }
    }
}

/// Draws an arc with a dot travelling along it.
fn render_flight_line(painter: &Painter, line: &FlightLine, view: ViewTransform, phase: f64) {
    let Some(base) = line.points.first().map(|p| p.z) else {
        return;
    };

    // The lift leaves the map plane; on screen it becomes a vertical offset.
    let points: Vec<Pos2> = line
        .points
        .iter()
        .map(|p| view.to_screen(DVec2::new(p.x, p.y + (p.z - base))))
        .collect();
    if points.len() < 2 {
        return;
    }

    let faded = Color32::from_rgba_unmultiplied(
        FLIGHT_LINE_COLOR.r(),
        FLIGHT_LINE_COLOR.g(),
        FLIGHT_LINE_COLOR.b(),
        90,
    );
    painter.add(egui::Shape::line(points.clone(), Stroke::new(1.0, faded)));

    let position = phase * (points.len() - 1) as f64;
    let index = (position.floor() as usize).min(points.len() - 2);
    let t = (position - index as f64) as f32;
    let dot = points[index].lerp(points[index + 1], t);
    painter.circle_filled(dot, 3.0, FLIGHT_LINE_COLOR);
}

/// Grid line color, gray when `cell_color` is not a hex color.
fn grid_color(grid: &GridConfig) -> Color32 {
    Color32::from_hex(&grid.cell_color).unwrap_or(GRID_FALLBACK_COLOR)
}

/// Draws the ground grid centered under the map.
fn render_grid(painter: &Painter, rect: &Rect, view: ViewTransform, state: &AppState) {
    let grid = &state.config.grid;
    let cell = grid.cell_size as f64;
    if cell <= 0.0 {
        return;
    }

    let color = grid_color(grid);
    let (r, g, b) = (color.r(), color.g(), color.b());
    let cell_stroke = Stroke::new(
        grid.cell_thickness,
        Color32::from_rgba_unmultiplied(r, g, b, 60),
    );
    let section_stroke = Stroke::new(
        grid.cell_thickness * 1.5,
        Color32::from_rgba_unmultiplied(r, g, b, 110),
    );

    // Grid extent in scene units
    let (min, max) = if grid.infinite_grid {
        (
            view.to_scene(rect.left_top()),
            view.to_scene(rect.right_bottom()),
        )
    } else {
        let half = DVec2::new(grid.grid_size[0] as f64, grid.grid_size[1] as f64) * 0.5;
        (-half, half)
    };

    // Skip when lines would be denser than every few pixels
    if cell * (view.pixels_per_unit as f64) < 4.0 {
        return;
    }

    let section = grid.section_size as f64;
    let stroke_for = |v: f64| {
        if section > 0.0 && (v / section).round() * section == v {
            section_stroke
        } else {
            cell_stroke
        }
    };

    let mut x = (min.x / cell).ceil() * cell;
    while x <= max.x {
        let from = view.to_screen(DVec2::new(x, min.y));
        let to = view.to_screen(DVec2::new(x, max.y));
        painter.line_segment([from, to], stroke_for(x));
        x += cell;
    }

    let mut y = (min.y / cell).ceil() * cell;
    while y <= max.y {
        let from = view.to_screen(DVec2::new(min.x, y));
        let to = view.to_screen(DVec2::new(max.x, y));
        painter.line_segment([from, to], stroke_for(y));
        y += cell;
    }
}

fn draw_overlay_info(ui: &mut egui::Ui, rect: &Rect, state: &AppState) {
    let overlay_pos = rect.left_top() + Vec2::new(10.0, 10.0);
    let overlay_rect = Rect::from_min_size(overlay_pos, Vec2::new(220.0, 70.0));

    let cursor = match state.viz_state.cursor_geo {
        Some(coord) => format!("{:.4}, {:.4}", coord.x, coord.y),
        None => "--".to_string(),
    };
    let camera = state.viz_state.camera_position;

    ui.scope_builder(egui::UiBuilder::new().max_rect(overlay_rect), |ui| {
        ui.vertical(|ui| {
            for line in [
                format!("Lon/Lat: {}", cursor),
                format!("Zoom: {:.0}%", state.viz_state.zoom * 100.0),
                format!("Camera: {:.1}, {:.1}, {:.1}", camera.x, camera.y, camera.z),
            ] {
                ui.label(
                    RichText::new(line)
                        .monospace()
                        .size(12.0)
                        .color(Color32::from_rgb(200, 200, 220)),
                );
            }
        });
    });
}

fn handle_canvas_interaction(response: &egui::Response, rect: &Rect, state: &mut AppState) {
    // Handle dragging for panning
    if response.dragged() {
        state.viz_state.pan_offset += response.drag_delta();
    }

    // Handle scroll for zooming relative to cursor position
    if response.hovered() {
        let scroll_delta = response.ctx.input(|i| i.raw_scroll_delta);
        if scroll_delta.y != 0.0 {
            let zoom_factor = 1.0 + scroll_delta.y * 0.001;
            let old_zoom = state.viz_state.zoom;
            let new_zoom = (old_zoom * zoom_factor).clamp(0.1, 50.0);

            // Adjust pan offset to keep the point under cursor stationary
            if let Some(cursor_pos) = response.hover_pos() {
                let cursor_rel = cursor_pos - rect.center();
                let ratio = new_zoom / old_zoom;
                state.viz_state.pan_offset =
                    cursor_rel * (1.0 - ratio) + state.viz_state.pan_offset * ratio;
            }

            state.viz_state.zoom = new_zoom;
        }
    }

    // Reset view on double-click
    if response.double_clicked() {
        state.viz_state.reset_view();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_transform_inverse() {
        let rect = Rect::from_min_size(Pos2::ZERO, Vec2::new(800.0, 600.0));
        let view = ViewTransform::new(rect, None, 2.0, Vec2::new(10.0, -5.0));

        let point = DVec2::new(12.5, -3.25);
        let back = view.to_scene(view.to_screen(point));
        assert!((back - point).length() < 1e-3);
        assert_eq!(view.to_screen(DVec2::ZERO), Pos2::new(410.0, 295.0));
    }

    #[test]
    fn test_grid_color() {
        let mut grid = GridConfig {
            cell_color: "#2a7f3c".to_string(),
            ..Default::default()
        };
        assert_eq!(grid_color(&grid), Color32::from_rgb(0x2a, 0x7f, 0x3c));

        grid.cell_color = "red".to_string();
        assert_eq!(grid_color(&grid), GRID_FALLBACK_COLOR);
        assert_eq!(grid_color(&GridConfig::default()), Color32::from_gray(0x6f));
    }
}
