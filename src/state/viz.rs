//! Visualization state.

use eframe::egui::Vec2;
use geo_types::Coord;
use glam::DVec3;
use province_map::scene::{CameraSink, CameraTransitionConfig};

/// Canvas state: user zoom/pan plus the animated camera.
pub struct VizState {
    /// User zoom level (1.0 = fit to canvas)
    pub zoom: f32,

    /// Current pan offset from center
    pub pan_offset: Vec2,

    /// Last camera position written by the transition
    pub camera_position: DVec3,

    /// Camera position at rest, the transition target
    pub camera_rest: DVec3,

    /// Geographic coordinate under the cursor
    pub cursor_geo: Option<Coord<f64>>,
}

impl Default for VizState {
    fn default() -> Self {
        Self::new(&CameraTransitionConfig::default())
    }
}

impl VizState {
    pub fn new(camera: &CameraTransitionConfig) -> Self {
        Self {
            zoom: 1.0,
            pan_offset: Vec2::ZERO,
            camera_position: DVec3::from_array(camera.from),
            camera_rest: DVec3::from_array(camera.to),
            cursor_geo: None,
        }
    }

    /// Apparent magnification from the camera distance. A camera further
    /// away than its rest position shows the map smaller.
    pub fn camera_scale(&self) -> f32 {
        let distance = self.camera_position.length();
        let rest = self.camera_rest.length();
        if distance <= f64::EPSILON || rest <= f64::EPSILON {
            return 1.0;
        }
        (rest / distance) as f32
    }

    /// Total screen magnification.
    pub fn effective_zoom(&self) -> f32 {
        self.zoom * self.camera_scale()
    }

    pub fn reset_view(&mut self) {
        self.zoom = 1.0;
        self.pan_offset = Vec2::ZERO;
    }
}

impl CameraSink for VizState {
    fn set_position(&mut self, position: DVec3) {
        self.camera_position = position;
    }
}
