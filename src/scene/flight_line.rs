//! Arc connectors ("flight lines") between city anchors.

use super::placement::Anchor;
use glam::DVec3;
use serde::{Deserialize, Serialize};

/// Arcs bulge toward the camera, which is negative depth in the map frame.
const LIFT_DIRECTION: DVec3 = DVec3::NEG_Z;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlightLineConfig {
    pub enabled: bool,
    /// Name of the anchor every line starts from; the first anchor if unset.
    pub hub: Option<String>,
    /// Number of straight segments per arc.
    pub segments: usize,
    /// Arc height as a fraction of the chord length.
    pub height_factor: f64,
    /// Flow animation speed in cycles per second.
    pub speed: f64,
}

impl Default for FlightLineConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            hub: None,
            segments: 32,
            height_factor: 0.3,
            speed: 0.5,
        }
    }
}

/// Sampled arc from the hub anchor to one destination anchor.
#[derive(Debug, Clone, PartialEq)]
pub struct FlightLine {
    pub from: String,
    pub to: String,
    /// `segments + 1` points from the hub to the destination.
    pub points: Vec<DVec3>,
}

/// Builds one arc from the hub to every other anchor.
pub fn build_flight_lines(anchors: &[Anchor], config: &FlightLineConfig) -> Vec<FlightLine> {
    if !config.enabled || anchors.len() < 2 {
        return Vec::new();
    }

    let hub = match &config.hub {
        Some(name) => anchors.iter().find(|a| &a.name == name),
        None => anchors.first(),
    };
    let Some(hub) = hub else {
        log::warn!(
            "Flight line hub {:?} has no anchor, no lines built",
            config.hub
        );
        return Vec::new();
    };

    let segments = config.segments.max(1);
    anchors
        .iter()
        .filter(|a| a.feature != hub.feature)
        .map(|destination| FlightLine {
            from: hub.name.clone(),
            to: destination.name.clone(),
            points: sample_arc(
                hub.position,
                destination.position,
                config.height_factor,
                segments,
            ),
        })
        .collect()
}

/// Samples a quadratic Bézier lifted above the chord midpoint.
fn sample_arc(start: DVec3, end: DVec3, height_factor: f64, segments: usize) -> Vec<DVec3> {
    let lift = start.distance(end) * height_factor;
    let control = start.lerp(end, 0.5) + LIFT_DIRECTION * lift;

    (0..=segments)
        .map(|i| {
            let t = i as f64 / segments as f64;
            let a = start.lerp(control, t);
            let b = control.lerp(end, t);
            a.lerp(b, t)
        })
        .collect()
}

/// Dash offset of the flow animation, in [0, 1).
pub fn flow_phase(elapsed_secs: f64, speed: f64) -> f64 {
    let phase = (elapsed_secs * speed).rem_euclid(1.0);
    // rem_euclid rounds tiny negative inputs up to exactly 1.0.
    if phase >= 1.0 {
        0.0
    } else {
        phase
    }
}
