//! Map projection and coordinate transformation.
//!
//! Handles converting geographic coordinates (lon/lat) into the planar
//! coordinates the scene geometry is built in.

use crate::error::{MapError, Result};
use geo_types::Coord;
use glam::DVec2;
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI, TAU};

/// Center of the detailed provincial view (Chengdu).
pub const DETAILED_CENTER: [f64; 2] = [104.065735, 30.659462];
/// Scale of the detailed provincial view.
pub const DETAILED_SCALE: f64 = 8000.0;
/// Scale of the wider contextual view.
pub const CONTEXTUAL_SCALE: f64 = 80.0;

/// Supported cylindrical projections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectionKind {
    /// Conformal cylindrical projection, undefined at the poles.
    #[default]
    Mercator,
    /// Plate carrée: longitude and latitude mapped linearly.
    Equirectangular,
}

/// Parameters of a projection instance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionConfig {
    pub kind: ProjectionKind,
    /// Geographic point (lon, lat) that lands on `translate`.
    pub center: [f64; 2],
    /// Zoom factor applied to raw projected radians.
    pub scale: f64,
    /// Planar offset applied after projection.
    pub translate: [f64; 2],
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self::detailed()
    }
}

impl ProjectionConfig {
    /// Tight, large-scale view used for the detailed map.
    pub fn detailed() -> Self {
        Self {
            kind: ProjectionKind::Mercator,
            center: DETAILED_CENTER,
            scale: DETAILED_SCALE,
            translate: [0.0, 0.0],
        }
    }

    /// Small-scale view centered on a feature's anchor.
    pub fn contextual(center: Coord<f64>) -> Self {
        Self {
            kind: ProjectionKind::Mercator,
            center: [center.x, center.y],
            scale: CONTEXTUAL_SCALE,
            translate: [0.0, 0.0],
        }
    }

    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    /// Checks that the configuration can produce finite output.
    pub fn validate(&self) -> Result<()> {
        if !(self.scale.is_finite() && self.scale > 0.0) {
            return Err(MapError::InvalidConfig(format!(
                "projection scale must be positive, got {}",
                self.scale
            )));
        }
        if !self.translate.iter().all(|v| v.is_finite()) {
            return Err(MapError::InvalidConfig(
                "projection translate must be finite".to_string(),
            ));
        }
        let [lon, lat] = self.center;
        let center_ok = raw_forward(self.kind, lon.to_radians(), lat.to_radians())
            .is_some_and(|p| p.is_finite());
        if !center_ok {
            return Err(MapError::InvalidConfig(format!(
                "projection center [{lon}, {lat}] is outside the projection domain"
            )));
        }
        Ok(())
    }
}

/// Stateless projector for a fixed configuration.
///
/// Two projectors built from the same configuration always produce
/// bit-identical output for the same input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projector {
    config: ProjectionConfig,
    /// Raw projected position of the configured center.
    origin: DVec2,
}

impl Projector {
    /// Creates a projector, rejecting configurations with an unplottable
    /// center or a degenerate scale.
    pub fn new(config: ProjectionConfig) -> Result<Self> {
        config.validate()?;
        let [lon, lat] = config.center;
        let origin = raw_forward(config.kind, lon.to_radians(), lat.to_radians()).ok_or_else(
            || MapError::InvalidConfig("projection center is unplottable".to_string()),
        )?;
        Ok(Self { config, origin })
    }

    pub fn config(&self) -> &ProjectionConfig {
        &self.config
    }

    /// Projects a geographic coordinate (x = lon, y = lat) to planar space.
    ///
    /// Returns `None` when the coordinate is outside the projection domain
    /// or not finite. Planar y grows southward.
    pub fn project(&self, coord: Coord<f64>) -> Option<DVec2> {
        if !(coord.x.is_finite() && coord.y.is_finite()) {
            return None;
        }

        let lambda = wrap_longitude(coord.x.to_radians());
        let phi = coord.y.to_radians();
        let raw = raw_forward(self.config.kind, lambda, phi)?;

        let k = self.config.scale;
        let [tx, ty] = self.config.translate;
        let projected = DVec2::new(
            tx + k * (raw.x - self.origin.x),
            ty - k * (raw.y - self.origin.y),
        );

        projected.is_finite().then_some(projected)
    }

    /// Converts a planar point back to geographic coordinates.
    pub fn unproject(&self, point: DVec2) -> Option<Coord<f64>> {
        if !point.is_finite() {
            return None;
        }

        let k = self.config.scale;
        let [tx, ty] = self.config.translate;
        let raw = DVec2::new(
            (point.x - tx) / k + self.origin.x,
            (ty - point.y) / k + self.origin.y,
        );

        let (lambda, phi) = raw_inverse(self.config.kind, raw);
        let coord = Coord {
            x: wrap_longitude(lambda).to_degrees(),
            y: phi.to_degrees(),
        };

        (coord.x.is_finite() && coord.y.is_finite() && coord.y.abs() <= 90.0).then_some(coord)
    }
}

/// Projects radians into unscaled planar space.
fn raw_forward(kind: ProjectionKind, lambda: f64, phi: f64) -> Option<DVec2> {
    match kind {
        ProjectionKind::Mercator => {
            if phi.abs() >= FRAC_PI_2 {
                return None;
            }
            let y = (FRAC_PI_4 + phi / 2.0).tan().ln();
            y.is_finite().then(|| DVec2::new(lambda, y))
        }
        ProjectionKind::Equirectangular => {
            (phi.abs() <= FRAC_PI_2).then(|| DVec2::new(lambda, phi))
        }
    }
}

fn raw_inverse(kind: ProjectionKind, raw: DVec2) -> (f64, f64) {
    match kind {
        ProjectionKind::Mercator => (raw.x, 2.0 * raw.y.exp().atan() - FRAC_PI_2),
        ProjectionKind::Equirectangular => (raw.x, raw.y),
    }
}

/// Wraps a longitude in radians into [-π, π].
fn wrap_longitude(lambda: f64) -> f64 {
    if lambda.abs() > PI {
        lambda - (lambda / TAU).round() * TAU
    } else {
        lambda
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mercator(center: [f64; 2], scale: f64) -> Projector {
        Projector::new(ProjectionConfig {
            kind: ProjectionKind::Mercator,
            center,
            scale,
            translate: [0.0, 0.0],
        })
        .unwrap()
    }

    #[test]
    fn test_center_projects_to_translate() {
        let projector = Projector::new(ProjectionConfig {
            translate: [12.0, -3.0],
            ..ProjectionConfig::detailed()
        })
        .unwrap();

        let p = projector
            .project(Coord {
                x: DETAILED_CENTER[0],
                y: DETAILED_CENTER[1],
            })
            .unwrap();
        assert!((p.x - 12.0).abs() < 1e-9);
        assert!((p.y + 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_projection_is_deterministic() {
        let a = mercator([104.0, 30.0], 8000.0);
        let b = mercator([104.0, 30.0], 8000.0);
        let coord = Coord { x: 102.71, y: 25.04 };

        let first = a.project(coord).unwrap();
        for _ in 0..10 {
            let again = a.project(coord).unwrap();
            assert_eq!(first.x.to_bits(), again.x.to_bits());
            assert_eq!(first.y.to_bits(), again.y.to_bits());
        }
        assert_eq!(first, b.project(coord).unwrap());
    }

    #[test]
    fn test_north_is_up() {
        let projector = mercator([104.0, 30.0], 1000.0);
        let north = projector.project(Coord { x: 104.0, y: 31.0 }).unwrap();
        let east = projector.project(Coord { x: 105.0, y: 30.0 }).unwrap();

        assert!(north.y < 0.0);
        assert!(north.x.abs() < 1e-9);
        assert!(east.x > 0.0);
        assert!((east.x - 1000.0 * 1f64.to_radians()).abs() < 1e-9);
    }

    #[test]
    fn test_out_of_domain_is_none() {
        let projector = mercator([104.0, 30.0], 80.0);

        assert!(projector.project(Coord { x: 104.0, y: 90.0 }).is_none());
        assert!(projector.project(Coord { x: 104.0, y: -95.0 }).is_none());
        assert!(projector.project(Coord { x: f64::NAN, y: 30.0 }).is_none());
        assert!(projector
            .project(Coord {
                x: f64::INFINITY,
                y: 30.0
            })
            .is_none());
    }

    #[test]
    fn test_longitude_wraps() {
        let projector = mercator([0.0, 0.0], 100.0);
        let a = projector.project(Coord { x: 190.0, y: 10.0 }).unwrap();
        let b = projector.project(Coord { x: -170.0, y: 10.0 }).unwrap();
        assert!((a.x - b.x).abs() < 1e-9);
        assert!((a.y - b.y).abs() < 1e-9);
    }

    #[test]
    fn test_equirectangular() {
        let projector = Projector::new(ProjectionConfig {
            kind: ProjectionKind::Equirectangular,
            center: [0.0, 0.0],
            scale: 180.0 / PI,
            translate: [0.0, 0.0],
        })
        .unwrap();

        let p = projector.project(Coord { x: 20.0, y: 45.0 }).unwrap();
        assert!((p.x - 20.0).abs() < 1e-9);
        assert!((p.y + 45.0).abs() < 1e-9);
        assert!(projector.project(Coord { x: 0.0, y: 90.0 }).is_some());
    }

    #[test]
    fn test_unproject_inverts_project() {
        let projector = mercator([104.0, 30.0], 8000.0);
        let coord = Coord { x: 106.55, y: 29.56 };
        let back = projector
            .unproject(projector.project(coord).unwrap())
            .unwrap();
        assert!((back.x - coord.x).abs() < 1e-9);
        assert!((back.y - coord.y).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_config_rejected() {
        assert!(Projector::new(ProjectionConfig::detailed().with_scale(0.0)).is_err());
        assert!(Projector::new(ProjectionConfig {
            center: [0.0, 90.0],
            ..ProjectionConfig::detailed()
        })
        .is_err());
        assert!(Projector::new(ProjectionConfig::contextual(Coord { x: 104.0, y: 30.0 })).is_ok());
    }
}
