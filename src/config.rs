//! Map configuration.
//!
//! Settings are read from a JSON file so the viewer and any other renderer
//! share the same projection, placement and animation parameters.

use crate::error::{MapError, Result};
use crate::geo::{
    BuildIssue, BuildOptions, FeatureCollection, ProjectionConfig, CONTEXTUAL_SCALE,
};
use crate::scene::{CameraTransitionConfig, FlightLineConfig, PlacementConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Which projection a build uses.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "preset", rename_all = "snake_case")]
pub enum ProjectionChoice {
    /// Fixed large-scale view of the provincial capital.
    Detailed,
    /// Small-scale view centered on the first feature's anchor.
    Contextual {
        #[serde(default = "default_contextual_scale")]
        scale: f64,
    },
    Custom(ProjectionConfig),
}

fn default_contextual_scale() -> f64 {
    CONTEXTUAL_SCALE
}

impl Default for ProjectionChoice {
    fn default() -> Self {
        ProjectionChoice::Contextual {
            scale: CONTEXTUAL_SCALE,
        }
    }
}

impl ProjectionChoice {
    /// Resolves the concrete projection for a collection.
    ///
    /// A contextual view whose first anchor is missing or unplottable falls
    /// back to the detailed center; the returned issue records the fallback.
    pub fn resolve(
        &self,
        collection: &FeatureCollection,
    ) -> (ProjectionConfig, Option<BuildIssue>) {
        match *self {
            ProjectionChoice::Detailed => (ProjectionConfig::detailed(), None),
            ProjectionChoice::Contextual { scale } => {
                let anchor = collection.first_anchor();
                let centered = anchor
                    .map(|anchor| ProjectionConfig::contextual(anchor).with_scale(scale))
                    .filter(|config| config.validate().is_ok());
                match centered {
                    Some(config) => (config, None),
                    None => (
                        ProjectionConfig::detailed().with_scale(scale),
                        Some(BuildIssue::ContextualFallback { anchor }),
                    ),
                }
            }
            ProjectionChoice::Custom(config) => (config, None),
        }
    }
}

/// Control panel grid parameters. Only the viewer reads these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub grid_size: [f32; 2],
    pub cell_size: f32,
    pub cell_thickness: f32,
    pub cell_color: String,
    pub section_size: f32,
    pub infinite_grid: bool,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            grid_size: [10.5, 10.5],
            cell_size: 0.6,
            cell_thickness: 1.0,
            cell_color: "#6f6f6f".to_string(),
            section_size: 0.0,
            infinite_grid: true,
        }
    }
}

/// Complete configuration of a map scene.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub projection: ProjectionChoice,
    pub build: BuildOptions,
    pub placement: PlacementConfig,
    pub flight_lines: FlightLineConfig,
    pub camera: CameraTransitionConfig,
    pub grid: GridConfig,
}

impl MapConfig {
    /// Parses and validates JSON configuration. Missing fields take defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: MapConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| MapError::io(path, e))?;
        Self::from_json_str(&json)
    }

    /// Loads configuration, falling back to defaults when the file is absent
    /// or invalid.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };

        match Self::load_from_path(path) {
            Ok(config) => {
                log::info!("Loaded map configuration from {}", path.display());
                config
            }
            Err(e) => {
                log::warn!("Failed to load map configuration: {}", e);
                Self::default()
            }
        }
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn save_to_path(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = self.to_json_string()?;
        std::fs::write(path, json).map_err(|e| MapError::io(path, e))?;
        log::info!("Saved map configuration to {}", path.display());
        Ok(())
    }

    /// Rejects values that cannot produce a sensible scene.
    pub fn validate(&self) -> Result<()> {
        match &self.projection {
            ProjectionChoice::Detailed => {}
            ProjectionChoice::Contextual { scale } => {
                if !(scale.is_finite() && *scale > 0.0) {
                    return Err(invalid(format!(
                        "contextual scale must be positive, got {scale}"
                    )));
                }
            }
            ProjectionChoice::Custom(config) => config.validate()?,
        }

        if !(self.build.fill_depth.is_finite() && self.build.stroke_offset.is_finite()) {
            return Err(invalid("build depths must be finite"));
        }

        let placement = &self.placement;
        let mut placement_values = placement
            .group_position
            .iter()
            .chain(&placement.group_rotation)
            .chain([&placement.base_depth, &placement.label_depth]);
        if !placement_values.all(|v| v.is_finite()) {
            return Err(invalid("placement values must be finite"));
        }

        let camera = &self.camera;
        if !(camera.duration_secs.is_finite() && camera.duration_secs >= 0.0) {
            return Err(invalid(format!(
                "camera duration must be non-negative, got {}",
                camera.duration_secs
            )));
        }
        if !camera.from.iter().chain(&camera.to).all(|v| v.is_finite()) {
            return Err(invalid("camera keyframes must be finite"));
        }

        let lines = &self.flight_lines;
        if lines.segments == 0 {
            return Err(invalid("flight lines need at least one segment"));
        }
        if !(lines.height_factor.is_finite() && lines.speed.is_finite()) {
            return Err(invalid("flight line height and speed must be finite"));
        }

        if !(self.grid.cell_size >= 0.0 && self.grid.section_size >= 0.0) {
            return Err(invalid("grid sizes must be non-negative"));
        }

        Ok(())
    }
}

fn invalid(message: impl Into<String>) -> MapError {
    MapError::InvalidConfig(message.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::{FeatureGeometry, InvalidVertexPolicy, MapFeature, ProjectionKind};
    use crate::scene::Easing;
    use geo_types::Coord;

    #[test]
    fn test_empty_json_is_default() {
        let config = MapConfig::from_json_str("{}").unwrap();
        assert_eq!(config, MapConfig::default());
        assert_eq!(
            config.projection,
            ProjectionChoice::Contextual { scale: 80.0 }
        );
        assert_eq!(config.camera.duration_secs, 1.5);
        assert_eq!(config.camera.easing, Easing::SineInOut);
    }

    #[test]
    fn test_partial_json() {
        let config = MapConfig::from_json_str(
            r#"{
                "projection": { "preset": "custom", "kind": "equirectangular", "scale": 500.0 },
                "build": { "invalid_vertices": "zero_fill" },
                "camera": { "duration_secs": 3.0, "easing": "linear" },
                "flight_lines": { "hub": "自贡市" }
            }"#,
        )
        .unwrap();

        match config.projection {
            ProjectionChoice::Custom(projection) => {
                assert_eq!(projection.kind, ProjectionKind::Equirectangular);
                assert_eq!(projection.scale, 500.0);
                assert_eq!(projection.center, crate::geo::DETAILED_CENTER);
            }
            other => panic!("unexpected projection {other:?}"),
        }
        assert_eq!(config.build.invalid_vertices, InvalidVertexPolicy::ZeroFill);
        assert_eq!(config.build.stroke_offset, -0.01);
        assert_eq!(config.camera.easing, Easing::Linear);
        assert_eq!(config.flight_lines.hub.as_deref(), Some("自贡市"));
        assert_eq!(config.flight_lines.segments, 32);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(MapConfig::from_json_str(r#"{ "camera": { "duration_secs": -1.0 } }"#).is_err());
        assert!(MapConfig::from_json_str(
            r#"{ "projection": { "preset": "contextual", "scale": 0.0 } }"#
        )
        .is_err());
        assert!(MapConfig::from_json_str(r#"{ "flight_lines": { "segments": 0 } }"#).is_err());
        assert!(matches!(
            MapConfig::from_json_str("not json"),
            Err(MapError::Json(_))
        ));
    }

    #[test]
    fn test_json_round_trip() {
        let config = MapConfig {
            projection: ProjectionChoice::Detailed,
            ..Default::default()
        };
        let json = config.to_json_string().unwrap();
        assert_eq!(MapConfig::from_json_str(&json).unwrap(), config);
    }

    #[test]
    fn test_contextual_centers_on_first_anchor() {
        let anchored = FeatureCollection::from_features(vec![MapFeature::new(
            0,
            "成都市",
            FeatureGeometry::Unsupported("Point"),
        )
        .with_anchor(Coord { x: 103.9, y: 30.6 })]);
        let (resolved, issue) = ProjectionChoice::default().resolve(&anchored);
        assert_eq!(resolved.center, [103.9, 30.6]);
        assert_eq!(resolved.scale, 80.0);
        assert_eq!(issue, None);

        let bare = FeatureCollection::from_features(vec![]);
        let (resolved, issue) = ProjectionChoice::Contextual { scale: 40.0 }.resolve(&bare);
        assert_eq!(resolved.center, crate::geo::DETAILED_CENTER);
        assert_eq!(resolved.scale, 40.0);
        assert_eq!(issue, Some(BuildIssue::ContextualFallback { anchor: None }));
    }

    #[test]
    fn test_contextual_polar_anchor_falls_back() {
        let pole = Coord { x: 104.0, y: 90.0 };
        let polar = FeatureCollection::from_features(vec![MapFeature::new(
            0,
            "north pole",
            FeatureGeometry::Unsupported("Point"),
        )
        .with_anchor(pole)]);

        let (resolved, issue) = ProjectionChoice::default().resolve(&polar);
        assert_eq!(resolved.center, crate::geo::DETAILED_CENTER);
        assert_eq!(resolved.scale, 80.0);
        assert!(resolved.validate().is_ok());
        assert_eq!(
            issue,
            Some(BuildIssue::ContextualFallback { anchor: Some(pole) })
        );
    }
}
