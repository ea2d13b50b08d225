//! Label anchors and the map group's placement in the scene.

use crate::geo::{Bounds, BuildIssue, FeatureCollection, FeatureId, Projector};
use glam::{DQuat, DVec2, DVec3, EulerRot};
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, PI};

/// Placement of the whole map group and its layers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementConfig {
    /// Position of the map group in its parent.
    pub group_position: [f64; 3],
    /// Euler rotation (XYZ order, radians) of the map group.
    pub group_rotation: [f64; 3],
    /// Depth of the base map layer.
    pub base_depth: f64,
    /// Depth of the label layer.
    pub label_depth: f64,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            group_position: [0.0, 0.5, -1.5],
            group_rotation: [FRAC_PI_2, 0.0, PI * 1.5],
            base_depth: -0.01,
            label_depth: -0.1,
        }
    }
}

/// Translation that puts the bounding-box center at the local origin.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CenteringTransform {
    offset: DVec2,
}

impl CenteringTransform {
    /// Identity when there are no bounds.
    pub fn from_bounds(bounds: Option<&Bounds>) -> Self {
        Self {
            offset: bounds.map(Bounds::centering_offset).unwrap_or(DVec2::ZERO),
        }
    }

    pub fn offset(&self) -> DVec2 {
        self.offset
    }

    pub fn apply(&self, point: DVec2) -> DVec2 {
        point + self.offset
    }
}

/// Full transform of the rendered map group.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderGroupTransform {
    pub position: DVec3,
    pub rotation: DVec3,
    pub centering: CenteringTransform,
    /// Depth of the base map layer; fills, borders and labels sit on it.
    pub base_depth: f64,
    /// Depth of labels relative to the base map.
    pub label_depth: f64,
}

impl RenderGroupTransform {
    pub fn resolve(config: &PlacementConfig, bounds: Option<&Bounds>) -> Self {
        Self {
            position: DVec3::from_array(config.group_position),
            rotation: DVec3::from_array(config.group_rotation),
            centering: CenteringTransform::from_bounds(bounds),
            base_depth: config.base_depth,
            label_depth: config.label_depth,
        }
    }

    /// Depth of `layer_depth` once nested under the base map.
    pub fn on_base(&self, layer_depth: f64) -> f64 {
        self.base_depth + layer_depth
    }

    /// Absolute label depth in the map frame.
    pub fn label_z(&self) -> f64 {
        self.on_base(self.label_depth)
    }

    /// Maps a point in the centered map frame into the group's parent frame.
    pub fn to_parent(&self, local: DVec3) -> DVec3 {
        let rotation = DQuat::from_euler(
            EulerRot::XYZ,
            self.rotation.x,
            self.rotation.y,
            self.rotation.z,
        );
        rotation * local + self.position
    }
}

/// Named label position for one feature.
#[derive(Debug, Clone, PartialEq)]
pub struct Anchor {
    pub feature: FeatureId,
    pub name: String,
    /// Centered planar position, with z at the label depth.
    pub position: DVec3,
}

impl Anchor {
    pub fn planar(&self) -> DVec2 {
        self.position.truncate()
    }
}

/// Projects every feature's anchor with the shared projector and centering.
///
/// Features without an anchor, or whose anchor cannot be projected, get no
/// label; each case is reported as an issue.
pub fn resolve_anchors(
    collection: &FeatureCollection,
    projector: &Projector,
    centering: &CenteringTransform,
    label_depth: f64,
) -> (Vec<Anchor>, Vec<BuildIssue>) {
    let mut anchors = Vec::with_capacity(collection.len());
    let mut issues = Vec::new();

    for feature in collection.iter() {
        let Some(coord) = feature.anchor else {
            log::debug!("{} has no anchor, no label", feature.name);
            issues.push(BuildIssue::MissingAnchor {
                feature: feature.id,
                name: feature.name.clone(),
            });
            continue;
        };

        match projector.project(coord) {
            Some(point) => anchors.push(Anchor {
                feature: feature.id,
                name: feature.name.clone(),
                position: centering.apply(point).extend(label_depth),
            }),
            None => {
                log::warn!("{}: anchor {:?} is unplottable", feature.name, coord);
                issues.push(BuildIssue::UnplottableAnchor {
                    feature: feature.id,
                    name: feature.name.clone(),
                    coord,
                });
            }
        }
    }

    (anchors, issues)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::{BoundsAccumulator, FeatureGeometry, MapFeature, ProjectionConfig};
    use geo_types::Coord;

    #[test]
    fn test_centering_from_bounds() {
        let bounds = BoundsAccumulator::from_points([DVec2::new(2.0, 4.0), DVec2::new(6.0, 10.0)])
            .finalize()
            .unwrap();
        let centering = CenteringTransform::from_bounds(Some(&bounds));

        assert_eq!(centering.offset(), DVec2::new(-4.0, -7.0));
        assert_eq!(centering.apply(bounds.center()), DVec2::ZERO);
        assert_eq!(CenteringTransform::from_bounds(None).offset(), DVec2::ZERO);
    }

    #[test]
    fn test_anchors_skip_missing_and_unplottable() {
        let collection = FeatureCollection::from_features(vec![
            MapFeature::new(0, "center", FeatureGeometry::Unsupported("Point"))
                .with_anchor(Coord { x: 104.0, y: 30.0 }),
            MapFeature::new(1, "none", FeatureGeometry::Unsupported("Point")),
            MapFeature::new(2, "pole", FeatureGeometry::Unsupported("Point"))
                .with_anchor(Coord { x: 104.0, y: 90.0 }),
        ]);
        let projector = Projector::new(ProjectionConfig::contextual(Coord { x: 104.0, y: 30.0 }))
            .unwrap();
        let centering = CenteringTransform {
            offset: DVec2::new(1.0, -1.0),
        };

        let (anchors, issues) = resolve_anchors(&collection, &projector, &centering, -0.1);

        assert_eq!(anchors.len(), 1);
        assert_eq!(anchors[0].name, "center");
        assert!((anchors[0].position - DVec3::new(1.0, -1.0, -0.1)).length() < 1e-12);
        assert!(matches!(issues[0], BuildIssue::MissingAnchor { .. }));
        assert!(matches!(issues[1], BuildIssue::UnplottableAnchor { .. }));
    }

    #[test]
    fn test_group_transform() {
        let config = PlacementConfig {
            group_position: [0.0, 0.5, -1.5],
            group_rotation: [FRAC_PI_2, 0.0, 0.0],
            ..Default::default()
        };
        let group = RenderGroupTransform::resolve(&config, None);

        let moved = group.to_parent(DVec3::new(0.0, 1.0, 0.0));
        assert!((moved - DVec3::new(0.0, 0.5, -0.5)).length() < 1e-12);

        let identity = RenderGroupTransform::resolve(
            &PlacementConfig {
                group_position: [0.0; 3],
                group_rotation: [0.0; 3],
                ..Default::default()
            },
            None,
        );
        assert_eq!(identity.to_parent(DVec3::ONE), DVec3::ONE);
    }

    #[test]
    fn test_layers_nest_under_base_depth() {
        let group = RenderGroupTransform::resolve(&PlacementConfig::default(), None);
        assert!((group.label_z() - (-0.11)).abs() < 1e-12);
        assert!((group.on_base(0.0) - (-0.01)).abs() < 1e-12);

        let lowered = RenderGroupTransform::resolve(
            &PlacementConfig {
                base_depth: -5.0,
                ..Default::default()
            },
            None,
        );
        assert!((lowered.label_z() - (-5.1)).abs() < 1e-12);
    }
}
