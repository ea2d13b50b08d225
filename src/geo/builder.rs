//! Planar outline construction from feature rings.
//!
//! Projects every ring of every feature, folds the projected points into a
//! bounding box in the same pass and keeps the rings that still describe a
//! polygon. Problems are isolated per ring (or per ring-group) and reported as
//! [`BuildIssue`]s; nothing here aborts a build.

use super::bounds::{Bounds, BoundsAccumulator};
use super::layer::{FeatureCollection, FeatureGeometry, FeatureId, MapFeature, Ring, RingGroup};
use super::projection::Projector;
use geo_types::Coord;
use glam::DVec2;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Minimum number of distinct vertices for a ring to form a polygon.
pub const MIN_RING_VERTICES: usize = 3;

/// What to do with a vertex the projector cannot place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvalidVertexPolicy {
    /// Remove the vertex. The ring may become degenerate.
    #[default]
    Drop,
    /// Substitute the planar origin. Keeps the vertex count but distorts the
    /// outline; only useful to reproduce legacy renders.
    ZeroFill,
}

/// Options that affect shape construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildOptions {
    pub invalid_vertices: InvalidVertexPolicy,
    /// Depth of region fills within the map group.
    pub fill_depth: f64,
    /// Offset of border strokes relative to the fill; negative is toward the
    /// camera.
    pub stroke_offset: f64,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            invalid_vertices: InvalidVertexPolicy::Drop,
            fill_depth: 0.0,
            stroke_offset: -0.01,
        }
    }
}

impl BuildOptions {
    pub fn stroke_depth(&self) -> f64 {
        self.fill_depth + self.stroke_offset
    }
}

/// Identifies one ring within the collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShapeKey {
    pub feature: FeatureId,
    pub group: usize,
    pub ring: usize,
}

impl std::fmt::Display for ShapeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.feature, self.group, self.ring)
    }
}

/// Non-fatal problem recorded during a build.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BuildIssue {
    #[error("{name} ring {key}: vertex {vertex} ({coord:?}) is outside the projection domain")]
    InvalidProjection {
        key: ShapeKey,
        name: String,
        vertex: usize,
        coord: Coord<f64>,
    },

    #[error("{name} ring {key}: only {distinct} distinct vertices")]
    DegenerateRing {
        key: ShapeKey,
        name: String,
        distinct: usize,
    },

    #[error("{name} ({feature}) ring-group {group} has no rings")]
    EmptyRingGroup {
        feature: FeatureId,
        name: String,
        group: usize,
    },

    #[error("{name} ({feature}): unsupported geometry kind {kind}")]
    UnsupportedGeometry {
        feature: FeatureId,
        name: String,
        kind: &'static str,
    },

    #[error("{name} ({feature}) has no centroid or center")]
    MissingAnchor { feature: FeatureId, name: String },

    #[error("{name} ({feature}) anchor {coord:?} is outside the projection domain")]
    UnplottableAnchor {
        feature: FeatureId,
        name: String,
        coord: Coord<f64>,
    },

    #[error("contextual view cannot center on anchor {anchor:?}, using the detailed center")]
    ContextualFallback { anchor: Option<Coord<f64>> },
}

/// A ring after projection and invalid-vertex handling.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectedRing {
    pub points: Vec<DVec2>,
    /// Source indices of vertices the projector rejected.
    pub invalid: Vec<usize>,
}

impl ProjectedRing {
    /// Number of distinct points, ignoring repeats anywhere in the ring.
    pub fn distinct_count(&self) -> usize {
        // Adding 0.0 folds -0.0 into 0.0 so both hash alike.
        self.points
            .iter()
            .map(|p| ((p.x + 0.0).to_bits(), (p.y + 0.0).to_bits()))
            .collect::<HashSet<_>>()
            .len()
    }

    /// Outline vertices: consecutive repeats and the closing repeat removed.
    pub fn outline(&self) -> Vec<DVec2> {
        let mut points = self.points.clone();
        points.dedup();
        if points.len() > 1 && points.first() == points.last() {
            points.pop();
        }
        points
    }
}

/// Projects one ring, applying `policy` to unplottable vertices.
pub fn project_ring(
    ring: &Ring,
    projector: &Projector,
    policy: InvalidVertexPolicy,
) -> ProjectedRing {
    let mut projected = ProjectedRing {
        points: Vec::with_capacity(ring.len()),
        invalid: Vec::new(),
    };

    for (index, coord) in ring.iter().enumerate() {
        match (projector.project(*coord), policy) {
            (Some(point), _) => projected.points.push(point),
            (None, InvalidVertexPolicy::ZeroFill) => {
                projected.invalid.push(index);
                projected.points.push(DVec2::ZERO);
            }
            (None, InvalidVertexPolicy::Drop) => projected.invalid.push(index),
        }
    }

    projected
}

/// Closed planar outline of one ring, before centering.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeOutline {
    pub key: ShapeKey,
    pub name: String,
    /// Open polygon: the first vertex is not repeated at the end.
    pub points: Vec<DVec2>,
}

impl ShapeOutline {
    /// Border loop for stroke rendering, closed back to the first vertex.
    pub fn edge_loop(&self) -> Vec<DVec2> {
        let mut edge = self.points.clone();
        if let Some(first) = self.points.first() {
            edge.push(*first);
        }
        edge
    }
}

/// Result of one geometry pass.
#[derive(Debug, Clone, Default)]
pub struct BuiltGeometry {
    pub outlines: Vec<ShapeOutline>,
    pub bounds: Option<Bounds>,
    pub issues: Vec<BuildIssue>,
}

/// Single-owner builder for one pass over a feature set.
///
/// The bounding box lives inside the builder and is frozen by
/// [`finish`](Self::finish), so no pass can observe another's box.
pub struct GeometryBuilder<'a> {
    projector: &'a Projector,
    options: &'a BuildOptions,
    bounds: BoundsAccumulator,
    outlines: Vec<ShapeOutline>,
    issues: Vec<BuildIssue>,
}

/// Output of one successfully built ring-group.
struct GroupOutput {
    outlines: Vec<ShapeOutline>,
    bounds: BoundsAccumulator,
    issues: Vec<BuildIssue>,
}

impl<'a> GeometryBuilder<'a> {
    pub fn new(projector: &'a Projector, options: &'a BuildOptions) -> Self {
        Self {
            projector,
            options,
            bounds: BoundsAccumulator::new(),
            outlines: Vec::new(),
            issues: Vec::new(),
        }
    }

    /// Builds every ring of every feature in order.
    pub fn add_collection(&mut self, collection: &FeatureCollection) {
        for feature in collection.iter() {
            self.add_feature(feature);
        }
    }

    /// Builds the outlines of one feature.
    pub fn add_feature(&mut self, feature: &MapFeature) {
        if let FeatureGeometry::Unsupported(kind) = feature.geometry {
            log::debug!("Skipping {} geometry of {}", kind, feature.name);
            self.issues.push(BuildIssue::UnsupportedGeometry {
                feature: feature.id,
                name: feature.name.clone(),
                kind,
            });
            return;
        }

        for (group_index, group) in feature.geometry.ring_groups().iter().enumerate() {
            match self.build_ring_group(feature, group_index, group) {
                Ok(output) => {
                    self.bounds = self.bounds.union(output.bounds);
                    self.outlines.extend(output.outlines);
                    self.issues.extend(output.issues);
                }
                Err(issue) => {
                    log::warn!("Skipping ring-group: {}", issue);
                    self.issues.push(issue);
                }
            }
        }
    }

    /// Builds one ring-group into its own bounds so a failed group leaves no
    /// trace in the pass.
    fn build_ring_group(
        &self,
        feature: &MapFeature,
        group_index: usize,
        group: &RingGroup,
    ) -> Result<GroupOutput, BuildIssue> {
        if group.is_empty() {
            return Err(BuildIssue::EmptyRingGroup {
                feature: feature.id,
                name: feature.name.clone(),
                group: group_index,
            });
        }

        let mut output = GroupOutput {
            outlines: Vec::new(),
            bounds: BoundsAccumulator::new(),
            issues: Vec::new(),
        };

        // Holes are drawn as independent boundaries; they are not subtracted.
        for (ring_index, ring) in group.iter().enumerate() {
            let key = ShapeKey {
                feature: feature.id,
                group: group_index,
                ring: ring_index,
            };

            let projected = project_ring(ring, self.projector, self.options.invalid_vertices);
            for &vertex in &projected.invalid {
                log::debug!("{} ring {}: vertex {} is unplottable", feature.name, key, vertex);
                output.issues.push(BuildIssue::InvalidProjection {
                    key,
                    name: feature.name.clone(),
                    vertex,
                    coord: ring[vertex],
                });
            }

            let distinct = projected.distinct_count();
            if distinct < MIN_RING_VERTICES {
                log::warn!(
                    "{} ring {}: {} distinct vertices, skipping",
                    feature.name,
                    key,
                    distinct
                );
                output.issues.push(BuildIssue::DegenerateRing {
                    key,
                    name: feature.name.clone(),
                    distinct,
                });
                continue;
            }

            // Only rings that become shapes count toward the bounds.
            output.bounds = projected
                .points
                .iter()
                .fold(output.bounds, |acc, p| acc.expand_by_point(*p));
            output.outlines.push(ShapeOutline {
                key,
                name: feature.name.clone(),
                points: projected.outline(),
            });
        }

        Ok(output)
    }

    pub fn finish(self) -> BuiltGeometry {
        log::debug!(
            "Built {} outlines with {} issues",
            self.outlines.len(),
            self.issues.len()
        );
        BuiltGeometry {
            outlines: self.outlines,
            bounds: self.bounds.finalize(),
            issues: self.issues,
        }
    }
}

/// Bounds of a whole collection in one projection pass, without building
/// any outlines. Degenerate rings are left out. Agrees with the bounds of a
/// full [`GeometryBuilder`] pass under the same projector and policy.
pub fn bounds_of_collection(
    collection: &FeatureCollection,
    projector: &Projector,
    policy: InvalidVertexPolicy,
) -> Option<Bounds> {
    collection
        .iter()
        .flat_map(|feature| feature.geometry.ring_groups())
        .flatten()
        .map(|ring| project_ring(ring, projector, policy))
        .filter(|projected| projected.distinct_count() >= MIN_RING_VERTICES)
        .flat_map(|projected| projected.points)
        .fold(BoundsAccumulator::new(), BoundsAccumulator::expand_by_point)
        .finalize()
}
