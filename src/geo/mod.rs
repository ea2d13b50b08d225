//! Geographic input and planar geometry.
//!
//! This module turns the administrative GeoJSON dataset into projected,
//! renderable outlines: projection, feature indexing, shape construction and
//! bounding boxes.

mod bounds;
mod builder;
mod layer;
mod projection;

pub use bounds::{Bounds, BoundsAccumulator};
pub use builder::{
    bounds_of_collection, project_ring, BuildIssue, BuildOptions, BuiltGeometry,
    GeometryBuilder, InvalidVertexPolicy, ProjectedRing, ShapeKey, ShapeOutline,
    MIN_RING_VERTICES,
};
pub use layer::{FeatureCollection, FeatureGeometry, FeatureId, MapFeature, Ring, RingGroup};
pub use projection::{
    ProjectionConfig, ProjectionKind, Projector, CONTEXTUAL_SCALE, DETAILED_CENTER,
    DETAILED_SCALE,
};
