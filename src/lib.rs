#![warn(clippy::all)]

//! Province Map - administrative map scene geometry.
//!
//! Turns a GeoJSON dataset of a province and its cities into renderable
//! scene data: projected, centered region outlines with borders, city label
//! anchors, flight line arcs and a cancelable mount-time camera transition.
//! Rendering itself is left to the caller; see the `province-map` viewer
//! binary for one consumer.

pub mod config;
pub mod error;
pub mod geo;
pub mod scene;

pub use config::{GridConfig, MapConfig, ProjectionChoice};
pub use error::{MapError, Result};
pub use geo::{FeatureCollection, Projector};
pub use scene::{Scene, SceneBuild, SceneBuilder};
