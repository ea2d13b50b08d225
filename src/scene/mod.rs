//! Scene assembly on top of the planar geometry.
//!
//! Combines built outlines with label anchors, the centering and group
//! transforms, flight lines and the mount-time camera transition.

mod build;
mod camera;
mod flight_line;
mod mount;
mod placement;

pub use build::{build_scene, MaterialRef, MaterialSet, SceneBuild, SceneBuilder, Shape};
pub use camera::{
    CameraSink, CameraTransition, CameraTransitionConfig, Easing, TransitionHandle,
    TransitionStatus,
};
pub use flight_line::{build_flight_lines, flow_phase, FlightLine, FlightLineConfig};
pub use mount::Scene;
pub use placement::{
    resolve_anchors, Anchor, CenteringTransform, PlacementConfig, RenderGroupTransform,
};
