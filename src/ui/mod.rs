//! UI modules for the Province Map viewer.
//!
//! The UI is split into distinct panels:
//! - Top bar: Title, build statistics, and status
//! - Left panel: Projection, layer and camera controls
//! - Central canvas: Map scene

mod canvas;
mod left_panel;
mod top_bar;

pub use canvas::render_canvas;
pub use left_panel::render_left_panel;
pub use top_bar::render_top_bar;
