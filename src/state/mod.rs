//! Viewer state management.
//!
//! The map configuration is the single source of truth for the scene; the
//! remaining state only affects how the viewer draws it.

mod layer;
mod stats;
mod viz;

pub use layer::LayerState;
pub use stats::BuildStats;
pub use viz::VizState;

use province_map::MapConfig;
use std::path::PathBuf;

/// Root viewer state containing all sub-states.
#[derive(Default)]
pub struct AppState {
    /// Scene configuration edited by the control panel
    pub config: MapConfig,

    /// Where the configuration was loaded from, if anywhere
    pub config_path: Option<PathBuf>,

    /// Canvas state (zoom/pan, camera, cursor)
    pub viz_state: VizState,

    /// Layer visibility toggles
    pub layer_state: LayerState,

    /// Statistics about the most recent scene build
    pub build_stats: BuildStats,

    /// Set by the control panel to restart the camera transition
    pub replay_camera: bool,

    /// Status message displayed in top bar
    pub status_message: String,
}

impl AppState {
    pub fn new(config: MapConfig, config_path: Option<PathBuf>) -> Self {
        let viz_state = VizState::new(&config.camera);
        Self {
            config,
            config_path,
            viz_state,
            status_message: "Ready".to_string(),
            ..Default::default()
        }
    }
}
