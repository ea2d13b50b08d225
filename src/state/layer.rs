//! Layer visibility state.

/// State for toggling the canvas layers.
#[derive(Clone)]
pub struct LayerState {
    /// Region borders
    pub outlines: bool,

    /// City names at the label anchors
    pub labels: bool,

    /// Arcs from the hub city
    pub flight_lines: bool,

    /// Ground grid below the map
    pub grid: bool,
}

impl Default for LayerState {
    fn default() -> Self {
        Self {
            outlines: true,
            labels: true,
            flight_lines: true,
            grid: true,
        }
    }
}
