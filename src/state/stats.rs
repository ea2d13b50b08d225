//! Build statistics for the top bar.

use province_map::SceneBuild;

/// Statistics about the most recent scene build.
#[derive(Default, Clone)]
pub struct BuildStats {
    /// Number of builds performed by the scene builder.
    pub build_count: usize,

    /// Region outlines in the current build.
    pub shapes: usize,

    /// Resolved label anchors.
    pub anchors: usize,

    /// Flight line arcs.
    pub flight_lines: usize,

    /// Non-fatal issues reported by the build.
    pub issues: usize,

    /// Duration of the last build in milliseconds.
    pub last_build_ms: Option<f64>,
}

impl BuildStats {
    pub fn record(&mut self, build: &SceneBuild, build_count: usize, elapsed_ms: f64) {
        self.build_count = build_count;
        self.shapes = build.shapes.len();
        self.anchors = build.anchors.len();
        self.flight_lines = build.flight_lines.len();
        self.issues = build.issues.len();
        self.last_build_ms = Some(elapsed_ms);
    }

    /// Format the build time for display (e.g., "3.2 ms").
    pub fn format_build_time(&self) -> String {
        match self.last_build_ms {
            Some(ms) => format!("{:.1} ms", ms),
            None => "--".to_string(),
        }
    }
}
