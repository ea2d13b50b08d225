#![warn(clippy::all)]

//! Province Map - desktop viewer for the administrative map scene.
//!
//! Loads a province GeoJSON dataset and an optional JSON configuration, then
//! draws the centered region borders, city labels and flight lines while the
//! mount-time camera transition plays.
//!
//! Usage: `province-map <features.geojson> [config.json]`

mod state;
mod ui;

use eframe::egui;
use province_map::scene::TransitionStatus;
use province_map::{FeatureCollection, MapConfig, Projector, Scene, SceneBuild, SceneBuilder};
use state::AppState;
use std::path::PathBuf;
use std::sync::Arc;
use web_time::Instant;

fn main() -> eframe::Result<()> {
    env_logger::init();

    let mut args = std::env::args_os().skip(1);
    let Some(features_path) = args.next().map(PathBuf::from) else {
        eprintln!("Usage: province-map <features.geojson> [config.json]");
        std::process::exit(2);
    };
    let config_path = args.next().map(PathBuf::from);

    let collection = match FeatureCollection::load_from_path(&features_path) {
        Ok(collection) => collection,
        Err(e) => {
            log::error!("{}", e);
            std::process::exit(1);
        }
    };
    let config = MapConfig::load_or_default(config_path.as_deref());

    let native_options = eframe::NativeOptions::default();

    eframe::run_native(
        "Province Map",
        native_options,
        Box::new(move |_cc| Ok(Box::new(MapViewerApp::new(collection, config, config_path)))),
    )
}

/// Main viewer application.
pub struct MapViewerApp {
    /// Viewer state
    state: AppState,

    /// Memoizing scene builder over the loaded collection
    builder: SceneBuilder,

    /// Lifecycle owner of the camera transition
    scene: Scene,

    /// Most recent successful build
    build: Option<Arc<SceneBuild>>,

    /// Projector of the current build, for cursor coordinates
    projector: Option<Projector>,

    /// Animation clock origin for the flight line flow
    started: Instant,
}

impl MapViewerApp {
    pub fn new(
        collection: FeatureCollection,
        config: MapConfig,
        config_path: Option<PathBuf>,
    ) -> Self {
        log::info!("Loaded {} features", collection.len());
        let scene = Scene::new(config.camera);
        Self {
            state: AppState::new(config, config_path),
            builder: SceneBuilder::new(Arc::new(collection)),
            scene,
            build: None,
            projector: None,
            started: Instant::now(),
        }
    }

    /// Rebuilds the scene when the configuration changed since last frame.
    fn refresh_build(&mut self) {
        let build_start = Instant::now();
        let previous_count = self.builder.build_count();

        let build = match self.builder.rebuild(&self.state.config) {
            Ok(build) => build,
            Err(e) => {
                self.state.status_message = format!("Invalid configuration: {}", e);
                return;
            }
        };

        if self.builder.build_count() == previous_count {
            return;
        }

        let elapsed_ms = build_start.elapsed().as_secs_f64() * 1000.0;
        self.state
            .build_stats
            .record(&build, self.builder.build_count(), elapsed_ms);
        self.projector = Projector::new(build.projection).ok();
        self.state.status_message = if build.issues.is_empty() {
            "Ready".to_string()
        } else {
            format!("{} build issues", build.issues.len())
        };
        log::debug!("Scene rebuilt in {:.1}ms", elapsed_ms);
        self.build = Some(build);
    }

    /// Remounts the scene so the camera transition plays again.
    fn replay_camera(&mut self, now: Instant) {
        self.scene.on_unmount();
        self.scene = Scene::new(self.state.config.camera);
        self.state.viz_state.camera_rest = glam::DVec3::from_array(self.state.config.camera.to);
        self.scene.mount(now);
    }
}

impl eframe::App for MapViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();

        if std::mem::take(&mut self.state.replay_camera) {
            self.replay_camera(now);
        } else if !self.scene.is_mounted() {
            self.scene.mount(now);
        }

        let status = self.scene.tick(now, &mut self.state.viz_state);
        self.refresh_build();

        let build = self.build.clone();
        let elapsed_secs = now.duration_since(self.started).as_secs_f64();

        ui::render_top_bar(ctx, &self.state);
        ui::render_left_panel(ctx, &mut self.state, build.as_deref());
        ui::render_canvas(
            ctx,
            &mut self.state,
            build.as_deref(),
            self.projector.as_ref(),
            elapsed_secs,
        );

        let animating = status == TransitionStatus::Running
            || (self.state.layer_state.flight_lines
                && build.as_ref().is_some_and(|b| !b.flight_lines.is_empty()));
        if animating {
            ctx.request_repaint();
        }
    }
}
