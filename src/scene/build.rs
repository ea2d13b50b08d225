//! Scene build pass: shapes, anchors and flight lines for one configuration.
//!
//! [`SceneBuilder::rebuild`] is the entry point renderers call. A build is a
//! pure function of the feature collection and the configuration, so the last
//! result is reused as long as neither changes.

use super::flight_line::{build_flight_lines, FlightLine, FlightLineConfig};
use super::placement::{
    resolve_anchors, Anchor, CenteringTransform, PlacementConfig, RenderGroupTransform,
};
use crate::config::{MapConfig, ProjectionChoice};
use crate::error::Result;
use crate::geo::{
    Bounds, BuildIssue, BuildOptions, FeatureCollection, GeometryBuilder, ProjectionConfig,
    Projector, ShapeKey,
};
use glam::DVec2;
use std::sync::Arc;

/// Opaque material handle supplied by the asset loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaterialRef(pub u64);

/// Materials attached to every shape of a build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MaterialSet {
    pub fill: Option<MaterialRef>,
    pub stroke: Option<MaterialRef>,
}

/// Renderable region: centered fill outline plus its border loop.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    pub key: ShapeKey,
    pub name: String,
    /// Open polygon in the centered map frame.
    pub outline: Vec<DVec2>,
    /// Closed border loop for stroke rendering.
    pub edge_loop: Vec<DVec2>,
    /// Texture coordinates of `outline`, normalized over the build bounds.
    pub uvs: Vec<DVec2>,
    pub fill_depth: f64,
    pub stroke_depth: f64,
    pub fill_material: Option<MaterialRef>,
    pub stroke_material: Option<MaterialRef>,
}

/// Everything a renderer needs from one build pass.
#[derive(Debug, Clone)]
pub struct SceneBuild {
    pub projection: ProjectionConfig,
    pub shapes: Vec<Shape>,
    pub anchors: Vec<Anchor>,
    pub flight_lines: Vec<FlightLine>,
    /// Bounds of the projected geometry before centering.
    pub bounds: Option<Bounds>,
    pub group: RenderGroupTransform,
    pub issues: Vec<BuildIssue>,
}

impl SceneBuild {
    /// Center of the uncentered bounds; the origin for an empty build.
    pub fn bounding_box_center(&self) -> DVec2 {
        self.bounds.map(|b| b.center()).unwrap_or(DVec2::ZERO)
    }

    pub fn centering(&self) -> &CenteringTransform {
        &self.group.centering
    }

    /// Bounds after the centering transform; centered on the origin.
    pub fn centered_bounds(&self) -> Option<Bounds> {
        self.bounds
            .map(|b| b.translated(self.group.centering.offset()))
    }

    /// Border loops of every region, for the province outline stroke.
    pub fn outline(&self) -> impl Iterator<Item = &[DVec2]> {
        self.shapes.iter().map(|s| s.edge_loop.as_slice())
    }

    pub fn anchor(&self, name: &str) -> Option<&Anchor> {
        self.anchors.iter().find(|a| a.name == name)
    }
}

/// Runs one full build pass.
///
/// The bounding box is folded while the outlines are built, then frozen; the
/// single centering transform derived from it is applied to every shape,
/// anchor and flight line of the pass.
pub fn build_scene(
    collection: &FeatureCollection,
    projector: &Projector,
    config: &MapConfig,
    materials: MaterialSet,
) -> SceneBuild {
    let options = &config.build;
    let mut builder = GeometryBuilder::new(projector, options);
    builder.add_collection(collection);
    let geometry = builder.finish();

    let group = RenderGroupTransform::resolve(&config.placement, geometry.bounds.as_ref());
    let centering = group.centering;
    let centered_bounds = geometry
        .bounds
        .map(|b| b.translated(centering.offset()));

    let shapes: Vec<Shape> = geometry
        .outlines
        .into_iter()
        .map(|outline| {
            let edge_loop = outline
                .edge_loop()
                .into_iter()
                .map(|p| centering.apply(p))
                .collect();
            let points: Vec<DVec2> = outline.points.iter().map(|p| centering.apply(*p)).collect();
            let uvs = match &centered_bounds {
                Some(bounds) => points.iter().map(|p| bounds.uv(*p)).collect(),
                None => vec![DVec2::ZERO; points.len()],
            };
            Shape {
                key: outline.key,
                name: outline.name,
                outline: points,
                edge_loop,
                uvs,
                fill_depth: group.on_base(options.fill_depth),
                stroke_depth: group.on_base(options.stroke_depth()),
                fill_material: materials.fill,
                stroke_material: materials.stroke,
            }
        })
        .collect();

    let (anchors, anchor_issues) =
        resolve_anchors(collection, projector, &centering, group.label_z());
    let flight_lines = build_flight_lines(&anchors, &config.flight_lines);

    let mut issues = geometry.issues;
    issues.extend(anchor_issues);

    log::debug!(
        "Scene build: {} shapes, {} anchors, {} flight lines, {} issues",
        shapes.len(),
        anchors.len(),
        flight_lines.len(),
        issues.len()
    );

    SceneBuild {
        projection: *projector.config(),
        shapes,
        anchors,
        flight_lines,
        bounds: geometry.bounds,
        group,
        issues,
    }
}

/// Everything a build depends on.
#[derive(Debug, Clone, PartialEq)]
struct BuildKey {
    revision: u64,
    projection: ProjectionChoice,
    build: BuildOptions,
    placement: PlacementConfig,
    flight_lines: FlightLineConfig,
    materials: MaterialSet,
}

/// Owns the feature collection and memoizes the last build.
pub struct SceneBuilder {
    collection: Arc<FeatureCollection>,
    materials: MaterialSet,
    cached: Option<(BuildKey, Arc<SceneBuild>)>,
    build_count: usize,
}

impl SceneBuilder {
    pub fn new(collection: Arc<FeatureCollection>) -> Self {
        Self {
            collection,
            materials: MaterialSet::default(),
            cached: None,
            build_count: 0,
        }
    }

    pub fn with_materials(mut self, materials: MaterialSet) -> Self {
        self.materials = materials;
        self
    }

    pub fn set_materials(&mut self, materials: MaterialSet) {
        self.materials = materials;
    }

    pub fn collection(&self) -> &Arc<FeatureCollection> {
        &self.collection
    }

    /// Replaces the source data. The next rebuild recomputes everything.
    pub fn set_collection(&mut self, collection: Arc<FeatureCollection>) {
        self.collection = collection;
        self.cached = None;
    }

    /// Number of build passes actually run (cache hits excluded).
    pub fn build_count(&self) -> usize {
        self.build_count
    }

    /// Returns the build for `config`, reusing the previous one when no
    /// dependency changed. Fails only on invalid configuration.
    pub fn rebuild(&mut self, config: &MapConfig) -> Result<Arc<SceneBuild>> {
        config.validate()?;
        let key = BuildKey {
            revision: self.collection.revision(),
            projection: config.projection,
            build: config.build,
            placement: config.placement,
            flight_lines: config.flight_lines.clone(),
            materials: self.materials,
        };

        if let Some((cached_key, build)) = &self.cached {
            if *cached_key == key {
                return Ok(Arc::clone(build));
            }
        }

        let (projection, fallback) = config.projection.resolve(&self.collection);
        let projector = Projector::new(projection)?;
        let mut build = build_scene(&self.collection, &projector, config, self.materials);
        if let Some(issue) = fallback {
            log::warn!("{issue}");
            build.issues.insert(0, issue);
        }
        let build = Arc::new(build);
        self.build_count += 1;
        self.cached = Some((key, Arc::clone(&build)));
        Ok(build)
    }
}
