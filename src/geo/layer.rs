//! Administrative feature data structures.
//!
//! Converts a GeoJSON feature collection into [`MapFeature`]s: a name, a
//! tagged polygon geometry and an optional label anchor per feature.

use crate::error::{MapError, Result};
use geo_types::Coord;
use geojson::{Feature, GeoJson, Geometry, JsonObject, JsonValue, Value};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

/// Ordered sequence of (lon, lat) coordinates forming one boundary loop.
pub type Ring = Vec<Coord<f64>>;

/// Outer ring followed by optional hole rings.
pub type RingGroup = Vec<Ring>;

/// Position of a feature within its collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FeatureId(pub usize);

impl std::fmt::Display for FeatureId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Geometry of a feature, normalized by kind.
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureGeometry {
    /// A single ring-group.
    Polygon(RingGroup),
    /// Independent ring-groups, never merged.
    MultiPolygon(Vec<RingGroup>),
    /// Any other GeoJSON geometry (or none). Carries the kind name.
    Unsupported(&'static str),
}

impl FeatureGeometry {
    /// Ring-groups of the geometry; empty for unsupported kinds.
    pub fn ring_groups(&self) -> &[RingGroup] {
        match self {
            FeatureGeometry::Polygon(group) => std::slice::from_ref(group),
            FeatureGeometry::MultiPolygon(groups) => groups,
            FeatureGeometry::Unsupported(_) => &[],
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            FeatureGeometry::Polygon(_) => "Polygon",
            FeatureGeometry::MultiPolygon(_) => "MultiPolygon",
            FeatureGeometry::Unsupported(kind) => kind,
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, FeatureGeometry::Unsupported(_))
    }
}

/// One administrative region (a city or the province itself).
#[derive(Debug, Clone, PartialEq)]
pub struct MapFeature {
    pub id: FeatureId,
    pub name: String,
    pub geometry: FeatureGeometry,
    /// Label anchor: `centroid`, else `center`, else none.
    pub anchor: Option<Coord<f64>>,
    /// Administrative division code.
    pub adcode: Option<u64>,
    /// Administrative level ("province", "city", "district").
    pub level: Option<String>,
    pub parent_adcode: Option<u64>,
}

impl MapFeature {
    /// Creates a feature with only a name and geometry.
    pub fn new(id: usize, name: impl Into<String>, geometry: FeatureGeometry) -> Self {
        Self {
            id: FeatureId(id),
            name: name.into(),
            geometry,
            anchor: None,
            adcode: None,
            level: None,
            parent_adcode: None,
        }
    }

    pub fn with_anchor(mut self, anchor: Coord<f64>) -> Self {
        self.anchor = Some(anchor);
        self
    }
}

/// Source of collection revisions; every loaded collection gets a fresh one.
static NEXT_REVISION: AtomicU64 = AtomicU64::new(1);

/// Immutable, ordered set of features loaded once at startup.
#[derive(Debug, Clone)]
pub struct FeatureCollection {
    features: Vec<MapFeature>,
    revision: u64,
}

impl PartialEq for FeatureCollection {
    fn eq(&self, other: &Self) -> bool {
        self.features == other.features
    }
}

impl FeatureCollection {
    /// Wraps already converted features. Ids are reassigned by position.
    pub fn from_features(mut features: Vec<MapFeature>) -> Self {
        for (index, feature) in features.iter_mut().enumerate() {
            feature.id = FeatureId(index);
        }
        Self {
            features,
            revision: NEXT_REVISION.fetch_add(1, Ordering::Relaxed),
        }
    }

    /// Parses GeoJSON text.
    pub fn from_geojson_str(geojson_str: &str) -> Result<Self> {
        let geojson: GeoJson = geojson_str.parse()?;
        Self::from_geojson(geojson)
    }

    /// Reads and parses a GeoJSON file.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| MapError::io(path, e))?;
        let collection = Self::from_geojson_str(&text)?;
        log::info!(
            "Loaded {} features from {}",
            collection.len(),
            path.display()
        );
        Ok(collection)
    }

    /// Walks a parsed GeoJSON document once.
    ///
    /// A lone `Feature` is accepted as a one-element collection; a bare
    /// geometry has no name or anchor and is rejected.
    pub fn from_geojson(geojson: GeoJson) -> Result<Self> {
        let features = match geojson {
            GeoJson::FeatureCollection(fc) => fc.features,
            GeoJson::Feature(f) => vec![f],
            GeoJson::Geometry(g) => return Err(MapError::NotACollection(value_kind(&g.value))),
        };

        let features = features
            .iter()
            .enumerate()
            .map(|(index, feature)| convert_feature(index, feature))
            .collect();

        Ok(Self::from_features(features))
    }

    pub fn features(&self) -> &[MapFeature] {
        &self.features
    }

    pub fn get(&self, id: FeatureId) -> Option<&MapFeature> {
        self.features.get(id.0)
    }

    /// First feature with the given name.
    pub fn find(&self, name: &str) -> Option<&MapFeature> {
        self.features.iter().find(|f| f.name == name)
    }

    /// Anchor of the first feature, used to center the contextual view.
    pub fn first_anchor(&self) -> Option<Coord<f64>> {
        self.features.first().and_then(|f| f.anchor)
    }

    /// Identity of this loaded snapshot, for build memoization.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MapFeature> {
        self.features.iter()
    }
}

fn convert_feature(index: usize, feature: &Feature) -> MapFeature {
    let properties = feature.properties.as_ref();

    let name = properties
        .and_then(|p| p.get("name").or_else(|| p.get("NAME")))
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .unwrap_or_default();

    let geometry = convert_geometry(feature.geometry.as_ref());
    if let FeatureGeometry::Unsupported(kind) = &geometry {
        log::warn!(
            "Feature {} ({}): unsupported geometry kind {}, skipping its shapes",
            index,
            name,
            kind
        );
    }

    MapFeature {
        id: FeatureId(index),
        name,
        geometry,
        anchor: properties.and_then(resolve_anchor),
        adcode: properties
            .and_then(|p| p.get("adcode"))
            .and_then(JsonValue::as_u64),
        level: properties
            .and_then(|p| p.get("level"))
            .and_then(|v| v.as_str())
            .map(|s| s.to_string()),
        parent_adcode: properties
            .and_then(|p| p.get("parent"))
            .and_then(|v| v.get("adcode"))
            .and_then(JsonValue::as_u64),
    }
}

/// Explicit `centroid` first, then `center`. Malformed values fall through.
fn resolve_anchor(properties: &JsonObject) -> Option<Coord<f64>> {
    ["centroid", "center"]
        .iter()
        .find_map(|key| properties.get(*key).and_then(coord_from_json))
}

fn coord_from_json(value: &JsonValue) -> Option<Coord<f64>> {
    let pair = value.as_array()?;
    match pair.as_slice() {
        [lon, lat, ..] => Some(Coord {
            x: lon.as_f64()?,
            y: lat.as_f64()?,
        }),
        _ => None,
    }
}

fn convert_geometry(geometry: Option<&Geometry>) -> FeatureGeometry {
    let Some(geometry) = geometry else {
        return FeatureGeometry::Unsupported("None");
    };

    match &geometry.value {
        Value::Polygon(rings) => FeatureGeometry::Polygon(convert_ring_group(rings)),
        Value::MultiPolygon(polygons) => {
            let groups = polygons.iter().map(|g| convert_ring_group(g)).collect();
            FeatureGeometry::MultiPolygon(groups)
        }
        other => FeatureGeometry::Unsupported(value_kind(other)),
    }
}

fn convert_ring_group(rings: &[Vec<Vec<f64>>]) -> RingGroup {
    rings
        .iter()
        .map(|ring| ring.iter().map(|c| coord_from_position(c)).collect())
        .collect()
}

/// Positions with fewer than two values become NaN so the projector
/// rejects them like any other out-of-domain vertex.
fn coord_from_position(position: &[f64]) -> Coord<f64> {
    match position {
        [x, y, ..] => Coord { x: *x, y: *y },
        _ => Coord {
            x: f64::NAN,
            y: f64::NAN,
        },
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Point(_) => "Point",
        Value::MultiPoint(_) => "MultiPoint",
        Value::LineString(_) => "LineString",
        Value::MultiLineString(_) => "MultiLineString",
        Value::Polygon(_) => "Polygon",
        Value::MultiPolygon(_) => "MultiPolygon",
        Value::GeometryCollection(_) => "GeometryCollection",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": {
                    "adcode": 510100,
                    "name": "成都市",
                    "center": [104.065735, 30.659462],
                    "centroid": [103.932, 30.656],
                    "level": "city",
                    "parent": { "adcode": 510000 }
                },
                "geometry": {
                    "type": "MultiPolygon",
                    "coordinates": [
                        [[[103.0, 30.0], [104.0, 30.0], [104.0, 31.0], [103.0, 30.0]]],
                        [[[105.0, 30.0], [105.5, 30.0], [105.5, 30.5], [105.0, 30.0]]]
                    ]
                }
            },
            {
                "type": "Feature",
                "properties": { "name": "自贡市", "center": [104.773447, 29.352765] },
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[104.0, 29.0], [105.0, 29.0], [105.0, 30.0], [104.0, 29.0]]]
                }
            },
            {
                "type": "Feature",
                "properties": { "name": "marker", "centroid": "not a coordinate" },
                "geometry": { "type": "Point", "coordinates": [104.0, 30.0] }
            }
        ]
    }"#;

    #[test]
    fn test_load_feature_collection() {
        let collection = FeatureCollection::from_geojson_str(SAMPLE).unwrap();
        assert_eq!(collection.len(), 3);

        let chengdu = &collection.features()[0];
        assert_eq!(chengdu.name, "成都市");
        assert_eq!(chengdu.id, FeatureId(0));
        assert_eq!(chengdu.adcode, Some(510100));
        assert_eq!(chengdu.parent_adcode, Some(510000));
        assert_eq!(chengdu.level.as_deref(), Some("city"));
        assert_eq!(chengdu.geometry.kind_name(), "MultiPolygon");
        assert_eq!(chengdu.geometry.ring_groups().len(), 2);
    }

    #[test]
    fn test_anchor_prefers_centroid() {
        let collection = FeatureCollection::from_geojson_str(SAMPLE).unwrap();
        assert_eq!(
            collection.features()[0].anchor,
            Some(Coord { x: 103.932, y: 30.656 })
        );
        assert_eq!(
            collection.features()[1].anchor,
            Some(Coord {
                x: 104.773447,
                y: 29.352765
            })
        );
        assert_eq!(collection.first_anchor(), collection.features()[0].anchor);
    }

    #[test]
    fn test_unsupported_geometry_kept_without_rings() {
        let collection = FeatureCollection::from_geojson_str(SAMPLE).unwrap();
        let marker = collection.find("marker").unwrap();

        assert_eq!(marker.geometry, FeatureGeometry::Unsupported("Point"));
        assert!(marker.geometry.ring_groups().is_empty());
        assert!(marker.anchor.is_none());
    }

    #[test]
    fn test_polygon_is_single_group() {
        let collection = FeatureCollection::from_geojson_str(SAMPLE).unwrap();
        let zigong = collection.find("自贡市").unwrap();

        assert!(matches!(zigong.geometry, FeatureGeometry::Polygon(_)));
        assert_eq!(zigong.geometry.ring_groups().len(), 1);
        assert_eq!(zigong.geometry.ring_groups()[0][0].len(), 4);
    }

    #[test]
    fn test_bare_geometry_rejected() {
        let result = FeatureCollection::from_geojson_str(
            r#"{ "type": "Point", "coordinates": [104.0, 30.0] }"#,
        );
        assert!(matches!(result, Err(MapError::NotACollection("Point"))));
    }

    #[test]
    fn test_revisions_are_unique() {
        let a = FeatureCollection::from_geojson_str(SAMPLE).unwrap();
        let b = FeatureCollection::from_geojson_str(SAMPLE).unwrap();
        assert_ne!(a.revision(), b.revision());
        assert_eq!(a, b);
    }
}
