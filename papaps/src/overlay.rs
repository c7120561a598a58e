//! Superposition spatiale : features de référence découpées par l'AOI

use geo::{BooleanOps, Coord, Geometry, MapCoords, MultiPolygon, Rect};
use papaps_aoi::project::WGS84;
use papaps_aoi::repair;
use papaps_aoi::Aoi;
use serde_json::Value;
use tracing::{debug, info};

use crate::layer::{BackendError, DatasetId, ReferenceLayer};
use crate::rules::fields::names;
use crate::rules::Attributes;

/// Intersection d'une feature de référence avec l'AOI
#[derive(Debug, Clone)]
pub struct ClippedFeature {
    pub geometry: MultiPolygon<f64>,
    /// Attributs d'origine, SAWIT forcé à 0
    pub attributes: Attributes,
}

/// Paramètres de l'intersection
#[derive(Debug, Clone, Copy)]
pub struct OverlayOptions {
    /// Pas de la grille d'accrochage, en mètres
    pub snap_tolerance_m: f64,
}

impl Default for OverlayOptions {
    fn default() -> Self {
        Self {
            snap_tolerance_m: 1.0,
        }
    }
}

impl OverlayOptions {
    /// Pas de la grille en degrés (mètres par degré à l'équateur)
    pub fn grid_step(&self) -> f64 {
        self.snap_tolerance_m / WGS84::METRES_PER_DEGREE
    }
}

/// Découpe les features du dataset qui croisent l'AOI
///
/// # Errors
///
/// Les erreurs du collaborateur sont propagées telles quelles.
pub fn overlay(
    aoi: &Aoi,
    layer: &dyn ReferenceLayer,
    dataset: &DatasetId,
    options: &OverlayOptions,
) -> Result<Vec<ClippedFeature>, BackendError> {
    let Some(bounds) = aoi.bounding_rect().map(|b| padded_bounds(b, options)) else {
        return Ok(Vec::new());
    };

    let candidates = layer.features_in_bounds(dataset, bounds)?;
    let fetched = candidates.len();

    let step = options.grid_step();
    let aoi_snapped = repair::make_valid(&snap(aoi.geometry(), step));

    let clipped: Vec<ClippedFeature> = candidates
        .into_iter()
        .filter(|f| f.intersects_bounds(&bounds))
        .filter_map(|feature| {
            let polygons = polygonal(feature.geometry)?;
            let geometry = clip(&polygons, &aoi_snapped, step)?;
            Some(ClippedFeature {
                geometry,
                attributes: reset_plantation(feature.attributes),
            })
        })
        .collect();

    info!(
        dataset = %dataset,
        fetched,
        clipped = clipped.len(),
        "Overlay complete"
    );
    Ok(clipped)
}

/// Intersection tolérante : accrochage à la grille, réparation, intersection
fn clip(
    reference: &MultiPolygon<f64>,
    aoi: &MultiPolygon<f64>,
    step: f64,
) -> Option<MultiPolygon<f64>> {
    let reference = repair::make_valid(&snap(reference, step));
    if reference.0.is_empty() {
        return None;
    }

    let intersection = repair::drop_degenerate(reference.intersection(aoi));
    (!intersection.0.is_empty()).then_some(intersection)
}

/// Arrondit chaque coordonnée au multiple de `step` le plus proche
fn snap(geometry: &MultiPolygon<f64>, step: f64) -> MultiPolygon<f64> {
    if step <= 0.0 {
        return geometry.clone();
    }
    geometry.map_coords(|c| Coord {
        x: (c.x / step).round() * step,
        y: (c.y / step).round() * step,
    })
}

/// Parties polygonales d'une géométrie de référence
fn polygonal(geometry: Geometry<f64>) -> Option<MultiPolygon<f64>> {
    match geometry {
        Geometry::Polygon(polygon) => Some(MultiPolygon::new(vec![polygon])),
        Geometry::MultiPolygon(multi) => Some(multi),
        Geometry::Rect(rect) => Some(MultiPolygon::new(vec![rect.to_polygon()])),
        Geometry::GeometryCollection(collection) => {
            let polygons: Vec<_> = collection
                .into_iter()
                .filter_map(polygonal)
                .flat_map(|multi| multi.0)
                .collect();
            (!polygons.is_empty()).then(|| MultiPolygon::new(polygons))
        }
        other => {
            debug!(kind = geometry_kind(&other), "Non-polygonal reference geometry skipped");
            None
        }
    }
}

fn geometry_kind(geometry: &Geometry<f64>) -> &'static str {
    match geometry {
        Geometry::Point(_) => "Point",
        Geometry::Line(_) => "Line",
        Geometry::LineString(_) => "LineString",
        Geometry::MultiPoint(_) => "MultiPoint",
        Geometry::MultiLineString(_) => "MultiLineString",
        Geometry::Triangle(_) => "Triangle",
        _ => "Polygonal",
    }
}

/// Le drapeau plantation est toujours remis à zéro après découpe
fn reset_plantation(mut attributes: Attributes) -> Attributes {
    attributes.insert(names::SAWIT.to_string(), Value::from(0));
    attributes
}

/// Emprise étendue d'un pas de grille
fn padded_bounds(bounds: Rect<f64>, options: &OverlayOptions) -> Rect<f64> {
    let pad = options.grid_step();
    Rect::new(
        Coord {
            x: bounds.min().x - pad,
            y: bounds.min().y - pad,
        },
        Coord {
            x: bounds.max().x + pad,
            y: bounds.max().y + pad,
        },
    )
}
