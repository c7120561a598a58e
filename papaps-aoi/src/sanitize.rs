//! Sanitization : archive soumise vers une AOI unique, valide, 2D, WGS84

use std::path::Path;

use geo::{unary_union, Polygon};
use tracing::{debug, info};

use crate::crs::{self, Crs};
use crate::project::SmartReprojector;
use crate::repair::{self, simplify};
use crate::types::{Aoi, RawGeometry, SanitizeOptions};
use crate::{archive, reader, AoiError};

/// Extrait, lit et sanitize l'archive soumise
///
/// # Arguments
///
/// * `archive_path` - Archive .zip ou .tar.bz2 contenant un shapefile
/// * `scratch` - Répertoire de travail propre à la requête
/// * `options` - Paramètres de simplification
///
/// # Errors
///
/// Toute erreur est une erreur d'entrée (`AoiError`).
pub fn sanitize(
    archive_path: &Path,
    scratch: &Path,
    options: &SanitizeOptions,
) -> Result<Aoi, AoiError> {
    let dataset = archive::extract(archive_path, scratch)?;

    let wkt = std::fs::read_to_string(&dataset.prj)?;
    let crs = crs::parse_prj(&wkt)?;
    info!(crs = %crs, shp = %dataset.shp.display(), "Input dataset detected");

    let parts = reader::read(&dataset)?;
    sanitize_geometries(parts, &crs, options)
}

/// Sanitize des géométries déjà lues
///
/// Pour chaque géométrie : reprojection en WGS84, aplatissement 2D,
/// réparation puis simplification. Les résultats sont ensuite fusionnés.
///
/// # Errors
///
/// `UnknownProjection`/`Reprojection` si le CRS n'est pas exploitable,
/// `NoUsableGeometry` si rien ne survit à la réparation.
pub fn sanitize_geometries(
    parts: Vec<RawGeometry>,
    source: &Crs,
    options: &SanitizeOptions,
) -> Result<Aoi, AoiError> {
    let parsed = parts.len();
    let reprojector = SmartReprojector::new(source)?;
    debug!(reprojector = reprojector.description(), parsed, "Sanitizing geometries");

    let mut polygons: Vec<Polygon<f64>> = Vec::new();
    let mut used = 0usize;

    for (index, part) in parts.into_iter().enumerate() {
        let wgs84 = reprojector.transform(&part.geometry)?;

        // L'altitude n'est jamais interpolée : elle est simplement ignorée
        if let Some(elevation) = &part.elevation {
            debug!(index, vertices = elevation.len(), "Elevation dropped");
        }

        let repaired = repair::make_valid(&wgs84);
        let simplified = simplify::simplify_multipolygon(&repaired, options.simplify_tolerance);
        let cleaned = repair::drop_degenerate(simplified);

        if cleaned.0.is_empty() {
            debug!(index, "Geometry unusable after repair");
            continue;
        }

        used += 1;
        polygons.extend(cleaned);
    }

    if polygons.is_empty() {
        return Err(AoiError::NoUsableGeometry { parsed });
    }

    let geometry = repair::drop_degenerate(unary_union(&polygons));
    if geometry.0.is_empty() {
        return Err(AoiError::NoUsableGeometry { parsed });
    }

    info!(
        parsed,
        used,
        polygons = geometry.0.len(),
        "AOI sanitized"
    );
    Ok(Aoi::new(geometry, used))
}
