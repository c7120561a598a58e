//! Lecture du shapefile soumis
//!
//! Les shapes Polygon, PolygonM et PolygonZ deviennent des `RawGeometry`.
//! La mesure M est ignorée, l'altitude Z est conservée à part pour être
//! aplatie par la sanitization.

use std::collections::HashMap;

use geo::{Coord, LineString, MultiPolygon};
use shapefile::dbase::{FieldValue, Record};
use shapefile::{PolygonRing, Shape};
use tracing::{debug, warn};

use crate::repair::rings;
use crate::types::{Dataset, RawGeometry};
use crate::AoiError;

/// Lit toutes les géométries polygonales du dataset
///
/// # Errors
///
/// `Shapefile` si le .shp, le .shx ou le .dbf est illisible.
pub fn read(dataset: &Dataset) -> Result<Vec<RawGeometry>, AoiError> {
    let file = dataset.shp.display().to_string();
    let mut reader =
        shapefile::Reader::from_path(&dataset.shp).map_err(|e| AoiError::shapefile(&file, e))?;

    let mut geometries = Vec::new();
    let mut skipped = 0usize;

    for (index, item) in reader.iter_shapes_and_records().enumerate() {
        let (shape, record) = item.map_err(|e| AoiError::shapefile(&file, e))?;

        let raw = match shape {
            Shape::Polygon(polygon) => to_raw(polygon.rings(), |p| (p.x, p.y, None)),
            Shape::PolygonM(polygon) => to_raw(polygon.rings(), |p| (p.x, p.y, None)),
            Shape::PolygonZ(polygon) => to_raw(polygon.rings(), |p| (p.x, p.y, Some(p.z))),
            Shape::NullShape => {
                debug!(index, "Null shape skipped");
                skipped += 1;
                continue;
            }
            other => {
                warn!(index, shape_type = ?other.shapetype(), "Non-polygon shape skipped");
                skipped += 1;
                continue;
            }
        };

        geometries.push(RawGeometry {
            attributes: attributes(record),
            ..raw
        });
    }

    debug!(read = geometries.len(), skipped, "Shapefile read");
    Ok(geometries)
}

/// Assemble les anneaux d'une shape polygonale
///
/// `split` rend (x, y, z) pour chaque point ; z vaut `None` hors PolygonZ.
fn to_raw<P, F>(shape_rings: &[PolygonRing<P>], split: F) -> RawGeometry
where
    F: Fn(&P) -> (f64, f64, Option<f64>),
{
    let mut outers = Vec::new();
    let mut inners = Vec::new();
    let mut elevation: Vec<f64> = Vec::new();
    let mut has_z = false;

    for ring in shape_rings {
        let coords: Vec<Coord<f64>> = ring
            .points()
            .iter()
            .map(|p| {
                let (x, y, z) = split(p);
                if let Some(z) = z {
                    has_z = true;
                    elevation.push(z);
                }
                Coord { x, y }
            })
            .collect();

        match ring {
            PolygonRing::Outer(_) => outers.push(LineString::new(coords)),
            PolygonRing::Inner(_) => inners.push(LineString::new(coords)),
        }
    }

    RawGeometry {
        geometry: MultiPolygon::new(rings::assemble(outers, inners)),
        elevation: has_z.then_some(elevation),
        attributes: HashMap::new(),
    }
}

/// Convertit l'enregistrement DBF en texte (valeurs nulles omises)
fn attributes(record: Record) -> HashMap<String, String> {
    HashMap::<String, FieldValue>::from(record)
        .into_iter()
        .filter_map(|(name, value)| field_to_string(value).map(|v| (name, v)))
        .collect()
}

fn field_to_string(value: FieldValue) -> Option<String> {
    match value {
        FieldValue::Character(v) => v.map(|s| s.trim().to_string()),
        FieldValue::Memo(s) => Some(s),
        FieldValue::Numeric(v) => v.map(|n| n.to_string()),
        FieldValue::Float(v) => v.map(|n| n.to_string()),
        FieldValue::Logical(v) => v.map(|b| b.to_string()),
        FieldValue::Integer(n) => Some(n.to_string()),
        FieldValue::Double(n) => Some(n.to_string()),
        FieldValue::Currency(n) => Some(n.to_string()),
        _ => None,
    }
}
