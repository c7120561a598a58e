//! Aperçu GeoJSON du résultat avec geozero (streaming)

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use geo::Geometry;
use geozero::geojson::GeoJsonWriter;
use geozero::GeozeroGeometry;

use crate::aggregate::AggregatedResult;

/// Exporte les lignes agrégées en FeatureCollection EPSG:4326
pub fn export_to_geojson(results: &[AggregatedResult], output_path: &Path) -> Result<()> {
    let file = File::create(output_path)
        .context(format!("Failed to create file: {}", output_path.display()))?;
    let mut writer = BufWriter::new(file);

    // Header FeatureCollection avec CRS
    write!(
        writer,
        r#"{{"type":"FeatureCollection","crs":{{"type":"name","properties":{{"name":"urn:ogc:def:crs:EPSG::4326"}}}},"features":["#
    )?;

    for (i, result) in results.iter().enumerate() {
        if i > 0 {
            write!(writer, ",")?;
        }
        write_feature(&mut writer, i, result)?;
    }

    write!(writer, "]}}")?;
    writer.flush()?;

    Ok(())
}

/// Écrit une ligne agrégée en Feature GeoJSON
fn write_feature<W: Write>(writer: &mut W, index: usize, result: &AggregatedResult) -> Result<()> {
    write!(writer, r#"{{"type":"Feature","id":{},"#, index)?;

    write!(writer, r#""geometry":"#)?;
    let mut geom_buf = Vec::new();
    let mut geom_writer = GeoJsonWriter::new(&mut geom_buf);
    Geometry::MultiPolygon(result.geometry.clone()).process_geom(&mut geom_writer)?;
    writer.write_all(&geom_buf)?;

    let c = &result.classification;
    write!(
        writer,
        r#","properties":{{"Arahan":"{}","Kewajiban":"{}","Ruang":"{}","luas_ha":{},"members":{}}}}}"#,
        escape_json(&c.directive.to_string()),
        escape_json(&c.obligation.to_string()),
        escape_json(c.category.as_str()),
        json_number(result.hectares),
        result.members
    )?;

    Ok(())
}

/// Nombre JSON (null si non fini)
fn json_number(value: f64) -> String {
    if value.is_finite() {
        value.to_string()
    } else {
        "null".to_string()
    }
}

/// Échappe une chaîne pour JSON
fn escape_json(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => result.push_str("\\\""),
            '\\' => result.push_str("\\\\"),
            '\n' => result.push_str("\\n"),
            '\r' => result.push_str("\\r"),
            '\t' => result.push_str("\\t"),
            c if c.is_control() => {
                result.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => result.push(c),
        }
    }
    result
}
