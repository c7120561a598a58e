//! Export du résultat agrégé en shapefile zippé (Result.zip)

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use geo::MultiPolygon;
use shapefile::dbase::{FieldName, FieldValue, Record, TableWriterBuilder};
use shapefile::{Point, Polygon, PolygonRing};
use tracing::{debug, warn};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::{RESULT_NAME, WGS84_WKT};
use crate::aggregate::AggregatedResult;

/// Champs DBF du résultat
const FIELD_DIRECTIVE: &str = "Arahan";
const FIELD_OBLIGATION: &str = "Kewajiban";
const FIELD_CATEGORY: &str = "Ruang";
const FIELD_AREA: &str = "luas_ha";

/// Écrit `Result.zip` (shp, shx, dbf, prj, cpg) dans `output_dir`
///
/// Les fichiers sont d'abord écrits dans un répertoire temporaire propre à
/// l'appel, puis zippés.
pub fn write_result_zip(results: &[AggregatedResult], output_dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(output_dir)
        .context(format!("Failed to create output directory: {}", output_dir.display()))?;

    let staging = tempfile::Builder::new()
        .prefix("papaps-out-")
        .tempdir()
        .context("Failed to create staging directory")?;

    let files = write_shapefile(results, staging.path())?;

    let zip_path = output_dir.join(format!("{}.zip", RESULT_NAME));
    let file = File::create(&zip_path)
        .context(format!("Failed to create file: {}", zip_path.display()))?;
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for path in &files {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .context("Invalid staged file name")?;
        zip.start_file(name, options)?;
        zip.write_all(&std::fs::read(path)?)?;
    }
    zip.finish().context("Failed to finalize Result.zip")?;

    debug!(path = %zip_path.display(), files = files.len(), "Result archive written");
    Ok(zip_path)
}

/// Écrit Result.shp/.shx/.dbf/.prj/.cpg dans `dir` et rend leurs chemins
pub fn write_shapefile(results: &[AggregatedResult], dir: &Path) -> Result<Vec<PathBuf>> {
    let shp = dir.join(format!("{}.shp", RESULT_NAME));

    let table = TableWriterBuilder::new()
        .add_character_field(field_name(FIELD_DIRECTIVE)?, 50)
        .add_character_field(field_name(FIELD_OBLIGATION)?, 20)
        .add_character_field(field_name(FIELD_CATEGORY)?, 20)
        .add_numeric_field(field_name(FIELD_AREA)?, 20, 4);

    {
        let mut writer = shapefile::Writer::from_path(&shp, table)
            .context(format!("Failed to create {}", shp.display()))?;

        for result in results {
            let Some(polygon) = to_shape(&result.geometry) else {
                warn!(
                    directive = %result.classification.directive,
                    "Empty aggregated geometry not exported"
                );
                continue;
            };
            writer
                .write_shape_and_record(&polygon, &to_record(result))
                .context("Failed to write shapefile record")?;
        }
    }

    let prj = dir.join(format!("{}.prj", RESULT_NAME));
    std::fs::write(&prj, WGS84_WKT)?;
    let cpg = dir.join(format!("{}.cpg", RESULT_NAME));
    std::fs::write(&cpg, "UTF-8")?;

    Ok(vec![
        shp.clone(),
        shp.with_extension("shx"),
        shp.with_extension("dbf"),
        prj,
        cpg,
    ])
}

fn field_name(name: &str) -> Result<FieldName> {
    FieldName::try_from(name).map_err(|e| anyhow::anyhow!("Invalid DBF field name {}: {:?}", name, e))
}

fn to_record(result: &AggregatedResult) -> Record {
    let c = &result.classification;
    let mut record = Record::default();
    record.insert(
        FIELD_DIRECTIVE.to_string(),
        FieldValue::Character(Some(c.directive.to_string())),
    );
    record.insert(
        FIELD_OBLIGATION.to_string(),
        FieldValue::Character(Some(c.obligation.to_string())),
    );
    record.insert(
        FIELD_CATEGORY.to_string(),
        FieldValue::Character(Some(c.category.to_string())),
    );
    record.insert(FIELD_AREA.to_string(), FieldValue::Numeric(Some(result.hectares)));
    record
}

/// Convertit un multipolygone en polygone shapefile (anneaux extérieurs et trous)
fn to_shape(geometry: &MultiPolygon<f64>) -> Option<Polygon> {
    let ring = |coords: &geo::LineString<f64>| -> Vec<Point> {
        coords.0.iter().map(|c| Point::new(c.x, c.y)).collect()
    };

    let rings: Vec<PolygonRing<Point>> = geometry
        .iter()
        .flat_map(|polygon| {
            std::iter::once(PolygonRing::Outer(ring(polygon.exterior())))
                .chain(polygon.interiors().iter().map(|r| PolygonRing::Inner(ring(r))))
        })
        .collect();

    (!rings.is_empty()).then(|| Polygon::with_rings(rings))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{classify, Attributes};
    use geo::{LineString, Polygon as GeoPolygon};
    use serde_json::json;

    fn result() -> AggregatedResult {
        let attributes: Attributes = json!({"F_KWS": "HL", "KRITIS": "KRITIS"})
            .as_object()
            .cloned()
            .unwrap();
        AggregatedResult {
            classification: classify(&attributes),
            geometry: MultiPolygon::new(vec![GeoPolygon::new(
                LineString::from(vec![
                    (110.0, -7.0),
                    (110.01, -7.0),
                    (110.01, -6.99),
                    (110.0, -6.99),
                    (110.0, -7.0),
                ]),
                vec![],
            )]),
            hectares: 122.4,
            members: 2,
        }
    }

    #[test]
    fn test_write_and_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let files = write_shapefile(&[result()], dir.path()).unwrap();
        assert_eq!(files.len(), 5);
        for file in &files {
            assert!(file.exists(), "{}", file.display());
        }

        let mut reader = shapefile::Reader::from_path(&files[0]).unwrap();
        let rows: Vec<_> = reader
            .iter_shapes_and_records()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(rows.len(), 1);

        let (_, record) = &rows[0];
        assert_eq!(
            record.get("Arahan"),
            Some(&FieldValue::Character(Some("A1A2A4".to_string())))
        );
        assert_eq!(
            record.get("Kewajiban"),
            Some(&FieldValue::Character(Some("K3".to_string())))
        );
        assert_eq!(
            record.get("Ruang"),
            Some(&FieldValue::Character(Some("Protection".to_string())))
        );
        match record.get("luas_ha") {
            Some(FieldValue::Numeric(Some(v))) => assert!((v - 122.4).abs() < 1e-6),
            other => panic!("unexpected luas_ha: {:?}", other),
        }

        let prj = std::fs::read_to_string(&files[3]).unwrap();
        assert!(prj.contains("WGS_1984"));
    }

    #[test]
    fn test_result_zip() {
        let dir = tempfile::tempdir().unwrap();
        let zip_path = write_result_zip(&[result()], dir.path()).unwrap();
        assert_eq!(zip_path.file_name().unwrap(), "Result.zip");

        let archive = zip::ZipArchive::new(File::open(&zip_path).unwrap()).unwrap();
        let mut names: Vec<_> = archive.file_names().map(String::from).collect();
        names.sort();
        assert_eq!(
            names,
            vec!["Result.cpg", "Result.dbf", "Result.prj", "Result.shp", "Result.shx"]
        );
    }

    #[test]
    fn test_polygon_with_hole_rings() {
        let geometry = MultiPolygon::new(vec![GeoPolygon::new(
            LineString::from(vec![(0.0, 0.0), (4.0, 0.0), (4.0, 4.0), (0.0, 4.0), (0.0, 0.0)]),
            vec![LineString::from(vec![
                (1.0, 1.0),
                (2.0, 1.0),
                (2.0, 2.0),
                (1.0, 2.0),
                (1.0, 1.0),
            ])],
        )]);

        let shape = to_shape(&geometry).unwrap();
        assert_eq!(shape.rings().len(), 2);
        assert!(to_shape(&MultiPolygon::new(vec![])).is_none());
    }
}
