//! Tests d'intégration du pipeline complet
//!
//! L'AOI est un shapefile zippé construit à la volée, la couche de référence
//! un répertoire GeoJSON temporaire.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use papaps::area::hectares;
use papaps::config::{PipelineConfig, RegionTable};
use papaps::export::shapefile::write_result_zip;
use papaps::layer::geojson::GeoJsonLayer;
use papaps::layer::{BackendError, DatasetId};
use papaps::rules::{classify, Attributes, Category};
use papaps::{run, Outcome, PipelineError};
use serde_json::{json, Value};
use shapefile::dbase::{FieldName, FieldValue, Record, TableWriterBuilder};
use shapefile::{Point, Polygon, PolygonRing};

const WGS84_PRJ: &str = r#"GEOGCS["GCS_WGS_1984",DATUM["D_WGS_1984",SPHEROID["WGS_1984",6378137.0,298.257223563]],PRIMEM["Greenwich",0.0],UNIT["Degree",0.0174532925199433]]"#;

const DATASET: &str = "PAPAPS_Jabar";

/// Anneau extérieur en sens horaire (convention shapefile)
fn ring(x0: f64, y0: f64, width: f64, height: f64) -> Vec<Point> {
    vec![
        Point::new(x0, y0),
        Point::new(x0, y0 + height),
        Point::new(x0 + width, y0 + height),
        Point::new(x0 + width, y0),
        Point::new(x0, y0),
    ]
}

/// Archive aoi.zip contenant un seul polygone
fn aoi_archive(dir: &Path, x0: f64, y0: f64, size: f64) -> PathBuf {
    let shp = dir.join("aoi.shp");
    {
        let table = TableWriterBuilder::new()
            .add_character_field(FieldName::try_from("NAMA").unwrap(), 30);
        let mut writer = shapefile::Writer::from_path(&shp, table).unwrap();
        let mut record = Record::default();
        record.insert(
            "NAMA".to_string(),
            FieldValue::Character(Some("Desa Sukamaju".to_string())),
        );
        let polygon = Polygon::new(PolygonRing::Outer(ring(x0, y0, size, size)));
        writer.write_shape_and_record(&polygon, &record).unwrap();
    }
    std::fs::write(dir.join("aoi.prj"), WGS84_PRJ).unwrap();

    let archive = dir.join("aoi.zip");
    let mut zip = zip::ZipWriter::new(File::create(&archive).unwrap());
    for name in ["aoi.shp", "aoi.shx", "aoi.dbf", "aoi.prj"] {
        zip.start_file(name, zip::write::SimpleFileOptions::default())
            .unwrap();
        zip.write_all(&std::fs::read(dir.join(name)).unwrap()).unwrap();
    }
    zip.finish().unwrap();
    archive
}

fn box_feature(x0: f64, y0: f64, width: f64, height: f64, properties: Value) -> Value {
    json!({
        "type": "Feature",
        "properties": properties,
        "geometry": {
            "type": "Polygon",
            "coordinates": [[
                [x0, y0],
                [x0 + width, y0],
                [x0 + width, y0 + height],
                [x0, y0 + height],
                [x0, y0]
            ]]
        }
    })
}

/// Répertoire de couches contenant `<DATASET>.geojson`
fn layer_dir(features: Vec<Value>) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let collection = json!({ "type": "FeatureCollection", "features": features });
    std::fs::write(
        dir.path().join(format!("{}.geojson", DATASET)),
        collection.to_string(),
    )
    .unwrap();
    dir
}

/// Moitié ouest en hutan lindung, moitié est sans attribut
fn two_zone_layer() -> tempfile::TempDir {
    layer_dir(vec![
        box_feature(107.50, -7.00, 0.01, 0.02, json!({ "F_KWS": "HL" })),
        box_feature(107.51, -7.00, 0.01, 0.02, json!({})),
    ])
}

#[test]
fn test_end_to_end_two_zones() {
    let source = tempfile::tempdir().unwrap();
    let archive = aoi_archive(source.path(), 107.50, -7.00, 0.02);
    let layers = two_zone_layer();
    let layer = GeoJsonLayer::new(layers.path());

    let result = run(
        &archive,
        &DatasetId::new(DATASET),
        &layer,
        &PipelineConfig::default(),
    )
    .unwrap();

    assert_eq!(result.aoi.parts(), 1);
    assert_eq!(result.clipped, 2);

    let rows = result.outcome.rows();
    assert_eq!(rows.len(), 2);

    // Tri lexicographique des codes : A1A2A3A4A5 < A1A2A4
    assert_eq!(rows[0].classification.directive.to_string(), "A1A2A3A4A5");
    assert_eq!(rows[0].classification.obligation.to_string(), "");
    assert_eq!(rows[0].classification.category, Category::Utilization);

    assert_eq!(rows[1].classification.directive.to_string(), "A1A2A4");
    assert_eq!(rows[1].classification.category, Category::Protection);

    // Les deux moitiés ont quasiment la même surface
    let ratio = rows[0].hectares / rows[1].hectares;
    assert!((ratio - 1.0).abs() < 1e-2, "ratio = {}", ratio);
}

#[test]
fn test_total_area_matches_aoi() {
    let source = tempfile::tempdir().unwrap();
    let archive = aoi_archive(source.path(), 107.50, -7.00, 0.02);
    let layers = two_zone_layer();
    let layer = GeoJsonLayer::new(layers.path());

    let result = run(
        &archive,
        &DatasetId::new(DATASET),
        &layer,
        &PipelineConfig::default(),
    )
    .unwrap();

    let aoi_ha = hectares(result.aoi.geometry());
    let total = result.total_hectares();
    let summed: f64 = result.outcome.rows().iter().map(|r| r.hectares).sum();

    assert!((total - summed).abs() < 1e-9);
    // Grille d'accrochage et buffer de réparation : écart sub-métrique
    assert!((total - aoi_ha).abs() / aoi_ha < 1e-3, "{} vs {}", total, aoi_ha);
}

#[test]
fn test_no_overlap_is_not_an_error() {
    let source = tempfile::tempdir().unwrap();
    let archive = aoi_archive(source.path(), 120.00, -3.00, 0.01);
    let layers = two_zone_layer();
    let layer = GeoJsonLayer::new(layers.path());

    let result = run(
        &archive,
        &DatasetId::new(DATASET),
        &layer,
        &PipelineConfig::default(),
    )
    .unwrap();

    assert!(matches!(result.outcome, Outcome::NoOverlap));
    assert!(result.outcome.rows().is_empty());
    assert_eq!(result.total_hectares(), 0.0);
}

#[test]
fn test_plantation_flag_is_reset_by_overlay() {
    let source = tempfile::tempdir().unwrap();
    let archive = aoi_archive(source.path(), 107.50, -7.00, 0.01);
    let layers = layer_dir(vec![box_feature(
        107.49,
        -7.01,
        0.03,
        0.03,
        json!({ "SAWIT": 1, "RURHL": "RURHL" }),
    )]);
    let layer = GeoJsonLayer::new(layers.path());

    let result = run(
        &archive,
        &DatasetId::new(DATASET),
        &layer,
        &PipelineConfig::default(),
    )
    .unwrap();

    let rows = result.outcome.rows();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].classification.obligation.to_string(), "K3");

    // Classification directe : K1 reste atteignable
    let attributes: Attributes = json!({ "SAWIT": 1, "RURHL": "RURHL" })
        .as_object()
        .cloned()
        .unwrap();
    assert_eq!(classify(&attributes).obligation.to_string(), "K1K3");
}

#[test]
fn test_missing_dataset_is_backend_error() {
    let source = tempfile::tempdir().unwrap();
    let archive = aoi_archive(source.path(), 107.50, -7.00, 0.01);
    let layers = tempfile::tempdir().unwrap();
    let layer = GeoJsonLayer::new(layers.path());

    let err = run(
        &archive,
        &DatasetId::new("PAPAPS_Papua"),
        &layer,
        &PipelineConfig::default(),
    )
    .unwrap_err();

    assert_eq!(err.stage(), "overlay");
    assert!(matches!(
        err,
        PipelineError::Overlay(BackendError::DatasetNotFound(_))
    ));
}

#[test]
fn test_invalid_archive_is_input_error() {
    let source = tempfile::tempdir().unwrap();
    let archive = source.path().join("aoi.zip");
    std::fs::write(&archive, b"definitely not a zip").unwrap();
    let layers = two_zone_layer();
    let layer = GeoJsonLayer::new(layers.path());

    let err = run(
        &archive,
        &DatasetId::new(DATASET),
        &layer,
        &PipelineConfig::default(),
    )
    .unwrap_err();

    assert!(err.is_input_error());
    assert_eq!(err.stage(), "sanitize");
}

#[test]
fn test_unknown_region() {
    let table = RegionTable::embedded().unwrap();
    assert_eq!(table.dataset_for("Jawa Barat").unwrap().as_str(), DATASET);
    assert!(matches!(
        table.dataset_for("Bali"),
        Err(BackendError::UnknownRegion { .. })
    ));
}

#[test]
fn test_result_zip_output() {
    let source = tempfile::tempdir().unwrap();
    let archive = aoi_archive(source.path(), 107.50, -7.00, 0.02);
    let layers = two_zone_layer();
    let layer = GeoJsonLayer::new(layers.path());

    let result = run(
        &archive,
        &DatasetId::new(DATASET),
        &layer,
        &PipelineConfig::default(),
    )
    .unwrap();

    let output = tempfile::tempdir().unwrap();
    let zip_path = write_result_zip(result.outcome.rows(), output.path()).unwrap();
    assert_eq!(zip_path, output.path().join("Result.zip"));

    let mut zip = zip::ZipArchive::new(File::open(&zip_path).unwrap()).unwrap();
    let mut names: Vec<_> = zip.file_names().map(String::from).collect();
    names.sort();
    assert_eq!(
        names,
        vec!["Result.cpg", "Result.dbf", "Result.prj", "Result.shp", "Result.shx"]
    );

    let extracted = tempfile::tempdir().unwrap();
    zip.extract(extracted.path()).unwrap();
    let mut reader = shapefile::Reader::from_path(extracted.path().join("Result.shp")).unwrap();
    let rows: Vec<_> = reader
        .iter_shapes_and_records()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(rows.len(), 2);

    let (_, record) = &rows[1];
    match record.get("Arahan") {
        Some(FieldValue::Character(Some(value))) => assert_eq!(value, "A1A2A4"),
        other => panic!("unexpected Arahan value: {:?}", other),
    }
    match record.get("Ruang") {
        Some(FieldValue::Character(Some(value))) => assert_eq!(value, "Protection"),
        other => panic!("unexpected Ruang value: {:?}", other),
    }
}
