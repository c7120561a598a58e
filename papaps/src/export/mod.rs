//! Modules d'export (Shapefile zippé, GeoJSON)

pub mod geojson;
pub mod shapefile;

/// WKT du système de coordonnées des sorties (EPSG:4326)
pub const WGS84_WKT: &str = r#"GEOGCS["GCS_WGS_1984",DATUM["D_WGS_1984",SPHEROID["WGS_1984",6378137.0,298.257223563]],PRIMEM["Greenwich",0.0],UNIT["Degree",0.0174532925199433]]"#;

/// Nom de base des fichiers produits
pub const RESULT_NAME: &str = "Result";
