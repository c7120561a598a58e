//! # papaps-aoi
//!
//! Sanitization de la zone d'intérêt (AOI) soumise à PAPAPS.
//!
//! ## Features
//!
//! - Archives `.zip` et `.tar.bz2` contenant un shapefile
//! - Shapes Polygon, PolygonM et PolygonZ (altitude aplatie)
//! - Détection du CRS depuis le `.prj` (WGS84, UTM, Web Mercator)
//! - Reprojection en Rust pur, PROJ en option (feature `reproject`)
//! - Réparation et simplification avec préservation de la topologie
//! - Projection équivalente World Cylindrical Equal Area pour les surfaces
//!
//! ## Usage
//!
//! ```rust,ignore
//! use papaps_aoi::{sanitize, SanitizeOptions};
//! use std::path::Path;
//!
//! let scratch = tempfile::tempdir()?;
//! let aoi = sanitize(Path::new("batas.zip"), scratch.path(), &SanitizeOptions::default())?;
//! println!("{} parts, bbox {:?}", aoi.parts(), aoi.bounding_rect());
//! ```

pub mod archive;
pub mod crs;
pub mod error;
pub mod project;
pub mod reader;
pub mod repair;
pub mod sanitize;
pub mod types;

pub use crs::Crs;
pub use error::AoiError;
pub use sanitize::{sanitize, sanitize_geometries};
pub use types::{Aoi, Dataset, RawGeometry, SanitizeOptions};
