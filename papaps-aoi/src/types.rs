//! Types de données pour le crate papaps-aoi

use std::collections::HashMap;
use std::path::PathBuf;

use geo::{BoundingRect, MultiPolygon, Rect};

/// Géométrie brute lue depuis le shapefile soumis
#[derive(Debug, Clone)]
pub struct RawGeometry {
    /// Parties polygonales (x, y) dans le CRS source
    pub geometry: MultiPolygon<f64>,

    /// Altitudes par sommet, dans l'ordre de parcours des anneaux.
    /// Présent uniquement pour les shapes PolygonZ.
    pub elevation: Option<Vec<f64>>,

    /// Attributs de l'enregistrement DBF (clé -> valeur)
    pub attributes: HashMap<String, String>,
}

impl RawGeometry {
    /// Géométrie 2D sans attributs
    pub fn new(geometry: MultiPolygon<f64>) -> Self {
        Self {
            geometry,
            elevation: None,
            attributes: HashMap::new(),
        }
    }

    /// Nombre de dimensions des coordonnées (2 ou 3)
    pub fn dimensions(&self) -> u8 {
        if self.elevation.is_some() {
            3
        } else {
            2
        }
    }
}

/// Zone d'intérêt sanitizée : un polygone valide, 2D, en WGS84
#[derive(Debug, Clone, PartialEq)]
pub struct Aoi {
    geometry: MultiPolygon<f64>,
    parts: usize,
}

impl Aoi {
    pub(crate) fn new(geometry: MultiPolygon<f64>, parts: usize) -> Self {
        Self { geometry, parts }
    }

    /// Géométrie (lon/lat WGS84)
    pub fn geometry(&self) -> &MultiPolygon<f64> {
        &self.geometry
    }

    /// Nombre de géométries d'entrée fusionnées dans l'AOI
    pub fn parts(&self) -> usize {
        self.parts
    }

    /// Emprise de l'AOI
    pub fn bounding_rect(&self) -> Option<Rect<f64>> {
        self.geometry.bounding_rect()
    }

    pub fn into_geometry(self) -> MultiPolygon<f64> {
        self.geometry
    }
}

/// Shapefile extrait avec ses fichiers compagnons
#[derive(Debug, Clone)]
pub struct Dataset {
    pub shp: PathBuf,
    pub shx: PathBuf,
    pub dbf: PathBuf,
    pub prj: PathBuf,
}

/// Paramètres de la sanitization
#[derive(Debug, Clone, Copy)]
pub struct SanitizeOptions {
    /// Tolérance de simplification en degrés décimaux (~1 m à l'équateur)
    pub simplify_tolerance: f64,
}

impl Default for SanitizeOptions {
    fn default() -> Self {
        Self {
            simplify_tolerance: 0.00001,
        }
    }
}
