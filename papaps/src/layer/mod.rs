//! Couche thématique de référence
//!
//! Le serveur de features distant est modélisé par le trait
//! `ReferenceLayer`. Deux implémentations : fichiers GeoJSON (un par
//! dataset) et mémoire.

pub mod geojson;

pub use self::geojson::GeoJsonLayer;

use std::collections::HashMap;
use std::fmt;

use geo::{BoundingRect, Geometry, Intersects, Rect};
use thiserror::Error;

use crate::rules::Attributes;

/// Identifiant de dataset (ex: `PAPAPS_JatengJogja`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DatasetId(String);

impl DatasetId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DatasetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Feature de la couche de référence (lecture seule)
#[derive(Debug, Clone)]
pub struct ReferenceFeature {
    pub geometry: Geometry<f64>,
    pub attributes: Attributes,
}

impl ReferenceFeature {
    pub fn new(geometry: impl Into<Geometry<f64>>, attributes: Attributes) -> Self {
        Self {
            geometry: geometry.into(),
            attributes,
        }
    }

    /// Vrai si l'emprise de la feature croise `bounds`
    pub fn intersects_bounds(&self, bounds: &Rect<f64>) -> bool {
        self.geometry
            .bounding_rect()
            .map_or(false, |rect| rect.intersects(bounds))
    }
}

/// Erreurs du collaborateur
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Unknown region '{region}' (known: {known})")]
    UnknownRegion { region: String, known: String },

    #[error("Dataset not found: {0}")]
    DatasetNotFound(DatasetId),

    #[error("Dataset {dataset} unreadable: {reason}")]
    Unreadable { dataset: DatasetId, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Source des features de référence
pub trait ReferenceLayer: Send + Sync {
    /// Features du dataset dont l'emprise croise `bounds` (lon/lat WGS84)
    ///
    /// Le filtrage peut être grossier : l'overlay refiltre localement.
    fn features_in_bounds(
        &self,
        dataset: &DatasetId,
        bounds: Rect<f64>,
    ) -> Result<Vec<ReferenceFeature>, BackendError>;
}

/// Couche en mémoire, par dataset
#[derive(Debug, Default)]
pub struct MemoryLayer {
    datasets: HashMap<DatasetId, Vec<ReferenceFeature>>,
}

impl MemoryLayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, dataset: DatasetId, features: Vec<ReferenceFeature>) {
        self.datasets.insert(dataset, features);
    }

    pub fn with_dataset(mut self, dataset: DatasetId, features: Vec<ReferenceFeature>) -> Self {
        self.insert(dataset, features);
        self
    }
}

impl ReferenceLayer for MemoryLayer {
    fn features_in_bounds(
        &self,
        dataset: &DatasetId,
        bounds: Rect<f64>,
    ) -> Result<Vec<ReferenceFeature>, BackendError> {
        let features = self
            .datasets
            .get(dataset)
            .ok_or_else(|| BackendError::DatasetNotFound(dataset.clone()))?;

        Ok(features
            .iter()
            .filter(|f| f.intersects_bounds(&bounds))
            .cloned()
            .collect())
    }
}
