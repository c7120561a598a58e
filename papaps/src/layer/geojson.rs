//! Couche de référence lue depuis des fichiers GeoJSON
//!
//! Un fichier `<dir>/<dataset>.geojson` par dataset, FeatureCollection en
//! EPSG:4326.

use std::path::{Path, PathBuf};

use geo::{Geometry, Rect};
use geojson::GeoJson;
use tracing::{debug, warn};

use super::{BackendError, DatasetId, ReferenceFeature, ReferenceLayer};

/// Répertoire de fichiers GeoJSON
#[derive(Debug, Clone)]
pub struct GeoJsonLayer {
    dir: PathBuf,
}

impl GeoJsonLayer {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Chemin du fichier d'un dataset
    pub fn path_for(&self, dataset: &DatasetId) -> PathBuf {
        self.dir.join(format!("{}.geojson", dataset))
    }

    fn load(&self, dataset: &DatasetId) -> Result<Vec<ReferenceFeature>, BackendError> {
        let path = self.path_for(dataset);
        if !path.is_file() {
            return Err(BackendError::DatasetNotFound(dataset.clone()));
        }

        let unreadable = |reason: String| BackendError::Unreadable {
            dataset: dataset.clone(),
            reason,
        };

        let content = std::fs::read_to_string(&path)?;
        let collection = match content.parse::<GeoJson>().map_err(|e| unreadable(e.to_string()))? {
            GeoJson::FeatureCollection(collection) => collection,
            _ => return Err(unreadable("expected a FeatureCollection".to_string())),
        };

        let mut features = Vec::with_capacity(collection.features.len());
        let mut skipped = 0usize;

        for feature in collection.features {
            let Some(geometry) = feature.geometry else {
                skipped += 1;
                continue;
            };

            match Geometry::<f64>::try_from(geometry) {
                Ok(geometry) => features.push(ReferenceFeature {
                    geometry,
                    attributes: feature.properties.unwrap_or_default(),
                }),
                Err(e) => {
                    warn!(dataset = %dataset, error = %e, "Reference feature skipped");
                    skipped += 1;
                }
            }
        }

        debug!(dataset = %dataset, loaded = features.len(), skipped, "Reference dataset loaded");
        Ok(features)
    }
}

impl ReferenceLayer for GeoJsonLayer {
    fn features_in_bounds(
        &self,
        dataset: &DatasetId,
        bounds: Rect<f64>,
    ) -> Result<Vec<ReferenceFeature>, BackendError> {
        Ok(self
            .load(dataset)?
            .into_iter()
            .filter(|f| f.intersects_bounds(&bounds))
            .collect())
    }
}
