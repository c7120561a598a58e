//! Pipeline d'une requête : archive → AOI → overlay → règles → surfaces → agrégation
//!
//! Une requête s'exécute de façon synchrone, étape par étape. Le répertoire
//! d'extraction est propre à la requête et supprimé à la fin, succès ou
//! échec : plusieurs requêtes indépendantes peuvent tourner en parallèle.

use std::path::Path;

use papaps_aoi::Aoi;
use tracing::{info, warn};

use crate::aggregate::{aggregate, total_hectares, AggregatedResult};
use crate::area::measure;
use crate::config::PipelineConfig;
use crate::layer::{DatasetId, ReferenceLayer};
use crate::overlay::overlay;
use crate::rules::classify_feature;
use crate::PipelineError;

/// Résultat d'une requête
#[derive(Debug, Clone)]
pub enum Outcome {
    /// Au moins une ligne agrégée
    Results(Vec<AggregatedResult>),
    /// Aucune intersection entre l'AOI et la couche (pas une erreur)
    NoOverlap,
}

impl Outcome {
    pub fn rows(&self) -> &[AggregatedResult] {
        match self {
            Self::Results(rows) => rows,
            Self::NoOverlap => &[],
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::NoOverlap)
    }
}

/// Requête exécutée, avec ses compteurs
#[derive(Debug, Clone)]
pub struct PipelineRun {
    pub aoi: Aoi,
    pub clipped: usize,
    pub outcome: Outcome,
}

impl PipelineRun {
    pub fn total_hectares(&self) -> f64 {
        total_hectares(self.outcome.rows())
    }
}

/// Exécute une requête complète depuis l'archive soumise
///
/// # Errors
///
/// `Sanitize` pour une archive inexploitable, `Overlay` si la couche de
/// référence échoue, `Scratch` si le répertoire de travail ne peut être créé.
pub fn run(
    archive: &Path,
    dataset: &DatasetId,
    layer: &dyn ReferenceLayer,
    config: &PipelineConfig,
) -> Result<PipelineRun, PipelineError> {
    let scratch = tempfile::Builder::new()
        .prefix("papaps-")
        .tempdir()
        .map_err(PipelineError::Scratch)?;

    let aoi = papaps_aoi::sanitize(archive, scratch.path(), &config.sanitize_options())?;
    // Le répertoire d'extraction n'est plus utile après la sanitization
    drop(scratch);

    run_aoi(aoi, dataset, layer, config)
}

/// Exécute la requête à partir d'une AOI déjà sanitizée
pub fn run_aoi(
    aoi: Aoi,
    dataset: &DatasetId,
    layer: &dyn ReferenceLayer,
    config: &PipelineConfig,
) -> Result<PipelineRun, PipelineError> {
    info!(dataset = %dataset, parts = aoi.parts(), "Running overlay");
    let clipped = overlay(&aoi, layer, dataset, &config.overlay_options())?;
    let clipped_count = clipped.len();

    let area_options = config.area_options();
    let records: Vec<_> = clipped
        .into_iter()
        .map(classify_feature)
        .map(|feature| measure(feature, &area_options))
        .collect();

    let rows = aggregate(records);
    let outcome = if rows.is_empty() {
        warn!(dataset = %dataset, "No intersection between AOI and reference layer");
        Outcome::NoOverlap
    } else {
        info!(
            rows = rows.len(),
            hectares = total_hectares(&rows),
            "Classification complete"
        );
        Outcome::Results(rows)
    };

    Ok(PipelineRun {
        aoi,
        clipped: clipped_count,
        outcome,
    })
}
