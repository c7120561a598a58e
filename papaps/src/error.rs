//! Erreurs du pipeline de classification

use papaps_aoi::AoiError;
use thiserror::Error;

use crate::layer::BackendError;

/// Échec d'une requête, par étape
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Archive soumise inexploitable (erreur d'entrée)
    #[error("Invalid input: {0}")]
    Sanitize(#[from] AoiError),

    /// Couche de référence indisponible
    #[error("Reference layer error: {0}")]
    Overlay(#[from] BackendError),

    /// Répertoire de travail impossible à créer
    #[error("Cannot create scratch directory: {0}")]
    Scratch(#[source] std::io::Error),
}

impl PipelineError {
    /// Nom de l'étape en échec
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Sanitize(_) => "sanitize",
            Self::Overlay(_) => "overlay",
            Self::Scratch(_) => "scratch",
        }
    }

    /// Vrai si l'erreur vient de l'archive soumise
    pub fn is_input_error(&self) -> bool {
        matches!(self, Self::Sanitize(_))
    }
}
