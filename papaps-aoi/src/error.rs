//! Types d'erreurs pour le crate papaps-aoi

use thiserror::Error;

/// Erreurs pouvant survenir lors de la sanitization d'une AOI.
///
/// Toutes ces erreurs sont des erreurs d'entrée : l'archive soumise est
/// inexploitable et la requête doit être abandonnée.
#[derive(Debug, Error)]
pub enum AoiError {
    /// Erreur d'I/O lors de la lecture ou de l'extraction de l'archive
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Archive corrompue ou format non supporté
    #[error("Invalid archive: {0}")]
    InvalidArchive(String),

    /// Aucun shapefile (.shp) dans l'archive
    #[error("Archive contains no vector dataset (.shp)")]
    NoVectorDataset,

    /// Fichier compagnon manquant (.shx, .dbf, .prj)
    #[error("Missing companion file: {0}")]
    MissingFile(String),

    /// Erreur de lecture du shapefile
    #[error("Shapefile error in {file}: {reason}")]
    Shapefile { file: String, reason: String },

    /// Système de coordonnées non reconnu ou non reprojetable
    #[error("Unknown projection: {0}")]
    UnknownProjection(String),

    /// Échec de la reprojection d'une coordonnée
    #[error("Reprojection failed: {0}")]
    Reprojection(String),

    /// Aucune géométrie exploitable après réparation
    #[error("No usable geometry after repair ({parsed} shapes read)")]
    NoUsableGeometry { parsed: usize },
}

impl AoiError {
    /// Crée une erreur de lecture shapefile avec contexte
    pub fn shapefile(file: impl Into<String>, reason: impl ToString) -> Self {
        Self::Shapefile {
            file: file.into(),
            reason: reason.to_string(),
        }
    }
}
