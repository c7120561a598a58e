//! Configuration : table des régions, paramètres du pipeline, couche

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use papaps_aoi::SanitizeOptions;
use serde::{Deserialize, Serialize};

use crate::area::AreaOptions;
use crate::layer::{BackendError, DatasetId};
use crate::overlay::OverlayOptions;

/// Variable d'environnement du répertoire des couches
pub const LAYER_DIR_ENV: &str = "PAPAPS_LAYER_DIR";

/// Région → dataset de la couche thématique
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RegionTable {
    /// Préfixe des identifiants de dataset
    #[serde(default = "default_prefix")]
    pub prefix: String,

    /// Nom de région → suffixe du dataset
    pub regions: BTreeMap<String, String>,
}

fn default_prefix() -> String {
    "PAPAPS_".to_string()
}

impl RegionTable {
    /// Table embarquée (Java, Sumatera, Kalimantan, Papua)
    pub fn embedded() -> Result<Self> {
        serde_json::from_str(include_str!("presets/regions.json"))
            .context("Failed to parse embedded region table")
    }

    /// Charge une table depuis un fichier JSON
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read region table: {}", path.display()))?;

        serde_json::from_str(&content).context("Failed to parse region table JSON")
    }

    /// Fichier si fourni, table embarquée sinon
    pub fn from_option(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Self::embedded(),
        }
    }

    /// Dataset d'une région (nom insensible à la casse)
    pub fn dataset_for(&self, region: &str) -> Result<DatasetId, BackendError> {
        let wanted = region.trim();
        self.regions
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(wanted))
            .map(|(_, suffix)| DatasetId::new(format!("{}{}", self.prefix, suffix)))
            .ok_or_else(|| BackendError::UnknownRegion {
                region: wanted.to_string(),
                known: self.names().collect::<Vec<_>>().join(", "),
            })
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.regions.keys().map(String::as_str)
    }
}

/// Paramètres numériques du pipeline
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Tolérance de simplification de l'AOI, en degrés
    pub simplify_tolerance_deg: f64,
    /// Pas de la grille d'accrochage de l'intersection, en mètres
    pub snap_tolerance_m: f64,
    /// Buffer de réparation avant calcul de surface, en mètres
    pub repair_buffer_m: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            simplify_tolerance_deg: 0.00001,
            snap_tolerance_m: 1.0,
            repair_buffer_m: 0.1,
        }
    }
}

impl PipelineConfig {
    /// Charge une configuration depuis un fichier
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;

        serde_json::from_str(&content).context("Failed to parse config JSON")
    }

    pub fn from_option(path: Option<&Path>) -> Result<Self> {
        path.map_or_else(|| Ok(Self::default()), Self::load)
    }

    pub fn sanitize_options(&self) -> SanitizeOptions {
        SanitizeOptions {
            simplify_tolerance: self.simplify_tolerance_deg,
        }
    }

    pub fn overlay_options(&self) -> OverlayOptions {
        OverlayOptions {
            snap_tolerance_m: self.snap_tolerance_m,
        }
    }

    pub fn area_options(&self) -> AreaOptions {
        AreaOptions {
            repair_buffer_m: self.repair_buffer_m,
        }
    }
}

/// Emplacement de la couche de référence
#[derive(Debug, Clone)]
pub struct LayerSettings {
    pub dir: PathBuf,
}

impl LayerSettings {
    /// Lit `PAPAPS_LAYER_DIR` (défaut : `./layers`)
    pub fn from_env() -> Self {
        let dir = std::env::var(LAYER_DIR_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("layers"));
        Self { dir }
    }

    /// Argument CLI prioritaire sur l'environnement
    pub fn with_override(self, dir: Option<PathBuf>) -> Self {
        match dir {
            Some(dir) => Self { dir },
            None => self,
        }
    }
}
