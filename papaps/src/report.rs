//! Rapport d'exécution d'une requête
//!
//! Collecte les compteurs de chaque étape, les lignes agrégées et les
//! warnings (exports en échec), pour affichage console et sauvegarde JSON.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::aggregate::AggregatedResult;
use crate::rules::{Category, DirectiveSet, ObligationSet};

/// Statut global de la requête
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RunStatus {
    /// Classification et exports réussis
    Success,
    /// Aucune intersection entre l'AOI et la couche
    Empty,
    /// Résultats calculés, au moins un export en échec
    PartialSuccess,
}

/// Ligne du tableau récapitulatif
#[derive(Debug, Clone, Serialize)]
pub struct ReportRow {
    #[serde(rename = "Arahan")]
    pub directive: DirectiveSet,
    #[serde(rename = "Kewajiban")]
    pub obligation: ObligationSet,
    #[serde(rename = "Ruang")]
    pub category: Category,
    pub luas_ha: f64,
    pub members: usize,
}

impl From<&AggregatedResult> for ReportRow {
    fn from(result: &AggregatedResult) -> Self {
        Self {
            directive: result.classification.directive,
            obligation: result.classification.obligation,
            category: result.classification.category,
            luas_ha: result.hectares,
            members: result.members,
        }
    }
}

/// Rapport complet d'une requête
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Archive soumise
    pub input: String,
    /// Checksum blake3 de l'archive
    pub checksum: Option<String>,
    pub region: String,
    pub dataset: String,
    pub status: RunStatus,
    pub duration_secs: f64,

    /// Nombre de géométries d'entrée fusionnées dans l'AOI
    pub aoi_parts: usize,
    /// Nombre de features découpées par l'AOI
    pub clipped_features: usize,

    pub rows: Vec<ReportRow>,
    pub total_ha: f64,

    /// Fichiers produits
    pub outputs: Vec<String>,
    pub warnings: Vec<String>,
}

impl RunReport {
    pub fn new(input: &Path, region: &str, dataset: &str) -> Self {
        Self {
            input: input.display().to_string(),
            checksum: None,
            region: region.to_string(),
            dataset: dataset.to_string(),
            status: RunStatus::Success,
            duration_secs: 0.0,
            aoi_parts: 0,
            clipped_features: 0,
            rows: Vec::new(),
            total_ha: 0.0,
            outputs: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Enregistre les lignes agrégées
    pub fn record_rows(&mut self, results: &[AggregatedResult]) {
        self.rows = results.iter().map(ReportRow::from).collect();
        self.total_ha = self.rows.iter().map(|r| r.luas_ha).sum();
    }

    /// Enregistre un fichier produit
    pub fn record_output(&mut self, path: &Path) {
        self.outputs.push(path.display().to_string());
    }

    /// Enregistre un warning (export en échec, etc.)
    pub fn record_warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    /// Définit la durée de la requête
    pub fn set_duration(&mut self, duration: Duration) {
        self.duration_secs = duration.as_secs_f64();
    }

    /// Détermine le statut final
    pub fn finalize(&mut self) {
        self.status = if self.rows.is_empty() {
            RunStatus::Empty
        } else if !self.warnings.is_empty() {
            RunStatus::PartialSuccess
        } else {
            RunStatus::Success
        };
    }

    /// Affiche le rapport sur la console
    pub fn display(&self) {
        println!("\n{}", "=".repeat(60));
        println!("PAPAPS REPORT - {} ({})", self.region, self.dataset);
        println!("{}", "=".repeat(60));

        println!("\nInput: {}", self.input);
        if let Some(checksum) = &self.checksum {
            println!("Checksum (blake3): {}", checksum);
        }
        println!("Status: {:?}", self.status);
        println!("Duration: {:.2}s", self.duration_secs);

        println!("\n--- SUMMARY ---");
        println!(
            "AOI parts: {}, clipped features: {}, rows: {}",
            self.aoi_parts,
            self.clipped_features,
            self.rows.len()
        );

        if self.rows.is_empty() {
            println!("\nNo intersection with the reference layer.");
        } else {
            println!("\n--- RESULT ---");
            println!(
                "  {:<12} {:<10} {:<12} {:>14}",
                "Arahan", "Kewajiban", "Ruang", "luas_ha"
            );
            for row in &self.rows {
                println!(
                    "  {:<12} {:<10} {:<12} {:>14.4}",
                    row.directive.to_string(),
                    row.obligation.to_string(),
                    row.category.as_str(),
                    row.luas_ha
                );
            }
            println!("  {:<36} {:>14.4}", "TOTAL", self.total_ha);
        }

        if !self.outputs.is_empty() {
            println!("\n--- OUTPUTS ---");
            for output in &self.outputs {
                println!("  {}", output);
            }
        }

        if !self.warnings.is_empty() {
            println!("\n--- WARNINGS ({}) ---", self.warnings.len());
            for w in self.warnings.iter().take(10) {
                println!("  {}", w);
            }
            if self.warnings.len() > 10 {
                println!("  ... and {} more", self.warnings.len() - 10);
            }
        }

        println!("\n{}", "=".repeat(60));
    }

    /// Sauvegarde le rapport en JSON
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write report: {}", path.display()))?;
        Ok(())
    }

    /// Affichage compact pour le résumé
    pub fn summary(&self) -> String {
        format!(
            "{}: {:?}, {} rows, {:.4} ha, {} warnings",
            self.input,
            self.status,
            self.rows.len(),
            self.total_ha,
            self.warnings.len()
        )
    }
}
