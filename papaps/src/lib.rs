//! # papaps
//!
//! Classification d'une zone d'intérêt (AOI) selon la couche thématique
//! PAPAPS : arahan (A1..A6), kewajiban (K1..K3) et ruang (Protection /
//! Utilization), avec surface en hectares par combinaison.
//!
//! ## Pipeline
//!
//! 1. Sanitization de l'archive soumise (`papaps-aoi`)
//! 2. Overlay avec la couche de référence de la région
//! 3. Moteur de règles par feature
//! 4. Surface sur une projection équivalente
//! 5. Agrégation par classification
//!
//! ## Usage CLI
//!
//! ```bash
//! papaps run --input ./batas.zip --region "Jawa Barat" --output ./out
//! papaps batch --path ./uploads/ --region Papua --output ./out --jobs 4
//! papaps regions
//! ```

pub mod aggregate;
pub mod area;
pub mod config;
pub mod error;
pub mod export;
pub mod layer;
pub mod overlay;
pub mod pipeline;
pub mod report;
pub mod rules;

pub use aggregate::AggregatedResult;
pub use config::{LayerSettings, PipelineConfig, RegionTable};
pub use error::PipelineError;
pub use layer::{BackendError, DatasetId, ReferenceLayer};
pub use pipeline::{run, run_aoi, Outcome, PipelineRun};
pub use report::{RunReport, RunStatus};
pub use rules::{classify, Category, Classification};
