//! Définition et implémentation des commandes CLI
//!
//! - `run`: une archive → tableau récapitulatif, Result.zip, rapport
//! - `batch`: un dossier d'archives traitées en parallèle
//! - `regions`: liste la table région → dataset

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use rayon::prelude::*;
use tracing::{info, warn};

use papaps::config::{LayerSettings, PipelineConfig, RegionTable};
use papaps::export::geojson::export_to_geojson;
use papaps::export::shapefile::write_result_zip;
use papaps::export::RESULT_NAME;
use papaps::layer::geojson::GeoJsonLayer;
use papaps::layer::DatasetId;
use papaps::report::{RunReport, RunStatus};
use papaps::pipeline;

/// Options communes : couche, table des régions, paramètres
#[derive(Args, Debug, Clone)]
pub struct LayerArgs {
    /// Directory holding <dataset>.geojson reference layers (default: env PAPAPS_LAYER_DIR / ./layers)
    #[arg(long)]
    pub layer_dir: Option<PathBuf>,

    /// JSON region table replacing the embedded one
    #[arg(long)]
    pub regions: Option<PathBuf>,

    /// JSON pipeline parameters (tolerances, repair buffer)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Classify one AOI archive (.zip or .tar.bz2)
    Run {
        /// Path to the submitted archive
        #[arg(short, long)]
        input: PathBuf,

        /// Region name (e.g. "Jawa Barat"), resolved through the region table
        #[arg(short, long, required_unless_present = "dataset")]
        region: Option<String>,

        /// Dataset id, bypassing the region table (e.g. PAPAPS_Jabar)
        #[arg(long)]
        dataset: Option<String>,

        /// Output directory for Result.zip
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        /// Also write Result.geojson
        #[arg(long)]
        geojson: bool,

        /// Save the JSON run report to this file
        #[arg(long)]
        report: Option<PathBuf>,

        #[command(flatten)]
        layer: LayerArgs,
    },

    /// Classify every archive of a directory, one request per archive
    Batch {
        /// Directory containing .zip / .tar.bz2 / .tbz2 archives
        #[arg(short, long)]
        path: PathBuf,

        /// Region name applied to every archive
        #[arg(short, long, required_unless_present = "dataset")]
        region: Option<String>,

        /// Dataset id, bypassing the region table
        #[arg(long)]
        dataset: Option<String>,

        /// Output directory (one sub-directory per archive)
        #[arg(short, long)]
        output: PathBuf,

        /// Also write Result.geojson
        #[arg(long)]
        geojson: bool,

        /// Maximum number of archives processed concurrently
        #[arg(long, alias = "threads")]
        jobs: Option<usize>,

        #[command(flatten)]
        layer: LayerArgs,
    },

    /// List known regions and their dataset ids
    Regions {
        /// JSON region table replacing the embedded one
        #[arg(long)]
        regions: Option<PathBuf>,
    },
}

/// Paramètres résolus d'une requête
struct Request {
    region: String,
    dataset: DatasetId,
    layer: GeoJsonLayer,
    config: PipelineConfig,
}

impl Request {
    fn resolve(region: Option<&str>, dataset: Option<&str>, args: &LayerArgs) -> Result<Self> {
        let config = PipelineConfig::from_option(args.config.as_deref())?;
        let settings = LayerSettings::from_env().with_override(args.layer_dir.clone());

        let dataset = match (dataset, region) {
            (Some(id), _) => DatasetId::new(id),
            (None, Some(region)) => {
                let table = RegionTable::from_option(args.regions.as_deref())?;
                table.dataset_for(region)?
            }
            (None, None) => anyhow::bail!("Either --region or --dataset is required"),
        };

        Ok(Self {
            region: region.unwrap_or(dataset.as_str()).to_string(),
            layer: GeoJsonLayer::new(settings.dir),
            dataset,
            config,
        })
    }
}

/// Exécute la commande run
pub fn cmd_run(
    input: &Path,
    region: Option<&str>,
    dataset: Option<&str>,
    output: &Path,
    geojson: bool,
    report_path: Option<&Path>,
    args: &LayerArgs,
) -> Result<()> {
    let request = Request::resolve(region, dataset, args)?;

    info!(
        input = %input.display(),
        region = %request.region,
        dataset = %request.dataset,
        layer_dir = %request.layer.dir().display(),
        "Starting request"
    );

    let report = process_request(input, &request, output, geojson)?;
    report.display();

    if let Some(path) = report_path {
        report.save_to_file(path)?;
        println!("Report saved to {}", path.display());
    }

    Ok(())
}

/// Exécute la commande batch
pub fn cmd_batch(
    path: &Path,
    region: Option<&str>,
    dataset: Option<&str>,
    output: &Path,
    geojson: bool,
    jobs: Option<usize>,
    args: &LayerArgs,
) -> Result<()> {
    let request = Request::resolve(region, dataset, args)?;

    let archives = collect_archives(path)?;
    if archives.is_empty() {
        anyhow::bail!("No archives (.zip, .tar.bz2) found in {}", path.display());
    }

    let jobs = jobs.unwrap_or_else(|| {
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4)
    });

    info!(
        archives = archives.len(),
        jobs = jobs,
        dataset = %request.dataset,
        "Starting batch"
    );

    std::fs::create_dir_all(output)
        .with_context(|| format!("Cannot create output directory {}", output.display()))?;

    let thread_pool = rayon::ThreadPoolBuilder::new()
        .num_threads(jobs)
        .build()
        .context("Failed to build worker pool")?;

    let success_count = AtomicUsize::new(0);
    let empty_count = AtomicUsize::new(0);
    let error_count = AtomicUsize::new(0);

    thread_pool.install(|| {
        archives.par_iter().for_each(|archive_path| {
            let archive_output = output.join(get_archive_basename(archive_path));
            let outcome = process_request(archive_path, &request, &archive_output, geojson)
                .and_then(|report| {
                    std::fs::create_dir_all(&archive_output)?;
                    report.save_to_file(&archive_output.join("report.json"))?;
                    Ok(report)
                });

            match outcome {
                Ok(report) => {
                    println!("{}", report.summary());
                    match report.status {
                        RunStatus::Empty => empty_count.fetch_add(1, Ordering::Relaxed),
                        _ => success_count.fetch_add(1, Ordering::Relaxed),
                    };
                }
                Err(e) => {
                    warn!("Failed to process {}: {:#}", archive_path.display(), e);
                    error_count.fetch_add(1, Ordering::Relaxed);
                }
            }
        });
    });

    let success = success_count.load(Ordering::Relaxed);
    let empty = empty_count.load(Ordering::Relaxed);
    let errors = error_count.load(Ordering::Relaxed);

    println!(
        "Batch complete: {}/{} archives classified, {} without overlap, {} failed",
        success,
        archives.len(),
        empty,
        errors
    );

    if errors > 0 {
        warn!("{} archives failed", errors);
    }

    Ok(())
}

/// Exécute la commande regions
pub fn cmd_regions(regions: Option<&Path>) -> Result<()> {
    let table = RegionTable::from_option(regions)?;

    println!("{:<20} DATASET", "REGION");
    for name in table.names() {
        let dataset = table.dataset_for(name)?;
        println!("{:<20} {}", name, dataset);
    }

    Ok(())
}

/// Traite une archive de bout en bout et construit son rapport
///
/// Les échecs d'export deviennent des warnings du rapport : les lignes
/// calculées restent disponibles.
fn process_request(
    input: &Path,
    request: &Request,
    output: &Path,
    geojson: bool,
) -> Result<RunReport> {
    let started = Instant::now();
    let mut report = RunReport::new(input, &request.region, request.dataset.as_str());
    report.checksum = Some(compute_file_checksum(input)?);

    let run = pipeline::run(input, &request.dataset, &request.layer, &request.config).map_err(
        |e| {
            let stage = e.stage();
            anyhow::Error::new(e)
                .context(format!("Stage '{}' failed for {}", stage, input.display()))
        },
    )?;

    report.aoi_parts = run.aoi.parts();
    report.clipped_features = run.clipped;
    report.record_rows(run.outcome.rows());

    if !run.outcome.is_empty() {
        export_outputs(run.outcome.rows(), output, geojson, &mut report);
    }

    report.set_duration(started.elapsed());
    report.finalize();
    Ok(report)
}

fn export_outputs(
    rows: &[papaps::AggregatedResult],
    output: &Path,
    geojson: bool,
    report: &mut RunReport,
) {
    if let Err(e) = std::fs::create_dir_all(output) {
        warn!(output = %output.display(), "Cannot create output directory: {}", e);
        report.record_warning(format!("Output directory {}: {}", output.display(), e));
        return;
    }

    match write_result_zip(rows, output) {
        Ok(path) => report.record_output(&path),
        Err(e) => {
            warn!("{}.zip export failed: {:#}", RESULT_NAME, e);
            report.record_warning(format!("{}.zip export failed: {:#}", RESULT_NAME, e));
        }
    }

    if geojson {
        let path = output.join(format!("{}.geojson", RESULT_NAME));
        match export_to_geojson(rows, &path) {
            Ok(()) => report.record_output(&path),
            Err(e) => {
                warn!("{}.geojson export failed: {:#}", RESULT_NAME, e);
                report.record_warning(format!("{}.geojson export failed: {:#}", RESULT_NAME, e));
            }
        }
    }
}

/// Extrait le nom de base d'une archive (sans .zip, .tar.bz2, .tbz2, .bz2)
fn get_archive_basename(path: &Path) -> String {
    let name = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("unknown");

    let name = name
        .strip_suffix(".tar.bz2")
        .or_else(|| name.strip_suffix(".tbz2"))
        .or_else(|| name.strip_suffix(".zip"))
        .or_else(|| name.strip_suffix(".bz2"))
        .unwrap_or(name);

    name.to_string()
}

fn is_archive(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| {
            ["zip", "bz2", "tbz2"]
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

/// Collecte récursivement les archives soumises
fn collect_archives(path: &Path) -> Result<Vec<PathBuf>> {
    let mut archives = Vec::new();

    if path.is_file() {
        if is_archive(path) {
            archives.push(path.to_path_buf());
        }
        return Ok(archives);
    }

    let entries = std::fs::read_dir(path)
        .with_context(|| format!("Cannot read directory {}", path.display()))?;
    for entry in entries {
        let entry_path = entry?.path();

        if entry_path.is_dir() {
            archives.extend(collect_archives(&entry_path)?);
        } else if is_archive(&entry_path) {
            archives.push(entry_path);
        }
    }

    archives.sort();
    Ok(archives)
}

/// Calcule le checksum blake3 d'un fichier
fn compute_file_checksum(path: &Path) -> Result<String> {
    use std::fs::File;
    use std::io::Read;

    let mut file = File::open(path).with_context(|| format!("Cannot open {}", path.display()))?;
    let mut hasher = blake3::Hasher::new();
    let mut buffer = [0u8; 65536];

    loop {
        let bytes_read = file.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(hasher.finalize().to_hex().to_string())
}
