//! Extraction des archives soumises (.zip, .tar.bz2)

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use bzip2::read::BzDecoder;
use tar::Archive;
use tracing::debug;
use zip::ZipArchive;

use crate::types::Dataset;
use crate::AoiError;

/// Format d'archive détecté par signature
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArchiveKind {
    Zip,
    TarBz2,
}

impl ArchiveKind {
    /// Détecte le format depuis les premiers octets du fichier
    fn detect(path: &Path) -> Result<Self, AoiError> {
        let mut magic = [0u8; 4];
        let mut file = File::open(path)?;
        let read = file.read(&mut magic)?;

        match &magic[..read] {
            [b'P', b'K', 3, 4] | [b'P', b'K', 5, 6] => Ok(Self::Zip),
            [b'B', b'Z', b'h', _] => Ok(Self::TarBz2),
            _ => Err(AoiError::InvalidArchive(format!(
                "{}: expected a .zip or .tar.bz2 archive",
                path.display()
            ))),
        }
    }
}

/// Extrait l'archive dans `dest` et localise le shapefile et ses compagnons
///
/// # Arguments
///
/// * `archive_path` - Chemin vers l'archive soumise
/// * `dest` - Répertoire de travail propre à la requête
///
/// # Errors
///
/// `NoVectorDataset` si aucun .shp n'est présent, `MissingFile` si un
/// fichier compagnon (.shx, .dbf, .prj) manque.
pub fn extract(archive_path: &Path, dest: &Path) -> Result<Dataset, AoiError> {
    match ArchiveKind::detect(archive_path)? {
        ArchiveKind::Zip => {
            let file = File::open(archive_path)?;
            let mut archive =
                ZipArchive::new(file).map_err(|e| AoiError::InvalidArchive(e.to_string()))?;
            archive
                .extract(dest)
                .map_err(|e| AoiError::InvalidArchive(e.to_string()))?;
        }
        ArchiveKind::TarBz2 => {
            let file = File::open(archive_path)?;
            let mut archive = Archive::new(BzDecoder::new(file));
            archive.unpack(dest)?;
        }
    }

    let shp = find_shapefile(dest)?.ok_or(AoiError::NoVectorDataset)?;
    debug!(shp = %shp.display(), "Shapefile found");

    // Extensions normalisées en minuscules : le lecteur shapefile dérive
    // les chemins .shx/.dbf du .shp
    Ok(Dataset {
        shx: normalize(companion(&shp, "shx")?, "shx")?,
        dbf: normalize(companion(&shp, "dbf")?, "dbf")?,
        prj: normalize(companion(&shp, "prj")?, "prj")?,
        shp: normalize(shp, "shp")?,
    })
}

/// Renomme le fichier avec l'extension en minuscules si nécessaire
fn normalize(path: PathBuf, extension: &str) -> Result<PathBuf, AoiError> {
    let canonical = path.with_extension(extension);
    if canonical != path {
        std::fs::rename(&path, &canonical)?;
    }
    Ok(canonical)
}

/// Cherche récursivement le premier .shp (ordre des chemins)
fn find_shapefile(dir: &Path) -> Result<Option<PathBuf>, AoiError> {
    let mut entries: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .collect();
    entries.sort();

    for path in &entries {
        if path.is_file() && has_extension(path, "shp") {
            return Ok(Some(path.clone()));
        }
    }

    for path in &entries {
        if path.is_dir() {
            if let Some(found) = find_shapefile(path)? {
                return Ok(Some(found));
            }
        }
    }

    Ok(None)
}

/// Fichier compagnon du .shp (même nom, extension insensible à la casse)
fn companion(shp: &Path, extension: &str) -> Result<PathBuf, AoiError> {
    let stem = shp.file_stem().and_then(|s| s.to_str()).unwrap_or("");
    let dir = shp.parent().unwrap_or_else(|| Path::new("."));

    std::fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .find(|p| {
            p.file_stem().and_then(|s| s.to_str()) == Some(stem) && has_extension(p, extension)
        })
        .ok_or_else(|| AoiError::MissingFile(format!("{}.{}", stem, extension)))
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map_or(false, |e| e.eq_ignore_ascii_case(extension))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_extract_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = extract(Path::new("nonexistent.zip"), dir.path());
        assert!(matches!(result, Err(AoiError::Io(_))));
    }

    #[test]
    fn test_reject_unknown_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("upload.zip");
        std::fs::write(&path, b"not an archive").unwrap();

        let result = extract(&path, dir.path());
        assert!(matches!(result, Err(AoiError::InvalidArchive(_))));
    }

    #[test]
    fn test_zip_without_shapefile() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("upload.zip");
        {
            let file = File::create(&path).unwrap();
            let mut zip = zip::ZipWriter::new(file);
            zip.start_file("readme.txt", zip::write::SimpleFileOptions::default())
                .unwrap();
            zip.write_all(b"no data here").unwrap();
            zip.finish().unwrap();
        }

        let scratch = tempfile::tempdir().unwrap();
        let result = extract(&path, scratch.path());
        assert!(matches!(result, Err(AoiError::NoVectorDataset)));
    }

    #[test]
    fn test_companion_case_insensitive() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["parcel.shp", "parcel.SHX", "parcel.Dbf", "parcel.PRJ"] {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }

        let shp = find_shapefile(dir.path()).unwrap().unwrap();
        assert!(companion(&shp, "shx").is_ok());
        assert!(companion(&shp, "dbf").is_ok());
        assert!(companion(&shp, "prj").is_ok());

        let dbf = normalize(companion(&shp, "dbf").unwrap(), "dbf").unwrap();
        assert_eq!(dbf, dir.path().join("parcel.dbf"));
        assert!(dbf.exists());
    }

    #[test]
    fn test_missing_prj() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("batas");
        std::fs::create_dir(&nested).unwrap();
        for name in ["aoi.shp", "aoi.shx", "aoi.dbf"] {
            std::fs::write(nested.join(name), b"").unwrap();
        }

        let shp = find_shapefile(dir.path()).unwrap().unwrap();
        assert_eq!(shp, nested.join("aoi.shp"));
        assert!(matches!(
            companion(&shp, "prj"),
            Err(AoiError::MissingFile(name)) if name == "aoi.prj"
        ));
    }
}
