//! Reprojection intelligente : Rust pur en priorité, fallback sur PROJ
//!
//! Utilise automatiquement la meilleure option disponible.

use geo::MultiPolygon;

use super::ReprojectorLite;
use crate::crs::Crs;
use crate::AoiError;

/// Reprojection intelligente vers WGS84
pub enum SmartReprojector {
    /// Pas de reprojection (source déjà en WGS84)
    Identity,
    /// Reprojection légère (pure Rust)
    Lite(ReprojectorLite),
    /// Reprojection via PROJ (si feature activée)
    #[cfg(feature = "reproject")]
    Proj(super::proj::ProjReprojector),
}

impl SmartReprojector {
    /// Crée un reprojector depuis le CRS source
    ///
    /// # Errors
    ///
    /// `UnknownProjection` si le CRS n'est reprojetable ni en Rust pur ni
    /// via PROJ.
    pub fn new(source: &Crs) -> Result<Self, AoiError> {
        if source.is_wgs84() {
            return Ok(Self::Identity);
        }

        if let Some(lite) = ReprojectorLite::for_crs(source) {
            return Ok(Self::Lite(lite));
        }

        #[cfg(feature = "reproject")]
        {
            if let Crs::Other(wkt) = source {
                return Ok(Self::Proj(super::proj::ProjReprojector::new(wkt)?));
            }
        }

        let preview: String = match source {
            Crs::Other(wkt) => wkt.chars().take(60).collect(),
            other => other.to_string(),
        };
        Err(AoiError::UnknownProjection(format!(
            "{} (supported without PROJ: WGS84, UTM on WGS84/DGN95, Web Mercator; \
             build with --features reproject for others)",
            preview
        )))
    }

    /// Transforme une géométrie vers WGS84
    pub fn transform(&self, geometry: &MultiPolygon<f64>) -> Result<MultiPolygon<f64>, AoiError> {
        match self {
            Self::Identity => Ok(geometry.clone()),
            Self::Lite(lite) => lite.transform_multipolygon(geometry),
            #[cfg(feature = "reproject")]
            Self::Proj(proj) => proj.transform_multipolygon(geometry),
        }
    }

    /// Retourne une description du reprojector utilisé
    pub fn description(&self) -> &'static str {
        match self {
            Self::Identity => "identity (no reprojection)",
            Self::Lite(_) => "lite (pure Rust)",
            #[cfg(feature = "reproject")]
            Self::Proj(_) => "proj (PROJ library)",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity() {
        let r = SmartReprojector::new(&Crs::Wgs84).unwrap();
        assert!(matches!(r, SmartReprojector::Identity));
    }

    #[test]
    fn test_lite() {
        let r = SmartReprojector::new(&Crs::Utm { zone: 50, south: true }).unwrap();
        assert!(matches!(r, SmartReprojector::Lite(_)));
        assert_eq!(r.description(), "lite (pure Rust)");
    }

    #[cfg(not(feature = "reproject"))]
    #[test]
    fn test_other_requires_proj() {
        let result = SmartReprojector::new(&Crs::Other("PROJCS[\"Batavia / NEIEZ\"]".into()));
        assert!(matches!(result, Err(AoiError::UnknownProjection(_))));
    }
}
