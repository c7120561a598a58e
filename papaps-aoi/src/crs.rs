//! Détection du système de coordonnées depuis le fichier .prj
//!
//! Le .prj d'un shapefile est un WKT (ESRI ou OGC). On reconnaît les cas
//! rencontrés en Indonésie :
//! - WGS84 géographique (et DGN95, aligné sur WGS84)
//! - UTM nord/sud sur WGS84 ou DGN95
//! - Web Mercator (EPSG:3857)
//!
//! Tout autre WKT est conservé tel quel (`Crs::Other`) et n'est reprojetable
//! qu'avec la feature `reproject`.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

use crate::AoiError;

/// Système de coordonnées d'entrée
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Crs {
    /// Longitude/latitude WGS84 (EPSG:4326)
    Wgs84,
    /// UTM sur l'ellipsoïde WGS84
    Utm { zone: u8, south: bool },
    /// Pseudo-Mercator sphérique (EPSG:3857)
    WebMercator,
    /// WKT non reconnu
    Other(String),
}

impl Crs {
    /// Code EPSG si connu
    pub fn epsg(&self) -> Option<u32> {
        match self {
            Self::Wgs84 => Some(4326),
            Self::Utm { zone, south: false } => Some(32600 + u32::from(*zone)),
            Self::Utm { zone, south: true } => Some(32700 + u32::from(*zone)),
            Self::WebMercator => Some(3857),
            Self::Other(_) => None,
        }
    }

    pub fn is_wgs84(&self) -> bool {
        matches!(self, Self::Wgs84)
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Wgs84 => write!(f, "WGS84"),
            Self::Utm { zone, south } => {
                write!(f, "UTM {}{}", zone, if *south { 'S' } else { 'N' })
            }
            Self::WebMercator => write!(f, "Web Mercator"),
            Self::Other(_) => write!(f, "custom WKT"),
        }
    }
}

fn utm_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"(?i)UTM[_ ]zone[_ ](\d{1,2})\s*([NS])").ok())
        .as_ref()
}

/// Classe le contenu d'un fichier .prj
///
/// # Errors
///
/// `UnknownProjection` si le texte n'est pas un WKT de système de coordonnées.
pub fn parse_prj(wkt: &str) -> Result<Crs, AoiError> {
    let wkt = wkt.trim().trim_start_matches('\u{feff}');
    let upper = wkt.to_ascii_uppercase();

    let projected = upper.starts_with("PROJCS[") || upper.starts_with("PROJCRS[");
    let geographic = upper.starts_with("GEOGCS[") || upper.starts_with("GEOGCRS[");

    if !projected && !geographic {
        let preview: String = wkt.chars().take(40).collect();
        return Err(AoiError::UnknownProjection(format!(
            "not a WKT coordinate system: '{}'",
            preview
        )));
    }

    let wgs84_datum = ["WGS_1984", "WGS84", "WGS 84", "DGN95", "DGN_1995"]
        .iter()
        .any(|name| upper.contains(name));

    if geographic {
        return Ok(if wgs84_datum {
            Crs::Wgs84
        } else {
            Crs::Other(wkt.to_string())
        });
    }

    if ["PSEUDO-MERCATOR", "PSEUDO_MERCATOR", "MERCATOR_AUXILIARY_SPHERE", "POPULAR VISUALISATION"]
        .iter()
        .any(|name| upper.contains(name))
    {
        return Ok(Crs::WebMercator);
    }

    if wgs84_datum {
        if let Some(caps) = utm_pattern().and_then(|re| re.captures(wkt)) {
            let zone: u8 = caps[1].parse().unwrap_or(0);
            if (1..=60).contains(&zone) {
                let south = caps[2].eq_ignore_ascii_case("S");
                return Ok(Crs::Utm { zone, south });
            }
        }
    }

    Ok(Crs::Other(wkt.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const WGS84_ESRI: &str = r#"GEOGCS["GCS_WGS_1984",DATUM["D_WGS_1984",SPHEROID["WGS_1984",6378137.0,298.257223563]],PRIMEM["Greenwich",0.0],UNIT["Degree",0.0174532925199433]]"#;

    const UTM_48S: &str = r#"PROJCS["WGS_1984_UTM_Zone_48S",GEOGCS["GCS_WGS_1984",DATUM["D_WGS_1984",SPHEROID["WGS_1984",6378137.0,298.257223563]],PRIMEM["Greenwich",0.0],UNIT["Degree",0.0174532925199433]],PROJECTION["Transverse_Mercator"],PARAMETER["False_Easting",500000.0],PARAMETER["False_Northing",10000000.0],PARAMETER["Central_Meridian",105.0],PARAMETER["Scale_Factor",0.9996],PARAMETER["Latitude_Of_Origin",0.0],UNIT["Meter",1.0]]"#;

    const DGN95_UTM_50N: &str = r#"PROJCS["DGN95 / UTM zone 50N",GEOGCS["DGN95",DATUM["Datum_Geodesi_Nasional_1995",SPHEROID["WGS 84",6378137,298.257223563]],PRIMEM["Greenwich",0],UNIT["degree",0.0174532925199433]],PROJECTION["Transverse_Mercator"],UNIT["metre",1]]"#;

    const WEB_MERCATOR: &str = r#"PROJCS["WGS_1984_Web_Mercator_Auxiliary_Sphere",GEOGCS["GCS_WGS_1984",DATUM["D_WGS_1984",SPHEROID["WGS_1984",6378137.0,298.257223563]]],PROJECTION["Mercator_Auxiliary_Sphere"],UNIT["Meter",1.0]]"#;

    #[test]
    fn test_wgs84() {
        assert_eq!(parse_prj(WGS84_ESRI).unwrap(), Crs::Wgs84);
    }

    #[test]
    fn test_utm_south() {
        let crs = parse_prj(UTM_48S).unwrap();
        assert_eq!(crs, Crs::Utm { zone: 48, south: true });
        assert_eq!(crs.epsg(), Some(32748));
    }

    #[test]
    fn test_dgn95_utm_north() {
        assert_eq!(
            parse_prj(DGN95_UTM_50N).unwrap(),
            Crs::Utm { zone: 50, south: false }
        );
    }

    #[test]
    fn test_web_mercator() {
        assert_eq!(parse_prj(WEB_MERCATOR).unwrap(), Crs::WebMercator);
    }

    #[test]
    fn test_other_projection_is_kept() {
        let wkt = r#"PROJCS["Batavia / NEIEZ",GEOGCS["Batavia",DATUM["Batavia",SPHEROID["Bessel 1841",6377397.155,299.1528128]]],PROJECTION["Mercator_1SP"]]"#;
        assert!(matches!(parse_prj(wkt).unwrap(), Crs::Other(_)));
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(matches!(parse_prj(""), Err(AoiError::UnknownProjection(_))));
        assert!(matches!(
            parse_prj("hello world"),
            Err(AoiError::UnknownProjection(_))
        ));
    }
}
