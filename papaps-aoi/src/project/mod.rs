//! Reprojection légère en Rust pur et projection équivalente
//!
//! Sources supportées sans dépendance externe :
//! - UTM nord/sud sur WGS84 ou DGN95 (EPSG:326xx / 327xx)
//! - Web Mercator (EPSG:3857)
//!
//! Cible unique : WGS84 (EPSG:4326). Les autres systèmes passent par PROJ
//! (feature `reproject`).

mod cea;
mod ellipsoid;
mod mercator;
#[cfg(feature = "reproject")]
mod proj;
mod smart;
mod utm;

pub use ellipsoid::WGS84;
pub use smart::SmartReprojector;

use geo::{Coord, LineString, MapCoords, MultiPolygon, Polygon};

use crate::crs::Crs;
use crate::AoiError;

/// Point en coordonnées géographiques (radians)
#[derive(Debug, Clone, Copy)]
pub struct Geographic {
    /// Longitude en radians
    pub lon: f64,
    /// Latitude en radians
    pub lat: f64,
}

impl Geographic {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Convertit en degrés
    pub fn to_degrees(self) -> (f64, f64) {
        (self.lon.to_degrees(), self.lat.to_degrees())
    }
}

/// Reprojection légère vers WGS84
#[derive(Debug, Clone, Copy)]
pub enum ReprojectorLite {
    Utm { zone: u8, south: bool },
    WebMercator,
}

impl ReprojectorLite {
    /// Reprojector pour le CRS source, `None` si non supporté en Rust pur
    pub fn for_crs(crs: &Crs) -> Option<Self> {
        match crs {
            Crs::Utm { zone, south } => Some(Self::Utm {
                zone: *zone,
                south: *south,
            }),
            Crs::WebMercator => Some(Self::WebMercator),
            Crs::Wgs84 | Crs::Other(_) => None,
        }
    }

    /// Transforme un point (x, y) vers (lon, lat) en degrés
    pub fn transform_point(&self, x: f64, y: f64) -> (f64, f64) {
        let geo = match *self {
            Self::Utm { zone, south } => utm::utm_to_geographic(x, y, zone, south),
            Self::WebMercator => mercator::web_mercator_to_geographic(x, y),
        };
        geo.to_degrees()
    }

    /// Transforme un multipolygone
    ///
    /// # Errors
    ///
    /// `Reprojection` si une coordonnée sort du domaine de la projection.
    pub fn transform_multipolygon(
        &self,
        geometry: &MultiPolygon<f64>,
    ) -> Result<MultiPolygon<f64>, AoiError> {
        let projected = geometry.map_coords(|c| {
            let (x, y) = self.transform_point(c.x, c.y);
            Coord { x, y }
        });
        ensure_finite(projected)
    }
}

/// Projette un multipolygone lon/lat WGS84 en World Cylindrical Equal Area (mètres)
pub fn to_equal_area(geometry: &MultiPolygon<f64>) -> MultiPolygon<f64> {
    geometry.map_coords(|c| {
        let (x, y) = cea::geographic_to_cea(c.x, c.y);
        Coord { x, y }
    })
}

fn ensure_finite(geometry: MultiPolygon<f64>) -> Result<MultiPolygon<f64>, AoiError> {
    let finite = geometry
        .iter()
        .flat_map(|p: &Polygon<f64>| std::iter::once(p.exterior()).chain(p.interiors()))
        .flat_map(|ring: &LineString<f64>| ring.0.iter())
        .all(|c| c.x.is_finite() && c.y.is_finite());

    if finite {
        Ok(geometry)
    } else {
        Err(AoiError::Reprojection(
            "coordinates outside the projection domain".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::Area;

    #[test]
    fn test_lite_support() {
        assert!(ReprojectorLite::for_crs(&Crs::Utm { zone: 49, south: true }).is_some());
        assert!(ReprojectorLite::for_crs(&Crs::WebMercator).is_some());
        assert!(ReprojectorLite::for_crs(&Crs::Wgs84).is_none());
        assert!(ReprojectorLite::for_crs(&Crs::Other("PROJCS[]".into())).is_none());
    }

    #[test]
    fn test_utm_polygon_to_wgs84() {
        let reproj = ReprojectorLite::for_crs(&Crs::Utm { zone: 48, south: true }).unwrap();
        let square = MultiPolygon::new(vec![Polygon::new(
            LineString::from(vec![
                (704207.0, 9313358.0),
                (704307.0, 9313358.0),
                (704307.0, 9313458.0),
                (704207.0, 9313458.0),
                (704207.0, 9313358.0),
            ]),
            vec![],
        )]);

        let wgs84 = reproj.transform_multipolygon(&square).unwrap();
        let first = wgs84.0[0].exterior().0[0];
        assert!((first.x - 106.8456).abs() < 1e-4, "lon={}", first.x);
        assert!((first.y - (-6.2088)).abs() < 1e-4, "lat={}", first.y);
        assert_eq!(wgs84.0[0].exterior().0.len(), 5);
    }

    #[test]
    fn test_equal_area_one_degree_cell() {
        let cell = MultiPolygon::new(vec![Polygon::new(
            LineString::from(vec![(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0), (0.0, 0.0)]),
            vec![],
        )]);

        let hectares = to_equal_area(&cell).unsigned_area() / 10_000.0;
        // ~1 230 846 ha
        assert!((hectares - 1_230_846.0).abs() < 1_230_846.0 * 0.005, "ha={}", hectares);
    }

    #[test]
    fn test_non_finite_rejected() {
        let bad = MultiPolygon::new(vec![Polygon::new(
            LineString::from(vec![(f64::NAN, 0.0), (1.0, 0.0), (1.0, 1.0), (f64::NAN, 0.0)]),
            vec![],
        )]);
        assert!(matches!(
            ensure_finite(bad),
            Err(AoiError::Reprojection(_))
        ));
    }
}
