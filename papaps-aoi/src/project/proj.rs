//! Reprojection de géométries avec PROJ
//!
//! Ce module est disponible uniquement avec le feature `reproject`.

use geo::{Coord, LineString, MultiPolygon, Polygon};
use proj::Proj;

use crate::AoiError;

/// Reprojection d'un WKT quelconque vers WGS84
pub struct ProjReprojector {
    proj: Proj,
}

impl ProjReprojector {
    /// Crée un reprojector depuis le WKT du .prj
    pub fn new(source_wkt: &str) -> Result<Self, AoiError> {
        let proj = Proj::new_known_crs(source_wkt, "EPSG:4326", None)
            .map_err(|e| AoiError::UnknownProjection(e.to_string()))?;
        Ok(Self { proj })
    }

    pub fn transform_multipolygon(
        &self,
        geometry: &MultiPolygon<f64>,
    ) -> Result<MultiPolygon<f64>, AoiError> {
        let polygons: Result<Vec<Polygon<f64>>, AoiError> =
            geometry.iter().map(|p| self.transform_polygon(p)).collect();
        Ok(MultiPolygon::new(polygons?))
    }

    fn transform_polygon(&self, polygon: &Polygon<f64>) -> Result<Polygon<f64>, AoiError> {
        let exterior = self.transform_linestring(polygon.exterior())?;
        let interiors: Result<Vec<LineString<f64>>, AoiError> = polygon
            .interiors()
            .iter()
            .map(|ring| self.transform_linestring(ring))
            .collect();
        Ok(Polygon::new(exterior, interiors?))
    }

    /// Transformation batch d'un anneau
    fn transform_linestring(&self, ring: &LineString<f64>) -> Result<LineString<f64>, AoiError> {
        let mut coords: Vec<(f64, f64)> = ring.0.iter().map(|c| (c.x, c.y)).collect();

        self.proj
            .convert_array(&mut coords)
            .map_err(|e| AoiError::Reprojection(e.to_string()))?;

        Ok(LineString::new(
            coords.into_iter().map(|(x, y)| Coord { x, y }).collect(),
        ))
    }
}
