//! Calcul des surfaces en projection équivalente

use geo::algorithm::buffer::{BufferStyle, LineJoin};
use geo::{Area, Buffer, MultiPolygon};
use papaps_aoi::project::{self, WGS84};

use crate::rules::ClassifiedFeature;

/// Paramètres du calcul de surface
#[derive(Debug, Clone, Copy)]
pub struct AreaOptions {
    /// Buffer de réparation des micro-géométries, en mètres
    pub repair_buffer_m: f64,
}

/// Pas angulaire des jonctions rondes, le plus grossier accepté (π/4)
const COARSE_JOIN_STEP: f64 = std::f64::consts::FRAC_PI_4;

impl Default for AreaOptions {
    fn default() -> Self {
        Self {
            repair_buffer_m: 0.1,
        }
    }
}

/// Feature classée, géométrie réparée, surface en hectares
#[derive(Debug, Clone)]
pub struct AreaRecord {
    pub feature: ClassifiedFeature,
    pub hectares: f64,
}

/// Répare la géométrie par un buffer et mesure sa surface (World
/// Cylindrical Equal Area). Toujours par feature, jamais après agrégation.
pub fn measure(mut feature: ClassifiedFeature, options: &AreaOptions) -> AreaRecord {
    if options.repair_buffer_m > 0.0 && !feature.geometry.0.is_empty() {
        let distance = options.repair_buffer_m / WGS84::METRES_PER_DEGREE;
        let style = BufferStyle::new(distance).line_join(LineJoin::Round(COARSE_JOIN_STEP));
        feature.geometry = feature.geometry.buffer_with_style(style);
    }

    let hectares = hectares(&feature.geometry);
    AreaRecord { feature, hectares }
}

/// Surface d'une géométrie lon/lat WGS84, en hectares
pub fn hectares(geometry: &MultiPolygon<f64>) -> f64 {
    project::to_equal_area(geometry).unsigned_area() / 10_000.0
}
