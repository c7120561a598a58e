//! Simplification Douglas-Peucker avec préservation de la topologie
//!
//! Chaque anneau est simplifié indépendamment. Un anneau qui s'effondrerait
//! (moins de 4 points, aire nulle, orientation inversée) ou qui deviendrait
//! auto-intersectant garde ses sommets d'origine : aucun anneau ne disparaît
//! et aucun polygone n'est scindé.

use geo::{Area, LineString, MultiPolygon, Polygon, Simplify, Validation};

/// Simplifie tous les polygones d'un multipolygone
pub fn simplify_multipolygon(geometry: &MultiPolygon<f64>, tolerance: f64) -> MultiPolygon<f64> {
    MultiPolygon::new(
        geometry
            .iter()
            .map(|polygon| simplify_polygon(polygon, tolerance))
            .collect(),
    )
}

/// Simplifie l'extérieur et les trous d'un polygone
pub fn simplify_polygon(polygon: &Polygon<f64>, tolerance: f64) -> Polygon<f64> {
    let exterior = simplify_ring(polygon.exterior(), tolerance);
    let interiors = polygon
        .interiors()
        .iter()
        .map(|ring| simplify_ring(ring, tolerance))
        .collect();
    Polygon::new(exterior, interiors)
}

/// Simplifie un anneau fermé, ou le rend inchangé si la simplification
/// casserait sa topologie
pub fn simplify_ring(ring: &LineString<f64>, tolerance: f64) -> LineString<f64> {
    if ring.0.len() <= 4 || tolerance <= 0.0 {
        return ring.clone();
    }

    let candidate = ring.simplify(tolerance);
    if candidate.0.len() == ring.0.len() {
        return ring.clone();
    }

    if preserves_topology(ring, &candidate) {
        candidate
    } else {
        ring.clone()
    }
}

/// Au moins 4 points, même orientation, aire non nulle, anneau valide
fn preserves_topology(original: &LineString<f64>, candidate: &LineString<f64>) -> bool {
    if candidate.0.len() < 4 {
        return false;
    }

    let before = Polygon::new(original.clone(), vec![]).signed_area();
    let shell = Polygon::new(candidate.clone(), vec![]);
    let after = shell.signed_area();
    if after == 0.0 || before.signum() != after.signum() {
        return false;
    }

    shell.is_valid()
}
