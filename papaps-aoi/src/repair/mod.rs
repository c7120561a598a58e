//! Réparation des géométries soumises

pub mod rings;
pub mod simplify;

use geo::{unary_union, Area, LineString, MultiPolygon, Polygon, RemoveRepeatedPoints};
use tracing::debug;

/// Réparation topologique équivalente à un buffer de distance nulle
///
/// Les anneaux sont fermés et nettoyés des sommets dupliqués, puis la
/// superposition booléenne (`unary_union`) fusionne les recouvrements entre
/// parties. Comme `buffer(0)`, une auto-intersection en papillon ne garde
/// que le lobe orienté comme l'anneau : le lobe inversé disparaît.
pub fn make_valid(geometry: &MultiPolygon<f64>) -> MultiPolygon<f64> {
    let cleaned: Vec<Polygon<f64>> = geometry.iter().filter_map(clean_polygon).collect();
    if cleaned.is_empty() {
        return MultiPolygon::new(Vec::new());
    }

    drop_degenerate(unary_union(&cleaned))
}

/// Retire les polygones d'aire nulle et les anneaux inexploitables
pub fn drop_degenerate(geometry: MultiPolygon<f64>) -> MultiPolygon<f64> {
    let before = geometry.0.len();
    let kept: Vec<Polygon<f64>> = geometry
        .into_iter()
        .filter_map(|p| clean_polygon(&p))
        .filter(|p| p.unsigned_area() > 0.0)
        .collect();

    if kept.len() < before {
        debug!(dropped = before - kept.len(), "Degenerate polygons removed");
    }
    MultiPolygon::new(kept)
}

/// Ferme les anneaux, supprime les doublons consécutifs et les anneaux
/// de moins de 4 points. `None` si l'extérieur est inexploitable.
fn clean_polygon(polygon: &Polygon<f64>) -> Option<Polygon<f64>> {
    let exterior = clean_ring(polygon.exterior())?;
    let interiors = polygon.interiors().iter().filter_map(clean_ring).collect();
    Some(Polygon::new(exterior, interiors))
}

fn clean_ring(ring: &LineString<f64>) -> Option<LineString<f64>> {
    if ring.0.iter().any(|c| !c.x.is_finite() || !c.y.is_finite()) {
        return None;
    }

    let mut ring = ring.remove_repeated_points();
    ring.close();

    // LinearRing: >= 4 points, first == last
    (ring.0.len() >= 4).then_some(ring)
}
