//! Projection cylindrique équivalente (World Cylindrical Equal Area)
//!
//! Ellipsoïdale, parallèle standard 0, méridien central 0 (ESRI:54034).
//! Les aires planes dans cette projection sont les aires sur l'ellipsoïde.

use super::ellipsoid::WGS84;

/// Projette (lon, lat) en degrés vers (x, y) en mètres
pub fn geographic_to_cea(lon_deg: f64, lat_deg: f64) -> (f64, f64) {
    let x = WGS84::A * lon_deg.to_radians();
    let y = WGS84::A * authalic_q(lat_deg.to_radians()) / 2.0;
    (x, y)
}

/// Terme q de la latitude authalique (Snyder, éq. 3-12)
fn authalic_q(phi: f64) -> f64 {
    let e = WGS84::E;
    let e2 = WGS84::E2;
    let sin_phi = phi.sin();

    (1.0 - e2)
        * (sin_phi / (1.0 - e2 * sin_phi * sin_phi)
            - (1.0 / (2.0 * e)) * ((1.0 - e * sin_phi) / (1.0 + e * sin_phi)).ln())
}
