//! Projection Web Mercator inverse (EPSG:3857)
//!
//! Modèle sphérique de rayon égal au demi-grand axe WGS84.

use super::ellipsoid::WGS84;
use super::Geographic;

/// Convertit Web Mercator vers coordonnées géographiques
pub fn web_mercator_to_geographic(x: f64, y: f64) -> Geographic {
    let r = WGS84::A;

    // Longitude = x / R
    let lon = x / r;

    // Latitude = 2 * atan(exp(y/R)) - π/2
    let lat = 2.0 * (y / r).exp().atan() - std::f64::consts::FRAC_PI_2;

    Geographic::new(lon, lat)
}
