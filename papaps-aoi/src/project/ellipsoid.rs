//! Constantes de l'ellipsoïde WGS84 (partagé par DGN95)

/// Ellipsoïde WGS84
pub struct WGS84;

impl WGS84 {
    /// Demi-grand axe (rayon équatorial) en mètres
    pub const A: f64 = 6378137.0;

    /// Aplatissement
    pub const F: f64 = 1.0 / 298.257223563;

    /// Première excentricité au carré
    pub const E2: f64 = 2.0 * Self::F - Self::F * Self::F;

    /// Première excentricité
    pub const E: f64 = 0.0818191908426215; // sqrt(E2)

    /// Deuxième excentricité au carré
    pub const EP2: f64 = Self::E2 / (1.0 - Self::E2);

    /// Longueur d'un degré de longitude à l'équateur, en mètres
    pub const METRES_PER_DEGREE: f64 = Self::A * std::f64::consts::PI / 180.0;
}
