//! Définitions des ellipsoïdes

/// Ellipsoïde de référence (demi-grand axe + aplatissement)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ellipsoid {
    pub name: &'static str,
    /// Demi-grand axe (rayon équatorial) en mètres
    pub a: f64,
    /// Aplatissement
    pub f: f64,
}

impl Ellipsoid {
    /// Ellipsoïde WGS84
    pub const WGS84: Ellipsoid = Ellipsoid {
        name: "WGS84",
        a: 6378137.0,
        f: 1.0 / 298.257223563,
    };

    /// Ellipsoïde International 1924 (Hayford), utilisé par Campo Inchauspe
    pub const INTERNATIONAL_1924: Ellipsoid = Ellipsoid {
        name: "intl",
        a: 6378388.0,
        f: 1.0 / 297.0,
    };

    /// Demi-petit axe (rayon polaire) en mètres
    pub fn b(&self) -> f64 {
        self.a * (1.0 - self.f)
    }

    /// Première excentricité au carré
    pub fn e2(&self) -> f64 {
        2.0 * self.f - self.f * self.f
    }

    /// Première excentricité
    pub fn e(&self) -> f64 {
        self.e2().sqrt()
    }

    /// Troisième aplatissement n = f / (2 - f)
    pub fn n(&self) -> f64 {
        self.f / (2.0 - self.f)
    }

    /// Grande normale (rayon de courbure dans le premier vertical)
    pub fn prime_vertical_radius(&self, lat: f64) -> f64 {
        self.a / (1.0 - self.e2() * lat.sin().powi(2)).sqrt()
    }
}
