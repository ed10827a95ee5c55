//! Changement de datum par translation géocentrique (Helmert à 3 paramètres)
//!
//! Campo Inchauspe → WGS84 : (-148, 136, 90) m, valeurs `towgs84` de
//! l'EPSG:22195. Passage par les coordonnées cartésiennes géocentriques.

use super::ellipsoid::Ellipsoid;
use super::Geographic;

/// Nombre maximal d'itérations pour les résolutions itératives
const MAX_ITERATIONS: usize = 20;

/// Translation géocentrique locale → WGS84, en mètres
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Helmert3 {
    pub dx: f64,
    pub dy: f64,
    pub dz: f64,
}

impl Helmert3 {
    /// Campo Inchauspe 1969 → WGS84
    pub const CAMPO_INCHAUSPE: Helmert3 = Helmert3 {
        dx: -148.0,
        dy: 136.0,
        dz: 90.0,
    };

    pub fn new(dx: f64, dy: f64, dz: f64) -> Self {
        Self { dx, dy, dz }
    }

    /// Géographique WGS84 (hauteur nulle) → géographique sur l'ellipsoïde local
    pub(crate) fn wgs84_to_local(&self, local: &Ellipsoid, geo: Geographic) -> Geographic {
        let (x, y, z) = to_geocentric(&Ellipsoid::WGS84, geo, 0.0);
        let (lon_lat, _) = to_geodetic(local, x - self.dx, y - self.dy, z - self.dz);
        lon_lat
    }

    /// Géographique local → géographique WGS84
    ///
    /// La hauteur locale est choisie pour que le point tombe sur l'ellipsoïde
    /// WGS84 : c'est l'inverse exact de [`Helmert3::wgs84_to_local`].
    pub(crate) fn local_to_wgs84(&self, local: &Ellipsoid, geo: Geographic) -> Geographic {
        let mut h = 0.0;
        let mut result = geo;

        for _ in 0..MAX_ITERATIONS {
            let (x, y, z) = to_geocentric(local, geo, h);
            let (wgs, h_wgs) =
                to_geodetic(&Ellipsoid::WGS84, x + self.dx, y + self.dy, z + self.dz);
            result = wgs;
            if h_wgs.abs() < 1e-9 {
                break;
            }
            h -= h_wgs;
        }

        result
    }
}

/// Géographique + hauteur ellipsoïdale → cartésien géocentrique
pub(crate) fn to_geocentric(ellipsoid: &Ellipsoid, geo: Geographic, h: f64) -> (f64, f64, f64) {
    let n = ellipsoid.prime_vertical_radius(geo.lat);
    let (sin_lat, cos_lat) = geo.lat.sin_cos();
    let (sin_lon, cos_lon) = geo.lon.sin_cos();

    (
        (n + h) * cos_lat * cos_lon,
        (n + h) * cos_lat * sin_lon,
        (n * (1.0 - ellipsoid.e2()) + h) * sin_lat,
    )
}

/// Cartésien géocentrique → (géographique, hauteur ellipsoïdale)
pub(crate) fn to_geodetic(ellipsoid: &Ellipsoid, x: f64, y: f64, z: f64) -> (Geographic, f64) {
    let e2 = ellipsoid.e2();
    let p = x.hypot(y);
    let lon = y.atan2(x);

    // Sur l'axe polaire la longitude est indéterminée
    if p < 1e-9 {
        let lat = std::f64::consts::FRAC_PI_2.copysign(z);
        return (Geographic::new(lon, lat), z.abs() - ellipsoid.b());
    }

    let mut lat = z.atan2(p * (1.0 - e2));
    let mut h = 0.0;
    for _ in 0..MAX_ITERATIONS {
        let n = ellipsoid.prime_vertical_radius(lat);
        h = p / lat.cos() - n;
        let next = z.atan2(p * (1.0 - e2 * n / (n + h)));
        let converged = (next - lat).abs() < 1e-15;
        lat = next;
        if converged {
            break;
        }
    }

    let n = ellipsoid.prime_vertical_radius(lat);
    h = if lat.cos().abs() > 1e-10 {
        p / lat.cos() - n
    } else {
        z.abs() / lat.sin().abs() - n * (1.0 - e2)
    };

    (Geographic::new(lon, lat), h)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geocentric_roundtrip() {
        let intl = Ellipsoid::INTERNATIONAL_1924;
        let geo = Geographic::from_degrees(-60.65, -32.94);
        let (x, y, z) = to_geocentric(&intl, geo, 123.4);
        let (back, h) = to_geodetic(&intl, x, y, z);
        assert!((back.lat - geo.lat).abs() < 1e-13);
        assert!((back.lon - geo.lon).abs() < 1e-13);
        assert!((h - 123.4).abs() < 1e-6, "h={}", h);
    }

    #[test]
    fn test_equator_on_ellipsoid() {
        let (x, y, z) = to_geocentric(&Ellipsoid::WGS84, Geographic::new(0.0, 0.0), 0.0);
        assert!((x - 6378137.0).abs() < 1e-6);
        assert!(y.abs() < 1e-6);
        assert!(z.abs() < 1e-6);
    }

    #[test]
    fn test_shift_is_reversible() {
        let shift = Helmert3::CAMPO_INCHAUSPE;
        let intl = Ellipsoid::INTERNATIONAL_1924;
        let wgs = Geographic::from_degrees(-58.3816, -34.6037);

        let local = shift.wgs84_to_local(&intl, wgs);
        // La translation déplace le point de quelques secondes d'arc
        assert!((local.lat - wgs.lat).abs() > 1e-7);

        let back = shift.local_to_wgs84(&intl, local);
        assert!((back.lat - wgs.lat).abs() < 1e-13, "dlat={}", back.lat - wgs.lat);
        assert!((back.lon - wgs.lon).abs() < 1e-13, "dlon={}", back.lon - wgs.lon);
    }
}
