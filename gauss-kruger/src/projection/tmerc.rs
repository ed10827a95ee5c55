//! Projection Transverse Mercator (Gauss-Krüger / UTM)
//!
//! Série de Krüger à l'ordre 6 en n (formulation de Karney, 2011) :
//! précision nanométrique jusqu'à ~4000 km du méridien central, et
//! forward/inverse cohérents entre eux bien en dessous du millimètre.
//! C'est l'algorithme utilisé par défaut par PROJ (`tmerc`/`etmerc`).

use std::f64::consts::FRAC_PI_2;

use super::ellipsoid::Ellipsoid;
use super::Geographic;
use crate::error::ProjectionError;

/// Borne sur η (valeur retenue par PROJ) au-delà de laquelle la série diverge
const ETA_MAX: f64 = 2.623395162778;

/// Tolérance (radians) pour traiter une latitude ou un ξ comme le pôle
const POLE_TOLERANCE: f64 = 1e-12;

/// Projection Transverse Mercator pré-calculée pour un jeu de paramètres
#[derive(Debug, Clone)]
pub(crate) struct TransverseMercator {
    label: String,
    e: f64,
    e2: f64,
    /// k0 · A (rayon rectifiant mis à l'échelle)
    scaled_radius: f64,
    alpha: [f64; 6],
    beta: [f64; 6],
    lon0: f64,
    /// ξ de la latitude d'origine
    xi0: f64,
    x0: f64,
    y0: f64,
}

impl TransverseMercator {
    /// Pré-calcule les coefficients de la série
    ///
    /// `lat0` et `lon0` en radians, `x0`/`y0` en mètres.
    pub(crate) fn new(
        label: &str,
        ellipsoid: &Ellipsoid,
        lat0: f64,
        lon0: f64,
        k0: f64,
        x0: f64,
        y0: f64,
    ) -> Self {
        let n = ellipsoid.n();
        let n2 = n * n;
        let n3 = n2 * n;
        let n4 = n3 * n;
        let n5 = n4 * n;
        let n6 = n5 * n;

        // Rayon rectifiant
        let a_rect = ellipsoid.a / (1.0 + n) * (1.0 + n2 / 4.0 + n4 / 64.0 + n6 / 256.0);

        let alpha = [
            n / 2.0 - 2.0 / 3.0 * n2 + 5.0 / 16.0 * n3 + 41.0 / 180.0 * n4
                - 127.0 / 288.0 * n5
                + 7891.0 / 37800.0 * n6,
            13.0 / 48.0 * n2 - 3.0 / 5.0 * n3 + 557.0 / 1440.0 * n4 + 281.0 / 630.0 * n5
                - 1983433.0 / 1935360.0 * n6,
            61.0 / 240.0 * n3 - 103.0 / 140.0 * n4 + 15061.0 / 26880.0 * n5
                + 167603.0 / 181440.0 * n6,
            49561.0 / 161280.0 * n4 - 179.0 / 168.0 * n5 + 6601661.0 / 7257600.0 * n6,
            34729.0 / 80640.0 * n5 - 3418889.0 / 1995840.0 * n6,
            212378941.0 / 319334400.0 * n6,
        ];

        let beta = [
            n / 2.0 - 2.0 / 3.0 * n2 + 37.0 / 96.0 * n3 - 1.0 / 360.0 * n4 - 81.0 / 512.0 * n5
                + 96199.0 / 604800.0 * n6,
            1.0 / 48.0 * n2 + 1.0 / 15.0 * n3 - 437.0 / 1440.0 * n4 + 46.0 / 105.0 * n5
                - 1118711.0 / 3870720.0 * n6,
            17.0 / 480.0 * n3 - 37.0 / 840.0 * n4 - 209.0 / 4480.0 * n5 + 5569.0 / 90720.0 * n6,
            4397.0 / 161280.0 * n4 - 11.0 / 504.0 * n5 - 830251.0 / 7257600.0 * n6,
            4583.0 / 161280.0 * n5 - 108847.0 / 3991680.0 * n6,
            20648693.0 / 638668800.0 * n6,
        ];

        let mut tm = Self {
            label: label.to_string(),
            e: ellipsoid.e(),
            e2: ellipsoid.e2(),
            scaled_radius: k0 * a_rect,
            alpha,
            beta,
            lon0,
            xi0: 0.0,
            x0,
            y0,
        };
        tm.xi0 = tm.meridian_xi(lat0);
        tm
    }

    /// ξ le long du méridien central (arc de méridien / A)
    fn meridian_xi(&self, lat: f64) -> f64 {
        // Aux pôles la série s'annule : ξ = ±π/2
        if (lat.abs() - FRAC_PI_2).abs() < POLE_TOLERANCE {
            return FRAC_PI_2.copysign(lat);
        }
        let xi_prime = self.conformal_tau(lat).atan();
        let mut xi = xi_prime;
        for (j, a) in self.alpha.iter().enumerate() {
            let k = 2.0 * (j as f64 + 1.0);
            xi += a * (k * xi_prime).sin();
        }
        xi
    }

    /// tan de la latitude conforme
    fn conformal_tau(&self, lat: f64) -> f64 {
        let sin_lat = lat.sin();
        (sin_lat.atanh() - self.e * (self.e * sin_lat).atanh()).sinh()
    }

    /// Géographique (radians) → (x, y) en mètres
    pub(crate) fn forward(&self, geo: Geographic) -> Result<(f64, f64), ProjectionError> {
        let lon_deg = geo.lon.to_degrees();
        let lat_deg = geo.lat.to_degrees();

        if geo.lat.abs() > FRAC_PI_2 + POLE_TOLERANCE {
            return Err(self.outside(lon_deg, lat_deg, "latitude beyond the poles"));
        }

        let lam = normalize_angle(geo.lon - self.lon0);
        if lam.abs() >= FRAC_PI_2 {
            return Err(self.outside(
                lon_deg,
                lat_deg,
                "longitude 90 degrees or more away from the central meridian",
            ));
        }

        let (xi_p, eta_p) = if (geo.lat.abs() - FRAC_PI_2).abs() < POLE_TOLERANCE {
            (FRAC_PI_2.copysign(geo.lat), 0.0)
        } else {
            let tau_p = self.conformal_tau(geo.lat);
            let xi_p = tau_p.atan2(lam.cos());
            let eta_p = (lam.sin() / tau_p.hypot(1.0)).atanh();
            (xi_p, eta_p)
        };

        if eta_p.abs() > ETA_MAX {
            return Err(self.outside(lon_deg, lat_deg, "too far from the central meridian"));
        }

        let mut xi = xi_p;
        let mut eta = eta_p;
        for (j, a) in self.alpha.iter().enumerate() {
            let k = 2.0 * (j as f64 + 1.0);
            xi += a * (k * xi_p).sin() * (k * eta_p).cosh();
            eta += a * (k * xi_p).cos() * (k * eta_p).sinh();
        }

        let x = self.x0 + self.scaled_radius * eta;
        let y = self.y0 + self.scaled_radius * (xi - self.xi0);
        Ok((x, y))
    }

    /// (x, y) en mètres → géographique (radians)
    pub(crate) fn inverse(&self, x: f64, y: f64) -> Result<Geographic, ProjectionError> {
        let eta = (x - self.x0) / self.scaled_radius;
        let xi = (y - self.y0) / self.scaled_radius + self.xi0;

        if eta.abs() > ETA_MAX {
            return Err(self.outside(x, y, "easting too far from the central meridian"));
        }
        if xi.abs() > FRAC_PI_2 + POLE_TOLERANCE {
            return Err(self.outside(x, y, "northing beyond the pole"));
        }

        let mut xi_p = xi;
        let mut eta_p = eta;
        for (j, b) in self.beta.iter().enumerate() {
            let k = 2.0 * (j as f64 + 1.0);
            xi_p -= b * (k * xi).sin() * (k * eta).cosh();
            eta_p -= b * (k * xi).cos() * (k * eta).sinh();
        }

        let sinh_eta = eta_p.sinh();
        let cos_xi = xi_p.cos();
        let r = sinh_eta.hypot(cos_xi);

        // Au pôle : r → 0, longitude indéterminée, on garde le méridien central
        if r < 1e-15 {
            return Ok(Geographic::new(self.lon0, FRAC_PI_2.copysign(xi_p)));
        }

        let tau_p = xi_p.sin() / r;
        let lam = sinh_eta.atan2(cos_xi);
        let lat = self.tau_from_conformal(tau_p).atan();

        Ok(Geographic::new(normalize_angle(self.lon0 + lam), lat))
    }

    /// Résout tan φ à partir de tan φ' (Newton, convergence en 2-3 itérations)
    fn tau_from_conformal(&self, tau_p: f64) -> f64 {
        let e = self.e;
        let one_minus_e2 = 1.0 - self.e2;
        let mut tau = tau_p;

        for _ in 0..10 {
            let tau1 = tau.hypot(1.0);
            let sig = (e * (e * tau / tau1).atanh()).sinh();
            let tau_p_i = tau * sig.hypot(1.0) - sig * tau1;
            let delta = (tau_p - tau_p_i) * (1.0 + one_minus_e2 * tau * tau)
                / (one_minus_e2 * tau1 * tau_p_i.hypot(1.0));
            tau += delta;
            if delta.abs() < 1e-15 * tau.abs().max(1.0) {
                break;
            }
        }
        tau
    }

    fn outside(&self, x: f64, y: f64, reason: &'static str) -> ProjectionError {
        ProjectionError::OutsideDomain {
            projection: self.label.clone(),
            x,
            y,
            reason,
        }
    }
}

/// Ramène un angle dans ]-π, π]
fn normalize_angle(angle: f64) -> f64 {
    use std::f64::consts::{PI, TAU};
    let mut a = angle % TAU;
    if a > PI {
        a -= TAU;
    } else if a <= -PI {
        a += TAU;
    }
    a
}
