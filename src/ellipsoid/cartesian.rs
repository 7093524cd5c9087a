//! Geodetic <-> geocentric Cartesian conversion and radii of curvature.

use super::Ellipsoid;

/// Below this |cos φ| the height is taken from Z instead of p / cos φ.
pub(super) const NEAR_POLE_COS: f64 = 1e-6;

impl Ellipsoid {
    /// Prime vertical radius of curvature N(φ).
    pub fn prime_vertical_radius(&self, lat: f64) -> f64 {
        let sin_lat = lat.sin();
        self.a / (1.0 - self.e2 * sin_lat * sin_lat).sqrt()
    }

    /// Meridian radius of curvature M(φ).
    pub fn meridian_radius(&self, lat: f64) -> f64 {
        let sin_lat = lat.sin();
        let w2 = 1.0 - self.e2 * sin_lat * sin_lat;
        self.a * (1.0 - self.e2) / (w2 * w2.sqrt())
    }

    /// Radius of curvature of the normal section at azimuth α (Euler).
    pub fn radius_in_azimuth(&self, lat: f64, azimuth: f64) -> f64 {
        let m = self.meridian_radius(lat);
        let n = self.prime_vertical_radius(lat);
        let sin_az = azimuth.sin();
        let cos_az = azimuth.cos();
        m * n / (m * sin_az * sin_az + n * cos_az * cos_az)
    }

    /// Gaussian mean radius √(M·N).
    pub fn mean_radius(&self, lat: f64) -> f64 {
        (self.meridian_radius(lat) * self.prime_vertical_radius(lat)).sqrt()
    }

    /// Distance from the centre to the ellipsoid surface at geodetic latitude φ.
    pub fn geocentric_radius(&self, lat: f64) -> f64 {
        let (a2, b2) = (self.a * self.a, self.b * self.b);
        let cos_lat = lat.cos();
        let sin_lat = lat.sin();
        let num = (a2 * cos_lat).powi(2) + (b2 * sin_lat).powi(2);
        let den = (self.a * cos_lat).powi(2) + (self.b * sin_lat).powi(2);
        (num / den).sqrt()
    }

    /// (λ, φ, h) in radians/metres to geocentric (X, Y, Z) metres.
    pub fn to_cartesian_radians(&self, lon: f64, lat: f64, h: f64) -> [f64; 3] {
        let n = self.prime_vertical_radius(lat);
        let cos_lat = lat.cos();
        [
            (n + h) * cos_lat * lon.cos(),
            (n + h) * cos_lat * lon.sin(),
            (n * (1.0 - self.e2) + h) * lat.sin(),
        ]
    }

    /// Geocentric (X, Y, Z) to (λ, φ, h) in radians/metres.
    ///
    /// Bowring's single-step latitude estimate; sub-millimetre for terrestrial
    /// heights.
    pub fn to_geodetic_radians(&self, x: f64, y: f64, z: f64) -> (f64, f64, f64) {
        let p = x.hypot(y);
        let lon = y.atan2(x);
        let theta = (z * self.a).atan2(p * self.b);
        let sin_theta = theta.sin();
        let cos_theta = theta.cos();
        let lat = (z + self.ep2 * self.b * sin_theta.powi(3))
            .atan2(p - self.e2 * self.a * cos_theta.powi(3));

        let n = self.prime_vertical_radius(lat);
        let cos_lat = lat.cos();
        let h = if cos_lat.abs() < NEAR_POLE_COS {
            z.abs() / lat.sin().abs() - n * (1.0 - self.e2)
        } else {
            p / cos_lat - n
        };
        (lon, lat, h)
    }

    /// Degrees variant of [`Ellipsoid::to_cartesian_radians`].
    pub fn to_cartesian(&self, lon: f64, lat: f64, h: f64) -> [f64; 3] {
        self.to_cartesian_radians(lon.to_radians(), lat.to_radians(), h)
    }

    /// Degrees variant of [`Ellipsoid::to_geodetic_radians`].
    pub fn to_geodetic(&self, x: f64, y: f64, z: f64) -> (f64, f64, f64) {
        let (lon, lat, h) = self.to_geodetic_radians(x, y, z);
        (lon.to_degrees(), lat.to_degrees(), h)
    }
}
