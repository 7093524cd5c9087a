//! Survey reductions between observed (astronomic, spatial) quantities and
//! their ellipsoidal counterparts.
//!
//! Deflection of the vertical components ξ (north-south) and η (east-west)
//! are in degrees like every other angle at this boundary.

use std::f64::consts::TAU;

use super::cartesian::NEAR_POLE_COS;
use super::Ellipsoid;
use crate::error::GeodesyError;

struct Horizon {
    east: f64,
    north: f64,
    up: f64,
}

impl Ellipsoid {
    /// Components of the p1 -> p2 chord in the local horizon at (frame_lon, frame_lat).
    #[allow(clippy::too_many_arguments)]
    fn horizon_vector(
        &self,
        lon1: f64,
        lat1: f64,
        h1: f64,
        lon2: f64,
        lat2: f64,
        h2: f64,
        frame_lon: f64,
        frame_lat: f64,
    ) -> Horizon {
        let [x1, y1, z1] = self.to_cartesian_radians(lon1, lat1, h1);
        let [x2, y2, z2] = self.to_cartesian_radians(lon2, lat2, h2);
        let (dx, dy, dz) = (x2 - x1, y2 - y1, z2 - z1);
        let (sin_lon, cos_lon) = frame_lon.sin_cos();
        let (sin_lat, cos_lat) = frame_lat.sin_cos();
        Horizon {
            east: -sin_lon * dx + cos_lon * dy,
            north: -sin_lat * cos_lon * dx - sin_lat * sin_lon * dy + cos_lat * dz,
            up: cos_lat * cos_lon * dx + cos_lat * sin_lon * dy + sin_lat * dz,
        }
    }

    /// Sum of the corrections taking a geodesic azimuth to an astronomic
    /// azimuth, radians.
    #[allow(clippy::too_many_arguments)]
    fn astronomic_correction(
        &self,
        lon1: f64,
        lat1: f64,
        h1: f64,
        xi: f64,
        eta: f64,
        lon2: f64,
        lat2: f64,
        h2: f64,
    ) -> Result<(f64, f64), GeodesyError> {
        let azimuth = self.azimuth_radians(lon1, lat1, lon2, lat2)?;
        let distance = self.distance_metres_radians(lon1, lat1, lon2, lat2)?;
        let sin_2az = (2.0 * azimuth).sin();

        let horizon = self.horizon_vector(lon1, lat1, h1, lon2, lat2, h2, lon1, lat1);
        let horizontal = horizon.east.hypot(horizon.north);
        let cot_zenith = if horizontal > 0.0 {
            horizon.up / horizontal
        } else {
            0.0
        };
        // Laplace equation plus the zenith-dependent deflection term.
        let laplace = if lat1.cos().abs() < NEAR_POLE_COS {
            0.0
        } else {
            eta * lat1.tan()
        };
        let deflection = laplace + (xi * azimuth.sin() - eta * azimuth.cos()) * cot_zenith;

        // Skew normals: the target sits h2 above its own normal.
        let cos_lat2 = lat2.cos();
        let skew_normal =
            self.ep2 * h2 * cos_lat2 * cos_lat2 * sin_2az / (2.0 * self.meridian_radius(lat2));

        // Normal section to geodesic.
        let lat_m = (lat1 + lat2) / 2.0;
        let cos_lat_m = lat_m.cos();
        let n_m = self.prime_vertical_radius(lat_m);
        let geodesic =
            self.ep2 * distance * distance * cos_lat_m * cos_lat_m * sin_2az / (12.0 * n_m * n_m);

        Ok((azimuth, deflection + skew_normal + geodesic))
    }

    /// Astronomic azimuth in degrees of p2 seen from p1, given the deflection
    /// of the vertical (ξ, η) at p1 and the ellipsoidal heights.
    #[allow(clippy::too_many_arguments)]
    pub fn astronomic_azimuth(
        &self,
        lon1: f64,
        lat1: f64,
        h1: f64,
        xi: f64,
        eta: f64,
        lon2: f64,
        lat2: f64,
        h2: f64,
    ) -> Result<f64, GeodesyError> {
        let (azimuth, correction) = self.astronomic_correction(
            lon1.to_radians(),
            lat1.to_radians(),
            h1,
            xi.to_radians(),
            eta.to_radians(),
            lon2.to_radians(),
            lat2.to_radians(),
            h2,
        )?;
        Ok((azimuth + correction).rem_euclid(TAU).to_degrees())
    }

    /// Reduce an observed astronomic direction (degrees) to the ellipsoid.
    #[allow(clippy::too_many_arguments)]
    pub fn ellipsoid_direction(
        &self,
        lon1: f64,
        lat1: f64,
        h1: f64,
        xi: f64,
        eta: f64,
        lon2: f64,
        lat2: f64,
        h2: f64,
        direction: f64,
    ) -> Result<f64, GeodesyError> {
        let (_, correction) = self.astronomic_correction(
            lon1.to_radians(),
            lat1.to_radians(),
            h1,
            xi.to_radians(),
            eta.to_radians(),
            lon2.to_radians(),
            lat2.to_radians(),
            h2,
        )?;
        Ok((direction.to_radians() - correction).rem_euclid(TAU).to_degrees())
    }

    /// Straight-line distance in metres between two points above the ellipsoid.
    pub fn spatial_distance(
        &self,
        lon1: f64,
        lat1: f64,
        h1: f64,
        lon2: f64,
        lat2: f64,
        h2: f64,
    ) -> f64 {
        let [x1, y1, z1] = self.to_cartesian(lon1, lat1, h1);
        let [x2, y2, z2] = self.to_cartesian(lon2, lat2, h2);
        ((x2 - x1).powi(2) + (y2 - y1).powi(2) + (z2 - z1).powi(2)).sqrt()
    }

    /// Horizontal direction in degrees of p2 in the astronomic horizon of p1.
    #[allow(clippy::too_many_arguments)]
    pub fn spatial_direction(
        &self,
        lon1: f64,
        lat1: f64,
        h1: f64,
        xi: f64,
        eta: f64,
        lon2: f64,
        lat2: f64,
        h2: f64,
    ) -> f64 {
        let lat1 = lat1.to_radians();
        let lon1 = lon1.to_radians();
        // η has no longitude component at a pole; use the geodetic horizon.
        let (astro_lon, astro_lat) = if lat1.cos().abs() < NEAR_POLE_COS {
            (lon1, lat1)
        } else {
            (lon1 + eta.to_radians() / lat1.cos(), lat1 + xi.to_radians())
        };
        let horizon = self.horizon_vector(
            lon1,
            lat1,
            h1,
            lon2.to_radians(),
            lat2.to_radians(),
            h2,
            astro_lon,
            astro_lat,
        );
        horizon.east.atan2(horizon.north).rem_euclid(TAU).to_degrees()
    }

    /// Ratio of the ellipsoidal arc length to the horizontal distance for a
    /// measured spatial distance between two points.
    #[allow(clippy::too_many_arguments)]
    pub fn horizontal_ellipsoid_factor(
        &self,
        lon1: f64,
        lat1: f64,
        h1: f64,
        lon2: f64,
        lat2: f64,
        h2: f64,
        spatial_distance: f64,
    ) -> Result<f64, GeodesyError> {
        let (lon1, lat1) = (lon1.to_radians(), lat1.to_radians());
        let (lon2, lat2) = (lon2.to_radians(), lat2.to_radians());
        let azimuth = self.azimuth_radians(lon1, lat1, lon2, lat2)?;
        let radius = self.radius_in_azimuth((lat1 + lat2) / 2.0, azimuth);

        let dh = h2 - h1;
        let horizontal_sq = spatial_distance * spatial_distance - dh * dh;
        if horizontal_sq <= 0.0 {
            return Ok(1.0);
        }
        let horizontal = horizontal_sq.sqrt();
        let chord = (horizontal_sq / ((1.0 + h1 / radius) * (1.0 + h2 / radius))).sqrt();
        let arc = 2.0 * radius * (chord / (2.0 * radius)).asin();
        Ok(arc / horizontal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    // Roughly 10 km north-east of the start.
    const P1: (f64, f64) = (10.0, 45.0);
    const P2: (f64, f64) = (10.09, 45.064);

    #[test]
    fn test_spatial_distance_is_chord() {
        let wgs84 = Ellipsoid::wgs84();
        let chord = wgs84.spatial_distance(P1.0, P1.1, 0.0, P2.0, P2.1, 0.0);
        let arc = wgs84.distance_metres(P1.0, P1.1, P2.0, P2.1).unwrap();
        assert!(chord < arc);
        assert_relative_eq!(chord, arc, epsilon = 0.01);
    }

    #[test]
    fn test_spatial_distance_vertical() {
        let wgs84 = Ellipsoid::wgs84();
        let d = wgs84.spatial_distance(P1.0, P1.1, 100.0, P1.0, P1.1, 350.0);
        assert_relative_eq!(d, 250.0, epsilon = 1e-6);
    }

    #[test]
    fn test_spatial_direction_matches_geodetic_azimuth() {
        let wgs84 = Ellipsoid::wgs84();
        let direction = wgs84.spatial_direction(P1.0, P1.1, 0.0, 0.0, 0.0, P2.0, P2.1, 0.0);
        let azimuth = wgs84.azimuth(P1.0, P1.1, P2.0, P2.1).unwrap();
        assert_relative_eq!(direction, azimuth, epsilon = 1e-6);
    }

    #[test]
    fn test_spatial_direction_at_pole_is_finite() {
        let wgs84 = Ellipsoid::wgs84();
        let target = (0.0, 89.9);
        let deflected = wgs84.spatial_direction(0.0, 90.0, 0.0, 0.001, 0.002, target.0, target.1, 0.0);
        let plain = wgs84.spatial_direction(0.0, 90.0, 0.0, 0.0, 0.0, target.0, target.1, 0.0);
        assert!(deflected.is_finite());
        assert_relative_eq!(deflected, plain, epsilon = 1e-12);

        let astro = wgs84
            .astronomic_azimuth(0.0, 90.0, 0.0, 0.001, 0.002, target.0, target.1, 0.0)
            .unwrap();
        assert!(astro.is_finite());
    }

    #[test]
    fn test_astronomic_azimuth_without_deflection() {
        let wgs84 = Ellipsoid::wgs84();
        let astro = wgs84
            .astronomic_azimuth(P1.0, P1.1, 0.0, 0.0, 0.0, P2.0, P2.1, 0.0)
            .unwrap();
        let azimuth = wgs84.azimuth(P1.0, P1.1, P2.0, P2.1).unwrap();
        assert_relative_eq!(astro, azimuth, epsilon = 1e-6);
    }

    #[test]
    fn test_laplace_term() {
        let wgs84 = Ellipsoid::wgs84();
        let eta = 10.0 / 3600.0;
        let astro = wgs84
            .astronomic_azimuth(P1.0, P1.1, 0.0, 0.0, eta, P2.0, P2.1, 0.0)
            .unwrap();
        let azimuth = wgs84.azimuth(P1.0, P1.1, P2.0, P2.1).unwrap();
        // tan 45° = 1, the zenith term is small for a level line.
        assert_relative_eq!(astro - azimuth, eta, epsilon = 1e-5);
    }

    #[test]
    fn test_ellipsoid_direction_inverts_astronomic_azimuth() {
        let wgs84 = Ellipsoid::wgs84();
        let (xi, eta) = (4.0 / 3600.0, -7.0 / 3600.0);
        let astro = wgs84
            .astronomic_azimuth(P1.0, P1.1, 250.0, xi, eta, P2.0, P2.1, 1_200.0)
            .unwrap();
        let reduced = wgs84
            .ellipsoid_direction(P1.0, P1.1, 250.0, xi, eta, P2.0, P2.1, 1_200.0, astro)
            .unwrap();
        let azimuth = wgs84.azimuth(P1.0, P1.1, P2.0, P2.1).unwrap();
        assert_relative_eq!(reduced, azimuth, epsilon = 1e-9);
    }

    #[test]
    fn test_horizontal_ellipsoid_factor_recovers_geodesic() {
        let wgs84 = Ellipsoid::wgs84();
        let spatial = wgs84.spatial_distance(P1.0, P1.1, 0.0, P2.0, P2.1, 0.0);
        let factor = wgs84
            .horizontal_ellipsoid_factor(P1.0, P1.1, 0.0, P2.0, P2.1, 0.0, spatial)
            .unwrap();
        assert!(factor > 1.0);
        let arc = wgs84.distance_metres(P1.0, P1.1, P2.0, P2.1).unwrap();
        assert_relative_eq!(factor * spatial, arc, epsilon = 1e-3);
    }

    #[test]
    fn test_horizontal_ellipsoid_factor_high_points() {
        let wgs84 = Ellipsoid::wgs84();
        let spatial = wgs84.spatial_distance(P1.0, P1.1, 1_500.0, P2.0, P2.1, 1_600.0);
        let factor = wgs84
            .horizontal_ellipsoid_factor(P1.0, P1.1, 1_500.0, P2.0, P2.1, 1_600.0, spatial)
            .unwrap();
        // Reduction from ~1.5 km altitude shrinks the distance.
        assert!(factor < 1.0);
    }
}
