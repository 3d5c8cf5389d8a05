use std::f64::consts::PI;

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::math::frame::normalize_angle_degrees;

// ---------------------------------------------------------------------------
// Earth constants
// ---------------------------------------------------------------------------

pub const G0: f64 = 9.80665; // standard gravity, m/s^2
pub const EARTH_RADIUS: f64 = 6_378_137.0; // equatorial radius (WGS-84), m
pub const EARTH_RADIUS_GEOPOTENTIAL_KM: f64 = 6_356.766; // radius used for geopotential height, km

pub const SEA_LEVEL_PRESSURE: f64 = 101_325.0; // Pa
pub const SEA_LEVEL_TEMPERATURE: f64 = 288.15; // K
pub const SEA_LEVEL_AIR_DENSITY: f64 = 1.225; // kg/m^3
pub const AIR_GAS_CONSTANT: f64 = 287.058; // J/(kg·K)

// ---------------------------------------------------------------------------
// Geodetic points
// ---------------------------------------------------------------------------

/// Latitude / longitude in degrees, altitude in metres above mean sea level.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64, altitude: f64) -> Self {
        Self { latitude, longitude, altitude }
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.7}, {:.7}, {:.2}m", self.latitude, self.longitude, self.altitude)
    }
}

/// Home reference with its trigonometry cached; computed once per home point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HomeGeoPoint {
    pub home_point: GeoPoint,
    pub lat_rad: f64,
    pub lon_rad: f64,
    pub sin_lat: f64,
    pub cos_lat: f64,
}

impl HomeGeoPoint {
    pub fn new(home_point: GeoPoint) -> Self {
        let lat_rad = home_point.latitude.to_radians();
        let lon_rad = home_point.longitude.to_radians();
        Self {
            home_point,
            lat_rad,
            lon_rad,
            sin_lat: lat_rad.sin(),
            cos_lat: lat_rad.cos(),
        }
    }
}

const ANGLE_EPS: f64 = 1e-12;
const ANTIPODE_EPS: f64 = 1e-7;

/// Local NED offset from home → geodetic point (azimuthal equidistant
/// projection on a spherical earth). Altitude grows as NED z goes negative.
pub fn ned_to_geodetic(v: &Vector3<f64>, home: &HomeGeoPoint) -> GeoPoint {
    let altitude = home.home_point.altitude - v.z;

    let x_rad = v.x / EARTH_RADIUS;
    let y_rad = v.y / EARTH_RADIUS;
    let c = (x_rad * x_rad + y_rad * y_rad).sqrt();
    if c < ANGLE_EPS {
        return GeoPoint::new(home.home_point.latitude, home.home_point.longitude, altitude);
    }

    let (sin_c, cos_c) = c.sin_cos();
    let lat_rad = (cos_c * home.sin_lat + x_rad * sin_c * home.cos_lat / c)
        .clamp(-1.0, 1.0)
        .asin();
    let lon_rad = home.lon_rad
        + (y_rad * sin_c).atan2(c * home.cos_lat * cos_c - x_rad * home.sin_lat * sin_c);

    GeoPoint::new(
        lat_rad.to_degrees(),
        normalize_angle_degrees(lon_rad.to_degrees()),
        altitude,
    )
}

/// Geodetic point → local NED offset from home. Inverse of [`ned_to_geodetic`].
///
/// Within about a metre of the antipode every direction is equally short
/// (and the projection is numerically meaningless); the offset is reported
/// as πR due north.
pub fn geodetic_to_ned(geo: &GeoPoint, home: &HomeGeoPoint) -> Vector3<f64> {
    let z = home.home_point.altitude - geo.altitude;

    let lat_rad = geo.latitude.to_radians();
    let d_lon = geo.longitude.to_radians() - home.lon_rad;
    let (sin_lat, cos_lat) = lat_rad.sin_cos();
    let cos_d_lon = d_lon.cos();

    let arg = (home.sin_lat * sin_lat + home.cos_lat * cos_lat * cos_d_lon).clamp(-1.0, 1.0);
    let c = arg.acos();

    if PI - c < ANTIPODE_EPS {
        return Vector3::new(PI * EARTH_RADIUS, 0.0, z);
    }
    let k = if c < ANGLE_EPS { 1.0 } else { c / c.sin() };

    let x = k * (home.cos_lat * sin_lat - home.sin_lat * cos_lat * cos_d_lon) * EARTH_RADIUS;
    let y = k * cos_lat * d_lon.sin() * EARTH_RADIUS;
    Vector3::new(x, y, z)
}
