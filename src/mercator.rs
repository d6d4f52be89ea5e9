//! Closed-form spherical ("Web") Mercator, EPSG:3857 on the WGS84 sphere.

use std::f64::consts::PI;

/// Half the equatorial circumference of the Web Mercator sphere, in metres.
pub const ORIGIN_SHIFT: f64 = 20_037_508.34;

/// Longitude/latitude in degrees to Web Mercator metres.
pub fn spherical_mercator_forward(lon: f64, lat: f64) -> (f64, f64) {
    let x = lon * ORIGIN_SHIFT / 180.0;
    let y = ((90.0 + lat) * PI / 360.0).tan().ln() / (PI / 180.0);
    (x, y * ORIGIN_SHIFT / 180.0)
}

/// Web Mercator metres to longitude/latitude in degrees.
pub fn spherical_mercator_inverse(x: f64, y: f64) -> (f64, f64) {
    let lon = (x / ORIGIN_SHIFT) * 180.0;
    let lat = (y / ORIGIN_SHIFT) * 180.0;
    let lat = 180.0 / PI * (2.0 * (lat * PI / 180.0).exp().atan() - PI / 2.0);
    (lon, lat)
}
