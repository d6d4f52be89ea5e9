//! Local model space and its relation to the geographic frame.
//!
//! The consuming application positions its scene on the earth with an affine
//! transform from model coordinates to WGS84 longitude/latitude/elevation.
//! [`ModelTransform`] holds that transform and its inverse; [`EarthAnchor`]
//! derives one from an anchor point the way a 3D host document describes it.

use crate::errors::*;

/// A point in 3D, used for model, geographic (lon, lat, elevation) and native
/// coordinates alike.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Point3 { x, y, z }
    }
}

impl From<(f64, f64, f64)> for Point3 {
    fn from((x, y, z): (f64, f64, f64)) -> Self {
        Point3 { x, y, z }
    }
}

impl From<geo_types::Coord<f64>> for Point3 {
    fn from(c: geo_types::Coord<f64>) -> Self {
        Point3 { x: c.x, y: c.y, z: 0.0 }
    }
}

impl From<Point3> for geo_types::Coord<f64> {
    fn from(p: Point3) -> Self {
        geo_types::Coord { x: p.x, y: p.y }
    }
}

/// Row-major 3x4 affine transform: a linear part plus a translation column.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Affine3 {
    rows: [[f64; 4]; 3],
}

impl Affine3 {
    pub const IDENTITY: Affine3 = Affine3 {
        rows: [[1., 0., 0., 0.], [0., 1., 0., 0.], [0., 0., 1., 0.]],
    };

    pub const fn from_rows(rows: [[f64; 4]; 3]) -> Self {
        Affine3 { rows }
    }

    pub fn rows(&self) -> &[[f64; 4]; 3] {
        &self.rows
    }

    pub fn apply(&self, p: Point3) -> Point3 {
        let r = &self.rows;
        Point3 {
            x: r[0][0] * p.x + r[0][1] * p.y + r[0][2] * p.z + r[0][3],
            y: r[1][0] * p.x + r[1][1] * p.y + r[1][2] * p.z + r[1][3],
            z: r[2][0] * p.x + r[2][1] * p.y + r[2][2] * p.z + r[2][3],
        }
    }

    /// Determinant of the linear part.
    pub fn determinant(&self) -> f64 {
        let m = &self.rows;
        m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
            - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
            + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0])
    }

    /// The inverse transform, `None` when the linear part is singular.
    pub fn inverse(&self) -> Option<Affine3> {
        let det = self.determinant();
        if !det.is_normal() {
            return None;
        }
        let m = &self.rows;
        // adjugate / det
        let mut inv = [[0.0; 4]; 3];
        inv[0][0] = (m[1][1] * m[2][2] - m[1][2] * m[2][1]) / det;
        inv[0][1] = (m[0][2] * m[2][1] - m[0][1] * m[2][2]) / det;
        inv[0][2] = (m[0][1] * m[1][2] - m[0][2] * m[1][1]) / det;
        inv[1][0] = (m[1][2] * m[2][0] - m[1][0] * m[2][2]) / det;
        inv[1][1] = (m[0][0] * m[2][2] - m[0][2] * m[2][0]) / det;
        inv[1][2] = (m[0][2] * m[1][0] - m[0][0] * m[1][2]) / det;
        inv[2][0] = (m[1][0] * m[2][1] - m[1][1] * m[2][0]) / det;
        inv[2][1] = (m[0][1] * m[2][0] - m[0][0] * m[2][1]) / det;
        inv[2][2] = (m[0][0] * m[1][1] - m[0][1] * m[1][0]) / det;
        for row in 0..3 {
            inv[row][3] =
                -(inv[row][0] * m[0][3] + inv[row][1] * m[1][3] + inv[row][2] * m[2][3]);
        }
        Some(Affine3 { rows: inv })
    }
}

/// Model space to WGS84 (x = longitude, y = latitude, z = elevation) and back.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ModelTransform {
    to_geographic: Affine3,
    to_local: Affine3,
}

impl ModelTransform {
    /// Wrap a model-to-earth transform.
    ///
    /// Fails with [`ClipError::NonInvertibleTransform`] when the transform has
    /// no inverse.
    pub fn new(to_geographic: Affine3) -> Result<Self> {
        let to_local = to_geographic
            .inverse()
            .ok_or(ClipError::NonInvertibleTransform)?;
        Ok(ModelTransform {
            to_geographic,
            to_local,
        })
    }

    /// Model coordinates are already longitude/latitude/elevation.
    pub fn identity() -> Self {
        ModelTransform {
            to_geographic: Affine3::IDENTITY,
            to_local: Affine3::IDENTITY,
        }
    }

    pub fn from_rows(rows: [[f64; 4]; 3]) -> Result<Self> {
        Self::new(Affine3::from_rows(rows))
    }

    pub fn to_geographic(&self, local: Point3) -> Point3 {
        self.to_geographic.apply(local)
    }

    pub fn to_local(&self, geographic: Point3) -> Point3 {
        self.to_local.apply(geographic)
    }

    pub fn model_to_earth(&self) -> &Affine3 {
        &self.to_geographic
    }
}

const WGS84_SEMI_MAJOR: f64 = 6_378_137.0;
const WGS84_INV_FLATTENING: f64 = 298.257_223_563;

/// Where a model sits on the earth.
///
/// The model base point lands on the anchor and one model unit is
/// `units_to_metres` metres. Model +Y points `north_rotation_deg` degrees
/// clockwise from true north; with zero rotation model +X is east.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct EarthAnchor {
    pub longitude: f64,
    pub latitude: f64,
    pub elevation: f64,
    pub model_base_point: Point3,
    pub units_to_metres: f64,
    pub north_rotation_deg: f64,
}

impl Default for EarthAnchor {
    fn default() -> Self {
        EarthAnchor {
            longitude: 0.0,
            latitude: 0.0,
            elevation: 0.0,
            model_base_point: Point3::default(),
            units_to_metres: 1.0,
            north_rotation_deg: 0.0,
        }
    }
}

impl EarthAnchor {
    /// Linearised model-to-earth transform at the anchor.
    ///
    /// Uses the WGS84 meridional radius `M` and prime vertical radius `N` at the
    /// anchor latitude: one metre north is `1/M` radians of latitude, one metre
    /// east `1/(N cos φ)` radians of longitude.
    pub fn model_transform(&self) -> Result<ModelTransform> {
        if !(-90.0..=90.0).contains(&self.latitude) || self.latitude.abs() == 90.0 {
            return Err(ClipError::BadArgument(format!(
                "anchor latitude {} must lie strictly between the poles",
                self.latitude
            )));
        }
        let phi = self.latitude.to_radians();
        let f = 1.0 / WGS84_INV_FLATTENING;
        let e2 = f * (2.0 - f);
        let w = 1.0 - e2 * phi.sin().powi(2);
        let m = WGS84_SEMI_MAJOR * (1.0 - e2) / w.powf(1.5);
        let n = WGS84_SEMI_MAJOR / w.sqrt();

        let deg_per_metre_north = (1.0 / m).to_degrees();
        let deg_per_metre_east = (1.0 / (n * phi.cos())).to_degrees();

        let (sin_t, cos_t) = self.north_rotation_deg.to_radians().sin_cos();
        let s = self.units_to_metres;
        let b = self.model_base_point;

        // model (dx, dy) -> metres east/north
        // east  =  cos θ · dx + sin θ · dy
        // north = -sin θ · dx + cos θ · dy
        let lon = [
            deg_per_metre_east * s * cos_t,
            deg_per_metre_east * s * sin_t,
            0.0,
        ];
        let lat = [
            -deg_per_metre_north * s * sin_t,
            deg_per_metre_north * s * cos_t,
            0.0,
        ];
        let elev = [0.0, 0.0, s];

        let row = |coeff: [f64; 3], origin: f64| {
            [
                coeff[0],
                coeff[1],
                coeff[2],
                origin - (coeff[0] * b.x + coeff[1] * b.y + coeff[2] * b.z),
            ]
        };
        ModelTransform::from_rows([
            row(lon, self.longitude),
            row(lat, self.latitude),
            row(elev, self.elevation),
        ])
    }
}
