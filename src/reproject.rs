//! Reprojection between a dataset's native CRS and WGS84.

use crate::errors::*;
use crate::mercator::{spherical_mercator_forward, spherical_mercator_inverse};
use crate::model::Point3;
use crate::spatial_ref::{CoordTransform, SpatialRef};

/// Native CRS <-> WGS84 longitude/latitude, x first.
pub trait Reprojector {
    /// Native coordinates to WGS84.
    fn forward(&self, native: Point3) -> Result<Point3>;

    /// WGS84 coordinates to native.
    fn reverse(&self, wgs84: Point3) -> Result<Point3>;

    /// Reproject a whole part at once.
    fn forward_all(&self, native: &[Point3]) -> Result<Vec<Point3>> {
        native.iter().map(|&p| self.forward(p)).collect()
    }
}

/// GDAL/OSR backed reprojection from any CRS GDAL understands.
#[derive(Debug)]
pub struct CrsReprojector {
    native: SpatialRef,
    forward: CoordTransform,
    reverse: CoordTransform,
}

impl CrsReprojector {
    /// Both directions are built once, with longitude/easting first on both
    /// sides.
    pub fn new(native: &SpatialRef) -> Result<Self> {
        let native = native.clone();
        native.set_traditional_axis_order();
        let wgs84 = SpatialRef::wgs84()?;
        wgs84.set_traditional_axis_order();

        let forward = CoordTransform::new(&native, &wgs84)?;
        let reverse = CoordTransform::new(&wgs84, &native)?;
        Ok(CrsReprojector {
            native,
            forward,
            reverse,
        })
    }

    pub fn native(&self) -> &SpatialRef {
        &self.native
    }

    fn transform(trafo: &CoordTransform, points: &[Point3]) -> Result<Vec<Point3>> {
        let mut xs: Vec<f64> = points.iter().map(|p| p.x).collect();
        let mut ys: Vec<f64> = points.iter().map(|p| p.y).collect();
        let mut zs: Vec<f64> = points.iter().map(|p| p.z).collect();
        trafo.transform_coords(&mut xs, &mut ys, &mut zs)?;
        Ok(xs
            .into_iter()
            .zip(ys)
            .zip(zs)
            .map(|((x, y), z)| Point3::new(x, y, z))
            .collect())
    }

    fn transform_one(trafo: &CoordTransform, p: Point3) -> Result<Point3> {
        let mut x = [p.x];
        let mut y = [p.y];
        let mut z = [p.z];
        trafo.transform_coords(&mut x, &mut y, &mut z)?;
        Ok(Point3::new(x[0], y[0], z[0]))
    }
}

impl Reprojector for CrsReprojector {
    fn forward(&self, native: Point3) -> Result<Point3> {
        Self::transform_one(&self.forward, native)
    }

    fn reverse(&self, wgs84: Point3) -> Result<Point3> {
        Self::transform_one(&self.reverse, wgs84)
    }

    fn forward_all(&self, native: &[Point3]) -> Result<Vec<Point3>> {
        Self::transform(&self.forward, native)
    }
}

/// Closed-form EPSG:3857, no GDAL involved. Elevations pass through.
#[derive(Copy, Clone, Debug, Default)]
pub struct WebMercator;

impl Reprojector for WebMercator {
    fn forward(&self, native: Point3) -> Result<Point3> {
        let (lon, lat) = spherical_mercator_inverse(native.x, native.y);
        Ok(Point3::new(lon, lat, native.z))
    }

    fn reverse(&self, wgs84: Point3) -> Result<Point3> {
        let (x, y) = spherical_mercator_forward(wgs84.x, wgs84.y);
        Ok(Point3::new(x, y, wgs84.z))
    }
}

/// Data already in WGS84 longitude/latitude.
#[derive(Copy, Clone, Debug, Default)]
pub struct Wgs84;

impl Reprojector for Wgs84 {
    fn forward(&self, native: Point3) -> Result<Point3> {
        Ok(native)
    }

    fn reverse(&self, wgs84: Point3) -> Result<Point3> {
        Ok(wgs84)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assert_near;

    #[test]
    fn web_mercator_agrees_with_gdal() {
        let gdal = CrsReprojector::new(&SpatialRef::from_epsg(3857).unwrap()).unwrap();
        let native = Point3::new(1_113_194.9, 6_800_125.45, 12.0);

        let ours = WebMercator.forward(native).unwrap();
        let theirs = gdal.forward(native).unwrap();
        assert_near!(Point3, ours, theirs, epsilon = 1e-6);

        let back = gdal.reverse(theirs).unwrap();
        assert_near!(Point3, back, native, epsilon = 1e-3);
    }

    #[test]
    fn gdal_batch_matches_single_points() {
        let utm = CrsReprojector::new(&SpatialRef::from_epsg(32631).unwrap()).unwrap();
        let part = [
            Point3::new(500_000.0, 5_700_000.0, 0.0),
            Point3::new(510_000.0, 5_710_000.0, 3.0),
        ];
        let batch = utm.forward_all(&part).unwrap();
        for (p, b) in part.iter().zip(&batch) {
            assert_near!(Point3, utm.forward(*p).unwrap(), *b, epsilon = 1e-12);
        }
        // central meridian of zone 31 is 3°E
        assert_near!(batch[0].x, 3.0, epsilon = 1e-9);
    }

    #[test]
    fn traditional_axis_order_is_forced() {
        let gdal = CrsReprojector::new(&SpatialRef::wgs84().unwrap()).unwrap();
        let p = Point3::new(5.0, 50.0, 0.0);
        let out = gdal.forward(p).unwrap();
        assert_near!(out.x, 5.0, epsilon = 1e-12);
        assert_near!(out.y, 50.0, epsilon = 1e-12);
        assert_eq!(gdal.native(), &SpatialRef::wgs84().unwrap());
    }

    #[test]
    fn wgs84_is_identity() {
        let p = Point3::new(-3.5, 40.25, 10.0);
        assert_eq!(Wgs84.forward(p).unwrap(), p);
        assert_eq!(Wgs84.reverse(p).unwrap(), p);
        assert_eq!(Wgs84.forward_all(&[p, p]).unwrap(), vec![p, p]);
    }
}
