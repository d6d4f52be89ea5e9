use std::ffi::{c_char, CString};
use std::fmt::{self, Debug, Formatter};
use std::marker::PhantomData;
use std::ptr;

use gdal_sys::{OGRErr, OGRGeometryH, OGRwkbGeometryType};

use crate::errors::*;
use crate::model::Point3;
use crate::utils::{_last_null_pointer_err, _string_and_free};

/// OGR Geometry owned by Rust.
///
/// Built on the Rust side (e.g. a spatial filter) and destroyed on drop.
pub struct Geometry {
    c_geometry: OGRGeometryH,
}

impl Geometry {
    /// Create a new, empty geometry of the given type.
    pub fn empty(wkb_type: OGRwkbGeometryType::Type) -> Result<Geometry> {
        let c_geom = unsafe { gdal_sys::OGR_G_CreateGeometry(wkb_type) };
        if c_geom.is_null() {
            return Err(_last_null_pointer_err("OGR_G_CreateGeometry"));
        };
        Ok(Geometry { c_geometry: c_geom })
    }

    /// Create a geometry by parsing a
    /// [WKT](https://en.wikipedia.org/wiki/Well-known_text_representation_of_geometry) string.
    pub fn from_wkt(wkt: &str) -> Result<Geometry> {
        let c_wkt = CString::new(wkt)?;
        // OGR_G_CreateFromWkt only advances the pointer, it never writes through it
        let mut c_wkt_ptr = c_wkt.as_ptr() as *mut c_char;
        let mut c_geom: OGRGeometryH = ptr::null_mut();
        let rv =
            unsafe { gdal_sys::OGR_G_CreateFromWkt(&mut c_wkt_ptr, ptr::null_mut(), &mut c_geom) };
        if rv != OGRErr::OGRERR_NONE {
            return Err(ClipError::OgrError {
                err: rv,
                method_name: "OGR_G_CreateFromWkt",
            });
        }
        Ok(Geometry { c_geometry: c_geom })
    }

    /// Returns the wrapped C pointer
    ///
    /// # Safety
    /// This method returns a raw C pointer
    pub unsafe fn c_geometry(&self) -> OGRGeometryH {
        self.c_geometry
    }

    /// Give up ownership of the handle, e.g. to a parent geometry.
    ///
    /// # Safety
    /// The caller becomes responsible for destroying the returned handle.
    pub unsafe fn into_c_geometry(self) -> OGRGeometryH {
        let c_geometry = self.c_geometry;
        std::mem::forget(self);
        c_geometry
    }

    pub fn add_point_2d(&mut self, (x, y): (f64, f64)) {
        unsafe { gdal_sys::OGR_G_AddPoint_2D(self.c_geometry, x, y) };
    }

    pub fn add_point(&mut self, (x, y, z): (f64, f64, f64)) {
        unsafe { gdal_sys::OGR_G_AddPoint(self.c_geometry, x, y, z) };
    }

    /// Append `sub` as a child (ring of a polygon, member of a collection).
    pub fn add_geometry(&mut self, sub: Geometry) -> Result<()> {
        let rv = unsafe {
            gdal_sys::OGR_G_AddGeometryDirectly(self.c_geometry, sub.into_c_geometry())
        };
        if rv != OGRErr::OGRERR_NONE {
            return Err(ClipError::OgrError {
                err: rv,
                method_name: "OGR_G_AddGeometryDirectly",
            });
        }
        Ok(())
    }

    /// Borrow the geometry with the read-only accessors of [`GeometryRef`].
    pub fn as_geometry_ref(&self) -> GeometryRef<'_> {
        unsafe { GeometryRef::from_c_geometry(self.c_geometry) }
    }

    pub fn wkt(&self) -> Result<String> {
        self.as_geometry_ref().wkt()
    }
}

impl Drop for Geometry {
    fn drop(&mut self) {
        unsafe { gdal_sys::OGR_G_DestroyGeometry(self.c_geometry) };
    }
}

impl Debug for Geometry {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Debug::fmt(&self.as_geometry_ref(), f)
    }
}

/// A geometry owned by GDAL (a feature's geometry or one of its parts).
///
/// Valid for as long as its owner is borrowed.
#[derive(Clone, Copy)]
pub struct GeometryRef<'a> {
    c_geometry: OGRGeometryH,
    _owner: PhantomData<&'a ()>,
}

impl<'a> GeometryRef<'a> {
    /// # Safety
    /// `c_geometry` must be non-null and outlive `'a`.
    pub(crate) unsafe fn from_c_geometry(c_geometry: OGRGeometryH) -> GeometryRef<'a> {
        GeometryRef {
            c_geometry,
            _owner: PhantomData,
        }
    }

    pub fn geometry_type(&self) -> OGRwkbGeometryType::Type {
        unsafe { gdal_sys::OGR_G_GetGeometryType(self.c_geometry) }
    }

    /// Number of direct sub-geometries: rings of a polygon, members of a
    /// multi-geometry, zero for points and line strings.
    pub fn geometry_count(&self) -> usize {
        let cnt = unsafe { gdal_sys::OGR_G_GetGeometryCount(self.c_geometry) };
        cnt.max(0) as usize
    }

    pub fn get_geometry(&self, idx: usize) -> Option<GeometryRef<'a>> {
        let c_geom = unsafe { gdal_sys::OGR_G_GetGeometryRef(self.c_geometry, idx as i32) };
        if c_geom.is_null() {
            None
        } else {
            Some(unsafe { GeometryRef::from_c_geometry(c_geom) })
        }
    }

    pub fn point_count(&self) -> usize {
        let cnt = unsafe { gdal_sys::OGR_G_GetPointCount(self.c_geometry) };
        cnt.max(0) as usize
    }

    /// Returns `(x, y, z)`; `z` is `0.0` for 2D geometries.
    pub fn get_point(&self, index: usize) -> (f64, f64, f64) {
        let mut x: f64 = 0.;
        let mut y: f64 = 0.;
        let mut z: f64 = 0.;
        unsafe { gdal_sys::OGR_G_GetPoint(self.c_geometry, index as i32, &mut x, &mut y, &mut z) };
        (x, y, z)
    }

    pub fn get_point_vec(&self) -> Vec<Point3> {
        (0..self.point_count())
            .map(|i| self.get_point(i).into())
            .collect()
    }

    /// The geometry's parts, each as its vertices in native coordinates.
    ///
    /// Parts are the direct sub-geometries; a geometry without any (a point or
    /// a line string) is its own single part.
    pub fn parts(&self) -> Vec<Vec<Point3>> {
        match self.geometry_count() {
            0 if self.point_count() == 0 => Vec::new(),
            0 => vec![self.get_point_vec()],
            n => (0..n)
                .map(|gi| {
                    self.get_geometry(gi)
                        .map(|part| part.get_point_vec())
                        .unwrap_or_default()
                })
                .collect(),
        }
    }

    pub fn wkt(&self) -> Result<String> {
        let mut c_wkt: *mut c_char = ptr::null_mut();
        let rv = unsafe { gdal_sys::OGR_G_ExportToWkt(self.c_geometry, &mut c_wkt) };
        if rv != OGRErr::OGRERR_NONE {
            return Err(ClipError::OgrError {
                err: rv,
                method_name: "OGR_G_ExportToWkt",
            });
        }
        Ok(_string_and_free(c_wkt))
    }
}

impl Debug for GeometryRef<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.wkt() {
            Ok(wkt) => f.write_str(wkt.as_str()),
            Err(_) => Err(fmt::Error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector::ToGdal;
    use geo_types::polygon;

    #[test]
    fn polygon_parts_are_rings() {
        let poly = geo_types::polygon![
            exterior: [(x: 0., y: 0.), (x: 4., y: 0.), (x: 4., y: 4.), (x: 0., y: 0.)],
            interiors: [[(x: 1., y: 1.), (x: 2., y: 1.), (x: 1., y: 2.), (x: 1., y: 1.)]],
        ];
        let geom = poly.to_gdal().unwrap();
        let parts = geom.as_geometry_ref().parts();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].len(), 4);
        assert_eq!(parts[1][1], Point3::new(2., 1., 0.));
    }

    #[test]
    fn line_string_is_its_own_part() {
        let mut line = Geometry::empty(OGRwkbGeometryType::wkbLineString25D).unwrap();
        line.add_point((1., 2., 3.));
        line.add_point((4., 5., 6.));
        let geom = line.as_geometry_ref();
        assert_eq!(geom.geometry_count(), 0);
        assert_eq!(
            geom.parts(),
            vec![vec![Point3::new(1., 2., 3.), Point3::new(4., 5., 6.)]]
        );
    }

    #[test]
    fn empty_collection_has_no_parts() {
        let multi = Geometry::empty(OGRwkbGeometryType::wkbMultiPolygon).unwrap();
        assert!(multi.as_geometry_ref().parts().is_empty());
    }

    #[test]
    fn multi_polygon_members_are_parts_without_vertices() {
        let multi = Geometry::from_wkt(
            "MULTIPOLYGON (((0 0,0 1,1 1,0 0)),((5 5,5 6,6 6,6 5,5 5)))",
        )
        .unwrap();
        let geom = multi.as_geometry_ref();
        assert_eq!(geom.geometry_count(), 2);
        assert_eq!(geom.get_geometry(1).unwrap().geometry_count(), 1);
        assert_eq!(geom.parts(), vec![Vec::<Point3>::new(), Vec::new()]);
    }

    #[test]
    fn invalid_wkt() {
        assert!(matches!(
            Geometry::from_wkt("POLYGON ((0 0,"),
            Err(ClipError::OgrError { .. })
        ));
    }
}
