use std::ffi::{c_char, CString};
use std::ptr::{self, null_mut};

use gdal_sys::{OGRErr, OGRSpatialReferenceH};

use crate::errors::*;
use crate::utils::{_last_null_pointer_err, _string, _string_and_free};

/// A OpenGIS Spatial Reference System definition.
///
/// Used in geo-referencing raster and vector data, and in coordinate transformations.
///
/// # Notes
/// * See also: [OGR Coordinate Reference Systems and Coordinate Transformation Tutorial](https://gdal.org/tutorials/osr_api_tut.html)
/// * Consult the [OGC WKT Coordinate System Issues](https://gdal.org/tutorials/wktproblems.html)
///   page for implementation details of WKT in OGR.
#[derive(Debug)]
pub struct SpatialRef(OGRSpatialReferenceH);

impl Drop for SpatialRef {
    fn drop(&mut self) {
        unsafe { gdal_sys::OSRRelease(self.0) };
        self.0 = null_mut();
    }
}

impl Clone for SpatialRef {
    fn clone(&self) -> SpatialRef {
        let n_obj = unsafe { gdal_sys::OSRClone(self.0) };
        SpatialRef(n_obj)
    }
}

impl PartialEq for SpatialRef {
    fn eq(&self, other: &SpatialRef) -> bool {
        unsafe { gdal_sys::OSRIsSame(self.0, other.0) == 1 }
    }
}

impl SpatialRef {
    /// The WGS84 geographic frame, the reference every import reprojects through.
    pub fn wgs84() -> Result<SpatialRef> {
        let c_obj = unsafe { gdal_sys::OSRNewSpatialReference(ptr::null()) };
        if c_obj.is_null() {
            return Err(_last_null_pointer_err("OSRNewSpatialReference"));
        }
        let srs = SpatialRef(c_obj);
        let c_name = CString::new("WGS84")?;
        let rv = unsafe { gdal_sys::OSRSetWellKnownGeogCS(srs.0, c_name.as_ptr()) };
        if rv != OGRErr::OGRERR_NONE {
            return Err(ClipError::OgrError {
                err: rv,
                method_name: "OSRSetWellKnownGeogCS",
            });
        }
        Ok(srs)
    }

    /// Set a coordinate system from almost any user-supplied definition:
    /// `EPSG:n`, WKT, PROJ strings, well known names such as `WGS84`.
    ///
    /// See: [`OSRSetFromUserInput`](https://gdal.org/api/ogr_srs_api.html#_CPPv419OSRSetFromUserInputH20OGRSpatialReferenceHPKc)
    pub fn from_definition(definition: &str) -> Result<SpatialRef> {
        let c_obj = unsafe { gdal_sys::OSRNewSpatialReference(ptr::null()) };
        if c_obj.is_null() {
            return Err(_last_null_pointer_err("OSRNewSpatialReference"));
        }
        let srs = SpatialRef(c_obj);
        let c_definition = CString::new(definition)?;
        let rv = unsafe { gdal_sys::OSRSetFromUserInput(srs.0, c_definition.as_ptr()) };
        if rv != OGRErr::OGRERR_NONE {
            return Err(ClipError::OgrError {
                err: rv,
                method_name: "OSRSetFromUserInput",
            });
        }
        Ok(srs)
    }

    pub fn from_wkt(wkt: &str) -> Result<SpatialRef> {
        let c_str = CString::new(wkt)?;
        let c_obj = unsafe { gdal_sys::OSRNewSpatialReference(c_str.as_ptr()) };
        if c_obj.is_null() {
            return Err(_last_null_pointer_err("OSRNewSpatialReference"));
        }
        Ok(SpatialRef(c_obj))
    }

    pub fn from_epsg(epsg_code: u32) -> Result<SpatialRef> {
        let c_obj = unsafe { gdal_sys::OSRNewSpatialReference(ptr::null()) };
        if c_obj.is_null() {
            return Err(_last_null_pointer_err("OSRNewSpatialReference"));
        }
        let srs = SpatialRef(c_obj);
        let rv = unsafe { gdal_sys::OSRImportFromEPSG(srs.0, epsg_code as i32) };
        if rv != OGRErr::OGRERR_NONE {
            return Err(ClipError::OgrError {
                err: rv,
                method_name: "OSRImportFromEPSG",
            });
        }
        Ok(srs)
    }

    /// Returns a wrapped `SpatialRef` from a raw C API handle, taking a copy so
    /// the owner of the handle (usually a layer) keeps its reference.
    ///
    /// # Safety
    /// The handle passed to this function must be valid.
    pub unsafe fn from_c_obj(c_obj: OGRSpatialReferenceH) -> Result<SpatialRef> {
        let mut_c_obj = gdal_sys::OSRClone(c_obj);
        if mut_c_obj.is_null() {
            Err(_last_null_pointer_err("OSRClone"))
        } else {
            Ok(SpatialRef(mut_c_obj))
        }
    }

    pub fn to_wkt(&self) -> Result<String> {
        let mut c_wkt: *mut c_char = ptr::null_mut();
        let rv = unsafe { gdal_sys::OSRExportToWkt(self.0, &mut c_wkt) };
        if rv != OGRErr::OGRERR_NONE {
            Err(ClipError::OgrError {
                err: rv,
                method_name: "OSRExportToWkt",
            })
        } else {
            Ok(_string_and_free(c_wkt))
        }
    }

    /// `AUTH:CODE` of the definition, e.g. `EPSG:4326`, when it carries one.
    pub fn authority(&self) -> Option<String> {
        let c_name = unsafe { gdal_sys::OSRGetAuthorityName(self.0, ptr::null()) };
        let c_code = unsafe { gdal_sys::OSRGetAuthorityCode(self.0, ptr::null()) };
        if c_name.is_null() || c_code.is_null() {
            return None;
        }
        Some(format!("{}:{}", _string(c_name), _string(c_code)))
    }

    pub fn is_geographic(&self) -> bool {
        unsafe { gdal_sys::OSRIsGeographic(self.0) == 1 }
    }

    /// Force longitude/easting-first axis order regardless of what the
    /// authority defines.
    ///
    /// GDAL 3 honours the EPSG axis order (latitude first for EPSG:4326); the
    /// shapefile driver and the whole import pipeline work in x = longitude.
    #[cfg(major_ge_3)]
    pub fn set_traditional_axis_order(&self) {
        unsafe {
            gdal_sys::OSRSetAxisMappingStrategy(
                self.0,
                gdal_sys::OSRAxisMappingStrategy::OAMS_TRADITIONAL_GIS_ORDER,
            );
        }
    }

    #[cfg(not(major_ge_3))]
    pub fn set_traditional_axis_order(&self) {}

    /// Returns a C pointer to the allocated [`gdal_sys::OGRSpatialReferenceH`] memory.
    ///
    /// # Safety
    /// This method returns a raw C pointer
    pub unsafe fn to_c_hsrs(&self) -> OGRSpatialReferenceH {
        self.0
    }
}
