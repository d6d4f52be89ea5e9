use std::ffi::c_int;

use gdal_sys::{OGRFeatureDefnH, OGRFieldDefnH, OGRFieldType, OGRwkbGeometryType};

use crate::utils::_string;

/// Layer definition
///
/// The attribute schema shared by every feature of a layer.
#[derive(Debug)]
pub struct Defn {
    c_defn: OGRFeatureDefnH,
}

impl Defn {
    /// Creates a new Defn by wrapping a C pointer
    ///
    /// # Safety
    /// `c_defn` must be owned by a layer that outlives the returned value.
    pub unsafe fn from_c_defn(c_defn: OGRFeatureDefnH) -> Defn {
        Defn { c_defn }
    }

    /// Returns the wrapped C pointer
    ///
    /// # Safety
    /// This method returns a raw C pointer
    pub unsafe fn c_defn(&self) -> OGRFeatureDefnH {
        self.c_defn
    }

    pub fn name(&self) -> String {
        _string(unsafe { gdal_sys::OGR_FD_GetName(self.c_defn) })
    }

    pub fn field_count(&self) -> usize {
        let total = unsafe { gdal_sys::OGR_FD_GetFieldCount(self.c_defn) };
        total.max(0) as usize
    }

    /// Iterate over the field schema of this layer, in field-index order.
    pub fn fields(&self) -> FieldIterator<'_> {
        FieldIterator {
            defn: self,
            next_id: 0,
            total: self.field_count(),
        }
    }

    /// Get the geometry type of the first geometry field
    pub fn geometry_type(&self) -> OGRwkbGeometryType::Type {
        unsafe { gdal_sys::OGR_FD_GetGeomType(self.c_defn) }
    }
}

pub struct FieldIterator<'a> {
    defn: &'a Defn,
    next_id: usize,
    total: usize,
}

impl<'a> Iterator for FieldIterator<'a> {
    type Item = Field<'a>;

    #[inline]
    fn next(&mut self) -> Option<Field<'a>> {
        if self.next_id == self.total {
            return None;
        }
        let field = Field {
            _defn: self.defn,
            c_field_defn: unsafe {
                gdal_sys::OGR_FD_GetFieldDefn(self.defn.c_defn, self.next_id as c_int)
            },
        };
        self.next_id += 1;
        Some(field)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.total - self.next_id;
        (left, Some(left))
    }
}

pub struct Field<'a> {
    _defn: &'a Defn,
    c_field_defn: OGRFieldDefnH,
}

impl Field<'_> {
    /// Get the name of this field.
    pub fn name(&self) -> String {
        let rv = unsafe { gdal_sys::OGR_Fld_GetNameRef(self.c_field_defn) };
        _string(rv)
    }

    /// Get the data type of this field.
    pub fn field_type(&self) -> OGRFieldType::Type {
        unsafe { gdal_sys::OGR_Fld_GetType(self.c_field_defn) }
    }

    /// Get the formatting width for this field.
    ///
    /// Zero means no specified width.
    pub fn width(&self) -> i32 {
        unsafe { gdal_sys::OGR_Fld_GetWidth(self.c_field_defn) }
    }
}
