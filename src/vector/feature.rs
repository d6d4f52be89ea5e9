use std::ffi::c_int;
use std::fmt::{self, Display, Formatter};
use std::marker::PhantomData;

use gdal_sys::OGRFeatureH;

use crate::utils::_string;
use crate::vector::GeometryRef;

/// The text of one attribute of one feature.
///
/// A field that is unset or NULL in the source is kept distinct from one that
/// holds an empty string.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum FieldValue {
    Set(String),
    Unset,
}

impl FieldValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Set(value) => Some(value),
            FieldValue::Unset => None,
        }
    }

    pub fn is_set(&self) -> bool {
        matches!(self, FieldValue::Set(_))
    }
}

/// Unset values render as `null`.
impl Display for FieldValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Set(value) => f.write_str(value),
            FieldValue::Unset => f.write_str("null"),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Set(value.to_string())
    }
}

impl From<Option<String>> for FieldValue {
    fn from(value: Option<String>) -> Self {
        value.map_or(FieldValue::Unset, FieldValue::Set)
    }
}

/// OGR Feature
///
/// Handed out by a layer's read cursor; destroyed on drop.
#[derive(Debug)]
pub struct Feature<'a> {
    c_feature: OGRFeatureH,
    _layer: PhantomData<&'a ()>,
}

impl<'a> Feature<'a> {
    /// # Safety
    /// `c_feature` must be a non-null feature handle the caller owns.
    pub(crate) unsafe fn from_c_feature(c_feature: OGRFeatureH) -> Feature<'a> {
        Feature {
            c_feature,
            _layer: PhantomData,
        }
    }

    /// Returns the wrapped C pointer
    ///
    /// # Safety
    /// This method returns a raw C pointer
    pub unsafe fn c_feature(&self) -> OGRFeatureH {
        self.c_feature
    }

    pub fn fid(&self) -> Option<u64> {
        let rv = unsafe { gdal_sys::OGR_F_GetFID(self.c_feature) };
        if rv < 0 {
            None
        } else {
            Some(rv as u64)
        }
    }

    /// The feature's geometry, `None` for a null shape.
    pub fn geometry(&self) -> Option<GeometryRef<'_>> {
        let c_geom = unsafe { gdal_sys::OGR_F_GetGeometryRef(self.c_feature) };
        if c_geom.is_null() {
            None
        } else {
            Some(unsafe { GeometryRef::from_c_geometry(c_geom) })
        }
    }

    pub fn field_count(&self) -> usize {
        let count = unsafe { gdal_sys::OGR_F_GetFieldCount(self.c_feature) };
        count.max(0) as usize
    }

    /// The value of field `idx` as GDAL formats it for display.
    pub fn field_value(&self, idx: usize) -> FieldValue {
        if idx >= self.field_count() {
            return FieldValue::Unset;
        }
        let idx = idx as c_int;
        let is_set = unsafe { gdal_sys::OGR_F_IsFieldSetAndNotNull(self.c_feature, idx) } != 0;
        if !is_set {
            return FieldValue::Unset;
        }
        let rv = unsafe { gdal_sys::OGR_F_GetFieldAsString(self.c_feature, idx) };
        FieldValue::Set(_string(rv))
    }

    /// Every field value, in field-index order.
    pub fn field_values(&self) -> Vec<FieldValue> {
        (0..self.field_count())
            .map(|idx| self.field_value(idx))
            .collect()
    }
}

impl Drop for Feature<'_> {
    fn drop(&mut self) {
        unsafe {
            gdal_sys::OGR_F_Destroy(self.c_feature);
        }
    }
}
