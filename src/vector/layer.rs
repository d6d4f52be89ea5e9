use std::marker::PhantomData;
use std::mem::MaybeUninit;
use std::ptr::null_mut;

use gdal_sys::{OGREnvelope, OGRErr, OGRLayerH};

use crate::dataset::Dataset;
use crate::errors::*;
use crate::spatial_ref::SpatialRef;
use crate::utils::_string;
use crate::vector::{Defn, Feature, Geometry};

/// Layer in a vector dataset
///
/// ```no_run
/// use shpclip::Dataset;
///
/// let dataset = Dataset::open("fixtures/roads.shp").unwrap();
/// let mut layer = dataset.layer(0).unwrap();
/// for feature in layer.features() {
///     // do something with each feature
/// }
/// ```
#[derive(Debug)]
pub struct Layer<'a> {
    c_layer: OGRLayerH,
    defn: Defn,
    phantom: PhantomData<&'a Dataset>,
}

impl<'a> Layer<'a> {
    /// Creates a new Layer from a GDAL layer pointer
    ///
    /// # Safety
    /// `c_layer` must be a layer owned by `_dataset`.
    pub(crate) unsafe fn from_c_layer(_dataset: &'a Dataset, c_layer: OGRLayerH) -> Layer<'a> {
        let c_defn = gdal_sys::OGR_L_GetLayerDefn(c_layer);
        let defn = Defn::from_c_defn(c_defn);
        Layer {
            c_layer,
            defn,
            phantom: PhantomData,
        }
    }

    /// Returns the wrapped C pointer
    ///
    /// # Safety
    /// This method returns a raw C pointer
    pub unsafe fn c_layer(&self) -> OGRLayerH {
        self.c_layer
    }

    pub fn name(&self) -> String {
        _string(unsafe { gdal_sys::OGR_L_GetName(self.c_layer) })
    }

    pub fn defn(&self) -> &Defn {
        &self.defn
    }

    /// Names of the attribute fields, in field-index order.
    pub fn field_names(&self) -> Vec<String> {
        self.defn.fields().map(|field| field.name()).collect()
    }

    /// Number of features in the layer. Honours the current spatial filter.
    pub fn feature_count(&self) -> u64 {
        let count = unsafe { gdal_sys::OGR_L_GetFeatureCount(self.c_layer, 1) };
        count.max(0) as u64
    }

    /// The layer's bounding box in its native CRS.
    pub fn extent(&self) -> Result<geo_types::Rect<f64>> {
        let mut envelope = MaybeUninit::<OGREnvelope>::uninit();
        let rv = unsafe { gdal_sys::OGR_L_GetExtent(self.c_layer, envelope.as_mut_ptr(), 1) };
        if rv != OGRErr::OGRERR_NONE {
            return Err(ClipError::OgrError {
                err: rv,
                method_name: "OGR_L_GetExtent",
            });
        }
        let envelope = unsafe { envelope.assume_init() };
        Ok(geo_types::Rect::new(
            (envelope.MinX, envelope.MinY),
            (envelope.MaxX, envelope.MaxY),
        ))
    }

    /// The CRS the layer declares, `None` when there is no `.prj`.
    pub fn spatial_ref(&self) -> Option<SpatialRef> {
        let c_obj = unsafe { gdal_sys::OGR_L_GetSpatialRef(self.c_layer) };
        if c_obj.is_null() {
            return None;
        }
        unsafe { SpatialRef::from_c_obj(c_obj) }.ok()
    }

    /// Restrict reads to features intersecting `geometry` (native CRS).
    pub fn set_spatial_filter(&mut self, geometry: &Geometry) {
        unsafe { gdal_sys::OGR_L_SetSpatialFilter(self.c_layer, geometry.c_geometry()) };
    }

    pub fn clear_spatial_filter(&mut self) {
        unsafe { gdal_sys::OGR_L_SetSpatialFilter(self.c_layer, null_mut()) };
    }

    /// Rewind the read cursor to the first feature.
    pub fn reset_reading(&mut self) {
        unsafe { gdal_sys::OGR_L_ResetReading(self.c_layer) };
    }

    /// Next feature from the read cursor.
    pub fn next_feature(&mut self) -> Option<Feature<'_>> {
        let c_feature = unsafe { gdal_sys::OGR_L_GetNextFeature(self.c_layer) };
        if c_feature.is_null() {
            None
        } else {
            Some(unsafe { Feature::from_c_feature(c_feature) })
        }
    }

    /// Iterate over the remaining features of the read cursor.
    ///
    /// The cursor is not rewound; call [`Layer::reset_reading`] first to start
    /// from the beginning.
    pub fn features(&mut self) -> FeatureIterator<'_> {
        FeatureIterator {
            c_layer: self.c_layer,
            phantom: PhantomData,
        }
    }
}

pub struct FeatureIterator<'a> {
    c_layer: OGRLayerH,
    phantom: PhantomData<&'a mut ()>,
}

impl<'a> Iterator for FeatureIterator<'a> {
    type Item = Feature<'a>;

    #[inline]
    fn next(&mut self) -> Option<Feature<'a>> {
        let c_feature = unsafe { gdal_sys::OGR_L_GetNextFeature(self.c_layer) };
        if c_feature.is_null() {
            None
        } else {
            Some(unsafe { Feature::from_c_feature(c_feature) })
        }
    }
}
