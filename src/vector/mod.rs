//! OGR vector access: layers, features and geometries of an opened dataset.
//!
//! ## Reading
//!
//! ```no_run
//! use shpclip::Dataset;
//!
//! let dataset = Dataset::open("fixtures/roads.shp").unwrap();
//! let mut layer = dataset.layer(0).unwrap();
//! for feature in layer.features() {
//!     let name = feature.field_value(0);
//!     if let Some(geometry) = feature.geometry() {
//!         println!("{} {}", name, geometry.wkt().unwrap());
//!     }
//! }
//! ```

pub use defn::{Defn, Field, FieldIterator};
pub use feature::{Feature, FieldValue};
pub use gdal_sys::{OGRFieldType, OGRwkbGeometryType};
pub use geometry::{Geometry, GeometryRef};
pub use layer::{FeatureIterator, Layer};

use crate::errors::Result;

/// Convert object to a GDAL geometry.
pub trait ToGdal {
    fn to_gdal(&self) -> Result<Geometry>;
}

mod defn;
mod feature;
mod geo_to_gdal;
mod geometry;
mod layer;
