//! Clip ESRI Shapefile features to model-space boundaries, through
//! [GDAL](http://gdal.org/).
//!
//! A shapefile's first layer is reprojected to WGS84, mapped into the local
//! model space of the consuming application, and filtered by the bounding box
//! of each boundary. Every vertex and attribute of the matching features is
//! collected into trees keyed by `(boundary, feature, part)`.
//!
//! ## Use
//!
//! ```no_run
//! use shpclip::{import_shapefile, Boundary, EarthAnchor, ImportOptions, Point3};
//!
//! # fn main() -> shpclip::errors::Result<()> {
//! let model = EarthAnchor {
//!     longitude: 4.8952,
//!     latitude: 52.3702,
//!     ..Default::default()
//! }
//! .model_transform()?;
//! let site = Boundary::new(vec![
//!     Point3::new(-250.0, -250.0, 0.0),
//!     Point3::new(250.0, 250.0, 0.0),
//! ]);
//!
//! let output = import_shapefile("buildings.shp", &[site], &model, &ImportOptions::default())?;
//! for warning in &output.warnings {
//!     eprintln!("{warning}");
//! }
//! for (path, values) in output.value_strings().iter() {
//!     println!("{path:?}: {}", values.join(", "));
//! }
//! # Ok(())
//! # }
//! ```
//!
//! GDAL's own diagnostics can be sent to the [`log`] facade with
//! [`config::route_gdal_errors_to_log`].

pub use dataset::Dataset;
pub use import::{import_shapefile, ImportOptions};
pub use model::{Affine3, EarthAnchor, ModelTransform, Point3};
pub use options::{DatasetOptions, GdalOpenFlags};
pub use pipeline::{
    clip_and_collect, AttributeMode, Boundary, CancelToken, ClipOptions, ClipOutput, ClipWarning,
};
pub use source::{FeatureRecord, FeatureSource, MemorySource, OgrSource};
pub use tree::DataTree;

pub mod config;
mod dataset;
pub mod errors;
pub mod filter;
mod import;
pub mod mercator;
mod model;
mod options;
pub mod pipeline;
pub mod reproject;
mod source;
pub mod spatial_ref;
mod tree;
mod utils;
pub mod vector;

#[cfg(test)]
mod test_utils;
