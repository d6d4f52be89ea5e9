//! Clip-and-collect: filter a layer by boundary boxes and gather every vertex
//! and attribute of the matching features into output trees.
//!
//! ```no_run
//! use shpclip::{clip_and_collect, Boundary, ClipOptions, Dataset, ModelTransform, OgrSource};
//! use shpclip::reproject::CrsReprojector;
//!
//! # fn main() -> shpclip::errors::Result<()> {
//! let dataset = Dataset::open("parcels.shp")?;
//! let mut source = OgrSource::new(&dataset)?;
//! let srs = source.spatial_ref().cloned().expect("parcels.prj");
//! let reprojector = CrsReprojector::new(&srs)?;
//! let boundary = Boundary::from(geo_types::Rect::new((4.88, 52.36), (4.90, 52.38)));
//!
//! let output = clip_and_collect(
//!     &mut source,
//!     &reprojector,
//!     &ModelTransform::identity(),
//!     &[boundary],
//!     &ClipOptions::default(),
//! )?;
//! for (path, points) in output.points.iter() {
//!     println!("{path:?}: {} vertices", points.len());
//! }
//! # Ok(())
//! # }
//! ```

use std::fmt::{self, Display, Formatter};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use geo_types::{LineString, Rect};

use crate::errors::*;
use crate::filter::build_spatial_filter;
use crate::model::{ModelTransform, Point3};
use crate::reproject::Reprojector;
use crate::source::FeatureSource;
use crate::tree::DataTree;
use crate::vector::FieldValue;

/// `(boundary, feature)`
pub type FeaturePath = (usize, usize);
/// `(boundary, feature, part)`
pub type PartPath = (usize, usize, usize);

/// How attribute values are repeated in the field-value tree.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum AttributeMode {
    /// The full field list is appended once per vertex; the branch is
    /// emptied at the first vertex of every part, so it ends up holding one
    /// copy per vertex of the feature's last non-empty part.
    #[default]
    PerVertex,
    /// The field list is appended once per feature, at its first vertex.
    PerFeature,
}

/// Cooperative cancellation, shared with whoever may want to stop a run.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Options for [`clip_and_collect`].
#[derive(Clone, Debug)]
pub struct ClipOptions {
    /// Rewind the read cursor after setting each boundary's filter. Without
    /// it every boundary continues where the previous one stopped.
    pub reset_reading: bool,
    pub attributes: AttributeMode,
    pub cancel: Option<CancelToken>,
}

impl Default for ClipOptions {
    fn default() -> Self {
        ClipOptions {
            reset_reading: true,
            attributes: AttributeMode::default(),
            cancel: None,
        }
    }
}

/// A boundary that was skipped. The run goes on without it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClipWarning {
    BoundaryOutOfBounds { boundary: usize },
    EmptyBoundary { boundary: usize },
}

impl Display for ClipWarning {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ClipWarning::BoundaryOutOfBounds { boundary } => {
                write!(f, "boundary {boundary}: boundary outside dataset bounds")
            }
            ClipWarning::EmptyBoundary { boundary } => {
                write!(f, "boundary {boundary}: boundary has no vertices")
            }
        }
    }
}

/// A clipping curve in model space. Only its bounding box matters.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Boundary {
    points: Vec<Point3>,
}

impl Boundary {
    pub fn new(points: Vec<Point3>) -> Self {
        Boundary { points }
    }

    pub fn points(&self) -> &[Point3] {
        &self.points
    }

    /// Component-wise minimum and maximum, `None` without vertices.
    pub fn bounding_box(&self) -> Option<(Point3, Point3)> {
        let (first, rest) = self.points.split_first()?;
        Some(rest.iter().fold((*first, *first), |(min, max), p| {
            (
                Point3::new(min.x.min(p.x), min.y.min(p.y), min.z.min(p.z)),
                Point3::new(max.x.max(p.x), max.y.max(p.y), max.z.max(p.z)),
            )
        }))
    }
}

impl From<Vec<Point3>> for Boundary {
    fn from(points: Vec<Point3>) -> Self {
        Boundary { points }
    }
}

impl From<&LineString<f64>> for Boundary {
    fn from(line: &LineString<f64>) -> Self {
        Boundary {
            points: line.coords().map(|&c| Point3::from(c)).collect(),
        }
    }
}

impl From<Rect<f64>> for Boundary {
    fn from(rect: Rect<f64>) -> Self {
        Boundary::from(rect.to_polygon().exterior())
    }
}

/// Everything a run collects.
#[derive(Clone, Debug, PartialEq)]
pub struct ClipOutput {
    /// Schema name of the clipped layer.
    pub layer_name: String,
    /// Feature count of every layer of the dataset.
    pub feature_counts: Vec<u64>,
    /// The clipped layer's extent in model space.
    pub extent: Rect<f64>,
    pub spatial_ref_wkt: String,
    pub field_names: Vec<String>,
    pub values: DataTree<FeaturePath, FieldValue>,
    /// Model-space vertices.
    pub points: DataTree<PartPath, Point3>,
    pub warnings: Vec<ClipWarning>,
}

impl ClipOutput {
    /// The field-value tree as text, unset values as `null`.
    pub fn value_strings(&self) -> DataTree<FeaturePath, String> {
        let mut strings = DataTree::new();
        for (path, values) in self.values.iter() {
            strings.extend(*path, values.iter().map(FieldValue::to_string));
        }
        strings
    }
}

fn check_cancelled(options: &ClipOptions) -> Result<()> {
    match &options.cancel {
        Some(token) if token.is_cancelled() => Err(ClipError::Cancelled),
        _ => Ok(()),
    }
}

fn contains(rect: &Rect<f64>, p: Point3) -> bool {
    (rect.min().x..=rect.max().x).contains(&p.x) && (rect.min().y..=rect.max().y).contains(&p.y)
}

/// Native extent corners, through WGS84, into model space.
fn local_extent<R: Reprojector + ?Sized>(
    native: Rect<f64>,
    reprojector: &R,
    model: &ModelTransform,
) -> Result<Rect<f64>> {
    let min = reprojector.forward(Point3::new(native.min().x, native.min().y, 0.0))?;
    let max = reprojector.forward(Point3::new(native.max().x, native.max().y, 0.0))?;
    let min = model.to_local(min);
    let max = model.to_local(max);
    Ok(Rect::new((min.x, min.y), (max.x, max.y)))
}

/// Run every boundary, in order, against `source`.
///
/// Points land under `(boundary, feature, part)` and field values under
/// `(boundary, feature)`, where `feature` counts only the features of that
/// boundary that have a geometry. Boundaries outside the layer's extent are
/// reported in [`ClipOutput::warnings`] and skipped.
pub fn clip_and_collect<S, R>(
    source: &mut S,
    reprojector: &R,
    model: &ModelTransform,
    boundaries: &[Boundary],
    options: &ClipOptions,
) -> Result<ClipOutput>
where
    S: FeatureSource + ?Sized,
    R: Reprojector + ?Sized,
{
    check_cancelled(options)?;

    let feature_counts = source.feature_counts();
    let extent = local_extent(source.extent()?, reprojector, model)?;
    let spatial_ref_wkt = source.spatial_ref_wkt()?;
    let field_names = source.field_names();
    log::debug!(
        "clipping layer '{}' with {} boundaries, model-space extent {:?}",
        source.layer_name(),
        boundaries.len(),
        extent
    );

    let mut values: DataTree<FeaturePath, FieldValue> = DataTree::new();
    let mut points: DataTree<PartPath, Point3> = DataTree::new();
    let mut warnings = Vec::new();

    for (i, boundary) in boundaries.iter().enumerate() {
        check_cancelled(options)?;

        let Some((min, max)) = boundary.bounding_box() else {
            let warning = ClipWarning::EmptyBoundary { boundary: i };
            log::warn!("{warning}");
            warnings.push(warning);
            continue;
        };
        if !contains(&extent, min) || !contains(&extent, max) {
            let warning = ClipWarning::BoundaryOutOfBounds { boundary: i };
            log::warn!("{warning}");
            warnings.push(warning);
            continue;
        }

        let filter = build_spatial_filter(min, max, model, reprojector)?;
        source.set_spatial_filter(&filter)?;
        if options.reset_reading {
            source.reset_reading();
        }

        let mut m = 0;
        while let Some(feature) = source.next_feature()? {
            check_cancelled(options)?;
            let Some(parts) = feature.parts else {
                continue;
            };
            let feature_path = (i, m);

            let mut fields_written = false;
            for (gi, part) in parts.iter().enumerate() {
                let geographic = reprojector.forward_all(part)?;
                for (vi, p) in geographic.into_iter().enumerate() {
                    points.append((i, m, gi), model.to_local(p));
                    match options.attributes {
                        AttributeMode::PerVertex => {
                            if vi == 0 {
                                values.clear_branch(&feature_path);
                            }
                            values.extend(feature_path, feature.values.iter().cloned());
                        }
                        // only once the feature has put a vertex in the point tree
                        AttributeMode::PerFeature if !fields_written => {
                            values.extend(feature_path, feature.values.iter().cloned());
                            fields_written = true;
                        }
                        AttributeMode::PerFeature => {}
                    }
                }
            }
            m += 1;
        }
        log::trace!("boundary {i}: {m} features with geometry");
    }

    Ok(ClipOutput {
        layer_name: source.layer_name(),
        feature_counts,
        extent,
        spatial_ref_wkt,
        field_names,
        values,
        points,
        warnings,
    })
}
