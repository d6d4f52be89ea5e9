//! Shapefile import: open, reproject and clip in one call.

use std::path::Path;

use crate::config::{clear_config_option, set_config_option};
use crate::dataset::Dataset;
use crate::errors::*;
use crate::model::ModelTransform;
use crate::pipeline::{clip_and_collect, Boundary, ClipOptions, ClipOutput};
use crate::reproject::CrsReprojector;
use crate::source::OgrSource;
use crate::spatial_ref::SpatialRef;

/// Options for [`import_shapefile`].
#[derive(Clone, Debug, Default)]
pub struct ImportOptions<'a> {
    /// CRS definition (anything [`SpatialRef::from_definition`] takes) used
    /// when the shapefile has no `.prj`.
    pub fallback_srs: Option<&'a str>,
    /// GDAL configuration options set for the duration of the import, e.g.
    /// `("SHAPE_ENCODING", "CP1252")`.
    pub gdal_config: &'a [(&'a str, &'a str)],
    pub clip: ClipOptions,
}

/// Restores GDAL configuration options when dropped.
struct ConfigGuard<'a> {
    keys: Vec<&'a str>,
}

impl<'a> ConfigGuard<'a> {
    fn set(options: &[(&'a str, &str)]) -> Result<Self> {
        let mut guard = ConfigGuard { keys: Vec::new() };
        for &(key, value) in options {
            set_config_option(key, value)?;
            guard.keys.push(key);
        }
        Ok(guard)
    }
}

impl Drop for ConfigGuard<'_> {
    fn drop(&mut self) {
        for key in &self.keys {
            if let Err(e) = clear_config_option(key) {
                log::warn!("could not clear GDAL option {key}: {e}");
            }
        }
    }
}

/// Open the shapefile at `path` and clip its first layer to `boundaries`.
///
/// The dataset, its layer and the coordinate transforms live for this call
/// only.
pub fn import_shapefile<P: AsRef<Path>>(
    path: P,
    boundaries: &[Boundary],
    model: &ModelTransform,
    options: &ImportOptions<'_>,
) -> Result<ClipOutput> {
    let path = path.as_ref();
    let _config = ConfigGuard::set(options.gdal_config)?;

    let dataset = Dataset::open(path)?;
    let mut source = OgrSource::new(&dataset)?;
    if let Some(definition) = options.fallback_srs {
        source = source.with_fallback_spatial_ref(SpatialRef::from_definition(definition)?);
    }
    let native = match source.spatial_ref() {
        Some(srs) => srs.clone(),
        None => {
            return Err(ClipError::MissingSpatialRef {
                layer: source.layer().name(),
            })
        }
    };
    log::debug!(
        "importing '{}' from {}",
        path.display(),
        native.authority().as_deref().unwrap_or("an unnamed CRS")
    );
    let reprojector = CrsReprojector::new(&native)?;

    clip_and_collect(&mut source, &reprojector, model, boundaries, &options.clip)
}
