use std::ffi::{c_char, CString};
use std::path::{Path, PathBuf};
use std::ptr;
use std::sync::Once;

use gdal_sys::GDALDatasetH;

use crate::errors::*;
use crate::options::DatasetOptions;
use crate::utils::{_last_err_msg, _path_to_c_string};
use crate::vector::Layer;

/// Short name of the GDAL driver used for every dataset this crate opens.
pub const SHAPEFILE_DRIVER: &str = "ESRI Shapefile";

static START: Once = Once::new();

pub fn _register_drivers() {
    START.call_once(|| unsafe {
        gdal_sys::GDALAllRegister();
    });
}

/// A vector dataset opened read-only through GDAL.
///
/// The dataset is closed when the value is dropped; every [`Layer`] borrows it.
#[derive(Debug)]
pub struct Dataset {
    c_dataset: GDALDatasetH,
    path: PathBuf,
}

impl Dataset {
    /// Open an ESRI Shapefile read-only.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Dataset> {
        Self::open_ex(path, DatasetOptions::shapefile())
    }

    pub fn open_ex<P: AsRef<Path>>(path: P, options: DatasetOptions) -> Result<Dataset> {
        let path = path.as_ref();
        _register_drivers();
        let c_filename = _path_to_c_string(path)?;

        // keep the CStrings alive for as long as the pointer arrays are used
        let c_drivers_vec = options
            .allowed_drivers
            .unwrap_or(&[])
            .iter()
            .map(|&s| CString::new(s))
            .collect::<std::result::Result<Vec<CString>, _>>()?;
        let mut c_drivers_ptrs = c_drivers_vec.iter().map(|s| s.as_ptr()).collect::<Vec<_>>();
        c_drivers_ptrs.push(ptr::null());
        let c_drivers_ptr = if options.allowed_drivers.is_some() {
            c_drivers_ptrs.as_ptr()
        } else {
            ptr::null()
        };

        let c_open_options_vec = options
            .open_options
            .unwrap_or(&[])
            .iter()
            .map(|&s| CString::new(s))
            .collect::<std::result::Result<Vec<CString>, _>>()?;
        let mut c_open_options_ptrs = c_open_options_vec
            .iter()
            .map(|s| s.as_ptr())
            .collect::<Vec<_>>();
        c_open_options_ptrs.push(ptr::null());
        let c_open_options_ptr = if options.open_options.is_some() {
            c_open_options_ptrs.as_ptr()
        } else {
            ptr::null()
        };

        let c_dataset = unsafe {
            gdal_sys::GDALOpenEx(
                c_filename.as_ptr(),
                options.open_flags.bits(),
                c_drivers_ptr,
                c_open_options_ptr,
                ptr::null::<*const c_char>(),
            )
        };
        if c_dataset.is_null() {
            return Err(ClipError::DatasetOpen {
                path: path.to_path_buf(),
                msg: _last_err_msg(),
            });
        }
        Ok(Dataset {
            c_dataset,
            path: path.to_path_buf(),
        })
    }

    /// The path the dataset was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn layer_count(&self) -> usize {
        let count = unsafe { gdal_sys::GDALDatasetGetLayerCount(self.c_dataset) };
        count.max(0) as usize
    }

    /// Fetch a layer by index.
    ///
    /// A layer the dataset advertises but cannot hand out is reported as
    /// [`ClipError::LayerFetch`].
    pub fn layer(&self, idx: usize) -> Result<Layer<'_>> {
        let c_layer = unsafe { gdal_sys::GDALDatasetGetLayer(self.c_dataset, idx as i32) };
        if c_layer.is_null() {
            return Err(ClipError::LayerFetch {
                index: idx,
                msg: _last_err_msg(),
            });
        }
        Ok(unsafe { Layer::from_c_layer(self, c_layer) })
    }

    /// Every advertised layer, in index order.
    pub fn layers(&self) -> Result<Vec<Layer<'_>>> {
        (0..self.layer_count()).map(|idx| self.layer(idx)).collect()
    }
}

impl Drop for Dataset {
    fn drop(&mut self) {
        unsafe {
            gdal_sys::GDALClose(self.c_dataset);
        }
    }
}
