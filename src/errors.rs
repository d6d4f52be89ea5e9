use std::ffi::NulError;
use std::path::PathBuf;
use std::str::Utf8Error;

use gdal_sys::{CPLErr, OGRErr};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ClipError>;

#[derive(Clone, Debug, Error)]
pub enum ClipError {
    #[error("FfiNulError")]
    FfiNulError(#[from] NulError),
    #[error("StrUtf8Error")]
    StrUtf8Error(#[from] Utf8Error),
    #[error("CPL error class: '{class:?}', error number: '{number}', error msg: '{msg}'")]
    CplError {
        class: CplErrType,
        number: i32,
        msg: String,
    },
    #[error("GDAL method '{method_name}' returned a NULL pointer. Error msg: '{msg}'")]
    NullPointer {
        method_name: &'static str,
        msg: String,
    },
    #[error("OGR method '{method_name}' returned error: '{err:?}'")]
    OgrError {
        err: OGRErr::Type,
        method_name: &'static str,
    },
    #[error("Bad argument: {0}")]
    BadArgument(String),
    #[error("Unable to transform coordinates from {from} to {to}{}", .msg.as_ref().map(|m| format!(": {m}")).unwrap_or_default())]
    InvalidCoordinateRange {
        from: String,
        to: String,
        msg: Option<String>,
    },

    #[error("Unable to open '{path}' as an ESRI Shapefile: {msg}")]
    DatasetOpen { path: PathBuf, msg: String },
    #[error("Couldn't fetch advertised layer {index}: {msg}")]
    LayerFetch { index: usize, msg: String },
    #[error("Layer '{layer}' declares no spatial reference and no fallback was configured")]
    MissingSpatialRef { layer: String },
    #[error("The model-to-earth transform is not invertible")]
    NonInvertibleTransform,
    #[error("The import was cancelled")]
    Cancelled,
}

/// A wrapper for [`CPLErr::Type`] that reflects it as an enum
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(C)]
pub enum CplErrType {
    None = 0,
    Debug = 1,
    Warning = 2,
    Failure = 3,
    Fatal = 4,
}

impl From<CPLErr::Type> for CplErrType {
    fn from(error_type: CPLErr::Type) -> Self {
        match error_type {
            CPLErr::CE_Debug => Self::Debug,
            CPLErr::CE_Warning => Self::Warning,
            CPLErr::CE_Failure => Self::Failure,
            CPLErr::CE_Fatal => Self::Fatal,
            // CE_None and anything GDAL adds later
            _ => Self::None,
        }
    }
}
