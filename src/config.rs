//! GDAL Configuration Functions
//!
//! The shapefile driver reads a handful of runtime options (for example
//! `SHAPE_ENCODING` or `SHAPE_RESTORE_SHX`). Options set by calling functions in
//! this module override options set in environment variables.
//!
//! ```no_run
//! use shpclip::config::*;
//!
//! // Rebuild a missing .shx index on open
//! set_config_option("SHAPE_RESTORE_SHX", "YES").unwrap();
//! assert_eq!(get_config_option("SHAPE_RESTORE_SHX", "").unwrap(), "YES");
//! clear_config_option("SHAPE_RESTORE_SHX").unwrap();
//! ```
//!
//! GDAL reports its own diagnostics through a process-wide error handler.
//! [`route_gdal_errors_to_log`] forwards them into the [`log`] facade.

use std::ffi::{c_char, c_void, CString};
use std::sync::Mutex;

use gdal_sys::{CPLErr, CPLErrorNum, CPLGetErrorHandlerUserData};

use crate::errors::{CplErrType, Result};
use crate::utils::_string;

/// Set a GDAL library configuration option
///
/// Refer to [GDAL `ConfigOptions`](https://gdal.org/user/configoptions.html) for
/// a full list of options.
pub fn set_config_option(key: &str, value: &str) -> Result<()> {
    let c_key = CString::new(key.as_bytes())?;
    let c_val = CString::new(value.as_bytes())?;
    unsafe {
        gdal_sys::CPLSetConfigOption(c_key.as_ptr(), c_val.as_ptr());
    };
    Ok(())
}

/// Get the value of a GDAL library configuration option
///
/// If the config option specified by `key` is not found, `default` is returned.
pub fn get_config_option(key: &str, default: &str) -> Result<String> {
    let c_key = CString::new(key.as_bytes())?;
    let c_default = CString::new(default.as_bytes())?;
    let rv = unsafe { gdal_sys::CPLGetConfigOption(c_key.as_ptr(), c_default.as_ptr()) };
    Ok(_string(rv))
}

/// Clear the value of a GDAL library configuration option
pub fn clear_config_option(key: &str) -> Result<()> {
    let c_key = CString::new(key.as_bytes())?;
    unsafe {
        gdal_sys::CPLSetConfigOption(c_key.as_ptr(), ::std::ptr::null());
    };
    Ok(())
}

type ErrorCallbackType = dyn FnMut(CplErrType, i32, &str) + 'static + Send;
// Double-`Box`ed so GDAL gets a thin, stable pointer to the trait object.
type PinnedErrorCallback = Box<Box<ErrorCallbackType>>;

static ERROR_CALLBACK: Mutex<Option<PinnedErrorCallback>> = Mutex::new(None);

/// Set a custom error handler for GDAL.
///
/// The function must be `Send` and `Sync` since it is potentially called from multiple threads.
pub fn set_error_handler<F>(callback: F)
where
    F: FnMut(CplErrType, i32, &str) + 'static + Send + Sync,
{
    unsafe extern "C" fn error_handler(
        error_type: CPLErr::Type,
        error_num: CPLErrorNum,
        error_msg_ptr: *const c_char,
    ) {
        let error_msg = _string(error_msg_ptr);
        let error_type: CplErrType = error_type.into();

        // reconstruct callback from user data pointer
        let callback_raw = CPLGetErrorHandlerUserData();
        let callback: &mut Box<ErrorCallbackType> = &mut *(callback_raw as *mut Box<_>);

        callback(error_type, error_num, &error_msg);
    }

    let mut callback: PinnedErrorCallback = Box::new(Box::new(callback));
    let callback_ref: &mut Box<ErrorCallbackType> = callback.as_mut();

    let mut callback_lock = match ERROR_CALLBACK.lock() {
        Ok(guard) => guard,
        // poisoning could only occur on `CPLSetErrorHandlerEx` panicking
        Err(poison_error) => poison_error.into_inner(),
    };

    unsafe {
        gdal_sys::CPLSetErrorHandlerEx(Some(error_handler), callback_ref as *mut _ as *mut c_void);
    };

    // keep the callback alive for as long as GDAL holds the pointer
    callback_lock.replace(callback);
}

/// Remove a custom error handler for GDAL.
pub fn remove_error_handler() {
    let mut callback_lock = match ERROR_CALLBACK.lock() {
        Ok(guard) => guard,
        Err(poison_error) => poison_error.into_inner(),
    };

    unsafe {
        gdal_sys::CPLSetErrorHandler(None);
    };

    callback_lock.take();
}

/// Forward every GDAL diagnostic into the `log` facade under the `gdal` target.
pub fn route_gdal_errors_to_log() {
    set_error_handler(|class, number, msg| {
        if let Some(level) = log_level(class) {
            log::log!(target: "gdal", level, "[{number}] {msg}");
        }
    });
}

pub(crate) fn log_level(class: CplErrType) -> Option<log::Level> {
    match class {
        CplErrType::None => None,
        CplErrType::Debug => Some(log::Level::Debug),
        CplErrType::Warning => Some(log::Level::Warn),
        CplErrType::Failure | CplErrType::Fatal => Some(log::Level::Error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_options() {
        // GDAL config is global; keep the scenarios sequential.
        assert!(set_config_option("SHAPE_ENCODING", "UTF-8").is_ok());
        assert_eq!(get_config_option("SHAPE_ENCODING", "").unwrap(), "UTF-8");
        assert_eq!(
            get_config_option("NON_EXISTANT_OPTION", "DEFAULT_VALUE").unwrap(),
            "DEFAULT_VALUE"
        );

        assert!(set_config_option("f\0oo", "valid").is_err());
        assert!(set_config_option("foo", "in\0valid").is_err());

        assert!(clear_config_option("SHAPE_ENCODING").is_ok());
        assert_eq!(
            get_config_option("SHAPE_ENCODING", "DEFAULT").unwrap(),
            "DEFAULT"
        );
    }

    #[test]
    fn cpl_classes_map_to_log_levels() {
        assert_eq!(log_level(CplErrType::None), None);
        assert_eq!(log_level(CplErrType::Debug), Some(log::Level::Debug));
        assert_eq!(log_level(CplErrType::Warning), Some(log::Level::Warn));
        assert_eq!(log_level(CplErrType::Failure), Some(log::Level::Error));
        assert_eq!(log_level(CplErrType::Fatal), Some(log::Level::Error));
    }
}
