use std::ffi::{c_char, c_void, CStr, CString};
use std::path::Path;

use gdal_sys::CPLErr;

use crate::errors::*;

pub fn _string(raw_ptr: *const c_char) -> String {
    if raw_ptr.is_null() {
        return String::new();
    }
    let c_str = unsafe { CStr::from_ptr(raw_ptr) };
    c_str.to_string_lossy().into_owned()
}

/// Copies a GDAL-owned string and releases it with `VSIFree`.
pub fn _string_and_free(raw_ptr: *mut c_char) -> String {
    let rv = _string(raw_ptr);
    unsafe { gdal_sys::VSIFree(raw_ptr as *mut c_void) };
    rv
}

pub fn _last_cpl_err(cpl_err_class: CPLErr::Type) -> ClipError {
    let last_err_no = unsafe { gdal_sys::CPLGetLastErrorNo() };
    let last_err_msg = _string(unsafe { gdal_sys::CPLGetLastErrorMsg() });
    unsafe { gdal_sys::CPLErrorReset() };
    ClipError::CplError {
        class: cpl_err_class.into(),
        number: last_err_no,
        msg: last_err_msg,
    }
}

pub fn _last_null_pointer_err(method_name: &'static str) -> ClipError {
    let last_err_msg = _last_err_msg();
    ClipError::NullPointer {
        method_name,
        msg: last_err_msg,
    }
}

/// Takes the pending CPL error message, leaving GDAL's error state clean.
pub fn _last_err_msg() -> String {
    let last_err_msg = _string(unsafe { gdal_sys::CPLGetLastErrorMsg() });
    unsafe { gdal_sys::CPLErrorReset() };
    last_err_msg
}

pub fn _path_to_c_string(path: &Path) -> Result<CString> {
    let path_str = path.to_string_lossy();
    CString::new(path_str.as_ref()).map_err(Into::into)
}
