use std::ffi::{c_void, CString};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::ptr;

use gdal_sys::{OGRErr, OGRFieldType, OGRwkbGeometryType};

use crate::spatial_ref::SpatialRef;
use crate::utils::_last_err_msg;
use crate::vector::Geometry;

/// A struct that contains a temporary directory and a path to a file in that directory.
pub struct TempFixture {
    _temp_dir: tempfile::TempDir,
    temp_path: PathBuf,
}

impl TempFixture {
    /// Creates a temporary directory and path to a non-existent file with given `name`.
    ///
    /// Returns the struct `TempFixture` that contains the temp dir (for clean-up on `drop`)
    /// as well as the empty file path.
    pub fn empty(name: &str) -> Self {
        let _temp_dir = tempfile::tempdir().unwrap();
        let temp_path = _temp_dir.path().join(name);
        Self {
            _temp_dir,
            temp_path,
        }
    }

    pub fn path(&self) -> &Path {
        &self.temp_path
    }
}

impl AsRef<Path> for TempFixture {
    fn as_ref(&self) -> &Path {
        self.path()
    }
}

/// Scoped value for temporarily suppressing thread-local GDAL log messages.
///
/// Useful for tests that expect GDAL errors and want to keep the output log clean
/// of distracting yet expected error messages.
pub(crate) struct SuppressGDALErrorLog {
    // Make !Sync and !Send, and force use of `new`.
    _private: PhantomData<*mut c_void>,
}

impl SuppressGDALErrorLog {
    pub(crate) fn new() -> Self {
        unsafe { gdal_sys::CPLPushErrorHandler(Some(gdal_sys::CPLQuietErrorHandler)) };
        SuppressGDALErrorLog {
            _private: PhantomData,
        }
    }
}

impl Drop for SuppressGDALErrorLog {
    fn drop(&mut self) {
        unsafe { gdal_sys::CPLPopErrorHandler() };
    }
}

/// One feature of a shapefile fixture.
pub(crate) struct FixtureRecord<'a> {
    /// Geometry as WKT, `None` for a null shape.
    pub wkt: Option<&'a str>,
    pub values: Vec<&'a str>,
}

/// Width of every character field the fixtures create.
pub(crate) const FIXTURE_FIELD_WIDTH: i32 = 16;

/// Writes a polygon shapefile at `shp_path` through GDAL's `ESRI Shapefile`
/// driver, with one character field per name and a `.prj` when `srs` is given.
pub(crate) fn write_shapefile(
    shp_path: &Path,
    field_names: &[&str],
    records: &[FixtureRecord<'_>],
    srs: Option<&SpatialRef>,
) {
    crate::dataset::_register_drivers();
    let c_driver_name = CString::new(crate::dataset::SHAPEFILE_DRIVER).unwrap();
    let c_path = CString::new(shp_path.to_str().unwrap()).unwrap();
    let c_layer_name = CString::new(shp_path.file_stem().unwrap().to_str().unwrap()).unwrap();

    unsafe {
        let c_driver = gdal_sys::GDALGetDriverByName(c_driver_name.as_ptr());
        assert!(!c_driver.is_null(), "no shapefile driver");
        let c_dataset = gdal_sys::GDALCreate(
            c_driver,
            c_path.as_ptr(),
            0,
            0,
            0,
            gdal_sys::GDALDataType::GDT_Unknown,
            ptr::null_mut(),
        );
        assert!(!c_dataset.is_null(), "{}", _last_err_msg());

        let c_srs = srs.map_or(ptr::null_mut(), |srs| srs.to_c_hsrs());
        let c_layer = gdal_sys::GDALDatasetCreateLayer(
            c_dataset,
            c_layer_name.as_ptr(),
            c_srs,
            OGRwkbGeometryType::wkbPolygon,
            ptr::null_mut(),
        );
        assert!(!c_layer.is_null(), "{}", _last_err_msg());

        for name in field_names {
            let c_name = CString::new(*name).unwrap();
            let c_field = gdal_sys::OGR_Fld_Create(c_name.as_ptr(), OGRFieldType::OFTString);
            gdal_sys::OGR_Fld_SetWidth(c_field, FIXTURE_FIELD_WIDTH);
            let rv = gdal_sys::OGR_L_CreateField(c_layer, c_field, 1);
            gdal_sys::OGR_Fld_Destroy(c_field);
            assert_eq!(rv, OGRErr::OGRERR_NONE);
        }

        for record in records {
            let c_feature = gdal_sys::OGR_F_Create(gdal_sys::OGR_L_GetLayerDefn(c_layer));
            for (idx, value) in record.values.iter().enumerate() {
                let c_value = CString::new(*value).unwrap();
                gdal_sys::OGR_F_SetFieldString(c_feature, idx as i32, c_value.as_ptr());
            }
            if let Some(wkt) = record.wkt {
                let geometry = Geometry::from_wkt(wkt).unwrap();
                // the feature takes a copy
                let rv = gdal_sys::OGR_F_SetGeometry(c_feature, geometry.c_geometry());
                assert_eq!(rv, OGRErr::OGRERR_NONE);
            }
            let rv = gdal_sys::OGR_L_CreateFeature(c_layer, c_feature);
            gdal_sys::OGR_F_Destroy(c_feature);
            assert_eq!(rv, OGRErr::OGRERR_NONE, "{}", _last_err_msg());
        }

        gdal_sys::GDALClose(c_dataset);
    }
}

/// `squares.shp` in WGS84 with fields `NAME` and `KIND`:
///
/// 0. a triangle ring of 4 vertices over `(0, 0)..(1, 1)`
/// 1. a null shape
/// 2. a square ring of 5 vertices over `(10, 10)..(11, 11)`
pub(crate) fn square_fixture() -> TempFixture {
    let fixture = TempFixture::empty("squares.shp");
    write_shapefile(
        fixture.path(),
        &["NAME", "KIND"],
        &[
            // rings clockwise, as shapefiles store outer rings
            FixtureRecord {
                wkt: Some("POLYGON ((0 0,0 1,1 1,0 0))"),
                values: vec!["alpha", "triangle"],
            },
            FixtureRecord {
                wkt: None,
                values: vec!["beta", "empty"],
            },
            FixtureRecord {
                wkt: Some("POLYGON ((10 10,10 11,11 11,11 10,10 10))"),
                values: vec!["gamma", "square"],
            },
        ],
        Some(&SpatialRef::wgs84().unwrap()),
    );
    fixture
}

/// Assert numerical difference between two expressions is less than
/// 64-bit machine epsilon or a specified epsilon.
///
/// # Examples:
/// ```rust, ignore
/// use std::f64::consts::{PI, E};
/// assert_near!(PI / E, 1.1557273497909217);
/// // with specified epsilon
/// assert_near!(PI / E, 1.15572734, epsilon = 1e-8);
/// ```
#[macro_export]
macro_rules! assert_near {
    ($left:expr, $right:expr) => {
        $crate::assert_near!($left, $right, epsilon = f64::EPSILON)
    };
    ($left:expr, $right:expr, epsilon = $ep:expr) => {
        assert!(
            ($left - $right).abs() < $ep,
            "|{} - {}| = {} is greater than epsilon {:.4e}",
            $left,
            $right,
            ($left - $right).abs(),
            $ep
        )
    };
    ($left:expr, $right:expr, epsilon = $ep:expr, field = $field:expr) => {
        assert!(
            ($left - $right).abs() < $ep,
            "field {}: |{} - {}| = {} is greater than epsilon {:.4e}",
            $field,
            $left,
            $right,
            ($left - $right).abs(),
            $ep
        )
    };
    // Pseudo-specialization
    (Point3, $left:expr, $right:expr, epsilon = $ep:expr) => {
        $crate::assert_near!($left.x, $right.x, epsilon = $ep, field = "x");
        $crate::assert_near!($left.y, $right.y, epsilon = $ep, field = "y");
        $crate::assert_near!($left.z, $right.z, epsilon = $ep, field = "z");
    };
}
