use super::{CoordTransform, SpatialRef};
use crate::assert_near;
use crate::errors::ClipError;
use crate::mercator::spherical_mercator_forward;
use crate::test_utils::SuppressGDALErrorLog;

fn traditional(srs: SpatialRef) -> SpatialRef {
    srs.set_traditional_axis_order();
    srs
}

#[test]
fn wgs84_is_geographic() {
    let wgs84 = SpatialRef::wgs84().unwrap();
    assert!(wgs84.is_geographic());
    assert!(wgs84.to_wkt().unwrap().contains("WGS 84"));
    assert_eq!(wgs84.authority().as_deref(), Some("EPSG:4326"));
}

#[test]
fn definitions_are_equivalent() {
    let wgs84 = SpatialRef::wgs84().unwrap();
    assert_eq!(wgs84, SpatialRef::from_epsg(4326).unwrap());
    assert_eq!(wgs84, SpatialRef::from_definition("EPSG:4326").unwrap());
    assert_eq!(wgs84, SpatialRef::from_wkt(&wgs84.to_wkt().unwrap()).unwrap());
    assert_ne!(wgs84, SpatialRef::from_epsg(3857).unwrap());
}

#[test]
fn bad_definition_is_an_error() {
    let _nolog = SuppressGDALErrorLog::new();
    assert!(SpatialRef::from_definition("not a crs").is_err());
}

#[test]
fn web_mercator_is_projected() {
    let merc = SpatialRef::from_epsg(3857).unwrap();
    assert!(!merc.is_geographic());
    assert_eq!(merc.authority().as_deref(), Some("EPSG:3857"));
    let clone = merc.clone();
    assert_eq!(clone, merc);
}

#[test]
fn transform_wgs84_to_web_mercator() {
    let wgs84 = traditional(SpatialRef::wgs84().unwrap());
    let merc = traditional(SpatialRef::from_epsg(3857).unwrap());
    let trafo = CoordTransform::new(&wgs84, &merc).unwrap();

    let mut xs = [10.0, -73.9857];
    let mut ys = [0.0, 40.7484];
    let mut zs = [5.0, 0.0];
    trafo.transform_coords(&mut xs, &mut ys, &mut zs).unwrap();

    assert_near!(xs[0], 1113194.9079327357, epsilon = 1e-6);
    assert_near!(ys[0], 0.0, epsilon = 1e-6);
    assert_near!(zs[0], 5.0, epsilon = 1e-9);

    // the closed-form projection agrees to well under a millimetre
    let (x, y) = spherical_mercator_forward(-73.9857, 40.7484);
    assert_near!(xs[1], x, epsilon = 1e-2);
    assert_near!(ys[1], y, epsilon = 1e-2);
}

#[test]
fn transform_round_trip() {
    let wgs84 = traditional(SpatialRef::wgs84().unwrap());
    let utm = traditional(SpatialRef::from_epsg(32633).unwrap());
    let forward = CoordTransform::new(&wgs84, &utm).unwrap();
    let reverse = CoordTransform::new(&utm, &wgs84).unwrap();

    let mut xs = [15.0];
    let mut ys = [52.0];
    forward.transform_coords(&mut xs, &mut ys, &mut []).unwrap();
    assert_near!(xs[0], 500000.0, epsilon = 1e-3);
    reverse.transform_coords(&mut xs, &mut ys, &mut []).unwrap();
    assert_near!(xs[0], 15.0, epsilon = 1e-9);
    assert_near!(ys[0], 52.0, epsilon = 1e-9);
}

#[test]
fn failing_transformation() {
    let _nolog = SuppressGDALErrorLog::new();
    let wgs84 = traditional(SpatialRef::wgs84().unwrap());
    let merc = traditional(SpatialRef::from_epsg(3857).unwrap());

    let mut x = [1000000.0];
    let mut y = [1000000.0];

    let trafo = CoordTransform::new(&wgs84, &merc).unwrap();
    let r = trafo.transform_coords(&mut x, &mut y, &mut []);

    match r {
        Err(ClipError::InvalidCoordinateRange { from, to, .. }) => {
            assert_eq!(from, "EPSG:4326");
            assert_eq!(to, "EPSG:3857");
        }
        other => panic!("Wrong result: {other:?}"),
    }
}

#[test]
fn mismatched_slices_are_rejected() {
    let wgs84 = SpatialRef::wgs84().unwrap();
    let trafo = CoordTransform::new(&wgs84, &wgs84).unwrap();
    let r = trafo.transform_coords(&mut [1.0, 2.0], &mut [1.0], &mut []);
    assert!(matches!(r, Err(ClipError::BadArgument(_))));
}
