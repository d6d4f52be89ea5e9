//! Spatial filter rectangles for boundaries, in the layer's native CRS.

use geo_types::{Coord, LineString, Polygon};

use crate::errors::*;
use crate::model::{ModelTransform, Point3};
use crate::reproject::Reprojector;

/// Turn a boundary's model-space bounding box into the rectangle the dataset
/// is filtered with, in the dataset's native CRS.
///
/// The ring is closed and has five vertices:
/// `(minx miny, minx maxy, maxx maxy, maxx miny, minx miny)`.
pub fn build_spatial_filter<R: Reprojector + ?Sized>(
    min: Point3,
    max: Point3,
    model: &ModelTransform,
    reprojector: &R,
) -> Result<Polygon<f64>> {
    let min = reprojector.reverse(model.to_geographic(min))?;
    let max = reprojector.reverse(model.to_geographic(max))?;
    Ok(rectangle(min, max))
}

fn rectangle(min: Point3, max: Point3) -> Polygon<f64> {
    let ring = LineString::new(vec![
        Coord { x: min.x, y: min.y },
        Coord { x: min.x, y: max.y },
        Coord { x: max.x, y: max.y },
        Coord { x: max.x, y: min.y },
        Coord { x: min.x, y: min.y },
    ]);
    Polygon::new(ring, vec![])
}
