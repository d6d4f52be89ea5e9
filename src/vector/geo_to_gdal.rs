use gdal_sys::OGRwkbGeometryType;

use crate::errors::*;
use crate::vector::{Geometry, ToGdal};

impl ToGdal for geo_types::Point<f64> {
    fn to_gdal(&self) -> Result<Geometry> {
        let mut geom = Geometry::empty(OGRwkbGeometryType::wkbPoint)?;
        geom.add_point_2d(self.x_y());
        Ok(geom)
    }
}

fn geometry_with_points(
    wkb_type: OGRwkbGeometryType::Type,
    points: &geo_types::LineString<f64>,
) -> Result<Geometry> {
    let mut geom = Geometry::empty(wkb_type)?;
    for coord in points.coords() {
        geom.add_point_2d(coord.x_y());
    }
    Ok(geom)
}

impl ToGdal for geo_types::LineString<f64> {
    fn to_gdal(&self) -> Result<Geometry> {
        geometry_with_points(OGRwkbGeometryType::wkbLineString, self)
    }
}

impl ToGdal for geo_types::Polygon<f64> {
    fn to_gdal(&self) -> Result<Geometry> {
        let mut geom = Geometry::empty(OGRwkbGeometryType::wkbPolygon)?;
        geom.add_geometry(geometry_with_points(
            OGRwkbGeometryType::wkbLinearRing,
            self.exterior(),
        )?)?;
        for ring in self.interiors() {
            geom.add_geometry(geometry_with_points(
                OGRwkbGeometryType::wkbLinearRing,
                ring,
            )?)?;
        }
        Ok(geom)
    }
}

impl ToGdal for geo_types::Rect<f64> {
    fn to_gdal(&self) -> Result<Geometry> {
        self.to_polygon().to_gdal()
    }
}
