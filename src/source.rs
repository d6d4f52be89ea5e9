//! Where the pipeline reads features from.
//!
//! [`OgrSource`] reads the first layer of a GDAL dataset; [`MemorySource`]
//! serves features held in memory with the same filtering and cursor rules.

use geo_types::{Polygon, Rect};

use crate::dataset::Dataset;
use crate::errors::*;
use crate::model::Point3;
use crate::spatial_ref::SpatialRef;
use crate::vector::{FieldValue, Layer, ToGdal};

/// The data of one feature, copied out of the reader.
#[derive(Clone, Debug, PartialEq)]
pub struct FeatureRecord {
    /// Vertices of each part in native coordinates, `None` for a null shape.
    pub parts: Option<Vec<Vec<Point3>>>,
    /// One value per schema field, in schema order.
    pub values: Vec<FieldValue>,
}

/// A single vector layer, as the clip pipeline sees it.
pub trait FeatureSource {
    /// Name of the layer's schema.
    fn layer_name(&self) -> String;

    /// Feature count of every layer of the underlying dataset, in layer order.
    fn feature_counts(&self) -> Vec<u64>;

    /// Bounding box of all features, in native coordinates.
    fn extent(&self) -> Result<Rect<f64>>;

    /// WKT of the native spatial reference.
    fn spatial_ref_wkt(&self) -> Result<String>;

    fn field_names(&self) -> Vec<String>;

    /// Restrict subsequent reads to features whose bounding box meets
    /// `filter` (native coordinates).
    fn set_spatial_filter(&mut self, filter: &Polygon<f64>) -> Result<()>;

    /// Rewind the read cursor to the first feature.
    fn reset_reading(&mut self);

    /// The next feature passing the filter, `None` once the cursor is
    /// exhausted.
    fn next_feature(&mut self) -> Result<Option<FeatureRecord>>;
}

/// Layer 0 of an opened dataset.
#[derive(Debug)]
pub struct OgrSource<'a> {
    layer: Layer<'a>,
    feature_counts: Vec<u64>,
    spatial_ref: Option<SpatialRef>,
}

impl<'a> OgrSource<'a> {
    /// Fetches every layer up front to record its feature count; any layer the
    /// dataset advertises but cannot produce fails the whole source.
    pub fn new(dataset: &'a Dataset) -> Result<Self> {
        let layers = dataset.layers()?;
        let feature_counts: Vec<u64> = layers.iter().map(Layer::feature_count).collect();
        let layer = match layers.into_iter().next() {
            Some(layer) => layer,
            None => {
                return Err(ClipError::LayerFetch {
                    index: 0,
                    msg: format!("'{}' has no layers", dataset.path().display()),
                })
            }
        };
        let spatial_ref = layer.spatial_ref();
        log::debug!(
            "opened layer '{}' with {} fields, feature counts {:?}",
            layer.name(),
            layer.defn().field_count(),
            feature_counts
        );
        Ok(OgrSource {
            layer,
            feature_counts,
            spatial_ref,
        })
    }

    /// Use `srs` when the layer declares no spatial reference of its own.
    pub fn with_fallback_spatial_ref(mut self, srs: SpatialRef) -> Self {
        if self.spatial_ref.is_none() {
            self.spatial_ref = Some(srs);
        }
        self
    }

    /// The layer's native spatial reference, after any fallback.
    pub fn spatial_ref(&self) -> Option<&SpatialRef> {
        self.spatial_ref.as_ref()
    }

    pub fn layer(&self) -> &Layer<'a> {
        &self.layer
    }
}

impl FeatureSource for OgrSource<'_> {
    fn layer_name(&self) -> String {
        self.layer.defn().name()
    }

    fn feature_counts(&self) -> Vec<u64> {
        self.feature_counts.clone()
    }

    fn extent(&self) -> Result<Rect<f64>> {
        self.layer.extent()
    }

    fn spatial_ref_wkt(&self) -> Result<String> {
        match &self.spatial_ref {
            Some(srs) => srs.to_wkt(),
            None => Err(ClipError::MissingSpatialRef {
                layer: self.layer.name(),
            }),
        }
    }

    fn field_names(&self) -> Vec<String> {
        self.layer.field_names()
    }

    fn set_spatial_filter(&mut self, filter: &Polygon<f64>) -> Result<()> {
        let geometry = filter.to_gdal()?;
        self.layer.set_spatial_filter(&geometry);
        Ok(())
    }

    fn reset_reading(&mut self) {
        self.layer.reset_reading();
    }

    fn next_feature(&mut self) -> Result<Option<FeatureRecord>> {
        // the OGR feature is dropped as soon as its data is copied out
        Ok(self.layer.next_feature().map(|feature| FeatureRecord {
            parts: feature.geometry().map(|geometry| geometry.parts()),
            values: feature.field_values(),
        }))
    }
}

/// Features held in memory, for data that never lived in a file.
#[derive(Clone, Debug, Default)]
pub struct MemorySource {
    name: String,
    field_names: Vec<String>,
    spatial_ref_wkt: String,
    features: Vec<FeatureRecord>,
    filter: Option<Rect<f64>>,
    cursor: usize,
}

impl MemorySource {
    pub fn new<S: Into<String>>(name: S, field_names: &[&str]) -> Self {
        MemorySource {
            name: name.into(),
            field_names: field_names.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn with_spatial_ref_wkt<S: Into<String>>(mut self, wkt: S) -> Self {
        self.spatial_ref_wkt = wkt.into();
        self
    }

    /// Add a feature; missing trailing values are unset, extra ones dropped.
    pub fn push(&mut self, parts: Option<Vec<Vec<Point3>>>, mut values: Vec<FieldValue>) {
        values.resize(self.field_names.len(), FieldValue::Unset);
        self.features.push(FeatureRecord { parts, values });
    }

    fn bounding_rect(parts: &[Vec<Point3>]) -> Option<Rect<f64>> {
        let mut points = parts.iter().flatten();
        let first = points.next()?;
        let (mut min, mut max) = ((first.x, first.y), (first.x, first.y));
        for p in points {
            min = (min.0.min(p.x), min.1.min(p.y));
            max = (max.0.max(p.x), max.1.max(p.y));
        }
        Some(Rect::new(min, max))
    }

    fn passes_filter(&self, feature: &FeatureRecord) -> bool {
        let Some(filter) = &self.filter else {
            return true;
        };
        match feature.parts.as_deref().and_then(Self::bounding_rect) {
            Some(bbox) => {
                bbox.min().x <= filter.max().x
                    && bbox.max().x >= filter.min().x
                    && bbox.min().y <= filter.max().y
                    && bbox.max().y >= filter.min().y
            }
            // a filtered read never returns shapeless features
            None => false,
        }
    }
}

impl FeatureSource for MemorySource {
    fn layer_name(&self) -> String {
        self.name.clone()
    }

    fn feature_counts(&self) -> Vec<u64> {
        vec![self.features.len() as u64]
    }

    fn extent(&self) -> Result<Rect<f64>> {
        let parts: Vec<Vec<Point3>> = self
            .features
            .iter()
            .filter_map(|f| f.parts.as_ref())
            .flatten()
            .cloned()
            .collect();
        Self::bounding_rect(&parts).ok_or_else(|| {
            ClipError::BadArgument(format!("layer '{}' has no vertices", self.name))
        })
    }

    fn spatial_ref_wkt(&self) -> Result<String> {
        Ok(self.spatial_ref_wkt.clone())
    }

    fn field_names(&self) -> Vec<String> {
        self.field_names.clone()
    }

    fn set_spatial_filter(&mut self, filter: &Polygon<f64>) -> Result<()> {
        let ring: Vec<Vec<Point3>> = vec![filter
            .exterior()
            .coords()
            .map(|&c| Point3::from(c))
            .collect()];
        self.filter = Self::bounding_rect(&ring);
        Ok(())
    }

    fn reset_reading(&mut self) {
        self.cursor = 0;
    }

    fn next_feature(&mut self) -> Result<Option<FeatureRecord>> {
        while let Some(feature) = self.features.get(self.cursor) {
            self.cursor += 1;
            if self.passes_filter(feature) {
                return Ok(Some(feature.clone()));
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::square_fixture;

    fn rect_filter(min: (f64, f64), max: (f64, f64)) -> Polygon<f64> {
        Rect::new(min, max).to_polygon()
    }

    #[test]
    fn ogr_source_reads_layer_zero() {
        let fixture = square_fixture();
        let ds = Dataset::open(fixture.path()).unwrap();
        let mut source = OgrSource::new(&ds).unwrap();

        assert_eq!(source.layer_name(), "squares");
        assert_eq!(source.feature_counts(), vec![3]);
        assert_eq!(source.field_names(), vec!["NAME", "KIND"]);
        assert_eq!(source.extent().unwrap(), Rect::new((0., 0.), (11., 11.)));
        assert!(source.spatial_ref().unwrap().is_geographic());
        assert!(source.spatial_ref_wkt().unwrap().contains("WGS"));

        let first = source.next_feature().unwrap().unwrap();
        assert_eq!(first.parts.as_ref().map(|p| p[0].len()), Some(4));
        assert_eq!(first.values, vec![FieldValue::from("alpha"), "triangle".into()]);

        let second = source.next_feature().unwrap().unwrap();
        assert_eq!(second.parts, None);
        assert_eq!(second.values[0], "beta".into());
    }

    #[test]
    fn ogr_filter_and_cursor() {
        let fixture = square_fixture();
        let ds = Dataset::open(fixture.path()).unwrap();
        let mut source = OgrSource::new(&ds).unwrap();

        source
            .set_spatial_filter(&rect_filter((9., 9.), (12., 12.)))
            .unwrap();
        source.reset_reading();
        let hit = source.next_feature().unwrap().unwrap();
        assert_eq!(hit.values[0], "gamma".into());
        assert!(source.next_feature().unwrap().is_none());
        // exhausted until rewound
        assert!(source.next_feature().unwrap().is_none());
        source.reset_reading();
        assert!(source.next_feature().unwrap().is_some());
    }

    #[test]
    fn missing_spatial_ref_uses_fallback() {
        let fixture = crate::test_utils::TempFixture::empty("bare.shp");
        crate::test_utils::write_shapefile(
            fixture.path(),
            &["ID"],
            &[crate::test_utils::FixtureRecord {
                wkt: Some("POLYGON ((0 0,0 1,1 1,0 0))"),
                values: vec!["1"],
            }],
            None,
        );
        let ds = Dataset::open(fixture.path()).unwrap();
        let source = OgrSource::new(&ds).unwrap();
        assert!(matches!(
            source.spatial_ref_wkt(),
            Err(ClipError::MissingSpatialRef { .. })
        ));

        let source = source.with_fallback_spatial_ref(SpatialRef::from_epsg(3857).unwrap());
        assert_eq!(
            source.spatial_ref().and_then(SpatialRef::authority).as_deref(),
            Some("EPSG:3857")
        );
    }

    #[test]
    fn memory_source_filters_on_bounding_boxes() {
        let mut source = MemorySource::new("mem", &["A", "B"]);
        source.push(
            Some(vec![vec![Point3::new(0., 0., 0.), Point3::new(2., 2., 0.)]]),
            vec!["near".into()],
        );
        source.push(None, vec!["shapeless".into(), "x".into(), "dropped".into()]);
        source.push(
            Some(vec![vec![Point3::new(50., 50., 0.)]]),
            vec!["far".into(), "y".into()],
        );

        assert_eq!(source.extent().unwrap(), Rect::new((0., 0.), (50., 50.)));

        // no filter: everything, shapeless included
        let mut all = Vec::new();
        while let Some(f) = source.next_feature().unwrap() {
            all.push(f);
        }
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].values, vec![FieldValue::from("near"), FieldValue::Unset]);
        assert_eq!(all[1].values.len(), 2);

        source
            .set_spatial_filter(&rect_filter((1., 1.), (3., 3.)))
            .unwrap();
        source.reset_reading();
        let hit = source.next_feature().unwrap().unwrap();
        assert_eq!(hit.values[0], "near".into());
        assert!(source.next_feature().unwrap().is_none());
    }

    #[test]
    fn empty_memory_source_has_no_extent() {
        let source = MemorySource::new("empty", &[]);
        assert!(source.extent().is_err());
        assert_eq!(source.feature_counts(), vec![0]);
    }
}
