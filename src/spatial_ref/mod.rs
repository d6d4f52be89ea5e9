//! Spatial reference systems and transforms.
//!
//! Only the parts an import needs: the layer's declared CRS, the WGS84
//! geographic frame, and the transforms between the two.

mod srs;
mod transform;

pub use srs::SpatialRef;
pub use transform::CoordTransform;

#[cfg(test)]
mod tests;
