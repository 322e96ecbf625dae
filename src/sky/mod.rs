//! Sky inputs: pixel masks, active-pixel sets and pixel geometry.
//!
//! Everything here is tagged with a [`PixelOrdering`](crate::PixelOrdering);
//! conversions between masks, coordinate tables and unit vectors refuse to mix
//! ring and nested numbering.

mod geometry;
mod mask;

pub use geometry::{lonlat_to_vec, PixelCoordinates, UnitVectorArray};
pub use mask::{PixelSet, SkyMask};
