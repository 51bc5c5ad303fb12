//! Chart aggregate: pixel domains, scales, drawable geometry and variant styling.

pub mod geometry;
pub mod scales;
pub mod value_objects;

pub use geometry::{CandleDirection, Primitive, Segment, revealed_len, to_primitives};
pub use scales::{ChartDomain, LinearScale, ScaleComputation, ScaleSet, compute_domain, compute_scales};
pub use value_objects::{ChartVariant, Color, Dimensions, VariantColors, VariantStyle};
