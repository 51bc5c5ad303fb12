//! Pure, target-independent core: data canonicalization, numeric domains,
//! geometry and the reveal animation.

pub mod animation;
pub mod chart;
pub mod errors;
pub mod events;
pub mod logging;
pub mod market_data;
