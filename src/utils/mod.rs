//! Numeric helpers shared by the pipeline stages.

pub mod stats;

pub use stats::{is_constant, linear_fit, mean, LinearFit};
