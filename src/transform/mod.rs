//! Conditioning transforms applied before filtering.
//!
//! # Example
//!
//! ```
//! use prism_spectral::transform::{condition, Conditioning};
//!
//! let volume = vec![120.0, 180.0, 150.0, 210.0, 170.0];
//! let centered = condition(&volume, Conditioning::Center).unwrap();
//! assert_eq!(centered.len(), volume.len());
//! ```

pub mod condition;

pub use condition::{
    center, condition, detrend, log_detrend, squeeze, validate_samples, Conditioning,
};
