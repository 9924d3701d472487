//! Shared data model for relative rotation graph computation.
//!
//! Price series in, RS-Ratio/RS-Momentum coordinates out. The smoothing,
//! transform and batch crates all speak these types.

pub mod config;
pub mod error;
pub mod traits;
pub mod types;

pub use config::*;
pub use error::*;
pub use traits::*;
pub use types::*;

/// Centre of both RRG axes.
pub const CENTER: f64 = 100.0;
