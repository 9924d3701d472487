//! Smoothing strategies for relative rotation graphs.
//!
//! Every strategy has the same shape: `(series, period) -> series` with the
//! input's length, `f64::NAN` marking "no value yet". Pick one with
//! [`SmoothingMethod`] or plug your own in through [`Smoother`].

pub mod methods;
pub mod primitives;


pub use methods::*;
pub use primitives::{ewm, leading_undefined, rolling_mean, rolling_weighted_mean, shift, span_alpha};
pub use rrg_core::SmoothingMethod;
