//! Relative Rotation Graph computation
//!
//! Aligns each sector with the benchmark, runs the two-stage RS-Ratio /
//! RS-Momentum normalization, and collects a whole sector universe into a
//! [`BatchResult`](rrg_core::BatchResult) where one bad sector never sinks
//! the rest.

pub mod alignment;
pub mod batch;
pub mod cache;
pub mod selection;
pub mod sweep;
pub mod transform;

pub use alignment::{align, check_output, check_overlap, overlap_count};
pub use batch::{BatchOrchestrator, SectorInput};
pub use cache::{CacheKey, RrgCache};
pub use selection::{default_selection, MAIN_SECTORS};
pub use sweep::{sweep, SweepEntry, SweepGrid};
pub use transform::{compute, compute_with, normalize};
