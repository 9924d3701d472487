use crate::{PriceSeries, Result};

/// Supplier of price series for one batch run (files, a remote fetcher, a test fixture).
///
/// Implementations do their own resampling and timezone handling; the
/// computation never shifts time itself.
pub trait SeriesSource: Send + Sync {
    /// Benchmark series every sector is measured against
    fn benchmark(&self) -> Result<PriceSeries>;

    /// Sector ids available from this source
    fn sector_ids(&self) -> Result<Vec<String>>;

    fn load(&self, sector_id: &str) -> Result<PriceSeries>;
}
