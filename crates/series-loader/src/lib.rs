//! Price series from CSV files on disk.
//!
//! Each file holds one instrument with at least a `datetime` and a `close`
//! column. Loading applies the interval's sampling rules (weekly bars close on
//! Friday, hourly bars are moved to exchange-local time) so the computation
//! crates never touch calendars or timezones.

pub mod csv_reader;
pub mod resample;
pub mod source;

pub use csv_reader::{parse_datetime, parse_price_csv};
pub use resample::{resample, week_ending_friday, HOURLY_OFFSET_HOURS};
pub use source::{load_csv, CsvDirectorySource, DEFAULT_BENCHMARK};
