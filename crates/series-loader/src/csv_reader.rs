use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rrg_core::{PriceSeries, Result, RrgError};
use std::io::Read;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parse a timestamp cell. Naive values are taken as UTC.
pub fn parse_datetime(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%:z") {
        return Some(dt.with_timezone(&Utc));
    }
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Some(dt.and_utc());
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

/// Read a price CSV for `symbol`.
///
/// Columns are found by header name (`datetime` or `date`, and `close`);
/// anything else is ignored. Rows are sorted by time, rows without a close
/// are dropped, and for a repeated timestamp the last row wins.
pub fn parse_price_csv<R: Read>(reader: R, symbol: &str) -> Result<PriceSeries> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| RrgError::source(symbol, format!("unreadable header: {}", e)))?
        .clone();
    let column = |names: &[&str]| {
        headers
            .iter()
            .position(|h| names.iter().any(|n| h.eq_ignore_ascii_case(n)))
    };
    let time_col = column(&["datetime", "date"])
        .ok_or_else(|| RrgError::source(symbol, "missing datetime column"))?;
    let close_col =
        column(&["close"]).ok_or_else(|| RrgError::source(symbol, "missing close column"))?;

    let mut rows: Vec<(DateTime<Utc>, f64)> = Vec::new();
    let mut dropped = 0usize;

    for (i, record) in reader.records().enumerate() {
        // header is line 1
        let line = i + 2;
        let record = record.map_err(|e| RrgError::source(symbol, format!("line {}: {}", line, e)))?;

        let raw_time = record.get(time_col).unwrap_or("");
        let timestamp = parse_datetime(raw_time).ok_or_else(|| {
            RrgError::source(symbol, format!("line {}: bad datetime '{}'", line, raw_time))
        })?;

        let raw_close = record.get(close_col).unwrap_or("");
        if raw_close.is_empty() || raw_close.eq_ignore_ascii_case("nan") {
            dropped += 1;
            continue;
        }
        let close: f64 = raw_close.parse().map_err(|_| {
            RrgError::source(symbol, format!("line {}: bad close '{}'", line, raw_close))
        })?;
        if close.is_nan() {
            dropped += 1;
            continue;
        }
        if !close.is_finite() || close <= 0.0 {
            return Err(RrgError::source(
                symbol,
                format!("line {}: close {} is not a positive price", line, close),
            ));
        }

        rows.push((timestamp, close));
    }

    // stable, so later rows stay after earlier ones with the same timestamp
    rows.sort_by_key(|(timestamp, _)| *timestamp);
    let mut deduped: Vec<(DateTime<Utc>, f64)> = Vec::with_capacity(rows.len());
    for (timestamp, close) in rows {
        match deduped.last_mut() {
            Some(last) if last.0 == timestamp => last.1 = close,
            _ => deduped.push((timestamp, close)),
        }
    }

    if dropped > 0 {
        tracing::debug!("{}: dropped {} rows without a close", symbol, dropped);
    }

    PriceSeries::from_pairs(deduped).map_err(|e| RrgError::source(symbol, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn day(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_parse_datetime_formats() {
        let expected = Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();
        assert_eq!(parse_datetime("2024-03-01 10:00:00"), Some(expected));
        assert_eq!(parse_datetime("2024-03-01T10:00:00"), Some(expected));
        assert_eq!(parse_datetime("2024-03-01T10:00:00Z"), Some(expected));
        assert_eq!(parse_datetime("2024-03-01 17:00:00+07:00"), Some(expected));
        assert_eq!(parse_datetime("2024-03-01"), Some(day(2024, 3, 1)));
        assert_eq!(parse_datetime("01/03/2024"), None);
    }

    #[test]
    fn test_columns_found_by_name() {
        let data = "\
open,close,datetime,volume
10,11.5,2024-01-02,100
11,12.0,2024-01-03,200
";
        let series = parse_price_csv(data.as_bytes(), "AGRI").unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.closes(), vec![11.5, 12.0]);
        assert_eq!(series.first().unwrap().timestamp, day(2024, 1, 2));
    }

    #[test]
    fn test_unsorted_rows_and_missing_close() {
        let data = "\
datetime,close
2024-01-04,3.0
2024-01-02,1.0
2024-01-03,
2024-01-05,NaN
";
        let series = parse_price_csv(data.as_bytes(), "BANK").unwrap();
        assert_eq!(series.closes(), vec![1.0, 3.0]);
        assert_eq!(series.last().unwrap().timestamp, day(2024, 1, 4));
    }

    #[test]
    fn test_duplicate_timestamp_last_wins() {
        let data = "\
datetime,close
2024-01-02,1.0
2024-01-03,2.0
2024-01-03,2.5
";
        let series = parse_price_csv(data.as_bytes(), "ICT").unwrap();
        assert_eq!(series.closes(), vec![1.0, 2.5]);
    }

    #[test]
    fn test_non_positive_close_is_source_error() {
        let data = "datetime,close\n2024-01-02,0\n";
        let err = parse_price_csv(data.as_bytes(), "PROP").unwrap_err();
        assert!(matches!(err, RrgError::SourceData { ref symbol, .. } if symbol == "PROP"));
    }

    #[test]
    fn test_missing_columns() {
        let err = parse_price_csv("time,price\n2024-01-02,1\n".as_bytes(), "FIN").unwrap_err();
        assert!(err.to_string().contains("datetime"));

        let err = parse_price_csv("datetime,open\n2024-01-02,1\n".as_bytes(), "FIN").unwrap_err();
        assert!(err.to_string().contains("close"));
    }

    #[test]
    fn test_bad_values_report_line() {
        let data = "datetime,close\n2024-01-02,1.0\n2024-01-03,abc\n";
        let err = parse_price_csv(data.as_bytes(), "CONS").unwrap_err();
        assert!(err.to_string().contains("line 3"));
    }

    #[test]
    fn test_header_only_is_empty_series() {
        let series = parse_price_csv("datetime,close\n".as_bytes(), "ENERG").unwrap();
        assert!(series.is_empty());
    }
}
