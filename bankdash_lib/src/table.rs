//! Per-ticker time series tables.
//!
//! A [`TickerTable`] keeps one date-ordered series per configured ticker,
//! in the order the tickers were configured. Tables are built once and
//! only read afterwards.

use chrono::NaiveDate;
use serde::Serialize;

/// A point on a dated series.
pub trait Dated {
    fn date(&self) -> NaiveDate;
    fn value(&self) -> f64;
}

/// One closing price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

impl Dated for PricePoint {
    fn date(&self) -> NaiveDate {
        self.date
    }

    fn value(&self) -> f64 {
        self.close
    }
}

/// Fractional change in close from the previous trading day, dated on the later day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReturnPoint {
    pub date: NaiveDate,
    pub value: f64,
}

impl Dated for ReturnPoint {
    fn date(&self) -> NaiveDate {
        self.date
    }

    fn value(&self) -> f64 {
        self.value
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TickerTable<P> {
    entries: Vec<(String, Vec<P>)>,
}

pub type PriceTable = TickerTable<PricePoint>;
pub type ReturnTable = TickerTable<ReturnPoint>;

impl<P> TickerTable<P> {
    pub fn new(entries: Vec<(String, Vec<P>)>) -> Self {
        Self { entries }
    }

    pub fn tickers(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(ticker, _)| ticker.as_str())
    }

    /// Series for a ticker. `None` only if the ticker was never configured.
    pub fn get(&self, ticker: &str) -> Option<&[P]> {
        self.entries
            .iter()
            .find(|(t, _)| t == ticker)
            .map(|(_, series)| series.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[P])> {
        self.entries
            .iter()
            .map(|(ticker, series)| (ticker.as_str(), series.as_slice()))
    }

    /// Number of tickers, including those with empty series.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of points across all tickers.
    pub fn total_points(&self) -> usize {
        self.entries.iter().map(|(_, series)| series.len()).sum()
    }
}

impl<P: Dated> TickerTable<P> {
    /// Earliest and latest date across every series.
    pub fn date_span(&self) -> Option<(NaiveDate, NaiveDate)> {
        let mut span: Option<(NaiveDate, NaiveDate)> = None;
        for (_, series) in &self.entries {
            // Series are date-ordered, so the ends are enough
            if let (Some(first), Some(last)) = (series.first(), series.last()) {
                span = Some(match span {
                    Some((lo, hi)) => (lo.min(first.date()), hi.max(last.date())),
                    None => (first.date(), last.date()),
                });
            }
        }
        span
    }

    /// Smallest and largest finite value across every series.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.entries
            .iter()
            .flat_map(|(_, series)| series.iter().map(Dated::value))
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                Some((lo, hi)) => Some((f64::min(lo, v), f64::max(hi, v))),
                None => Some((v, v)),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2018, 1, day).unwrap()
    }

    fn sample_table() -> PriceTable {
        TickerTable::new(vec![
            (
                "JPM".to_string(),
                vec![
                    PricePoint { date: date(2), close: 107.95 },
                    PricePoint { date: date(3), close: 108.06 },
                ],
            ),
            ("C".to_string(), vec![]),
            (
                "GS".to_string(),
                vec![
                    PricePoint { date: date(1), close: 255.0 },
                    PricePoint { date: date(4), close: 250.5 },
                ],
            ),
        ])
    }

    #[test]
    fn test_tickers_keep_configured_order() {
        let table = sample_table();
        let tickers: Vec<_> = table.tickers().collect();
        assert_eq!(tickers, vec!["JPM", "C", "GS"]);
        assert_eq!(table.len(), 3);
        assert_eq!(table.total_points(), 4);
    }

    #[test]
    fn test_get_empty_and_unknown() {
        let table = sample_table();
        assert!(table.get("C").unwrap().is_empty());
        assert!(table.get("WFC").is_none());
        assert_eq!(table.get("JPM").unwrap().len(), 2);
    }

    #[test]
    fn test_date_span() {
        let table = sample_table();
        assert_eq!(table.date_span(), Some((date(1), date(4))));
    }

    #[test]
    fn test_value_range() {
        let table = sample_table();
        assert_eq!(table.value_range(), Some((107.95, 255.0)));
    }

    #[test]
    fn test_empty_table_has_no_span() {
        let table: ReturnTable = TickerTable::new(vec![("BAC".to_string(), vec![])]);
        assert!(table.date_span().is_none());
        assert!(table.value_range().is_none());
    }
}
