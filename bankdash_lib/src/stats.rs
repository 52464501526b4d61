//! Descriptive statistics: box-plot summaries, Pearson correlation, and
//! per-ticker summaries.
//!
//! Undefined results are `None` rather than NaN so that callers have to
//! decide how to present them.

use chrono::NaiveDate;
use serde::Serialize;

use crate::table::{Dated, PriceTable, ReturnPoint, ReturnTable};

/// Whisker reach as a multiple of the interquartile range.
pub const WHISKER_IQR: f64 = 1.5;

/// Five-number summary plus whiskers and outliers for one series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxStats {
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    /// Smallest value within `q1 - 1.5 * IQR`.
    pub lower_whisker: f64,
    /// Largest value within `q3 + 1.5 * IQR`.
    pub upper_whisker: f64,
    pub outliers: Vec<f64>,
}

impl BoxStats {
    pub fn iqr(&self) -> f64 {
        self.q3 - self.q1
    }
}

/// Percentile of sorted data using linear interpolation between closest ranks.
///
/// `p` is a fraction in `[0, 1]`. `None` for an empty slice.
pub(crate) fn percentile(sorted: &[f64], p: f64) -> Option<f64> {
    let last = sorted.len().checked_sub(1)?;
    let pos = p.clamp(0.0, 1.0) * last as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64))
}

/// Box-plot statistics for a set of values. Non-finite values are ignored.
pub fn box_stats(values: &[f64]) -> Option<BoxStats> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    sorted.sort_by(f64::total_cmp);

    let q1 = percentile(&sorted, 0.25)?;
    let median = percentile(&sorted, 0.5)?;
    let q3 = percentile(&sorted, 0.75)?;
    let iqr = q3 - q1;
    let low_fence = q1 - WHISKER_IQR * iqr;
    let high_fence = q3 + WHISKER_IQR * iqr;

    // Quartiles lie inside the data range, so both searches find a value
    let lower_whisker = sorted
        .iter()
        .copied()
        .find(|&v| v >= low_fence)
        .unwrap_or(q1);
    let upper_whisker = sorted
        .iter()
        .rev()
        .copied()
        .find(|&v| v <= high_fence)
        .unwrap_or(q3);
    let outliers = sorted
        .iter()
        .copied()
        .filter(|&v| v < low_fence || v > high_fence)
        .collect();

    Some(BoxStats {
        min: sorted[0],
        q1,
        median,
        q3,
        max: sorted[sorted.len() - 1],
        lower_whisker,
        upper_whisker,
        outliers,
    })
}

fn is_constant(values: &[f64]) -> bool {
    values.windows(2).all(|w| w[0] == w[1])
}

/// Pearson correlation coefficient of paired samples.
///
/// Returns `None` for fewer than two pairs, mismatched lengths, or when either
/// side has no variance.
pub fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    if xs.len() != ys.len() || xs.len() < 2 {
        return None;
    }
    if is_constant(xs) || is_constant(ys) {
        return None;
    }

    let n = xs.len() as f64;
    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = ys.iter().sum::<f64>() / n;

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for (&x, &y) in xs.iter().zip(ys) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    if sxx <= 0.0 || syy <= 0.0 {
        return None;
    }
    let r = sxy / (sxx.sqrt() * syy.sqrt());
    r.is_finite().then(|| r.clamp(-1.0, 1.0))
}

/// Values of two date-ordered return series on the dates both contain.
pub fn aligned_values(a: &[ReturnPoint], b: &[ReturnPoint]) -> (Vec<f64>, Vec<f64>) {
    let mut xs = Vec::new();
    let mut ys = Vec::new();
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].date.cmp(&b[j].date) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                xs.push(a[i].value);
                ys.push(b[j].value);
                i += 1;
                j += 1;
            }
        }
    }
    (xs, ys)
}

/// Square ticker-by-ticker correlation matrix. `None` marks an undefined entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    tickers: Vec<String>,
    values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    pub fn tickers(&self) -> &[String] {
        &self.tickers
    }

    pub fn size(&self) -> usize {
        self.tickers.len()
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        self.values.get(row).and_then(|r| r.get(col)).copied().flatten()
    }

    /// Look up an entry by ticker names.
    pub fn between(&self, a: &str, b: &str) -> Option<f64> {
        let row = self.tickers.iter().position(|t| t == a)?;
        let col = self.tickers.iter().position(|t| t == b)?;
        self.get(row, col)
    }

    pub fn rows(&self) -> impl Iterator<Item = (&str, &[Option<f64>])> {
        self.tickers
            .iter()
            .zip(&self.values)
            .map(|(t, row)| (t.as_str(), row.as_slice()))
    }
}

/// Pairwise correlation of daily returns over the dates each pair shares.
pub fn correlation_matrix(returns: &ReturnTable) -> CorrelationMatrix {
    let series: Vec<(&str, &[ReturnPoint])> = returns.iter().collect();
    let n = series.len();
    let mut values = vec![vec![None; n]; n];

    for i in 0..n {
        let own: Vec<f64> = series[i].1.iter().map(Dated::value).collect();
        values[i][i] = (own.len() >= 2 && !is_constant(&own)).then_some(1.0);

        for j in (i + 1)..n {
            let (xs, ys) = aligned_values(series[i].1, series[j].1);
            let r = pearson(&xs, &ys);
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    let undefined = values.iter().flatten().filter(|v| v.is_none()).count();
    if undefined > 0 {
        tracing::warn!("{} correlation entries are undefined", undefined);
    }

    CorrelationMatrix {
        tickers: series.iter().map(|(t, _)| t.to_string()).collect(),
        values,
    }
}

/// Headline figures for one ticker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickerSummary {
    pub ticker: String,
    pub observations: usize,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    pub min_close: Option<f64>,
    pub median_close: Option<f64>,
    pub max_close: Option<f64>,
    /// Last close over first close, minus one.
    pub total_return: Option<f64>,
    pub mean_daily_return: Option<f64>,
    /// Sample standard deviation of daily returns.
    pub daily_volatility: Option<f64>,
}

fn mean(values: &[f64]) -> Option<f64> {
    (!values.is_empty()).then(|| values.iter().sum::<f64>() / values.len() as f64)
}

fn sample_std_dev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    Some(var.sqrt())
}

/// Summaries in the price table's ticker order.
pub fn summarize(prices: &PriceTable, returns: &ReturnTable) -> Vec<TickerSummary> {
    prices
        .iter()
        .map(|(ticker, series)| {
            let closes: Vec<f64> = series.iter().map(|p| p.close).collect();
            let daily: Vec<f64> = returns
                .get(ticker)
                .unwrap_or_default()
                .iter()
                .map(|r| r.value)
                .collect();
            let stats = box_stats(&closes);
            let total_return = match (series.first(), series.last()) {
                (Some(first), Some(last)) if first.close > 0.0 && series.len() > 1 => {
                    Some(last.close / first.close - 1.0)
                }
                _ => None,
            };

            TickerSummary {
                ticker: ticker.to_string(),
                observations: series.len(),
                first_date: series.first().map(|p| p.date),
                last_date: series.last().map(|p| p.date),
                min_close: stats.as_ref().map(|s| s.min),
                median_close: stats.as_ref().map(|s| s.median),
                max_close: stats.as_ref().map(|s| s.max),
                total_return,
                mean_daily_return: mean(&daily),
                daily_volatility: sample_std_dev(&daily),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{PricePoint, TickerTable};

    const EPS: f64 = 1e-9;

    fn day(n: u64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2016, 1, 4).unwrap() + chrono::Days::new(n)
    }

    fn returns_on(days: &[u64], values: &[f64]) -> Vec<ReturnPoint> {
        days.iter()
            .zip(values)
            .map(|(&d, &value)| ReturnPoint { date: day(d), value })
            .collect()
    }

    #[test]
    fn test_percentile_interpolates() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        assert!((percentile(&sorted, 0.25).unwrap() - 1.75).abs() < EPS);
        assert!((percentile(&sorted, 0.5).unwrap() - 2.5).abs() < EPS);
        assert!((percentile(&sorted, 0.75).unwrap() - 3.25).abs() < EPS);
        assert_eq!(percentile(&sorted, 0.0), Some(1.0));
        assert_eq!(percentile(&sorted, 1.0), Some(4.0));
    }

    #[test]
    fn test_percentile_empty_and_single() {
        assert_eq!(percentile(&[], 0.5), None);
        assert_eq!(percentile(&[7.0], 0.25), Some(7.0));
        assert!(box_stats(&[]).is_none());
        assert!(box_stats(&[f64::NAN]).is_none());
    }

    #[test]
    fn test_box_stats_known_series() {
        let stats = box_stats(&[100.0, 102.0, 101.0, 105.0, 104.0]).unwrap();
        assert_eq!(stats.median, 102.0);
        assert_eq!(stats.min, 100.0);
        assert_eq!(stats.max, 105.0);
        assert_eq!(stats.q1, 101.0);
        assert_eq!(stats.q3, 104.0);
        assert!(stats.outliers.is_empty());
        assert_eq!(stats.lower_whisker, 100.0);
        assert_eq!(stats.upper_whisker, 105.0);
    }

    #[test]
    fn test_box_stats_outliers() {
        let stats = box_stats(&[10.0, 11.0, 12.0, 11.5, 10.5, 50.0]).unwrap();
        assert_eq!(stats.outliers, vec![50.0]);
        assert_eq!(stats.upper_whisker, 12.0);
        assert_eq!(stats.max, 50.0);
    }

    #[test]
    fn test_box_stats_empty_and_single() {
        assert!(box_stats(&[]).is_none());
        assert!(box_stats(&[f64::NAN]).is_none());
        let single = box_stats(&[7.0]).unwrap();
        assert_eq!(single.q1, 7.0);
        assert_eq!(single.median, 7.0);
        assert_eq!(single.q3, 7.0);
        assert_eq!(single.iqr(), 0.0);
    }

    #[test]
    fn test_pearson_perfect() {
        let xs = [1.0, 2.0, 3.0, 4.0];
        let up = [2.0, 4.0, 6.0, 8.0];
        let down = [8.0, 6.0, 4.0, 2.0];
        assert!((pearson(&xs, &up).unwrap() - 1.0).abs() < EPS);
        assert!((pearson(&xs, &down).unwrap() + 1.0).abs() < EPS);
    }

    #[test]
    fn test_pearson_undefined() {
        assert!(pearson(&[1.0], &[2.0]).is_none());
        assert!(pearson(&[], &[]).is_none());
        assert!(pearson(&[1.0, 2.0], &[1.0]).is_none());
        assert!(pearson(&[0.1, 0.1, 0.1], &[1.0, 2.0, 3.0]).is_none());
    }

    #[test]
    fn test_aligned_values_intersects_dates() {
        let a = returns_on(&[0, 1, 2, 4], &[0.1, 0.2, 0.3, 0.4]);
        let b = returns_on(&[1, 3, 4, 5], &[1.0, 2.0, 3.0, 4.0]);
        let (xs, ys) = aligned_values(&a, &b);
        assert_eq!(xs, vec![0.2, 0.4]);
        assert_eq!(ys, vec![1.0, 3.0]);
    }

    #[test]
    fn test_correlation_matrix_properties() {
        let table = TickerTable::new(vec![
            ("JPM".to_string(), returns_on(&[0, 1, 2, 3, 4], &[0.01, -0.02, 0.015, 0.003, -0.007])),
            ("BAC".to_string(), returns_on(&[0, 1, 2, 3, 4], &[0.012, -0.018, 0.02, -0.001, -0.004])),
            ("GS".to_string(), returns_on(&[1, 2, 3, 4], &[-0.01, 0.004, 0.009, -0.02])),
        ]);
        let matrix = correlation_matrix(&table);
        assert_eq!(matrix.size(), 3);
        for i in 0..3 {
            assert_eq!(matrix.get(i, i), Some(1.0));
            for j in 0..3 {
                assert_eq!(matrix.get(i, j), matrix.get(j, i));
                let r = matrix.get(i, j).unwrap();
                assert!((-1.0..=1.0).contains(&r));
            }
        }
        assert!(matrix.between("JPM", "BAC").unwrap() > 0.8);
    }

    #[test]
    fn test_correlation_matrix_missing_ticker() {
        let table = TickerTable::new(vec![
            ("JPM".to_string(), returns_on(&[0, 1, 2], &[0.01, -0.02, 0.015])),
            ("C".to_string(), vec![]),
            ("WFC".to_string(), returns_on(&[5], &[0.01])),
        ]);
        let matrix = correlation_matrix(&table);
        assert_eq!(matrix.get(0, 0), Some(1.0));
        for k in 0..3 {
            assert_eq!(matrix.get(1, k), None);
            assert_eq!(matrix.get(k, 1), None);
        }
        // A single return cannot be correlated with anything, itself included
        assert_eq!(matrix.get(2, 2), None);
        assert_eq!(matrix.between("JPM", "WFC"), None);
    }

    #[test]
    fn test_correlation_matrix_constant_series() {
        let table = TickerTable::new(vec![
            ("JPM".to_string(), returns_on(&[0, 1, 2], &[0.01, -0.02, 0.015])),
            ("FLAT".to_string(), returns_on(&[0, 1, 2], &[0.0, 0.0, 0.0])),
        ]);
        let matrix = correlation_matrix(&table);
        assert_eq!(matrix.between("FLAT", "FLAT"), None);
        assert_eq!(matrix.between("JPM", "FLAT"), None);
    }

    #[test]
    fn test_correlation_matrix_reproducible() {
        let table = TickerTable::new(vec![
            ("JPM".to_string(), returns_on(&[0, 1, 2, 3], &[0.01, -0.02, 0.015, 0.002])),
            ("BAC".to_string(), returns_on(&[0, 1, 2, 3], &[0.02, -0.01, 0.005, 0.004])),
        ]);
        assert_eq!(correlation_matrix(&table), correlation_matrix(&table));
    }

    #[test]
    fn test_summarize() {
        let prices = TickerTable::new(vec![
            (
                "A".to_string(),
                [100.0, 102.0, 101.0, 105.0, 104.0]
                    .iter()
                    .enumerate()
                    .map(|(i, &close)| PricePoint { date: day(i as u64), close })
                    .collect(),
            ),
            ("B".to_string(), vec![]),
        ]);
        let returns = crate::returns::daily_returns(&prices);
        let summaries = summarize(&prices, &returns);

        assert_eq!(summaries.len(), 2);
        let a = &summaries[0];
        assert_eq!(a.observations, 5);
        assert_eq!(a.median_close, Some(102.0));
        assert_eq!(a.first_date, Some(day(0)));
        assert!((a.total_return.unwrap() - 0.04).abs() < EPS);
        assert!(a.daily_volatility.unwrap() > 0.0);

        let b = &summaries[1];
        assert_eq!(b.observations, 0);
        assert!(b.median_close.is_none());
        assert!(b.mean_daily_return.is_none());
        assert!(b.daily_volatility.is_none());
    }
}
