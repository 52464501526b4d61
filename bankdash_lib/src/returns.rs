//! Daily return series derived from closing prices.

use crate::table::{PricePoint, PriceTable, ReturnPoint, ReturnTable, TickerTable};

/// Fractional change between two consecutive closes.
///
/// Returns `None` if either close is zero or negative; such transitions have
/// no meaningful return and are left out of the series.
pub fn daily_return(prev_close: f64, close: f64) -> Option<f64> {
    if prev_close <= 0.0 || close <= 0.0 {
        return None;
    }
    Some((close - prev_close) / prev_close)
}

/// Daily returns for one date-ordered price series.
///
/// Each return is dated on the later of its two trading days, so the first
/// day of the series has no return.
pub fn series_returns(prices: &[PricePoint]) -> Vec<ReturnPoint> {
    prices
        .windows(2)
        .filter_map(|pair| {
            daily_return(pair[0].close, pair[1].close).map(|value| ReturnPoint {
                date: pair[1].date,
                value,
            })
        })
        .collect()
}

/// Build the return table, one series per ticker in the price table's order.
pub fn daily_returns(prices: &PriceTable) -> ReturnTable {
    let entries = prices
        .iter()
        .map(|(ticker, series)| {
            let returns = series_returns(series);
            let expected = series.len().saturating_sub(1);
            if returns.len() < expected {
                tracing::warn!(
                    "{}: skipped {} transitions with a non-positive close",
                    ticker,
                    expected - returns.len()
                );
            }
            (ticker.to_string(), returns)
        })
        .collect();

    TickerTable::new(entries)
}
