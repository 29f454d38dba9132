//! Column-wise indicator functions.
//!
//! Every function maps a price or return column to a new column of the same
//! length. Rolling statistics are `None` until their window is full; a window
//! containing a `None` is itself `None`.

use crate::error::AnalyticsError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use ta::Next;
use ta::indicators::{ExponentialMovingAverage, Minimum, SimpleMovingAverage};

/// Fractional change from the previous value. The first entry has no predecessor.
pub fn pct_change(values: &[f64]) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(values.len());
    if values.is_empty() {
        return out;
    }
    out.push(None);
    out.extend(values.windows(2).map(|w| Some(w[1] / w[0] - 1.0)));
    out
}

/// Simple moving average over `window` values.
pub fn rolling_mean(values: &[f64], window: usize) -> Result<Vec<Option<f64>>, AnalyticsError> {
    let mut sma = SimpleMovingAverage::new(window)?;
    Ok(values
        .iter()
        .enumerate()
        .map(|(i, &value)| {
            let mean = sma.next(value);
            (i + 1 >= window).then_some(mean)
        })
        .collect())
}

/// Sample (n - 1) standard deviation over `window` values.
pub fn rolling_std(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    (0..values.len())
        .map(|i| {
            if window < 2 || i + 1 < window {
                return None;
            }
            let slice = &values[i + 1 - window..=i];
            let window_values: Option<Vec<f64>> = slice.iter().copied().collect();
            window_values.and_then(|v| sample_std(&v))
        })
        .collect()
}

/// Relative strength index from simple rolling means of gains and losses.
///
/// The first row counts as neither a gain nor a loss. A window with only gains
/// reads 100; a window with no movement at all is undefined.
pub fn rsi(prices: &[f64], period: usize) -> Result<Vec<Option<f64>>, AnalyticsError> {
    let mut gains = Vec::with_capacity(prices.len());
    let mut losses = Vec::with_capacity(prices.len());
    for (i, &price) in prices.iter().enumerate() {
        let delta = if i == 0 { 0.0 } else { price - prices[i - 1] };
        gains.push(delta.max(0.0));
        losses.push((-delta).max(0.0));
    }

    let avg_gain = rolling_mean(&gains, period)?;
    let avg_loss = rolling_mean(&losses, period)?;

    Ok(avg_gain
        .into_iter()
        .zip(avg_loss)
        .map(|(gain, loss)| match (gain?, loss?) {
            (g, l) if l > 0.0 => Some(100.0 - 100.0 / (1.0 + g / l)),
            (g, _) if g > 0.0 => Some(100.0),
            _ => None,
        })
        .collect())
}

/// Upper and lower Bollinger bands: rolling mean plus/minus `num_std` sample
/// standard deviations.
pub fn bollinger_bands(
    prices: &[f64],
    window: usize,
    num_std: f64,
) -> Result<(Vec<Option<f64>>, Vec<Option<f64>>), AnalyticsError> {
    let mean = rolling_mean(prices, window)?;
    let as_options: Vec<Option<f64>> = prices.iter().copied().map(Some).collect();
    let std = rolling_std(&as_options, window);

    let (upper, lower) = mean
        .into_iter()
        .zip(std)
        .map(|(m, s)| match (m, s) {
            (Some(m), Some(s)) => (Some(m + num_std * s), Some(m - num_std * s)),
            _ => (None, None),
        })
        .unzip();
    Ok((upper, lower))
}

/// Exponential moving average with alpha = 2 / (span + 1), seeded with the
/// first price. Defined from the first row onwards.
pub fn ema(prices: &[f64], span: usize) -> Result<Vec<Option<f64>>, AnalyticsError> {
    let mut ema = ExponentialMovingAverage::new(span)?;
    Ok(prices.iter().map(|&price| Some(ema.next(price))).collect())
}

/// Fractional distance below the running peak, zero at a new high.
pub fn drawdown(prices: &[f64]) -> Vec<f64> {
    let mut peak = f64::NEG_INFINITY;
    prices
        .iter()
        .map(|&price| {
            peak = peak.max(price);
            if peak > 0.0 { (price - peak) / peak } else { 0.0 }
        })
        .collect()
}

/// Worst drawdown seen in each trailing `window`.
pub fn rolling_max_drawdown(
    prices: &[f64],
    window: usize,
) -> Result<Vec<Option<f64>>, AnalyticsError> {
    let mut minimum = Minimum::new(window)?;
    Ok(drawdown(prices)
        .into_iter()
        .enumerate()
        .map(|(i, dd)| {
            let worst = minimum.next(dd);
            (i + 1 >= window).then_some(worst)
        })
        .collect())
}

/// Sensitivity of the stock's returns to the benchmark's.
///
/// The covariance is taken over dates where both series have a return. The
/// variance uses every benchmark return. `None` when fewer than two dates
/// overlap or the benchmark never moves.
pub fn beta(
    stock: &[(NaiveDate, Option<f64>)],
    benchmark: &[(NaiveDate, Option<f64>)],
) -> Option<f64> {
    let by_date: HashMap<NaiveDate, f64> = benchmark
        .iter()
        .filter_map(|&(date, ret)| ret.map(|r| (date, r)))
        .collect();

    let (xs, ys): (Vec<f64>, Vec<f64>) = stock
        .iter()
        .filter_map(|&(date, ret)| Some((ret?, *by_date.get(&date)?)))
        .unzip();

    let covariance = sample_covariance(&xs, &ys)?;
    let market: Vec<f64> = benchmark.iter().filter_map(|&(_, r)| r).collect();
    let variance = sample_variance(&market)?;
    if variance == 0.0 {
        return None;
    }
    Some(covariance / variance)
}

/// Daily return less the daily share of the annual risk-free rate.
pub fn excess_returns(
    returns: &[Option<f64>],
    risk_free_rate: f64,
    trading_days_per_year: u32,
) -> Vec<Option<f64>> {
    let daily_rf = risk_free_rate / f64::from(trading_days_per_year);
    returns.iter().map(|r| r.map(|r| r - daily_rf)).collect()
}

/// Mean excess return over its sample standard deviation, per period and not
/// annualized. `None` for fewer than two observations or zero dispersion.
pub fn sharpe_ratio(excess: &[Option<f64>]) -> Option<f64> {
    let values: Vec<f64> = excess.iter().flatten().copied().collect();
    if values.windows(2).all(|w| w[0] == w[1]) {
        return None;
    }
    let std = sample_std(&values)?;
    if std == 0.0 {
        return None;
    }
    Some(mean(&values)? / std)
}

/// One bar of an equal-width histogram; `upper` is inclusive for the last bin only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Buckets the defined values into `bins` equal-width bins spanning their range.
/// A constant column is widened to plus/minus 0.5 around its value.
pub fn histogram(values: &[Option<f64>], bins: usize) -> Vec<HistogramBin> {
    let data: Vec<f64> = values.iter().flatten().copied().filter(|v| v.is_finite()).collect();
    if data.is_empty() || bins == 0 {
        return Vec::new();
    }

    let mut lo = data.iter().copied().fold(f64::INFINITY, f64::min);
    let mut hi = data.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if lo == hi {
        lo -= 0.5;
        hi += 0.5;
    }
    let width = (hi - lo) / bins as f64;

    let mut counts = vec![0usize; bins];
    for value in data {
        let idx = (((value - lo) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| HistogramBin {
            lower: lo + width * i as f64,
            upper: lo + width * (i + 1) as f64,
            count,
        })
        .collect()
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

fn sample_variance(values: &[f64]) -> Option<f64> {
    sample_covariance(values, values)
}

fn sample_std(values: &[f64]) -> Option<f64> {
    sample_variance(values).map(f64::sqrt)
}

fn sample_covariance(xs: &[f64], ys: &[f64]) -> Option<f64> {
    if xs.len() < 2 || xs.len() != ys.len() {
        return None;
    }
    let (mx, my) = (mean(xs)?, mean(ys)?);
    let sum: f64 = xs.iter().zip(ys).map(|(x, y)| (x - mx) * (y - my)).sum();
    Some(sum / (xs.len() - 1) as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn close(a: Option<f64>, b: f64) -> bool {
        a.is_some_and(|a| (a - b).abs() < EPS)
    }

    fn dated(returns: &[Option<f64>]) -> Vec<(NaiveDate, Option<f64>)> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        returns
            .iter()
            .enumerate()
            .map(|(i, &r)| (start + chrono::Days::new(i as u64), r))
            .collect()
    }

    #[test]
    fn pct_change_starts_undefined() {
        let out = pct_change(&[100.0, 110.0, 99.0]);
        assert_eq!(out[0], None);
        assert!(close(out[1], 0.1));
        assert!(close(out[2], -0.1));
        assert!(pct_change(&[]).is_empty());
    }

    #[test]
    fn rolling_mean_waits_for_a_full_window() {
        let out = rolling_mean(&[1.0, 2.0, 3.0, 4.0, 5.0], 3).unwrap();
        assert_eq!(&out[..2], &[None, None]);
        assert!(close(out[2], 2.0));
        assert!(close(out[3], 3.0));
        assert!(close(out[4], 4.0));
    }

    #[test]
    fn zero_window_is_rejected() {
        assert!(matches!(
            rolling_mean(&[1.0], 0),
            Err(AnalyticsError::Indicator(_))
        ));
    }

    #[test]
    fn rolling_std_uses_sample_denominator() {
        let values: Vec<Option<f64>> = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]
            .into_iter()
            .map(Some)
            .collect();
        let out = rolling_std(&values, 8);
        // population std is 2.0; sample std is sqrt(32 / 7)
        assert!(close(out[7], (32.0f64 / 7.0).sqrt()));
        assert!(out[..7].iter().all(Option::is_none));
    }

    #[test]
    fn rolling_std_skips_windows_with_gaps() {
        let out = rolling_std(&[None, Some(1.0), Some(3.0), Some(5.0)], 2);
        assert_eq!(out[1], None);
        assert!(close(out[2], 2.0f64.sqrt()));
        assert!(close(out[3], 2.0f64.sqrt()));
    }

    #[test]
    fn rsi_is_100_on_a_rising_series() {
        let prices: Vec<f64> = (1..=20).map(f64::from).collect();
        let out = rsi(&prices, 14).unwrap();
        assert!(out[..13].iter().all(Option::is_none));
        assert!(out[13..].iter().all(|v| close(*v, 100.0)));
    }

    #[test]
    fn rsi_balances_gains_and_losses() {
        // Alternating +1 / -1 moves: equal average gain and loss.
        let prices = [10.0, 11.0, 10.0, 11.0, 10.0];
        let out = rsi(&prices, 4).unwrap();
        assert!(close(out[4], 50.0));
        // Window 0..=3 holds the zero first row plus +1, -1, +1.
        let expected = 100.0 - 100.0 / (1.0 + (2.0 / 4.0) / (1.0 / 4.0));
        assert!(close(out[3], expected));
    }

    #[test]
    fn rsi_is_undefined_on_a_flat_series() {
        let out = rsi(&[5.0; 6], 3).unwrap();
        assert!(out.iter().all(Option::is_none));
    }

    #[test]
    fn bollinger_bands_straddle_the_mean() {
        let prices = [1.0, 2.0, 3.0, 4.0];
        let (upper, lower) = bollinger_bands(&prices, 3, 2.0).unwrap();
        assert_eq!(upper[1], None);
        // window [2, 3, 4]: mean 3, sample std 1
        assert!(close(upper[3], 5.0));
        assert!(close(lower[3], 1.0));
    }

    #[test]
    fn ema_is_seeded_with_the_first_price() {
        let out = ema(&[10.0, 20.0, 20.0], 3).unwrap();
        assert!(close(out[0], 10.0));
        // alpha = 0.5
        assert!(close(out[1], 15.0));
        assert!(close(out[2], 17.5));
    }

    #[test]
    fn drawdown_tracks_the_running_peak() {
        let dd = drawdown(&[100.0, 120.0, 90.0, 130.0]);
        assert_eq!(dd[0], 0.0);
        assert_eq!(dd[1], 0.0);
        assert!((dd[2] + 0.25).abs() < EPS);
        assert_eq!(dd[3], 0.0);
    }

    #[test]
    fn rolling_max_drawdown_keeps_the_worst_in_window() {
        let out = rolling_max_drawdown(&[100.0, 120.0, 90.0, 130.0, 125.0], 2).unwrap();
        assert_eq!(out[0], None);
        assert!(close(out[2], -0.25));
        assert!(close(out[3], -0.25));
        assert!(close(out[4], 125.0 / 130.0 - 1.0));
    }

    #[test]
    fn series_against_itself_has_beta_one() {
        let returns = dated(&[None, Some(0.01), Some(-0.02), Some(0.03), Some(0.005)]);
        assert!(close(beta(&returns, &returns), 1.0));
    }

    #[test]
    fn doubled_returns_have_beta_two() {
        let market = [None, Some(0.01), Some(-0.02), Some(0.03)];
        let stock: Vec<Option<f64>> = market.iter().map(|r| r.map(|r| r * 2.0)).collect();
        assert!(close(beta(&dated(&stock), &dated(&market)), 2.0));
    }

    #[test]
    fn beta_needs_overlapping_dates_and_market_movement() {
        let stock = dated(&[None, Some(0.01), Some(0.02)]);
        let shifted: Vec<_> = stock
            .iter()
            .map(|&(d, r)| (d + chrono::Days::new(100), r))
            .collect();
        assert_eq!(beta(&stock, &shifted), None);

        let flat = dated(&[None, Some(0.0), Some(0.0)]);
        assert_eq!(beta(&stock, &flat), None);
    }

    #[test]
    fn sharpe_ratio_of_flat_series_is_undefined() {
        let excess = excess_returns(&[None, Some(0.0), Some(0.0), Some(0.0)], 0.02, 252);
        assert!(close(excess[1], -0.02 / 252.0));
        assert_eq!(sharpe_ratio(&excess), None);
    }

    #[test]
    fn sharpe_ratio_is_mean_over_sample_std() {
        let excess = [None, Some(0.01), Some(0.03)];
        // mean 0.02, sample std sqrt(0.0002)
        assert!(close(sharpe_ratio(&excess), 0.02 / 0.0002f64.sqrt()));
    }

    #[test]
    fn histogram_counts_every_value_once() {
        let values: Vec<Option<f64>> = vec![None, Some(0.0), Some(0.5), Some(1.0), Some(1.0)];
        let bins = histogram(&values, 2);
        assert_eq!(bins.len(), 2);
        assert_eq!(bins[0].count, 1);
        assert_eq!(bins[1].count, 3);
        assert_eq!(bins[0].lower, 0.0);
        assert_eq!(bins[1].upper, 1.0);
    }

    #[test]
    fn histogram_of_a_constant_column_is_widened() {
        let bins = histogram(&[Some(2.0), Some(2.0)], 4);
        assert_eq!(bins.first().unwrap().lower, 1.5);
        assert_eq!(bins.last().unwrap().upper, 2.5);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 2);
    }
}
