use crate::data::Bar;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

//per-bar output of the disparity index calculation
//rows are produced in input order, one per bar
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorRow {
    pub timestamp: DateTime<Utc>,
    pub close: f64,
    pub baseline: f64,
    pub disparity: f64,
    pub short_smoothed: f64,
    pub long_smoothed: f64,
}

//recursive exponential moving average with alpha = 2 / (span + 1)
//seeded by the first input value, so ema[0] == values[0] with no warmup
pub fn ema(values: &[f64], span: usize) -> Vec<f64> {
    if values.is_empty() || span == 0 {
        return Vec::new();
    }

    let alpha = 2.0 / (span as f64 + 1.0);
    let mut out = Vec::with_capacity(values.len());
    let mut prev = values[0];
    out.push(prev);

    for &value in &values[1..] {
        prev = value * alpha + prev * (1.0 - alpha);
        out.push(prev);
    }

    out
}

//computes the disparity index and its two smoothed variants for a price series
//
//baseline = ema(close, length)
//disparity = (close - baseline) / baseline * 100
//short_smoothed = ema(disparity, short_period)
//long_smoothed = ema(disparity, long_period)
//
//a zero baseline yields NaN for that row's disparity; NaN propagates through
//the smoothings and compares false against everything, so it can never fire
//a buy transition downstream
//
//pure function: the input series is never mutated and identical inputs give
//identical rows
pub fn compute(
    bars: &[Bar],
    length: usize,
    short_period: usize,
    long_period: usize,
) -> Vec<IndicatorRow> {
    if bars.is_empty() || length == 0 || short_period == 0 || long_period == 0 {
        return Vec::new();
    }

    let closes: Vec<f64> = bars.iter().map(|bar| bar.close).collect();
    let baseline = ema(&closes, length);

    let disparity: Vec<f64> = closes
        .iter()
        .zip(baseline.iter())
        .map(|(&close, &base)| {
            if base == 0.0 {
                f64::NAN
            } else {
                (close - base) / base * 100.0
            }
        })
        .collect();

    let short_smoothed = ema(&disparity, short_period);
    let long_smoothed = ema(&disparity, long_period);

    bars.iter()
        .enumerate()
        .map(|(i, bar)| IndicatorRow {
            timestamp: bar.timestamp,
            close: bar.close,
            baseline: baseline[i],
            disparity: disparity[i],
            short_smoothed: short_smoothed[i],
            long_smoothed: long_smoothed[i],
        })
        .collect()
}
