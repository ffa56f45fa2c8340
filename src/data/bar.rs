use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BarError {
    #[error("Invalid OHLC values: high ({high}) < low ({low})")]
    InvalidHighLow { high: f64, low: f64 },
    #[error("Invalid OHLC values: close ({close}) outside high-low range [{low}, {high}]")]
    InvalidClose { close: f64, high: f64, low: f64 },
    #[error("Invalid OHLC values: open ({open}) outside high-low range [{low}, {high}]")]
    InvalidOpen { open: f64, high: f64, low: f64 },
    #[error("Non-positive close price: {0}")]
    NonPositiveClose(f64),
    #[error("Negative volume: {0}")]
    NegativeVolume(f64),
}

//represents a single daily ohlcv bar of market data
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub symbol: String,
}

impl Bar {
    //creates a new Bar with validation
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        timestamp: DateTime<Utc>,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
        symbol: String,
    ) -> Result<Self, BarError> {
        //validate high >= low
        if high < low {
            return Err(BarError::InvalidHighLow { high, low });
        }

        //validate close within [low, high]
        if close < low || close > high {
            return Err(BarError::InvalidClose { close, high, low });
        }

        //validate open within [low, high]
        if open < low || open > high {
            return Err(BarError::InvalidOpen { open, high, low });
        }

        //the simulator sizes positions as capital / close, so close must be positive
        if close <= 0.0 {
            return Err(BarError::NonPositiveClose(close));
        }

        //validate non-negative volume
        if volume < 0.0 {
            return Err(BarError::NegativeVolume(volume));
        }

        Ok(Bar {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
            symbol,
        })
    }

    //creates a Bar without validation
    #[allow(clippy::too_many_arguments)]
    pub fn new_unchecked(
        timestamp: DateTime<Utc>,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
        symbol: String,
    ) -> Self {
        Bar {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
            symbol,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap()
    }

    #[test]
    fn valid_bar() {
        let bar = Bar::new(ts(), 10.0, 12.0, 9.0, 11.0, 1000.0, "RELIANCE".to_string());
        assert!(bar.is_ok());
    }

    #[test]
    fn high_below_low_rejected() {
        let bar = Bar::new(ts(), 10.0, 8.0, 9.0, 8.5, 1000.0, "RELIANCE".to_string());
        assert!(matches!(bar, Err(BarError::InvalidHighLow { .. })));
    }

    #[test]
    fn close_outside_range_rejected() {
        let bar = Bar::new(ts(), 10.0, 12.0, 9.0, 13.0, 1000.0, "RELIANCE".to_string());
        assert!(matches!(bar, Err(BarError::InvalidClose { .. })));
    }

    #[test]
    fn negative_volume_rejected() {
        let bar = Bar::new(ts(), 10.0, 12.0, 9.0, 11.0, -1.0, "RELIANCE".to_string());
        assert!(matches!(bar, Err(BarError::NegativeVolume(_))));
    }
}
