use crate::indicator::IndicatorRow;
use crate::portfolio::{Portfolio, PositionState, TradeRecord};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BacktestError {
    #[error("Short period ({short_period}) must be less than long period ({long_period})")]
    InvalidParameters {
        short_period: usize,
        long_period: usize,
    },
}

//observable buy/sell notification emitted while the simulation runs
//the engine performs no I/O itself; callers render these after the run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum TradeEvent {
    Buy {
        date: DateTime<Utc>,
        price: f64,
        shares: f64,
    },
    Sell {
        date: DateTime<Utc>,
        price: f64,
        profit_loss: f64,
    },
}

//result of a backtest
#[derive(Debug, Clone)]
pub struct BacktestResult {
    pub initial_capital: f64,
    pub final_value: f64,
    pub total_return_pct: f64,
    pub trades: Vec<TradeRecord>,
    pub events: Vec<TradeEvent>,
}

impl BacktestResult {
    //result of a run over no data: capital untouched, nothing traded
    fn empty(initial_capital: f64) -> Self {
        BacktestResult {
            initial_capital,
            final_value: initial_capital,
            total_return_pct: 0.0,
            trades: Vec::new(),
            events: Vec::new(),
        }
    }
}

//signal-driven single-position backtest engine
//
//derives a boolean signal (short_smoothed > long_smoothed) for every bar at
//index >= long_period and trades the transitions: a rising edge buys with
//all capital, a falling edge sells the whole position
pub struct BacktestEngine {
    short_period: usize,
    long_period: usize,
    initial_capital: f64,
}

impl BacktestEngine {
    //validates the strategy configuration; a bad period pair never simulates
    pub fn new(
        short_period: usize,
        long_period: usize,
        initial_capital: f64,
    ) -> Result<Self, BacktestError> {
        if short_period >= long_period {
            return Err(BacktestError::InvalidParameters {
                short_period,
                long_period,
            });
        }

        Ok(BacktestEngine {
            short_period,
            long_period,
            initial_capital,
        })
    }

    pub fn short_period(&self) -> usize {
        self.short_period
    }

    pub fn long_period(&self) -> usize {
        self.long_period
    }

    //runs the simulation over precomputed indicator rows in one
    //chronological pass; pure given identical rows
    pub fn run(&self, rows: &[IndicatorRow]) -> BacktestResult {
        if rows.is_empty() {
            return BacktestResult::empty(self.initial_capital);
        }

        let mut portfolio = Portfolio::new(self.initial_capital);
        let mut position = PositionState::Flat;
        let mut trades = Vec::new();
        let mut events = Vec::new();

        //bars before long_period are neutral and never produce transitions;
        //the bar just before the eligible window carries an implicit false
        //signal, so a buy may fire exactly at index long_period
        let mut prev_signal = false;

        for row in rows.iter().skip(self.long_period) {
            //NaN smoothings compare false, so a degenerate disparity value
            //can never open a position
            let signal = row.short_smoothed > row.long_smoothed;

            if signal && !prev_signal {
                self.on_buy_signal(row, &mut position, &mut events);
            } else if !signal && prev_signal {
                self.on_sell_signal(row, &mut position, &mut portfolio, &mut trades, &mut events);
            }

            prev_signal = signal;
        }

        //mark any open position to market at the last close
        //unrealized pnl joins the portfolio value but never the ledger
        if let Some(last) = rows.last() {
            portfolio.apply_profit_loss(position.unrealized_pnl(last.close));
        }

        BacktestResult {
            initial_capital: self.initial_capital,
            final_value: portfolio.value,
            total_return_pct: portfolio.total_return_pct(),
            trades,
            events,
        }
    }

    //opens a long position with all capital at the bar's close
    fn on_buy_signal(
        &self,
        row: &IndicatorRow,
        position: &mut PositionState,
        events: &mut Vec<TradeEvent>,
    ) {
        //a second buy before a sell is ignored
        if position.is_long() {
            return;
        }

        let shares = self.initial_capital / row.close;
        *position = PositionState::Long {
            shares,
            entry_price: row.close,
            entry_date: row.timestamp,
        };

        events.push(TradeEvent::Buy {
            date: row.timestamp,
            price: row.close,
            shares,
        });
    }

    //closes the open position at the bar's close and records the round trip
    fn on_sell_signal(
        &self,
        row: &IndicatorRow,
        position: &mut PositionState,
        portfolio: &mut Portfolio,
        trades: &mut Vec<TradeRecord>,
        events: &mut Vec<TradeEvent>,
    ) {
        //cannot sell with nothing held
        if let PositionState::Long {
            shares,
            entry_price,
            entry_date,
        } = *position
        {
            let profit_loss = (row.close - entry_price) * shares;
            portfolio.apply_profit_loss(profit_loss);

            trades.push(TradeRecord {
                entry_date,
                entry_price,
                exit_date: row.timestamp,
                exit_price: row.close,
                profit_loss,
            });

            events.push(TradeEvent::Sell {
                date: row.timestamp,
                price: row.close,
                profit_loss,
            });

            *position = PositionState::Flat;
        }
    }
}
