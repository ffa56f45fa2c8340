use crate::engine::BacktestResult;
use crate::portfolio::TradeRecord;
use prettytable::{Cell, Row, Table};
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

//summary metrics for a backtest, computed over the realized ledger only
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryMetrics {
    pub initial_capital: f64,
    pub final_value: f64,
    pub total_return: f64,
    pub total_return_pct: f64,
    pub num_trades: usize,
    pub num_winning_trades: usize,
    pub num_losing_trades: usize,
    pub win_rate: f64,
    pub avg_win: f64,
    pub avg_loss: f64,
    pub profit_factor: f64,
    pub largest_win: f64,
    pub largest_loss: f64,
}

impl SummaryMetrics {
    //calculate summary metrics from a finished backtest
    pub fn from_backtest(result: &BacktestResult) -> Self {
        let total_return = result.final_value - result.initial_capital;

        let winning: Vec<f64> = result
            .trades
            .iter()
            .filter(|trade| trade.is_win())
            .map(|trade| trade.profit_loss)
            .collect();
        let losing: Vec<f64> = result
            .trades
            .iter()
            .filter(|trade| trade.profit_loss < 0.0)
            .map(|trade| trade.profit_loss)
            .collect();

        let num_trades = result.trades.len();
        let num_winning = winning.len();
        let num_losing = losing.len();

        let win_rate = if num_trades > 0 {
            num_winning as f64 / num_trades as f64
        } else {
            0.0
        };

        let avg_win = if num_winning > 0 {
            winning.as_slice().mean()
        } else {
            0.0
        };

        let avg_loss = if num_losing > 0 {
            losing.as_slice().mean()
        } else {
            0.0
        };

        let total_wins: f64 = winning.iter().sum();
        let total_losses: f64 = losing.iter().sum::<f64>().abs();

        let profit_factor = if total_losses > 0.0 {
            total_wins / total_losses
        } else if total_wins > 0.0 {
            f64::INFINITY
        } else {
            0.0
        };

        let largest_win = winning.iter().fold(0.0f64, |a, &b| a.max(b));
        let largest_loss = losing.iter().fold(0.0f64, |a, &b| a.min(b));

        SummaryMetrics {
            initial_capital: result.initial_capital,
            final_value: result.final_value,
            total_return,
            total_return_pct: result.total_return_pct,
            num_trades,
            num_winning_trades: num_winning,
            num_losing_trades: num_losing,
            win_rate,
            avg_win,
            avg_loss,
            profit_factor,
            largest_win,
            largest_loss,
        }
    }

    //prints metrics in a formatted table
    pub fn pretty_print_table(&self) {
        let mut table = Table::new();

        table.add_row(Row::new(vec![Cell::new("Metric"), Cell::new("Value")]));

        table.add_row(Row::new(vec![
            Cell::new("Initial Capital"),
            Cell::new(&format!("{:.2}", self.initial_capital)),
        ]));

        table.add_row(Row::new(vec![
            Cell::new("Final Portfolio Value"),
            Cell::new(&format!("{:.2}", self.final_value)),
        ]));

        table.add_row(Row::new(vec![
            Cell::new("Total Return"),
            Cell::new(&format!(
                "{:.2} ({:.2}%)",
                self.total_return, self.total_return_pct
            )),
        ]));

        table.add_row(Row::new(vec![
            Cell::new("Number of Trades"),
            Cell::new(&format!("{}", self.num_trades)),
        ]));

        table.add_row(Row::new(vec![
            Cell::new("Win Rate"),
            Cell::new(&format!("{:.2}%", self.win_rate * 100.0)),
        ]));

        table.add_row(Row::new(vec![
            Cell::new("Avg Win"),
            Cell::new(&format!("{:.2}", self.avg_win)),
        ]));

        table.add_row(Row::new(vec![
            Cell::new("Avg Loss"),
            Cell::new(&format!("{:.2}", self.avg_loss)),
        ]));

        table.add_row(Row::new(vec![
            Cell::new("Largest Win"),
            Cell::new(&format!("{:.2}", self.largest_win)),
        ]));

        table.add_row(Row::new(vec![
            Cell::new("Largest Loss"),
            Cell::new(&format!("{:.2}", self.largest_loss)),
        ]));

        table.add_row(Row::new(vec![
            Cell::new("Profit Factor"),
            Cell::new(&format!("{:.3}", self.profit_factor)),
        ]));

        table.printstd();
    }
}

//prints the trade history table (entry/exit, per-trade pnl)
pub fn pretty_print_trades(trades: &[TradeRecord]) {
    let mut table = Table::new();

    table.add_row(Row::new(vec![
        Cell::new("Entry Date"),
        Cell::new("Entry Price"),
        Cell::new("Exit Date"),
        Cell::new("Exit Price"),
        Cell::new("P/L"),
        Cell::new("Return"),
    ]));

    for trade in trades {
        table.add_row(Row::new(vec![
            Cell::new(&trade.entry_date.format("%Y-%m-%d").to_string()),
            Cell::new(&format!("{:.2}", trade.entry_price)),
            Cell::new(&trade.exit_date.format("%Y-%m-%d").to_string()),
            Cell::new(&format!("{:.2}", trade.exit_price)),
            Cell::new(&format!("{:.2}", trade.profit_loss)),
            Cell::new(&format!("{:.2}%", trade.return_pct())),
        ]));
    }

    table.printstd();
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::{TimeZone, Utc};

    fn trade(profit_loss: f64) -> TradeRecord {
        TradeRecord {
            entry_date: Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap(),
            entry_price: 100.0,
            exit_date: Utc.with_ymd_and_hms(2024, 1, 9, 0, 0, 0).unwrap(),
            exit_price: 100.0 + profit_loss / 1000.0,
            profit_loss,
        }
    }

    fn result_with_trades(trades: Vec<TradeRecord>) -> BacktestResult {
        let pnl: f64 = trades.iter().map(|t| t.profit_loss).sum();
        BacktestResult {
            initial_capital: 100_000.0,
            final_value: 100_000.0 + pnl,
            total_return_pct: pnl / 100_000.0 * 100.0,
            trades,
            events: Vec::new(),
        }
    }

    #[test]
    fn empty_ledger_metrics() {
        let metrics = SummaryMetrics::from_backtest(&result_with_trades(Vec::new()));

        assert_eq!(metrics.num_trades, 0);
        assert_relative_eq!(metrics.win_rate, 0.0);
        assert_relative_eq!(metrics.profit_factor, 0.0);
        assert_relative_eq!(metrics.total_return, 0.0);
    }

    #[test]
    fn mixed_ledger_metrics() {
        let metrics = SummaryMetrics::from_backtest(&result_with_trades(vec![
            trade(2_000.0),
            trade(-500.0),
            trade(1_000.0),
            trade(-1_500.0),
        ]));

        assert_eq!(metrics.num_trades, 4);
        assert_eq!(metrics.num_winning_trades, 2);
        assert_eq!(metrics.num_losing_trades, 2);
        assert_relative_eq!(metrics.win_rate, 0.5);
        assert_relative_eq!(metrics.avg_win, 1_500.0);
        assert_relative_eq!(metrics.avg_loss, -1_000.0);
        assert_relative_eq!(metrics.profit_factor, 3_000.0 / 2_000.0);
        assert_relative_eq!(metrics.largest_win, 2_000.0);
        assert_relative_eq!(metrics.largest_loss, -1_500.0);
    }

    #[test]
    fn all_winning_ledger_has_infinite_profit_factor() {
        let metrics =
            SummaryMetrics::from_backtest(&result_with_trades(vec![trade(100.0), trade(50.0)]));

        assert!(metrics.profit_factor.is_infinite());
        assert_relative_eq!(metrics.win_rate, 1.0);
    }
}
