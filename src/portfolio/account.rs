//tracks capital across a single backtest run
//value moves only when a trade closes, plus one final mark to market
//if a position is still open at the end of the series
#[derive(Debug, Clone)]
pub struct Portfolio {
    //capital at the start of the run, fixed
    pub initial_capital: f64,

    //current portfolio value
    pub value: f64,
}

impl Portfolio {
    //creates a portfolio holding only its starting capital
    pub fn new(initial_capital: f64) -> Self {
        Portfolio {
            initial_capital,
            value: initial_capital,
        }
    }

    //applies a realized or mark-to-market profit/loss to the portfolio value
    pub fn apply_profit_loss(&mut self, profit_loss: f64) {
        self.value += profit_loss;
    }

    //total return of the run as a percentage of initial capital
    pub fn total_return_pct(&self) -> f64 {
        (self.value - self.initial_capital) / self.initial_capital * 100.0
    }
}
