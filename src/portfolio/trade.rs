use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

//a closed round trip: one buy matched with one sell
//immutable once appended to the trade ledger
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TradeRecord {
    pub entry_date: DateTime<Utc>,
    pub entry_price: f64,
    pub exit_date: DateTime<Utc>,
    pub exit_price: f64,
    pub profit_loss: f64,
}

impl TradeRecord {
    //returns true if the round trip made money
    pub fn is_win(&self) -> bool {
        self.profit_loss > 0.0
    }

    //return of the round trip relative to its entry price
    pub fn return_pct(&self) -> f64 {
        (self.exit_price - self.entry_price) / self.entry_price * 100.0
    }
}
