use chrono::{DateTime, Utc};

//state of the single allowed position
//the simulator holds exactly one of these across the bar loop
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PositionState {
    Flat,
    Long {
        shares: f64,
        entry_price: f64,
        entry_date: DateTime<Utc>,
    },
}

impl PositionState {
    //returns true if no position is open
    pub fn is_flat(&self) -> bool {
        matches!(self, PositionState::Flat)
    }

    //returns true if a long position is open
    pub fn is_long(&self) -> bool {
        matches!(self, PositionState::Long { .. })
    }

    //unrealized pnl of an open position at the given price, 0 when flat
    pub fn unrealized_pnl(&self, current_price: f64) -> f64 {
        match self {
            PositionState::Flat => 0.0,
            PositionState::Long {
                shares,
                entry_price,
                ..
            } => (current_price - entry_price) * shares,
        }
    }
}
