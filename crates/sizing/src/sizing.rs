use fx_core::LOT_UNITS;
use serde::{Deserialize, Serialize};

/// The account fields every sizing rule reads.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub deposit: f64,
    pub per_lot_margin: f64,
    pub start_rate: f64,
}

impl Account {
    pub fn new(deposit: f64, per_lot_margin: f64, start_rate: f64) -> Self {
        Self {
            deposit,
            per_lot_margin,
            start_rate,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SizingMode {
    MarginCapped,
    LeverageTargeted { target_leverage: f64 },
    Manual { lots: i64 },
}

/// Recoverable adjustments made to a requested lot count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SizingNotice {
    MarginExceeded { requested: i64, cap: u32 },
    RaisedToMinimum { requested: i64 },
}

impl SizingNotice {
    pub fn message(&self) -> String {
        match self {
            Self::MarginExceeded { requested, cap } => {
                format!("{requested} lots exceed the margin cap, using {cap}")
            }
            Self::RaisedToMinimum { requested } => {
                format!("{requested} lots is below the minimum, using 1")
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SizingOutcome {
    pub lots: u32,
    pub notice: Option<SizingNotice>,
    pub effective_leverage: f64,
}

/// Floor that never fails: NaN, infinities and non-positive values give 0.
pub fn safe_floor(value: f64) -> u32 {
    if !value.is_finite() || value <= 0.0 {
        return 0;
    }

    let floored = value.floor();
    if floored >= f64::from(u32::MAX) {
        u32::MAX
    } else {
        floored as u32
    }
}

pub fn margin_cap(account: &Account) -> u32 {
    safe_floor(account.deposit / account.per_lot_margin.max(1.0)).max(1)
}

pub fn lots_for_leverage(target_leverage: f64, account: &Account) -> u32 {
    if !(account.start_rate > 0.0) {
        return 1;
    }

    let notional_per_lot = account.start_rate * LOT_UNITS;
    let by_leverage = safe_floor(target_leverage * account.deposit / notional_per_lot).max(1);
    by_leverage.min(margin_cap(account))
}

pub fn manual_lots(requested: i64, account: &Account) -> (u32, Option<SizingNotice>) {
    let cap = margin_cap(account);

    if requested < 1 {
        return (1, Some(SizingNotice::RaisedToMinimum { requested }));
    }
    if requested > i64::from(cap) {
        return (cap, Some(SizingNotice::MarginExceeded { requested, cap }));
    }

    // in range, so it fits a u32
    (requested as u32, None)
}

/// Notional over deposit, rounded to 2 decimals and floored at 0.1.
///
/// Reports 0.0 when the deposit or start rate leaves the ratio undefined.
pub fn effective_leverage(lots: u32, account: &Account) -> f64 {
    if !(account.deposit > 0.0) || !(account.start_rate > 0.0) {
        return 0.0;
    }

    let raw = f64::from(lots) * account.start_rate * LOT_UNITS / account.deposit;
    if !raw.is_finite() {
        return 0.0;
    }

    ((raw * 100.0).round() / 100.0).max(0.1)
}

pub fn size_position(mode: SizingMode, account: &Account) -> SizingOutcome {
    let (lots, notice) = match mode {
        SizingMode::MarginCapped => (margin_cap(account), None),
        SizingMode::LeverageTargeted { target_leverage } => {
            (lots_for_leverage(target_leverage, account), None)
        }
        SizingMode::Manual { lots } => manual_lots(lots, account),
    };

    SizingOutcome {
        lots,
        notice,
        effective_leverage: effective_leverage(lots, account),
    }
}
