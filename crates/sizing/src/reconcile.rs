use serde::{Deserialize, Serialize};

use crate::sizing::{
    effective_leverage, lots_for_leverage, manual_lots, margin_cap, Account, SizingNotice,
};

/// Which of the two linked fields the user set last. The other one is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Anchor {
    #[default]
    Leverage,
    Lots,
}

/// A single field edit coming from the input form.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum SizingEdit {
    Deposit(f64),
    PerLotMargin(f64),
    StartRate(f64),
    Leverage(f64),
    Lots(i64),
}

/// Caller-owned form state for the lots/leverage pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SizingState {
    pub account: Account,
    pub target_leverage: f64,
    pub lots: u32,
    pub effective_leverage: f64,
    pub anchor: Anchor,
    pub notice: Option<SizingNotice>,
}

impl SizingState {
    pub fn new(account: Account, target_leverage: f64) -> Self {
        let target_leverage = non_negative(target_leverage);
        let lots = lots_for_leverage(target_leverage, &account);

        Self {
            account,
            target_leverage,
            lots,
            effective_leverage: effective_leverage(lots, &account),
            anchor: Anchor::Leverage,
            notice: None,
        }
    }
}

impl Default for SizingState {
    fn default() -> Self {
        Self::new(Account::new(10_000_000.0, 40_000.0, 7.8), 3.0)
    }
}

/// Settles the state after one edit in a single pass.
///
/// Leverage edits derive lots, lots edits derive leverage. Account edits
/// re-derive from whichever side is anchored, and re-clamp anchored lots so
/// they never exceed the new margin cap.
pub fn reduce(state: SizingState, edit: SizingEdit) -> SizingState {
    let mut next = state;

    match edit {
        SizingEdit::Leverage(value) => {
            next.anchor = Anchor::Leverage;
            next.target_leverage = non_negative(value);
        }
        SizingEdit::Lots(requested) => {
            next.anchor = Anchor::Lots;
            let (lots, notice) = manual_lots(requested, &next.account);
            next.lots = lots;
            next.notice = notice;
        }
        SizingEdit::Deposit(value) => next.account.deposit = non_negative(value),
        SizingEdit::PerLotMargin(value) => next.account.per_lot_margin = non_negative(value),
        SizingEdit::StartRate(value) => next.account.start_rate = non_negative(value),
    }

    match next.anchor {
        Anchor::Leverage => {
            next.lots = lots_for_leverage(next.target_leverage, &next.account);
            next.notice = None;
        }
        Anchor::Lots => {
            if !matches!(edit, SizingEdit::Lots(_)) {
                let (lots, notice) = manual_lots(i64::from(next.lots), &next.account);
                next.lots = lots;
                let cap = margin_cap(&next.account);
                // an untouched lot count keeps its last notice while it still describes the cap
                next.notice =
                    notice.or(next.notice.filter(|held| still_holds(held, lots, cap)));
            }
            next.target_leverage = effective_leverage(next.lots, &next.account);
        }
    }

    next.effective_leverage = effective_leverage(next.lots, &next.account);
    next
}

fn still_holds(notice: &SizingNotice, lots: u32, cap: u32) -> bool {
    match *notice {
        SizingNotice::MarginExceeded { cap: quoted, .. } => quoted == cap && lots == cap,
        SizingNotice::RaisedToMinimum { .. } => lots == 1,
    }
}

fn non_negative(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}
