pub mod reconcile;
pub mod sizing;

pub use reconcile::{reduce, Anchor, SizingEdit, SizingState};
pub use sizing::{
    effective_leverage, lots_for_leverage, manual_lots, margin_cap, safe_floor, size_position,
    Account, SizingMode, SizingNotice, SizingOutcome,
};

#[cfg(test)]
mod tests {
    use crate::{reduce, size_position, Account, SizingEdit, SizingMode, SizingState};

    #[test]
    fn reducer_and_direct_sizing_agree_on_leverage_target() {
        let account = Account::new(4_000_000.0, 40_000.0, 7.5);
        let state = reduce(SizingState::new(account, 1.0), SizingEdit::Leverage(6.0));
        let outcome = size_position(
            SizingMode::LeverageTargeted {
                target_leverage: 6.0,
            },
            &account,
        );

        assert_eq!(state.lots, outcome.lots);
        assert_eq!(state.effective_leverage, outcome.effective_leverage);
    }

    #[test]
    fn reducer_and_direct_sizing_agree_on_manual_lots() {
        let account = Account::new(4_000_000.0, 40_000.0, 7.5);
        let state = reduce(SizingState::new(account, 1.0), SizingEdit::Lots(500));
        let outcome = size_position(SizingMode::Manual { lots: 500 }, &account);

        assert_eq!(state.lots, outcome.lots);
        assert_eq!(state.notice, outcome.notice);
    }
}
