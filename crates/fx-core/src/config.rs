use serde::{Deserialize, Serialize};

/// Units of the quoted pair per lot.
pub const LOT_UNITS: f64 = 100_000.0;

/// Trading fee per lot, charged once when the position opens and once when it closes.
pub const FEE_PER_LOT_PER_SIDE: f64 = 1_100.0;

/// Broker maximum leverage used for the margin-level columns.
pub const DEFAULT_MAX_LEVERAGE: f64 = 25.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContractSpec {
    pub fee_per_lot_per_side: f64,
    pub max_leverage: f64,
}

impl Default for ContractSpec {
    fn default() -> Self {
        Self {
            fee_per_lot_per_side: FEE_PER_LOT_PER_SIDE,
            max_leverage: DEFAULT_MAX_LEVERAGE,
        }
    }
}
