use fx_core::{ContractSpec, Direction};
use serde::{Deserialize, Deserializer, Serialize};
use sizing::SizingMode;

/// Longest holding period accepted for a linear path, roughly a century.
pub const MAX_DAYS: i64 = 36_600;

/// Everything the form submits for one simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationInput {
    pub initial_deposit: f64,
    pub per_lot_margin: f64,
    pub sizing: SizingMode,
    pub direction: Direction,
    pub swap_per_lot_per_day: f64,
    pub start_rate: f64,
    pub end_rate: f64,
    pub days: i64,
    /// Literal rate list. When non-blank it replaces the linear path.
    pub manual_rates: Option<String>,
    pub fee_per_lot_per_side: f64,
    pub max_leverage: Option<f64>,
}

/// A submitted form where every omitted field falls back to a base input.
///
/// An explicit `"max_leverage": null` turns margin metrics off; leaving the
/// field out keeps the base value.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SimulationRequest {
    pub initial_deposit: Option<f64>,
    pub per_lot_margin: Option<f64>,
    pub sizing: Option<SizingMode>,
    pub direction: Option<Direction>,
    pub swap_per_lot_per_day: Option<f64>,
    pub start_rate: Option<f64>,
    pub end_rate: Option<f64>,
    pub days: Option<i64>,
    pub manual_rates: Option<String>,
    pub fee_per_lot_per_side: Option<f64>,
    #[serde(deserialize_with = "present")]
    pub max_leverage: Option<Option<f64>>,
}

impl SimulationRequest {
    pub fn resolve(self, base: SimulationInput) -> SimulationInput {
        SimulationInput {
            initial_deposit: self.initial_deposit.unwrap_or(base.initial_deposit),
            per_lot_margin: self.per_lot_margin.unwrap_or(base.per_lot_margin),
            sizing: self.sizing.unwrap_or(base.sizing),
            direction: self.direction.unwrap_or(base.direction),
            swap_per_lot_per_day: self
                .swap_per_lot_per_day
                .unwrap_or(base.swap_per_lot_per_day),
            start_rate: self.start_rate.unwrap_or(base.start_rate),
            end_rate: self.end_rate.unwrap_or(base.end_rate),
            days: self.days.unwrap_or(base.days),
            manual_rates: self.manual_rates.or(base.manual_rates),
            fee_per_lot_per_side: self
                .fee_per_lot_per_side
                .unwrap_or(base.fee_per_lot_per_side),
            max_leverage: self.max_leverage.unwrap_or(base.max_leverage),
        }
    }
}

fn present<'de, D>(deserializer: D) -> Result<Option<Option<f64>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<f64>::deserialize(deserializer).map(Some)
}

impl Default for SimulationInput {
    fn default() -> Self {
        Self::with_contract(ContractSpec::default())
    }
}

impl SimulationInput {
    pub fn with_contract(contract: ContractSpec) -> Self {
        Self {
            initial_deposit: 10_000_000.0,
            per_lot_margin: 40_000.0,
            sizing: SizingMode::LeverageTargeted {
                target_leverage: 3.0,
            },
            direction: Direction::Long,
            swap_per_lot_per_day: 150.0,
            start_rate: 7.8,
            end_rate: 8.2,
            days: 365,
            manual_rates: None,
            fee_per_lot_per_side: contract.fee_per_lot_per_side,
            max_leverage: Some(contract.max_leverage),
        }
    }

    /// Replaces values the engine cannot use with safe defaults.
    pub fn sanitized(&self) -> Self {
        let sizing = match self.sizing {
            SizingMode::LeverageTargeted { target_leverage } => SizingMode::LeverageTargeted {
                target_leverage: non_negative(target_leverage),
            },
            other => other,
        };

        Self {
            initial_deposit: non_negative(self.initial_deposit),
            per_lot_margin: non_negative(self.per_lot_margin),
            sizing,
            direction: self.direction,
            swap_per_lot_per_day: finite_or_zero(self.swap_per_lot_per_day).abs(),
            start_rate: finite_or_zero(self.start_rate),
            end_rate: finite_or_zero(self.end_rate),
            days: self.days.max(1),
            manual_rates: self
                .manual_rates
                .as_ref()
                .filter(|text| !text.trim().is_empty())
                .cloned(),
            fee_per_lot_per_side: non_negative(self.fee_per_lot_per_side),
            max_leverage: self
                .max_leverage
                .filter(|leverage| leverage.is_finite() && *leverage > 0.0),
        }
    }

    pub fn holding_days(&self) -> u32 {
        // clamped into 1..=MAX_DAYS first, so the cast is lossless
        self.days.clamp(1, MAX_DAYS) as u32
    }
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

fn non_negative(value: f64) -> f64 {
    finite_or_zero(value).max(0.0)
}
