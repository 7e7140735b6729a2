use serde::{Deserialize, Serialize};

use crate::config::{FEE_PER_LOT_PER_SIDE, LOT_UNITS};
use crate::path::PricePath;
use crate::state::{DailyRecord, Direction, SimulationResult, SimulationSummary};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngineParams {
    pub initial_deposit: f64,
    pub lots: u32,
    pub direction: Direction,
    /// Magnitude only, the sign always follows `direction`.
    pub swap_per_lot_per_day: f64,
    pub fee_per_lot_per_side: f64,
    /// Enables the required-margin and margin-level columns.
    pub max_leverage: Option<f64>,
}

impl EngineParams {
    pub fn new(initial_deposit: f64, lots: u32, direction: Direction) -> Self {
        Self {
            initial_deposit,
            lots,
            direction,
            swap_per_lot_per_day: 0.0,
            fee_per_lot_per_side: FEE_PER_LOT_PER_SIDE,
            max_leverage: None,
        }
    }

    pub fn with_swap(mut self, swap_per_lot_per_day: f64) -> Self {
        self.swap_per_lot_per_day = swap_per_lot_per_day;
        self
    }

    pub fn with_fee(mut self, fee_per_lot_per_side: f64) -> Self {
        self.fee_per_lot_per_side = fee_per_lot_per_side;
        self
    }

    pub fn with_max_leverage(mut self, max_leverage: f64) -> Self {
        self.max_leverage = Some(max_leverage);
        self
    }
}

/// Decomposes the holding period into daily FX, swap and fee P&L.
///
/// Day 0 is the entry day: it carries no FX move and no swap, only the opening
/// fee. The closing fee lands on the last day whenever the path has a distinct
/// last day, so a one-point path pays the opening leg only.
pub fn compute(path: &PricePath, params: &EngineParams) -> SimulationResult {
    let rates = path.rates();
    let sign = params.direction.sign();
    let lots = f64::from(params.lots);
    let units = lots * LOT_UNITS;
    let daily_swap = sign * params.swap_per_lot_per_day.abs() * lots;
    let fee_per_leg = if params.lots > 0 {
        params.fee_per_lot_per_side * lots
    } else {
        0.0
    };
    let last_day = rates.len().saturating_sub(1);
    let max_leverage = params
        .max_leverage
        .filter(|leverage| leverage.is_finite() && *leverage > 0.0);

    let mut records = Vec::with_capacity(rates.len());
    let mut equity = params.initial_deposit;

    for (day, &rate) in rates.iter().enumerate() {
        let diff = if day == 0 { 0.0 } else { rate - rates[day - 1] };
        let fx_pnl = sign * diff * units;
        let swap = if day == 0 { 0.0 } else { daily_swap };

        let mut fee = 0.0;
        if day == 0 {
            fee -= fee_per_leg;
        }
        if day == last_day && last_day > 0 {
            fee -= fee_per_leg;
        }

        let total_pnl = fx_pnl + swap + fee;
        equity += total_pnl;

        let required_margin = max_leverage.map(|leverage| rate * units / leverage);
        let margin_level_pct = required_margin
            .filter(|margin| *margin > 0.0)
            .map(|margin| equity / margin * 100.0);

        records.push(DailyRecord {
            day,
            rate,
            fx_pnl,
            swap,
            fee,
            total_pnl,
            equity,
            required_margin,
            margin_level_pct,
            margin_call: margin_level_pct.is_some_and(|level| level < 100.0),
        });
    }

    let summary = summarize(params.initial_deposit, &records);
    SimulationResult { records, summary }
}

pub fn summarize(initial_deposit: f64, records: &[DailyRecord]) -> SimulationSummary {
    let fx_pnl_total: f64 = records.iter().map(|record| record.fx_pnl).sum();
    let swap_total: f64 = records.iter().map(|record| record.swap).sum();
    let fee_total: f64 = records.iter().map(|record| record.fee).sum();

    let ending_equity = records
        .last()
        .map_or(initial_deposit, |record| record.equity);
    let total_pnl = ending_equity - initial_deposit;
    let roi_pct = (initial_deposit > 0.0).then(|| total_pnl / initial_deposit * 100.0);

    SimulationSummary {
        ending_equity,
        total_pnl,
        total_pnl_ex_fee: total_pnl - fee_total,
        fx_pnl_total,
        swap_total,
        fee_total,
        fx_net_of_fee: fx_pnl_total - fee_total.abs(),
        roi_pct,
        max_drawdown: max_drawdown(records),
        first_margin_call_day: records
            .iter()
            .position(|record| record.margin_call)
            .map(|index| records[index].day),
    }
}

/// Deepest fall from the running equity peak, as a non-positive fraction.
fn max_drawdown(records: &[DailyRecord]) -> f64 {
    let mut peak = f64::NEG_INFINITY;
    let mut worst = 0.0_f64;

    for record in records {
        peak = peak.max(record.equity);
        // undefined against a non-positive peak
        if peak > 0.0 {
            worst = worst.min(record.equity / peak - 1.0);
        }
    }

    worst
}
