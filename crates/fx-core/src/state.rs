use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    #[default]
    Long,
    Short,
}

impl Direction {
    pub fn sign(self) -> f64 {
        match self {
            Self::Long => 1.0,
            Self::Short => -1.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Long => "long",
            Self::Short => "short",
        }
    }
}

/// One simulated day. `equity` is the running account balance after the day's P&L.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DailyRecord {
    pub day: usize,
    pub rate: f64,
    pub fx_pnl: f64,
    pub swap: f64,
    pub fee: f64,
    pub total_pnl: f64,
    pub equity: f64,
    pub required_margin: Option<f64>,
    pub margin_level_pct: Option<f64>,
    pub margin_call: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SimulationSummary {
    pub ending_equity: f64,
    pub total_pnl: f64,
    pub total_pnl_ex_fee: f64,
    pub fx_pnl_total: f64,
    pub swap_total: f64,
    pub fee_total: f64,
    pub fx_net_of_fee: f64,
    pub roi_pct: Option<f64>,
    pub max_drawdown: f64,
    pub first_margin_call_day: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationResult {
    pub records: Vec<DailyRecord>,
    pub summary: SimulationSummary,
}
