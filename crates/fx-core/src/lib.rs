mod config;
mod engine;
mod path;
mod state;

pub use config::{ContractSpec, DEFAULT_MAX_LEVERAGE, FEE_PER_LOT_PER_SIDE, LOT_UNITS};
pub use engine::{compute, summarize, EngineParams};
pub use path::{PathError, PricePath};
pub use state::{DailyRecord, Direction, SimulationResult, SimulationSummary};
