use fx_core::{compute, DailyRecord, EngineParams, PathError, PricePath, SimulationSummary};
use serde::Serialize;
use sizing::{size_position, Account, SizingNotice};
use thiserror::Error;

use crate::input::{SimulationInput, MAX_DAYS};
use crate::logging::{RunLogEvent, RunLogEventKind, RunLogWriter};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RunError {
    #[error("rate path rejected: {0}")]
    Path(#[from] PathError),
    #[error("holding period of {days} days exceeds the maximum of {max}")]
    HoldingPeriodTooLong { days: i64, max: i64 },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationReport {
    pub run_id: u64,
    pub lots: u32,
    pub notice: Option<SizingNotice>,
    pub effective_leverage: f64,
    pub records: Vec<DailyRecord>,
    pub summary: SimulationSummary,
}

/// Runs one simulation end to end on a snapshot of the form input.
///
/// A literal rate list replaces the linear path and its first rate is used as
/// the sizing start rate. Only a malformed or too-short rate list, or a linear
/// holding period beyond `MAX_DAYS`, fails the run.
pub fn run_simulation(
    run_id: u64,
    input: &SimulationInput,
    run_log_writer: &mut dyn RunLogWriter,
) -> Result<SimulationReport, RunError> {
    let input = input.sanitized();
    run_log_writer.write(RunLogEvent::new(
        run_id,
        RunLogEventKind::SimulationStarted,
        None,
    ));

    let path = match build_path(&input) {
        Ok(path) => path,
        Err(err) => {
            run_log_writer.write(RunLogEvent::new(
                run_id,
                RunLogEventKind::PathRejected,
                Some(err.to_string()),
            ));
            return Err(err);
        }
    };

    let start_rate = path.start_rate().unwrap_or(input.start_rate);
    let account = Account::new(input.initial_deposit, input.per_lot_margin, start_rate);
    let sizing = size_position(input.sizing, &account);
    if let Some(notice) = sizing.notice {
        run_log_writer.write(RunLogEvent::new(
            run_id,
            RunLogEventKind::SizingAdjusted,
            Some(notice.message()),
        ));
    }

    let params = EngineParams {
        initial_deposit: input.initial_deposit,
        lots: sizing.lots,
        direction: input.direction,
        swap_per_lot_per_day: input.swap_per_lot_per_day,
        fee_per_lot_per_side: input.fee_per_lot_per_side,
        max_leverage: input.max_leverage,
    };
    let result = compute(&path, &params);

    run_log_writer.write(RunLogEvent::new(
        run_id,
        RunLogEventKind::SimulationCompleted,
        Some(format!(
            "days={} lots={} ending_equity={:.0}",
            path.days(),
            sizing.lots,
            result.summary.ending_equity
        )),
    ));

    Ok(SimulationReport {
        run_id,
        lots: sizing.lots,
        notice: sizing.notice,
        effective_leverage: sizing.effective_leverage,
        records: result.records,
        summary: result.summary,
    })
}

fn build_path(input: &SimulationInput) -> Result<PricePath, RunError> {
    let path = match input.manual_rates.as_deref() {
        Some(text) => PricePath::from_literal(text)?,
        None => {
            if input.days > MAX_DAYS {
                return Err(RunError::HoldingPeriodTooLong {
                    days: input.days,
                    max: MAX_DAYS,
                });
            }
            PricePath::linear(input.holding_days(), input.start_rate, input.end_rate)
        }
    };
    path.ensure_tradable()?;
    Ok(path)
}
