use std::fmt::Display;
use std::io::{self, Write};

use fx_core::{DailyRecord, SimulationSummary};
use thiserror::Error;
use time::Date;

use crate::calendar::date_for_day;
use crate::logging::{RunLogEvent, RunLogEventKind, RunLogWriter};

pub const DAILY_CSV_HEADER: &str =
    "day,date,rate,fx_pnl,swap,fee,total_pnl,equity,required_margin,margin_level_pct,margin_call\n";

pub const SUMMARY_CSV_HEADER: &str = "ending_equity,total_pnl,total_pnl_ex_fee,fx_pnl_total,swap_total,fee_total,fx_net_of_fee,roi_pct,max_drawdown,first_margin_call_day\n";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write export: {0}")]
    Io(#[from] io::Error),
}

/// Writes simulation output as UTF-8 CSV, one row per day or a single summary row.
pub struct CsvExportWriter<W: Write> {
    writer: W,
}

impl<W: Write> CsvExportWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    pub fn write_daily(
        &mut self,
        records: &[DailyRecord],
        start_date: Option<Date>,
    ) -> Result<(), ExportError> {
        self.writer.write_all(DAILY_CSV_HEADER.as_bytes())?;

        for record in records {
            let date = start_date.and_then(|start| date_for_day(start, record.day));
            writeln!(
                self.writer,
                "{},{},{},{},{},{},{},{},{},{},{}",
                record.day,
                optional(date),
                record.rate,
                record.fx_pnl,
                record.swap,
                record.fee,
                record.total_pnl,
                record.equity,
                optional(record.required_margin),
                optional(record.margin_level_pct),
                record.margin_call,
            )?;
        }

        Ok(())
    }

    pub fn write_summary(&mut self, summary: &SimulationSummary) -> Result<(), ExportError> {
        self.writer.write_all(SUMMARY_CSV_HEADER.as_bytes())?;
        writeln!(
            self.writer,
            "{},{},{},{},{},{},{},{},{},{}",
            summary.ending_equity,
            summary.total_pnl,
            summary.total_pnl_ex_fee,
            summary.fx_pnl_total,
            summary.swap_total,
            summary.fee_total,
            summary.fx_net_of_fee,
            optional(summary.roi_pct),
            summary.max_drawdown,
            optional(summary.first_margin_call_day),
        )?;

        Ok(())
    }

    /// Writes the daily table and logs it only once the bytes are flushed.
    pub fn write_daily_and_log(
        &mut self,
        run_id: u64,
        records: &[DailyRecord],
        start_date: Option<Date>,
        run_log_writer: &mut dyn RunLogWriter,
    ) -> Result<(), ExportError> {
        self.write_daily(records, start_date)?;
        self.writer.flush()?;
        run_log_writer.write(RunLogEvent::new(
            run_id,
            RunLogEventKind::ExportWritten,
            Some(format!("daily rows={}", records.len())),
        ));
        Ok(())
    }
}

fn optional<T: Display>(value: Option<T>) -> String {
    value.map(|value| value.to_string()).unwrap_or_default()
}
