pub mod calendar;
pub mod export;
pub mod input;
pub mod logging;
pub mod runner;

pub use input::{SimulationInput, SimulationRequest};
pub use runner::{run_simulation, RunError, SimulationReport};

pub fn module_ready() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use crate::export::CsvExportWriter;
    use crate::logging::{InMemoryRunLogWriter, RunLogEventKind};
    use crate::{run_simulation, SimulationInput};

    #[test]
    fn run_then_export_logs_in_pipeline_order() {
        let mut log = InMemoryRunLogWriter::new();
        let report = run_simulation(4, &SimulationInput::default(), &mut log).unwrap();

        let mut writer = CsvExportWriter::new(Vec::new());
        writer
            .write_daily_and_log(report.run_id, &report.records, None, &mut log)
            .unwrap();

        assert_eq!(
            log.kinds(),
            vec![
                RunLogEventKind::SimulationStarted,
                RunLogEventKind::SimulationCompleted,
                RunLogEventKind::ExportWritten,
            ]
        );
        let csv = String::from_utf8(writer.into_inner()).unwrap();
        assert_eq!(csv.lines().count(), report.records.len() + 1);
    }
}
