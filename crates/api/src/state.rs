use std::{
    fmt,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex, PoisonError,
    },
};

use fx_core::ContractSpec;
use runtime::logging::{RunLogEvent, RunLogWriter, TracingRunLogWriter};
use runtime::{SimulationInput, SimulationRequest, SimulationReport};
use tokio::sync::broadcast;

type SharedRunLog = Arc<Mutex<dyn RunLogWriter + Send>>;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StartRunError {
    RunIdOverflow,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum RunEvent {
    Connected {
        run_id: Option<u64>,
    },
    SimulationCompleted {
        run_id: u64,
        lots: u32,
        ending_equity: f64,
        total_pnl: f64,
    },
    SimulationRejected {
        run_id: u64,
        reason: String,
    },
    SizingNotice {
        run_id: u64,
        message: String,
    },
}

impl RunEvent {
    pub fn connected() -> Self {
        Self::Connected { run_id: None }
    }

    pub fn simulation_completed(report: &SimulationReport) -> Self {
        Self::SimulationCompleted {
            run_id: report.run_id,
            lots: report.lots,
            ending_equity: report.summary.ending_equity,
            total_pnl: report.summary.total_pnl,
        }
    }

    pub fn simulation_rejected(run_id: u64, reason: impl Into<String>) -> Self {
        Self::SimulationRejected {
            run_id,
            reason: reason.into(),
        }
    }

    pub fn sizing_notice(run_id: u64, message: impl Into<String>) -> Self {
        Self::SizingNotice {
            run_id,
            message: message.into(),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    next_run_id: Arc<AtomicU64>,
    events_tx: broadcast::Sender<RunEvent>,
    contract: ContractSpec,
    run_log: Option<SharedRunLog>,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("next_run_id", &self.next_run_id)
            .field("contract", &self.contract)
            .field("run_log", &self.run_log.is_some())
            .finish_non_exhaustive()
    }
}

/// Run log for one request: always `tracing`, plus the shared sink when set.
pub struct RequestRunLog<'a> {
    sink: Option<&'a SharedRunLog>,
}

impl RunLogWriter for RequestRunLog<'_> {
    fn write(&mut self, event: RunLogEvent) {
        if let Some(sink) = self.sink {
            sink.lock()
                .unwrap_or_else(PoisonError::into_inner)
                .write(event.clone());
        }
        TracingRunLogWriter.write(event);
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::with_contract(ContractSpec::default())
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contract(contract: ContractSpec) -> Self {
        let (events_tx, _) = broadcast::channel(256);
        Self {
            next_run_id: Arc::new(AtomicU64::new(0)),
            events_tx,
            contract,
            run_log: None,
        }
    }

    /// Also sends every run log event to `writer`, shared across requests.
    pub fn with_run_log(mut self, writer: impl RunLogWriter + Send + 'static) -> Self {
        let writer: SharedRunLog = Arc::new(Mutex::new(writer));
        self.run_log = Some(writer);
        self
    }

    pub fn contract(&self) -> ContractSpec {
        self.contract
    }

    /// Fills the fields a request left out from the configured contract defaults.
    pub fn resolve_input(&self, request: SimulationRequest) -> SimulationInput {
        request.resolve(SimulationInput::with_contract(self.contract))
    }

    pub fn run_log(&self) -> RequestRunLog<'_> {
        RequestRunLog {
            sink: self.run_log.as_ref(),
        }
    }

    pub fn start_run(&self) -> Result<u64, StartRunError> {
        let previous = self
            .next_run_id
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |current| {
                current.checked_add(1)
            })
            .map_err(|_| StartRunError::RunIdOverflow)?;

        Ok(previous + 1)
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<RunEvent> {
        self.events_tx.subscribe()
    }

    /// Fans out to current subscribers. Having none is not an error.
    pub fn publish_event(&self, event: RunEvent) -> usize {
        self.events_tx.send(event).unwrap_or(0)
    }
}
