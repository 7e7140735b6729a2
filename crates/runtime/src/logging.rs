use std::io::{self, Write};

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunLogEventKind {
    SimulationStarted,
    SizingAdjusted,
    PathRejected,
    SimulationCompleted,
    ExportWritten,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunLogEvent {
    pub run_id: u64,
    pub kind: RunLogEventKind,
    pub detail: Option<String>,
}

impl RunLogEvent {
    pub fn new(run_id: u64, kind: RunLogEventKind, detail: Option<String>) -> Self {
        Self {
            run_id,
            kind,
            detail,
        }
    }
}

pub trait RunLogWriter {
    fn write(&mut self, event: RunLogEvent);
}

#[derive(Debug, Default)]
pub struct InMemoryRunLogWriter {
    events: Vec<RunLogEvent>,
}

impl InMemoryRunLogWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[RunLogEvent] {
        &self.events
    }

    pub fn kinds(&self) -> Vec<RunLogEventKind> {
        self.events.iter().map(|event| event.kind).collect()
    }
}

impl RunLogWriter for InMemoryRunLogWriter {
    fn write(&mut self, event: RunLogEvent) {
        self.events.push(event);
    }
}

/// Forwards run events to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingRunLogWriter;

impl RunLogWriter for TracingRunLogWriter {
    fn write(&mut self, event: RunLogEvent) {
        let detail = event.detail.as_deref().unwrap_or("");
        match event.kind {
            RunLogEventKind::PathRejected | RunLogEventKind::SizingAdjusted => {
                tracing::warn!(run_id = event.run_id, kind = ?event.kind, detail);
            }
            RunLogEventKind::SimulationCompleted | RunLogEventKind::ExportWritten => {
                tracing::info!(run_id = event.run_id, kind = ?event.kind, detail);
            }
            RunLogEventKind::SimulationStarted => {
                tracing::debug!(run_id = event.run_id, kind = ?event.kind, detail);
            }
        }
    }
}

/// One JSON object per line. Write failures are counted, not raised.
pub struct JsonLinesRunLogWriter<W: Write> {
    writer: W,
    failed_writes: u64,
}

impl<W: Write> JsonLinesRunLogWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            failed_writes: 0,
        }
    }

    pub fn failed_writes(&self) -> u64 {
        self.failed_writes
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_line(&mut self, event: &RunLogEvent) -> io::Result<()> {
        serde_json::to_writer(&mut self.writer, event)?;
        self.writer.write_all(b"\n")
    }
}

impl<W: Write> RunLogWriter for JsonLinesRunLogWriter<W> {
    fn write(&mut self, event: RunLogEvent) {
        if self.write_line(&event).is_err() {
            self.failed_writes += 1;
        }
    }
}
