use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use runtime::calendar::{parse_start_date, CalendarError};
use runtime::export::{CsvExportWriter, ExportError};
use runtime::{run_simulation, RunError, SimulationInput, SimulationReport, SimulationRequest};
use serde::{Deserialize, Serialize};
use sizing::{reduce, SizingEdit, SizingState};
use thiserror::Error;

use crate::state::{AppState, RunEvent, StartRunError};
use crate::ws;

const CSV_CONTENT_TYPE: &str = "text/csv; charset=utf-8";

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/static/styles.css", get(styles))
        .route("/static/app.js", get(script))
        .route("/defaults", get(defaults))
        .route("/simulations", post(simulate))
        .route("/simulations/export/daily.csv", post(export_daily))
        .route("/simulations/export/summary.csv", post(export_summary))
        .route("/sizing/state", get(initial_sizing_state))
        .route("/sizing/reduce", post(reduce_sizing))
        .route("/ws/events", get(ws::events_socket))
        .with_state(state)
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("run id counter exhausted")]
    RunIdOverflow,
    #[error(transparent)]
    Run(#[from] RunError),
    #[error(transparent)]
    Calendar(#[from] CalendarError),
    #[error(transparent)]
    Export(#[from] ExportError),
}

impl From<StartRunError> for ApiError {
    fn from(err: StartRunError) -> Self {
        match err {
            StartRunError::RunIdOverflow => Self::RunIdOverflow,
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Run(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Calendar(_) => StatusCode::BAD_REQUEST,
            Self::RunIdOverflow | Self::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        (
            status,
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

#[derive(Debug, Deserialize)]
struct ExportQuery {
    start_date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ReduceRequest {
    state: SizingState,
    edit: SizingEdit,
}

async fn index() -> Html<&'static str> {
    Html(ui::index_html())
}

async fn styles() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/css; charset=utf-8")],
        ui::styles_css(),
    )
}

async fn script() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/javascript; charset=utf-8")],
        ui::app_js(),
    )
}

async fn defaults(State(state): State<AppState>) -> Json<SimulationInput> {
    Json(SimulationInput::with_contract(state.contract()))
}

async fn simulate(
    State(state): State<AppState>,
    Json(request): Json<SimulationRequest>,
) -> Result<Json<SimulationReport>, ApiError> {
    let report = run_and_publish(&state, request)?;
    Ok(Json(report))
}

async fn export_daily(
    State(state): State<AppState>,
    Query(query): Query<ExportQuery>,
    Json(request): Json<SimulationRequest>,
) -> Result<Response, ApiError> {
    let start_date = query
        .start_date
        .as_deref()
        .filter(|value| !value.trim().is_empty())
        .map(parse_start_date)
        .transpose()?;
    let report = run_and_publish(&state, request)?;

    let mut writer = CsvExportWriter::new(Vec::new());
    writer.write_daily_and_log(
        report.run_id,
        &report.records,
        start_date,
        &mut state.run_log(),
    )?;

    Ok(csv_response("fx_daily.csv", writer.into_inner()))
}

async fn export_summary(
    State(state): State<AppState>,
    Json(request): Json<SimulationRequest>,
) -> Result<Response, ApiError> {
    let report = run_and_publish(&state, request)?;

    let mut writer = CsvExportWriter::new(Vec::new());
    writer.write_summary(&report.summary)?;

    Ok(csv_response("fx_summary.csv", writer.into_inner()))
}

async fn initial_sizing_state() -> Json<SizingState> {
    Json(SizingState::default())
}

async fn reduce_sizing(Json(request): Json<ReduceRequest>) -> Json<SizingState> {
    Json(reduce(request.state, request.edit))
}

fn run_and_publish(
    state: &AppState,
    request: SimulationRequest,
) -> Result<SimulationReport, ApiError> {
    let input = state.resolve_input(request);
    let run_id = state.start_run()?;

    match run_simulation(run_id, &input, &mut state.run_log()) {
        Ok(report) => {
            if let Some(notice) = report.notice {
                state.publish_event(RunEvent::sizing_notice(run_id, notice.message()));
            }
            state.publish_event(RunEvent::simulation_completed(&report));
            Ok(report)
        }
        Err(err) => {
            state.publish_event(RunEvent::simulation_rejected(run_id, err.to_string()));
            Err(err.into())
        }
    }
}

fn csv_response(filename: &str, body: Vec<u8>) -> Response {
    (
        [
            (header::CONTENT_TYPE, CSV_CONTENT_TYPE.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        body,
    )
        .into_response()
}
