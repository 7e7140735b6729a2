mod config;
mod wiring;

use std::{error::Error, fs::OpenOptions, io::LineWriter};

use api::state::AppState;
use runtime::logging::JsonLinesRunLogWriter;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config = config::Config::from_env()?;
    init_tracing(&config.log_filter)?;

    let mut state = AppState::with_contract(config.contract);
    if let Some(path) = &config.run_log_path {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        state = state.with_run_log(JsonLinesRunLogWriter::new(LineWriter::new(file)));
        tracing::info!(path = %path.display(), "appending run log");
    }

    let listener = TcpListener::bind(config.listen_addr).await?;
    tracing::info!(
        addr = %config.listen_addr,
        fee_per_lot_per_side = config.contract.fee_per_lot_per_side,
        max_leverage = config.contract.max_leverage,
        "fx simulator listening"
    );

    axum::serve(listener, wiring::build_app(state)).await?;
    Ok(())
}

fn init_tracing(default_filter: &str) -> Result<(), Box<dyn Error>> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_filter)?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|err| err as Box<dyn Error>)
}
