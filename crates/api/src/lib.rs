pub mod routes;
pub mod state;
pub mod ws;

use axum::Router;
use fx_core::ContractSpec;

pub fn module_ready() -> bool {
    true
}

pub fn app() -> Router {
    routes::router(state::AppState::new())
}

pub fn app_with_contract(contract: ContractSpec) -> Router {
    app_with_state(state::AppState::with_contract(contract))
}

pub fn app_with_state(state: state::AppState) -> Router {
    routes::router(state)
}
