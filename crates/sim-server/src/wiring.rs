use api::state::AppState;
use axum::{routing::get, Router};

pub fn build_app(state: AppState) -> Router {
    debug_assert!(runtime::module_ready());
    debug_assert!(api::module_ready());
    debug_assert!(ui::module_ready());

    api::app_with_state(state).route("/health", get(healthcheck))
}

async fn healthcheck() -> &'static str {
    "ok"
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use api::state::AppState;
    use fx_core::ContractSpec;
    use tower::ServiceExt;

    #[tokio::test]
    async fn server_healthcheck_responds_ok() {
        let app = super::build_app(AppState::new());

        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn configured_contract_reaches_form_defaults() {
        let app = super::build_app(AppState::with_contract(ContractSpec {
            fee_per_lot_per_side: 800.0,
            max_leverage: 20.0,
        }));

        let response = app
            .oneshot(Request::get("/defaults").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(json["fee_per_lot_per_side"], 800.0);
        assert_eq!(json["max_leverage"], 20.0);
    }
}
