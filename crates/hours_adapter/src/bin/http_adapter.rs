#![forbid(unsafe_code)]

use std::{env, net::SocketAddr, sync::Arc};

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use hours_adapter::{
    AdapterHealthResponse, AdapterRuntime, NormalizeHoursRequest, NormalizeHoursResponse,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let bind = env::var("HOURS_HTTP_BIND").unwrap_or_else(|_| "127.0.0.1:8080".to_string());
    let addr: SocketAddr = bind.parse()?;

    let runtime = Arc::new(AdapterRuntime::default_from_env());
    let app = Router::new()
        .route("/healthz", get(healthz))
        .route("/v1/hours/normalize", post(normalize_hours))
        .with_state(runtime);

    println!("hours_adapter_http listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn healthz(
    State(runtime): State<Arc<AdapterRuntime>>,
) -> (StatusCode, Json<AdapterHealthResponse>) {
    (StatusCode::OK, Json(runtime.health_report()))
}

async fn normalize_hours(
    State(runtime): State<Arc<AdapterRuntime>>,
    Json(request): Json<NormalizeHoursRequest>,
) -> Result<Json<NormalizeHoursResponse>, (StatusCode, Json<AdapterHealthResponse>)> {
    match runtime.normalize(request) {
        Ok(response) => Ok(Json(response)),
        Err(reason) => Err((
            StatusCode::BAD_REQUEST,
            Json(AdapterHealthResponse {
                status: "error".to_string(),
                outcome: "REJECTED".to_string(),
                reason: Some(reason),
            }),
        )),
    }
}
