//! Axum router assembly and gateway dispatch.

use axum::Router;
use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use tower::ServiceExt;
use tower_http::trace::TraceLayer;

use smarthub_app::gateway::ApiGateway;
use smarthub_domain::api::{ApiResponse, ApiStatus};

use crate::state::AppState;

/// Build the top-level axum [`Router`].
///
/// `/health` answers liveness probes; every other path goes through the
/// gateway dispatch. Includes a [`TraceLayer`] that logs each HTTP
/// request/response at the `DEBUG` level using the `tracing` ecosystem.
pub fn build(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .fallback(dispatch)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}

/// Route a request to the interface named by its first path segment, or to
/// the static file service when no interface matches and one is configured.
async fn dispatch(State(state): State<AppState>, request: Request) -> Response {
    let path = request.uri().path().to_owned();
    let name = ApiGateway::interface_name(&path);

    if state.gateway.has_interface(name) {
        return into_http(state.gateway.handle(&path));
    }

    match state.static_files.clone() {
        Some(files) => match files.oneshot(request).await {
            Ok(response) => response.map(Body::new).into_response(),
            Err(err) => match err {},
        },
        None => into_http(ApiResponse::client_error()),
    }
}

fn into_http(response: ApiResponse) -> Response {
    let status = match response.status {
        ApiStatus::Ok => StatusCode::OK,
        ApiStatus::ClientError => StatusCode::BAD_REQUEST,
    };

    if response.body.is_empty() {
        status.into_response()
    } else {
        (
            status,
            [(header::CONTENT_TYPE, "application/json")],
            response.body,
        )
            .into_response()
    }
}
