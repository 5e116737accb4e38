//! Router for the sign-in endpoints

use axum::Router;
use tower_http::LatencyUnit;
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;

use super::state::AuthState;

/// Create a router for the sign-in endpoints
///
/// Mount it at `AUTH_ROUTE_PREFIX`. The endpoints will be available at:
/// - {AUTH_ROUTE_PREFIX}/login (GET page, POST form)
/// - {AUTH_ROUTE_PREFIX}/logout
/// - {AUTH_ROUTE_PREFIX}/user/info
pub fn auth_session_router(state: AuthState) -> Router {
    auth_session_router_no_trace(state).layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(
                DefaultOnResponse::new()
                    .level(Level::INFO)
                    .latency_unit(LatencyUnit::Millis),
            ),
    )
}

/// Same as `auth_session_router()` but without the HTTP tracing middleware
pub fn auth_session_router_no_trace(state: AuthState) -> Router {
    super::pages::router().with_state(state)
}
