use askama::Template;
use axum::{
    Router,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
};
use dotenvy::dotenv;

use auth_session::{AuthSettings, UserCriteria, UserError, UserStore};
use auth_session_axum::{AUTH_ROUTE_PREFIX, AuthState, AuthUser, auth_session_router, init};

mod protected;
mod server;
use server::{init_tracing, serve_http};

#[derive(Template)]
#[template(path = "index.j2", escape = "html")]
struct IndexTemplate<'a> {
    username: Option<&'a str>,
    prefix: &'a str,
}

async fn index(user: Option<AuthUser>) -> Result<Response, (StatusCode, String)> {
    let template = IndexTemplate {
        username: user.as_ref().map(|u| u.username.as_str()),
        prefix: AUTH_ROUTE_PREFIX.as_str(),
    };
    match template.render() {
        Ok(html) => Ok(Html(html).into_response()),
        Err(e) => Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string())),
    }
}

/// Create the demo account unless a user with that name exists
async fn seed_demo_user(users: &UserStore) -> Result<(), UserError> {
    let username = std::env::var("DEMO_USERNAME").unwrap_or_else(|_| "alice".to_string());
    let password = std::env::var("DEMO_PASSWORD").unwrap_or_else(|_| "hunter2".to_string());

    let existing = users
        .find_unique_user(&UserCriteria::Username(username.clone()))
        .await?;
    if existing.is_some() {
        tracing::info!("Demo user {} already exists", username);
        return Ok(());
    }

    let mut user = users.create_user(&username, &password).await?;
    user.is_admin = true;
    users.upsert_user(user).await?;
    tracing::info!("Seeded demo user {}", username);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    init_tracing("demo_login");

    let (users, sessions) = init().await?;
    seed_demo_user(&users).await?;

    let state = AuthState::new(users, AuthSettings::new(), sessions);

    let app = Router::new()
        .route("/", get(index))
        .with_state(state.clone())
        .nest(
            AUTH_ROUTE_PREFIX.as_str(),
            auth_session_router(state.clone()),
        )
        .merge(protected::router(state));

    let port = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3001);
    serve_http(port, app).await?;
    Ok(())
}
