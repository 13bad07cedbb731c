#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

pub mod _api;
pub mod auth;
pub mod config;
pub mod error;
pub mod gateway;
pub mod membership;
pub mod project_tasks;
pub mod room;
pub mod state;

#[cfg(test)]
mod test_support;

use axum::{
    Router,
    http::Uri,
    routing::{delete, get, patch, post, put},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::error::ApiError;
use crate::state::AppState;

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .nest("/api", create_api_routes())
        .route("/ws", get(gateway::websocket::websocket_handler))
        .fallback(handler_404)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

fn create_api_routes() -> Router<AppState> {
    use crate::_api::projects::by_project_id as project;

    Router::new()
        .route("/profile", put(_api::profile::put))
        .route("/projects", post(_api::projects::post))
        .route("/projects/memberships", get(_api::projects::memberships::get))
        .route("/projects/{project_id}/apply", post(project::apply::post))
        .route("/projects/{project_id}/invitations", post(project::invitations::post))
        .route(
            "/projects/{project_id}/invitations/{member_id}",
            delete(project::invitations::delete),
        )
        .route(
            "/projects/{project_id}/invitations/{member_id}/accept",
            post(project::invitations::accept),
        )
        .route("/projects/{project_id}/requests", get(project::requests::get))
        .route("/projects/{project_id}/requests/{member_id}", delete(project::requests::delete))
        .route(
            "/projects/{project_id}/requests/{member_id}/accept",
            post(project::requests::accept),
        )
        .route("/projects/{project_id}/members", get(project::members::get))
        .route("/projects/{project_id}/members/{member_id}", delete(project::members::delete))
        .route("/projects/{project_id}/mentors", post(project::mentors::post))
        .route(
            "/projects/{project_id}/messages",
            get(project::messages::get).post(project::messages::post),
        )
        .route(
            "/projects/{project_id}/tasks",
            get(project::tasks::get).post(project::tasks::post),
        )
        .route(
            "/projects/{project_id}/tasks/{task_id}",
            patch(project::tasks::patch).delete(project::tasks::delete),
        )
        .route("/projects/{project_id}/rate", post(project::rate::post))
}

async fn handler_404(uri: Uri) -> ApiError {
    ApiError::not_found(format!("no route for {}", uri.path()))
}
