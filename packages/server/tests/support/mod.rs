#![allow(dead_code)]

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
};
use chrono::Duration;
use serde_json::Value;
use teamroom_server::{config::ServerConfig, create_app, membership::CreateProject, state::AppState};
use teamroom_surrealdb::test_utils::TestDatabase;
use tower::ServiceExt;

pub struct TestServer {
    pub app: Router,
    pub state: AppState,
    _db: TestDatabase,
}

impl TestServer {
    pub async fn new() -> Self {
        let db = TestDatabase::new().await.expect("test database");
        let state = AppState::new(db.db.clone(), ServerConfig::default());
        let app = create_app(state.clone());
        Self { app, state, _db: db }
    }

    pub fn token(&self, user_id: &str) -> String {
        self.state.session_service.issue_token(user_id, Duration::hours(1)).expect("token")
    }

    pub async fn project(&self, leader: &str, max_members: u32) -> String {
        let request = CreateProject {
            title: "Integration project".to_string(),
            description: None,
            max_members: Some(max_members),
        };
        let (project, _) = self.state.workflow.create_project(leader, request).await.expect("project");
        project.project_id
    }

    /// Send a request as `user_id` (or anonymously) and decode the JSON reply
    pub async fn call(
        &self,
        method: Method,
        uri: &str,
        user_id: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(user_id) = user_id {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", self.token(user_id)));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .expect("request"),
            None => builder.body(Body::empty()).expect("request"),
        };
        self.send(request).await
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.app.clone().oneshot(request).await.expect("response");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }
}
