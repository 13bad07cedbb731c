use teamroom_surrealdb::test_utils::TestDatabase;

use crate::config::ServerConfig;
use crate::membership::CreateProject;
use crate::state::AppState;

/// App state on its own in-memory database
pub struct TestApp {
    pub state: AppState,
    _db: TestDatabase,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_config(ServerConfig::default()).await
    }

    pub async fn with_config(config: ServerConfig) -> Self {
        let db = TestDatabase::new().await.expect("test database");
        let state = AppState::new(db.db.clone(), config);
        Self { state, _db: db }
    }

    /// Create a project led by `leader` and return its id
    pub async fn project(&self, leader: &str, max_members: u32) -> String {
        let request = CreateProject {
            title: "Test project".to_string(),
            description: None,
            max_members: Some(max_members),
        };
        let (project, _) = self.state.workflow.create_project(leader, request).await.unwrap();
        project.project_id
    }

    /// Invite `member_id` and have them accept
    pub async fn member(&self, project_id: &str, leader: &str, member_id: &str) {
        self.state.workflow.invite(leader, project_id, member_id).await.unwrap();
        self.state.workflow.accept_invite(member_id, project_id, member_id).await.unwrap();
    }
}
