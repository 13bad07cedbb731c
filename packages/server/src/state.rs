use std::sync::Arc;

use surrealdb::{Surreal, engine::any::Any};
use teamroom_surrealdb::repository::{
    MessageRepository, ProjectMemberRepository, ProjectRepository, TaskRepository,
    UserProfileRepository,
};

use crate::auth::SessionService;
use crate::config::ServerConfig;
use crate::membership::{MembershipWorkflow, WorkflowLimits};
use crate::project_tasks::TaskService;
use crate::room::{AuthorizationResolver, BroadcastRouter, RoomRegistry};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub session_service: Arc<SessionService>,
    pub resolver: AuthorizationResolver,
    pub registry: RoomRegistry,
    pub router: BroadcastRouter,
    pub workflow: MembershipWorkflow,
    pub tasks: TaskService,
    pub messages: MessageRepository<Any>,
    pub profiles: UserProfileRepository<Any>,
}

impl AppState {
    pub fn new(db: Surreal<Any>, config: ServerConfig) -> Self {
        let session_service = Arc::new(SessionService::new(&config.jwt_secret));

        // One ledger instance, so every writer shares its per-project locks
        let members = ProjectMemberRepository::new(db.clone());
        let projects = ProjectRepository::new(db.clone());
        let messages = MessageRepository::new(db.clone());
        let profiles = UserProfileRepository::new(db.clone());

        let resolver = AuthorizationResolver::new(projects.clone(), members.clone());
        let registry = RoomRegistry::new();
        let router = BroadcastRouter::new(
            resolver.clone(),
            messages.clone(),
            profiles.clone(),
            registry.clone(),
            config.max_message_length,
        );
        let workflow = MembershipWorkflow::new(
            projects.clone(),
            members,
            resolver.clone(),
            registry.clone(),
            WorkflowLimits {
                default_max_members: config.default_max_members,
                max_mentors_per_project: config.max_mentors_per_project,
                max_projects_per_leader: config.max_projects_per_leader,
            },
        );
        let tasks = TaskService::new(projects, TaskRepository::new(db.clone()), resolver.clone());

        Self {
            config: Arc::new(config),
            session_service,
            resolver,
            registry,
            router,
            workflow,
            tasks,
            messages,
            profiles,
        }
    }
}
