//! Membership state machine for one (project, member) pair:
//!
//! ```text
//! none --apply--> pending --accept_application--> accepted --remove_member--> none
//! none --invite--> invited --accept_invite------> accepted
//! pending | invited --reject--> none
//! accepted member --promote_mentor--> accepted mentor
//! ```
//!
//! Every operation resolves the actor's permissions before the ledger is touched.

use serde::{Deserialize, Serialize};
use surrealdb::engine::any::Any;
use teamroom_entity::types::{
    MembershipOverview, MembershipStatus, Project, ProjectMember, ProjectPermissions,
};
use teamroom_surrealdb::repository::{LedgerTransition, ProjectMemberRepository, ProjectRepository};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::ApiError;
use crate::room::{AuthorizationResolver, RoomRegistry};

#[derive(Debug, Clone, Deserialize)]
pub struct CreateProject {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub max_members: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectRating {
    pub project_id: String,
    pub average_rating: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct WorkflowLimits {
    pub default_max_members: u32,
    pub max_mentors_per_project: u32,
    pub max_projects_per_leader: u32,
}

#[derive(Clone)]
pub struct MembershipWorkflow {
    projects: ProjectRepository<Any>,
    members: ProjectMemberRepository<Any>,
    resolver: AuthorizationResolver,
    registry: RoomRegistry,
    limits: WorkflowLimits,
}

impl MembershipWorkflow {
    pub fn new(
        projects: ProjectRepository<Any>,
        members: ProjectMemberRepository<Any>,
        resolver: AuthorizationResolver,
        registry: RoomRegistry,
        limits: WorkflowLimits,
    ) -> Self {
        Self { projects, members, resolver, registry, limits }
    }

    pub async fn create_project(
        &self,
        leader_id: &str,
        request: CreateProject,
    ) -> Result<(Project, ProjectMember), ApiError> {
        let max_members = request.max_members.unwrap_or(self.limits.default_max_members);
        let mut project =
            Project::new(Uuid::new_v4().to_string(), request.title.trim(), leader_id, max_members);
        if let Some(description) = request.description {
            project = project.with_description(description);
        }

        Ok(self
            .projects
            .create_with_leader(project, self.limits.max_projects_per_leader)
            .await?)
    }

    /// `none -> pending`. Capacity is left to the leader's accept.
    pub async fn apply(&self, actor: &str, project_id: &str) -> Result<ProjectMember, ApiError> {
        self.projects.require(project_id).await?;
        let permissions = self.resolver.resolve(project_id, actor).await?;
        if permissions.exists {
            return Err(ApiError::Conflict(format!(
                "{} already has a membership record in {}",
                actor, project_id
            )));
        }

        let record = self.members.create(ProjectMember::application(project_id, actor), None).await?;
        info!(project_id, member_id = actor, "Application submitted");
        Ok(record)
    }

    /// `none -> invited`, leader only
    pub async fn invite(
        &self,
        actor: &str,
        project_id: &str,
        member_id: &str,
    ) -> Result<ProjectMember, ApiError> {
        let project = self.projects.require(project_id).await?;
        self.require_leader(project_id, actor, "invite").await?;

        let record = self
            .members
            .create(ProjectMember::invitation(project_id, member_id), Some(project.max_members))
            .await?;
        info!(project_id, member_id, invited_by = actor, "Invitation sent");
        Ok(record)
    }

    /// `invited -> accepted`, only by the invitee
    pub async fn accept_invite(
        &self,
        actor: &str,
        project_id: &str,
        member_id: &str,
    ) -> Result<ProjectMember, ApiError> {
        let project = self.projects.require(project_id).await?;
        let permissions = self.resolver.resolve(project_id, actor).await?;
        if actor != member_id {
            warn!(project_id, actor, member_id, "Invitation accept by someone else refused");
            return Err(ApiError::forbidden("only the invited user can accept an invitation"));
        }
        match permissions.status {
            None => return Err(ApiError::not_found(format!("no invitation for {} in {}", member_id, project_id))),
            Some(MembershipStatus::Invited) => {},
            Some(status) => {
                return Err(ApiError::forbidden(format!("record is {}, not invited", status)));
            },
        }

        let record = self
            .members
            .transition(project_id, member_id, LedgerTransition::Accept {
                from: MembershipStatus::Invited,
                max_members: project.max_members,
            })
            .await?;
        info!(project_id, member_id, "Invitation accepted");
        Ok(record)
    }

    /// `pending -> accepted`, leader only
    pub async fn accept_application(
        &self,
        actor: &str,
        project_id: &str,
        member_id: &str,
    ) -> Result<ProjectMember, ApiError> {
        let project = self.projects.require(project_id).await?;
        self.require_leader(project_id, actor, "accept applications").await?;

        let target = self.require_record(project_id, member_id).await?;
        match target.status {
            MembershipStatus::Pending => {},
            MembershipStatus::Accepted => {
                return Err(ApiError::Conflict(format!("{} is already a member", member_id)));
            },
            MembershipStatus::Invited => {
                return Err(ApiError::forbidden("an invitation can only be accepted by the invitee"));
            },
        }

        let record = self
            .members
            .transition(project_id, member_id, LedgerTransition::Accept {
                from: MembershipStatus::Pending,
                max_members: project.max_members,
            })
            .await?;
        info!(project_id, member_id, accepted_by = actor, "Application accepted");
        Ok(record)
    }

    /// `pending | invited -> none`.
    ///
    /// `expected` is the stage the caller is addressing. The leader may reject
    /// either stage; the invitee may decline their own invitation.
    pub async fn reject(
        &self,
        actor: &str,
        project_id: &str,
        member_id: &str,
        expected: MembershipStatus,
    ) -> Result<ProjectMember, ApiError> {
        self.projects.require(project_id).await?;
        let permissions = self.resolver.resolve(project_id, actor).await?;

        let target = self.require_record(project_id, member_id).await?;
        if target.is_accepted() {
            return Err(ApiError::forbidden("accepted members are removed, not rejected"));
        }
        if target.status != expected {
            return Err(ApiError::not_found(format!(
                "no {} record for {} in {}",
                expected, member_id, project_id
            )));
        }

        let declines_own_invite = expected == MembershipStatus::Invited && actor == member_id;
        if !permissions.can_manage_members && !declines_own_invite {
            warn!(project_id, actor, member_id, "Reject refused");
            return Err(ApiError::forbidden("only the leader or the invitee can reject"));
        }

        let record = self.members.delete(project_id, member_id, &[expected]).await?;
        info!(project_id, member_id, rejected_by = actor, status = %expected, "Membership rejected");
        Ok(record)
    }

    /// `accepted -> none`, leader only. Live connections of the removed user
    /// are dropped from the room.
    pub async fn remove_member(
        &self,
        actor: &str,
        project_id: &str,
        member_id: &str,
    ) -> Result<ProjectMember, ApiError> {
        self.projects.require(project_id).await?;
        self.require_leader(project_id, actor, "remove members").await?;

        let record = self.members.delete(project_id, member_id, &[MembershipStatus::Accepted]).await?;

        let _lane = self.registry.lane(project_id).await;
        let revoked = self.registry.revoke(project_id, member_id);
        info!(project_id, member_id, removed_by = actor, revoked, "Member removed");
        Ok(record)
    }

    /// `member -> mentor`, leader only. There is no way back.
    pub async fn promote_mentor(
        &self,
        actor: &str,
        project_id: &str,
        member_id: &str,
    ) -> Result<ProjectMember, ApiError> {
        self.projects.require(project_id).await?;
        self.require_leader(project_id, actor, "promote mentors").await?;

        let record = self
            .members
            .transition(project_id, member_id, LedgerTransition::PromoteMentor {
                max_mentors: self.limits.max_mentors_per_project,
            })
            .await?;
        info!(project_id, member_id, promoted_by = actor, "Member promoted to mentor");
        Ok(record)
    }

    /// One rating per accepted member; the project average is recomputed
    pub async fn rate(
        &self,
        actor: &str,
        project_id: &str,
        rating: i64,
    ) -> Result<ProjectRating, ApiError> {
        self.projects.require(project_id).await?;
        let rating = u8::try_from(rating)
            .ok()
            .filter(|r| (1..=5).contains(r))
            .ok_or_else(|| ApiError::bad_request("rating must be between 1 and 5"))?;

        let permissions = self.resolver.resolve(project_id, actor).await?;
        if !permissions.can_message {
            return Err(ApiError::forbidden("only accepted members can rate a project"));
        }

        let average_rating = self.members.mark_rated(project_id, actor, rating).await?;
        info!(project_id, member_id = actor, rating, average_rating, "Project rated");
        Ok(ProjectRating { project_id: project_id.to_string(), average_rating })
    }

    pub async fn list_members(
        &self,
        actor: &str,
        project_id: &str,
    ) -> Result<Vec<ProjectMember>, ApiError> {
        self.projects.require(project_id).await?;
        let permissions = self.resolver.resolve(project_id, actor).await?;
        if !permissions.can_message {
            return Err(ApiError::forbidden("only accepted members can list members"));
        }
        Ok(self.members.list_for_project(project_id, MembershipStatus::Accepted).await?)
    }

    pub async fn list_memberships(&self, actor: &str) -> Result<MembershipOverview, ApiError> {
        let records = self.members.list_for_member(actor).await?;
        Ok(MembershipOverview::from_records(records))
    }

    pub async fn list_pending_requests(
        &self,
        actor: &str,
        project_id: &str,
    ) -> Result<Vec<ProjectMember>, ApiError> {
        self.projects.require(project_id).await?;
        self.require_leader(project_id, actor, "list requests").await?;
        Ok(self.members.list_for_project(project_id, MembershipStatus::Pending).await?)
    }

    async fn require_leader(
        &self,
        project_id: &str,
        actor: &str,
        action: &str,
    ) -> Result<ProjectPermissions, ApiError> {
        let permissions = self.resolver.resolve(project_id, actor).await?;
        if !permissions.can_manage_members {
            warn!(project_id, actor, action, "Leader-only action refused");
            return Err(ApiError::forbidden(format!("only the project leader can {}", action)));
        }
        Ok(permissions)
    }

    async fn require_record(
        &self,
        project_id: &str,
        member_id: &str,
    ) -> Result<ProjectMember, ApiError> {
        self.members.find(project_id, member_id).await?.ok_or_else(|| {
            ApiError::not_found(format!("no membership record for {} in {}", member_id, project_id))
        })
    }
}
