use chrono::Utc;
use serde::Deserialize;
use surrealdb::{Connection, Surreal};
use teamroom_entity::types::{MembershipStatus, ProjectMember, ProjectRole};
use tracing::debug;

use crate::repository::error::RepositoryError;
use crate::repository::locks::ProjectLocks;

const TABLE: &str = "project_member";

/// A guarded state change on an existing ledger record.
///
/// The precondition is evaluated against a fresh read taken while the
/// project's lock is held, so two racing callers cannot both pass it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerTransition {
    /// `from -> accepted`, committed only while accepted count < `max_members`
    Accept { from: MembershipStatus, max_members: u32 },
    /// `member -> mentor` on an accepted record, committed only while mentor count < `max_mentors`
    PromoteMentor { max_mentors: u32 },
}

#[derive(Debug, Deserialize)]
struct CountRow {
    total: u32,
}

#[derive(Debug, Deserialize)]
struct AverageRow {
    average: f64,
}

/// The membership ledger: one record per (project, member) pair.
///
/// Every write for a project runs inside that project's critical section.
pub struct ProjectMemberRepository<C: Connection> {
    db: Surreal<C>,
    locks: ProjectLocks,
}

impl<C: Connection> Clone for ProjectMemberRepository<C> {
    fn clone(&self) -> Self {
        Self { db: self.db.clone(), locks: self.locks.clone() }
    }
}

impl<C: Connection> ProjectMemberRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db, locks: ProjectLocks::new() }
    }

    /// Insert a new pending or invited record.
    ///
    /// With `seat_limit` set the write only commits while the project has fewer
    /// accepted records than the limit. Leader records are only written together
    /// with their project.
    pub async fn create(
        &self,
        member: ProjectMember,
        seat_limit: Option<u32>,
    ) -> Result<ProjectMember, RepositoryError> {
        if member.is_leader() {
            return Err(RepositoryError::validation(
                "role",
                "leader records are created with their project",
            ));
        }
        if member.is_accepted() && seat_limit.is_none() {
            return Err(RepositoryError::validation(
                "status",
                "accepted records need a seat limit",
            ));
        }

        let _guard = self.locks.lock(&member.project_id).await;

        if let Some(limit) = seat_limit {
            let accepted = self.count_accepted(&member.project_id).await?;
            if accepted >= limit {
                return Err(RepositoryError::capacity(format!(
                    "project {} has {} of {} seats taken",
                    member.project_id, accepted, limit
                )));
            }
        }

        if self.find(&member.project_id, &member.member_id).await?.is_some() {
            return Err(RepositoryError::conflict(format!(
                "{} already has a membership record in {}",
                member.member_id, member.project_id
            )));
        }

        let created: Option<ProjectMember> =
            self.db.create((TABLE, member.key())).content(member).await?;

        let created = created.ok_or_else(|| {
            RepositoryError::write_failed("create membership record")
        })?;
        debug!(
            project_id = %created.project_id,
            member_id = %created.member_id,
            status = %created.status,
            "Membership record created"
        );
        Ok(created)
    }

    pub async fn find(
        &self,
        project_id: &str,
        member_id: &str,
    ) -> Result<Option<ProjectMember>, RepositoryError> {
        let record: Option<ProjectMember> =
            self.db.select((TABLE, ProjectMember::record_key(project_id, member_id))).await?;
        Ok(record)
    }

    pub async fn transition(
        &self,
        project_id: &str,
        member_id: &str,
        transition: LedgerTransition,
    ) -> Result<ProjectMember, RepositoryError> {
        let _guard = self.locks.lock(project_id).await;

        let mut record = self
            .find(project_id, member_id)
            .await?
            .ok_or_else(|| RepositoryError::not_found("project_member", ProjectMember::record_key(project_id, member_id)))?;

        match transition {
            LedgerTransition::Accept { from, max_members } => {
                if record.status != from {
                    return Err(RepositoryError::conflict(format!(
                        "record is {} but {} was expected",
                        record.status, from
                    )));
                }
                let accepted = self.count_accepted(project_id).await?;
                if accepted >= max_members {
                    return Err(RepositoryError::capacity(format!(
                        "project {} has {} of {} seats taken",
                        project_id, accepted, max_members
                    )));
                }
                record.status = MembershipStatus::Accepted;
            },
            LedgerTransition::PromoteMentor { max_mentors } => {
                if !record.is_accepted() {
                    return Err(RepositoryError::forbidden("only accepted members can be promoted"));
                }
                match record.role {
                    ProjectRole::Leader => {
                        return Err(RepositoryError::forbidden("the leader cannot be promoted"));
                    },
                    ProjectRole::Mentor => {
                        return Err(RepositoryError::conflict(format!(
                            "{} is already a mentor",
                            member_id
                        )));
                    },
                    ProjectRole::Member => {},
                }
                let mentors = self.count_mentors(project_id).await?;
                if mentors >= max_mentors {
                    return Err(RepositoryError::capacity(format!(
                        "project {} already has {} mentors",
                        project_id, mentors
                    )));
                }
                record.role = ProjectRole::Mentor;
            },
        }
        record.updated_at = Utc::now();

        let updated: Option<ProjectMember> =
            self.db.update((TABLE, record.key())).content(record).await?;
        let updated = updated.ok_or_else(|| {
            RepositoryError::write_failed("update membership record")
        })?;
        debug!(
            project_id = %updated.project_id,
            member_id = %updated.member_id,
            status = %updated.status,
            role = %updated.role,
            "Membership record updated"
        );
        Ok(updated)
    }

    /// Delete a record whose status is one of `allowed`. Leader records are never deleted.
    pub async fn delete(
        &self,
        project_id: &str,
        member_id: &str,
        allowed: &[MembershipStatus],
    ) -> Result<ProjectMember, RepositoryError> {
        let _guard = self.locks.lock(project_id).await;

        let key = ProjectMember::record_key(project_id, member_id);
        let record = self
            .find(project_id, member_id)
            .await?
            .ok_or_else(|| RepositoryError::not_found("project_member", key.clone()))?;

        if record.is_leader() {
            return Err(RepositoryError::forbidden("the leader record cannot be removed"));
        }
        if !allowed.contains(&record.status) {
            return Err(RepositoryError::conflict(format!(
                "record is {} and cannot be removed here",
                record.status
            )));
        }

        let deleted: Option<ProjectMember> = self.db.delete((TABLE, key)).await?;
        let deleted = deleted.ok_or_else(|| {
            RepositoryError::write_failed("delete membership record")
        })?;
        debug!(project_id, member_id, "Membership record deleted");
        Ok(deleted)
    }

    /// Record `member_id`'s one rating of the project and return the new project average.
    ///
    /// Only accepted records may rate, and only once.
    pub async fn mark_rated(
        &self,
        project_id: &str,
        member_id: &str,
        rating: u8,
    ) -> Result<f64, RepositoryError> {
        if !(1..=5).contains(&rating) {
            return Err(RepositoryError::validation("rating", "must be between 1 and 5"));
        }

        let _guard = self.locks.lock(project_id).await;

        let mut record = match self.find(project_id, member_id).await? {
            Some(record) if record.is_accepted() => record,
            _ => {
                return Err(RepositoryError::forbidden("only accepted members can rate a project"));
            },
        };
        if record.has_rated {
            return Err(RepositoryError::forbidden(format!(
                "{} has already rated {}",
                member_id, project_id
            )));
        }

        record.has_rated = true;
        record.rating = Some(rating);
        record.updated_at = Utc::now();
        let updated: Option<ProjectMember> =
            self.db.update((TABLE, record.key())).content(record).await?;
        if updated.is_none() {
            return Err(RepositoryError::write_failed("update membership rating"));
        }

        let mut response = self
            .db
            .query(
                "SELECT math::mean(rating) AS average FROM project_member WHERE project_id = $project_id AND has_rated = true GROUP ALL",
            )
            .bind(("project_id", project_id.to_string()))
            .await?;
        let row: Option<AverageRow> = response.take(0)?;
        let average = row.map(|r| r.average).unwrap_or(f64::from(rating));

        self.db
            .query("UPDATE type::thing('project', $project_id) SET rating = $average")
            .bind(("project_id", project_id.to_string()))
            .bind(("average", average))
            .await?
            .check()?;

        debug!(project_id, member_id, rating, average, "Project rated");
        Ok(average)
    }

    pub async fn count_accepted(&self, project_id: &str) -> Result<u32, RepositoryError> {
        let mut response = self
            .db
            .query(
                "SELECT count() AS total FROM project_member WHERE project_id = $project_id AND status = $status GROUP ALL",
            )
            .bind(("project_id", project_id.to_string()))
            .bind(("status", MembershipStatus::Accepted.as_str().to_string()))
            .await?;
        let row: Option<CountRow> = response.take(0)?;
        Ok(row.map(|r| r.total).unwrap_or(0))
    }

    pub async fn count_mentors(&self, project_id: &str) -> Result<u32, RepositoryError> {
        let mut response = self
            .db
            .query(
                "SELECT count() AS total FROM project_member WHERE project_id = $project_id AND role = $role GROUP ALL",
            )
            .bind(("project_id", project_id.to_string()))
            .bind(("role", ProjectRole::Mentor.as_str().to_string()))
            .await?;
        let row: Option<CountRow> = response.take(0)?;
        Ok(row.map(|r| r.total).unwrap_or(0))
    }

    /// Every record naming `member_id`, across projects
    pub async fn list_for_member(
        &self,
        member_id: &str,
    ) -> Result<Vec<ProjectMember>, RepositoryError> {
        let records: Vec<ProjectMember> = self
            .db
            .query("SELECT * FROM project_member WHERE member_id = $member_id ORDER BY created_at ASC")
            .bind(("member_id", member_id.to_string()))
            .await?
            .take(0)?;
        Ok(records)
    }

    pub async fn list_for_project(
        &self,
        project_id: &str,
        status: MembershipStatus,
    ) -> Result<Vec<ProjectMember>, RepositoryError> {
        let records: Vec<ProjectMember> = self
            .db
            .query(
                "SELECT * FROM project_member WHERE project_id = $project_id AND status = $status ORDER BY created_at ASC",
            )
            .bind(("project_id", project_id.to_string()))
            .bind(("status", status.as_str().to_string()))
            .await?
            .take(0)?;
        Ok(records)
    }
}
