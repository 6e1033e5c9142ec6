use super::audit_trail::AuditTrailWriter;
use super::transition_table::{StaticTransitionTable, TransitionTable};
use super::user::UserContext;
use crate::constants::actions;
use crate::database::{finish_transaction, DatabaseConnection};
use crate::error::{BizError, Result};
use crate::logging::log_workflow_transition;
use crate::models::audit::now;
use crate::models::{
    Entity, ObjectStatusAuditTrail, StatusAction, WorkflowEntity, WorkflowHistory,
};
use crate::repository::GenericRepository;
use crate::running_number::{
    NoReservations, ReservationProvider, ReservedNumber, RunningNumberAllocator,
};
use serde::{Deserialize, Serialize};
use sqlx::AnyConnection;
use std::sync::Arc;
use tracing::{debug, info};

/// Result of a committed transition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionOutcome {
    pub entity_id: i64,
    pub object_code: Option<String>,
    pub created: bool,
    pub history: WorkflowHistory,
}

impl TransitionOutcome {
    pub fn from_status(&self) -> &str {
        &self.history.from_status
    }

    pub fn to_status(&self) -> &str {
        &self.history.to_status
    }
}

/// A transition resolved before the transaction opens
struct PlannedTransition {
    action: String,
    from_status: String,
    to_status: String,
    assignee: Option<i64>,
}

/// Saves an entity and moves it through its workflow in one transaction.
///
/// Every statement of a transition (code allocation, insert or update, history row)
/// runs on one connection inside one transaction. A failure anywhere rolls the whole
/// transaction back and leaves the caller's entity untouched.
pub struct WorkflowTransitionEngine<E: Entity> {
    db: DatabaseConnection,
    repository: GenericRepository<E>,
    allocator: RunningNumberAllocator,
    transitions: Arc<dyn TransitionTable>,
    reservations: Arc<dyn ReservationProvider>,
    audit: AuditTrailWriter,
}

impl<E: Entity> Clone for WorkflowTransitionEngine<E> {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
            repository: self.repository.clone(),
            allocator: self.allocator.clone(),
            transitions: Arc::clone(&self.transitions),
            reservations: Arc::clone(&self.reservations),
            audit: self.audit,
        }
    }
}

impl<E: Entity> std::fmt::Debug for WorkflowTransitionEngine<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkflowTransitionEngine")
            .field("entity", &E::OBJECT_TYPE)
            .field("dialect", &self.db.dialect())
            .finish()
    }
}

impl<E: Entity> WorkflowTransitionEngine<E> {
    pub fn new(db: DatabaseConnection, transitions: Arc<dyn TransitionTable>) -> Self {
        Self {
            repository: GenericRepository::new(db.clone()),
            allocator: RunningNumberAllocator::new(db.clone()),
            audit: AuditTrailWriter::new(db.dialect()),
            transitions,
            reservations: Arc::new(NoReservations),
            db,
        }
    }

    /// Engine for entity types without a workflow; only status changes and trail
    /// queries are meaningful.
    pub fn for_status_changes(db: DatabaseConnection) -> Self {
        Self::new(db, Arc::new(StaticTransitionTable::new()))
    }

    pub fn with_reservations(mut self, reservations: Arc<dyn ReservationProvider>) -> Self {
        self.reservations = reservations;
        self
    }

    pub fn repository(&self) -> &GenericRepository<E> {
        &self.repository
    }

    pub fn allocator(&self) -> &RunningNumberAllocator {
        &self.allocator
    }

    /// Register, activate or terminate a live entity and append the status trail row.
    ///
    /// Termination also soft-deletes the entity.
    pub async fn record_status_change(
        &self,
        entity_id: i64,
        action: StatusAction,
        acting_user: &dyn UserContext,
        remark: Option<&str>,
    ) -> Result<ObjectStatusAuditTrail> {
        let user_id = acting_user.resolved_user_id()?;
        let mut tx = self.db.begin().await?;
        let result = self
            .record_status_change_in(&mut tx, entity_id, action, acting_user, user_id, remark)
            .await;
        let trail = finish_transaction(tx, result, "record_status_change").await?;

        info!(
            entity_type = E::OBJECT_TYPE,
            entity_id = entity_id,
            action = %action,
            user_id = user_id,
            "Status change recorded"
        );
        Ok(trail)
    }

    async fn record_status_change_in(
        &self,
        conn: &mut AnyConnection,
        entity_id: i64,
        action: StatusAction,
        acting_user: &dyn UserContext,
        user_id: i64,
        remark: Option<&str>,
    ) -> Result<ObjectStatusAuditTrail> {
        let changed = match action {
            StatusAction::Terminate => {
                self.repository
                    .soft_delete_in(conn, entity_id, acting_user)
                    .await?
            }
            StatusAction::Register | StatusAction::Activate => {
                self.repository.touch_in(conn, entity_id, acting_user).await?
            }
        };
        if !changed {
            return Err(BizError::NoRowsAffected(format!(
                "{} {entity_id} for {action}",
                E::OBJECT_TYPE
            )));
        }

        let at = now();
        let mut trail = ObjectStatusAuditTrail {
            id: None,
            object_id: entity_id,
            object_type: E::OBJECT_TYPE.to_string(),
            user_id,
            status_action: action,
            remark: remark.map(str::to_string),
            created_at: at,
            modified_at: at,
        };
        self.audit.insert_status_change(conn, &mut trail).await?;
        Ok(trail)
    }

    /// Workflow history of one entity, oldest first.
    pub async fn history(&self, entity_id: i64) -> Result<Vec<WorkflowHistory>> {
        let mut conn = self.db.acquire().await?;
        self.audit
            .history_for(&mut conn, E::OBJECT_TYPE, entity_id)
            .await
    }

    /// Status trail of one entity, oldest first.
    pub async fn status_trail(&self, entity_id: i64) -> Result<Vec<ObjectStatusAuditTrail>> {
        let mut conn = self.db.acquire().await?;
        self.audit
            .status_trail_for(&mut conn, E::OBJECT_TYPE, entity_id)
            .await
    }
}

impl<E: WorkflowEntity> WorkflowTransitionEngine<E> {
    /// Persist `entity` and apply `action` to it.
    ///
    /// New entities (no id) get a business code when none is set, from the acting
    /// user's reservation if one exists and otherwise from the allocator, and are
    /// inserted. Existing entities are updated; zero affected rows fails with
    /// `NoRowsAffected`. Assignment actions also write the assignment fields:
    /// `SELF_PICKUP` assigns the acting user, `ASSIGN` and `TRANSFER` the target user.
    /// A history row is written in the same transaction, and a reservation is claimed
    /// only after that row is in.
    ///
    /// `entity` is replaced with the saved state only after commit.
    pub async fn save_and_transit(
        &self,
        entity: &mut E,
        acting_user: &dyn UserContext,
        target_user: Option<i64>,
        action: &str,
        remark: Option<&str>,
    ) -> Result<TransitionOutcome> {
        let user_id = acting_user.resolved_user_id()?;
        let plan = self.plan(entity, user_id, target_user, action)?;

        let mut working = entity.clone();
        let mut tx = self.db.begin().await?;
        let result = self
            .transit_in(&mut tx, &mut working, acting_user, user_id, target_user, &plan, remark)
            .await;
        let outcome = finish_transaction(tx, result, "save_and_transit").await?;

        *entity = working;
        log_workflow_transition(
            E::OBJECT_TYPE,
            outcome.entity_id,
            &plan.action,
            &plan.from_status,
            &plan.to_status,
            user_id,
        );
        Ok(outcome)
    }

    fn plan(
        &self,
        entity: &E,
        user_id: i64,
        target_user: Option<i64>,
        action: &str,
    ) -> Result<PlannedTransition> {
        if E::OBJECT_TYPE.trim().is_empty() {
            return Err(BizError::Validation(
                "entity type declares no object type".to_string(),
            ));
        }
        let action = action.trim();
        if action.is_empty() {
            return Err(BizError::Validation("workflow action is empty".to_string()));
        }

        let from_status = if entity.audit().is_new() {
            String::new()
        } else {
            entity.workflow_status().trim().to_string()
        };
        let to_status = self
            .transitions
            .resolve(E::OBJECT_TYPE, &from_status, action)?;

        let assignee = match action {
            actions::SELF_PICKUP => Some(user_id),
            actions::ASSIGN | actions::TRANSFER => Some(target_user.ok_or_else(|| {
                BizError::Validation(format!("{action} needs a target user"))
            })?),
            _ => None,
        };

        Ok(PlannedTransition {
            action: action.to_string(),
            from_status,
            to_status,
            assignee,
        })
    }

    #[allow(clippy::too_many_arguments)]
    async fn transit_in(
        &self,
        conn: &mut AnyConnection,
        entity: &mut E,
        acting_user: &dyn UserContext,
        user_id: i64,
        target_user: Option<i64>,
        plan: &PlannedTransition,
        remark: Option<&str>,
    ) -> Result<TransitionOutcome> {
        let at = now();
        entity.set_workflow_status(&plan.to_status);
        if let Some(assignee) = plan.assignee {
            match entity.assignment_mut() {
                Some(assignment) => assignment.assign(assignee, at),
                None => debug!(
                    entity_type = E::OBJECT_TYPE,
                    action = %plan.action,
                    "Entity type has no assignment fields"
                ),
            }
        }

        let created = entity.audit().is_new();
        let (entity_id, reservation) = if created {
            self.insert_new(conn, entity, acting_user, user_id).await?
        } else {
            let id = entity.id().ok_or_else(|| {
                BizError::Mapping(format!("{} without id", E::OBJECT_TYPE))
            })?;
            if !self.repository.update_in(conn, entity, acting_user).await? {
                return Err(BizError::NoRowsAffected(format!(
                    "{} {id} for {}",
                    E::OBJECT_TYPE,
                    plan.action
                )));
            }
            (id, None)
        };

        let mut history = WorkflowHistory {
            id: None,
            object_id: entity_id,
            object_type: E::OBJECT_TYPE.to_string(),
            user_id,
            org_unit_id: acting_user.org_unit_id(),
            target_user_id: target_user,
            from_status: plan.from_status.clone(),
            to_status: plan.to_status.clone(),
            action_code: plan.action.clone(),
            remark: remark.map(str::to_string),
            created_at: at,
            modified_at: at,
        };
        self.audit.insert_history(conn, &mut history).await?;

        // Claimed last: a provider claim may survive a rollback.
        if let Some(reserved) = reservation {
            self.reservations.claim(conn, &reserved, entity_id).await?;
        }

        Ok(TransitionOutcome {
            entity_id,
            object_code: entity.audit().object_code.clone(),
            created,
            history,
        })
    }

    async fn insert_new(
        &self,
        conn: &mut AnyConnection,
        entity: &mut E,
        acting_user: &dyn UserContext,
        user_id: i64,
    ) -> Result<(i64, Option<ReservedNumber>)> {
        let has_code = entity
            .audit()
            .object_code
            .as_deref()
            .is_some_and(|code| !code.trim().is_empty());

        let mut reservation = None;
        if !has_code {
            let code = match self
                .reservations
                .find_reserved(conn, user_id, E::OBJECT_TYPE)
                .await?
            {
                Some(reserved) => {
                    let code = reserved.code.clone();
                    reservation = Some(reserved);
                    code
                }
                None => self.allocator.allocate(conn, E::OBJECT_TYPE).await?,
            };
            entity.audit_mut().object_code = Some(code);
        }

        let id = self.repository.insert_in(conn, entity, acting_user).await?;
        Ok((id, reservation))
    }
}
