//! # Blocking API
//!
//! Synchronous wrappers for callers without an async runtime. Each call runs the
//! async operation to completion on a runtime owned by [`BlockingRuntime`], so the
//! behavior is exactly that of the async API.
//!
//! Connections must be created through [`BlockingRuntime::connect`] so the pool lives
//! on the same runtime that drives it. Calling into this module from inside another
//! Tokio runtime panics.
//!
//! ```rust,ignore
//! let runtime = Arc::new(BlockingRuntime::new()?);
//! let db = runtime.connect(&config.database)?;
//! let venues = BlockingRepository::<Venue>::new(Arc::clone(&runtime), db);
//! let hall = venues.get_by_business_code("HALL-1")?;
//! ```

use crate::config::DatabaseConfig;
use crate::database::DatabaseConnection;
use crate::error::{BizError, Result};
use crate::models::{Entity, ObjectStatusAuditTrail, StatusAction, WorkflowEntity, WorkflowHistory};
use crate::query_builder::{Page, Pagination};
use crate::repository::{GenericRepository, SearchCriteria};
use crate::running_number::ReservationProvider;
use crate::workflow::{TransitionOutcome, TransitionTable, UserContext, WorkflowTransitionEngine};
use std::future::Future;
use std::sync::Arc;
use tracing::info;

/// Multi-threaded Tokio runtime driving the blocking wrappers
#[derive(Debug)]
pub struct BlockingRuntime {
    runtime: tokio::runtime::Runtime,
}

impl BlockingRuntime {
    pub fn new() -> Result<Self> {
        Self::with_worker_threads(2)
    }

    pub fn with_worker_threads(worker_threads: usize) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .worker_threads(worker_threads.max(1))
            .thread_name("bizcore-blocking")
            .build()
            .map_err(|e| BizError::Runtime(format!("failed to build runtime: {e}")))?;
        info!(worker_threads = worker_threads.max(1), "Blocking runtime started");
        Ok(Self { runtime })
    }

    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    pub fn connect(&self, config: &DatabaseConfig) -> Result<DatabaseConnection> {
        self.block_on(DatabaseConnection::from_config(config))
    }
}

/// Blocking [`GenericRepository`]
pub struct BlockingRepository<E: Entity> {
    runtime: Arc<BlockingRuntime>,
    inner: GenericRepository<E>,
}

impl<E: Entity> BlockingRepository<E> {
    pub fn new(runtime: Arc<BlockingRuntime>, db: DatabaseConnection) -> Self {
        Self {
            runtime,
            inner: GenericRepository::new(db),
        }
    }

    pub fn inner(&self) -> &GenericRepository<E> {
        &self.inner
    }

    pub fn get_by_id(&self, id: i64) -> Result<Option<E>> {
        self.runtime.block_on(self.inner.get_by_id(id))
    }

    pub fn get_by_business_code(&self, code: &str) -> Result<Option<E>> {
        self.runtime.block_on(self.inner.get_by_business_code(code))
    }

    pub fn get_all(&self) -> Result<Vec<E>> {
        self.runtime.block_on(self.inner.get_all())
    }

    pub fn search(&self, criteria: &SearchCriteria) -> Result<Vec<E>> {
        self.runtime.block_on(self.inner.search(criteria))
    }

    pub fn count(&self, criteria: &SearchCriteria) -> Result<i64> {
        self.runtime.block_on(self.inner.count(criteria))
    }

    pub fn search_page(&self, criteria: &SearchCriteria) -> Result<Page<E>> {
        self.runtime.block_on(self.inner.search_page(criteria))
    }

    pub fn quick_search(&self, text: &str, pagination: Pagination) -> Result<Vec<E>> {
        self.runtime.block_on(self.inner.quick_search(text, pagination))
    }

    pub fn quick_search_count(&self, text: &str) -> Result<i64> {
        self.runtime.block_on(self.inner.quick_search_count(text))
    }

    pub fn duplicate_code_check(&self, id: Option<i64>, code: &str) -> Result<bool> {
        self.runtime.block_on(self.inner.duplicate_code_check(id, code))
    }

    pub fn insert(&self, entity: &mut E, acting_user: &dyn UserContext) -> Result<i64> {
        self.runtime.block_on(self.inner.insert(entity, acting_user))
    }

    pub fn update(&self, entity: &mut E, acting_user: &dyn UserContext) -> Result<bool> {
        self.runtime.block_on(self.inner.update(entity, acting_user))
    }

    pub fn soft_delete(&self, id: i64, acting_user: &dyn UserContext) -> Result<bool> {
        self.runtime.block_on(self.inner.soft_delete(id, acting_user))
    }

    pub fn hard_delete(&self, id: i64) -> Result<bool> {
        self.runtime.block_on(self.inner.hard_delete(id))
    }
}

/// Blocking [`WorkflowTransitionEngine`]
pub struct BlockingWorkflowEngine<E: Entity> {
    runtime: Arc<BlockingRuntime>,
    inner: WorkflowTransitionEngine<E>,
}

impl<E: Entity> BlockingWorkflowEngine<E> {
    pub fn new(
        runtime: Arc<BlockingRuntime>,
        db: DatabaseConnection,
        transitions: Arc<dyn TransitionTable>,
    ) -> Self {
        Self {
            runtime,
            inner: WorkflowTransitionEngine::new(db, transitions),
        }
    }

    pub fn with_reservations(mut self, reservations: Arc<dyn ReservationProvider>) -> Self {
        self.inner = self.inner.with_reservations(reservations);
        self
    }

    pub fn inner(&self) -> &WorkflowTransitionEngine<E> {
        &self.inner
    }

    pub fn record_status_change(
        &self,
        entity_id: i64,
        action: StatusAction,
        acting_user: &dyn UserContext,
        remark: Option<&str>,
    ) -> Result<ObjectStatusAuditTrail> {
        self.runtime
            .block_on(self.inner.record_status_change(entity_id, action, acting_user, remark))
    }

    pub fn history(&self, entity_id: i64) -> Result<Vec<WorkflowHistory>> {
        self.runtime.block_on(self.inner.history(entity_id))
    }

    pub fn status_trail(&self, entity_id: i64) -> Result<Vec<ObjectStatusAuditTrail>> {
        self.runtime.block_on(self.inner.status_trail(entity_id))
    }
}

impl<E: WorkflowEntity> BlockingWorkflowEngine<E> {
    pub fn save_and_transit(
        &self,
        entity: &mut E,
        acting_user: &dyn UserContext,
        target_user: Option<i64>,
        action: &str,
        remark: Option<&str>,
    ) -> Result<TransitionOutcome> {
        self.runtime.block_on(self.inner.save_and_transit(
            entity,
            acting_user,
            target_user,
            action,
            remark,
        ))
    }
}
