//! Pre-reserved business codes.
//!
//! A user may hold a code reserved ahead of saving (for instance one printed on a
//! paper form). When such a reservation exists for the acting user and object class,
//! the workflow engine uses it instead of allocating and then claims it for the saved
//! object, inside the same transaction.

use crate::error::{BizError, Result};
use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use sqlx::AnyConnection;
use std::sync::atomic::{AtomicI64, Ordering};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservedNumber {
    pub reservation_id: i64,
    pub code: String,
    pub user_id: i64,
    pub object_class: String,
}

/// A claimed reservation and the object it was spent on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimedReservation {
    pub reservation: ReservedNumber,
    pub object_id: i64,
}

/// Source of pre-reserved codes.
///
/// Both calls receive the engine's open transaction so a store backed by the same
/// database commits or rolls back together with the save.
#[async_trait]
pub trait ReservationProvider: Send + Sync {
    async fn find_reserved(
        &self,
        conn: &mut AnyConnection,
        user_id: i64,
        object_class: &str,
    ) -> Result<Option<ReservedNumber>>;

    async fn claim(
        &self,
        conn: &mut AnyConnection,
        reservation: &ReservedNumber,
        object_id: i64,
    ) -> Result<()>;
}

/// No reservations; every code is allocated.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoReservations;

#[async_trait]
impl ReservationProvider for NoReservations {
    async fn find_reserved(
        &self,
        _conn: &mut AnyConnection,
        _user_id: i64,
        _object_class: &str,
    ) -> Result<Option<ReservedNumber>> {
        Ok(None)
    }

    async fn claim(
        &self,
        _conn: &mut AnyConnection,
        reservation: &ReservedNumber,
        _object_id: i64,
    ) -> Result<()> {
        Err(BizError::not_found("ReservedNumber", reservation.reservation_id))
    }
}

/// Process-local reservation store.
///
/// Claims are not transactional: a claim made by a transaction that later rolls back
/// stays claimed.
#[derive(Debug, Default)]
pub struct InMemoryReservationProvider {
    pending: DashMap<(i64, String), ReservedNumber>,
    claims: Mutex<Vec<ClaimedReservation>>,
    next_id: AtomicI64,
}

impl InMemoryReservationProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve `code` for `user_id`, replacing any earlier reservation for the class.
    pub fn reserve(&self, user_id: i64, object_class: &str, code: &str) -> ReservedNumber {
        let reservation = ReservedNumber {
            reservation_id: self.next_id.fetch_add(1, Ordering::Relaxed) + 1,
            code: code.to_string(),
            user_id,
            object_class: object_class.to_string(),
        };
        self.pending
            .insert((user_id, object_class.to_string()), reservation.clone());
        reservation
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn claims(&self) -> Vec<ClaimedReservation> {
        self.claims.lock().clone()
    }
}

#[async_trait]
impl ReservationProvider for InMemoryReservationProvider {
    async fn find_reserved(
        &self,
        _conn: &mut AnyConnection,
        user_id: i64,
        object_class: &str,
    ) -> Result<Option<ReservedNumber>> {
        Ok(self
            .pending
            .get(&(user_id, object_class.to_string()))
            .map(|entry| entry.value().clone()))
    }

    async fn claim(
        &self,
        _conn: &mut AnyConnection,
        reservation: &ReservedNumber,
        object_id: i64,
    ) -> Result<()> {
        let key = (reservation.user_id, reservation.object_class.clone());
        let (_, claimed) = self
            .pending
            .remove_if(&key, |_, pending| pending.reservation_id == reservation.reservation_id)
            .ok_or_else(|| BizError::not_found("ReservedNumber", reservation.reservation_id))?;

        debug!(
            reservation_id = claimed.reservation_id,
            code = %claimed.code,
            object_id = object_id,
            "Reserved number claimed"
        );
        self.claims.lock().push(ClaimedReservation {
            reservation: claimed,
            object_id,
        });
        Ok(())
    }
}
