//! # Running Numbers
//!
//! Business-code allocation from configured generators, plus the hook for codes a
//! user reserved ahead of time.
//!
//! ```rust,ignore
//! let allocator = RunningNumberAllocator::new(db.clone());
//! let mut tx = db.begin().await?;
//! let code = allocator.allocate(&mut tx, "Invoice").await?; // e.g. INV2503000007
//! tx.commit().await?;
//! ```

pub mod allocator;
pub mod reservation;

pub use allocator::{format_running_number, IntervalStamp, RunningNumberAllocator};
pub use reservation::{
    ClaimedReservation, InMemoryReservationProvider, NoReservations, ReservationProvider,
    ReservedNumber,
};
