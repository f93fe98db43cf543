//! Back-order lifecycle: parts that could not be reserved from stock,
//! tracked from PENDING through receipt or cancellation.
//!
//! ```text
//! PENDING → ORDERED → PARTIALLY_RECEIVED → RECEIVED
//!                  └──────────────────────→ RECEIVED
//! any non-terminal state → CANCELLED
//! ```
//!
//! Received quantity feeds back into the reservation ledger as a
//! best-effort follow-up: physical receipt is the authoritative event
//! and is never rolled back because a reservation failed.

mod book;
mod order;

pub use book::BackOrderBook;
pub use order::{
    BackOrder, BackOrderPriority, BackOrderStats, BackOrderStatus, NewBackOrder, OrderPlacement,
};
