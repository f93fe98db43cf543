//! Inventory reservation ledger.
//!
//! Tracks available-vs-reserved quantity per product and an append-only
//! movement log. Every quantity change on a product corresponds to
//! exactly one [`StockMove`] row — the movement log is the audit trail.
//!
//! # Example
//!
//! ```rust
//! use werkplaats::inventory::InventoryLedger;
//! use rust_decimal_macros::dec;
//!
//! let ledger = InventoryLedger::new();
//! ledger.register_product(1, "OIL-5W30", dec!(10));
//!
//! let levels = ledger.reserve(1, dec!(4), 12, 301).unwrap();
//! assert_eq!(levels.qty_available, dec!(6));
//! assert_eq!(levels.qty_reserved, dec!(4));
//! ```

mod ledger;
mod moves;

pub use ledger::{InventoryLedger, InventoryLevels, ProductInventory};
pub use moves::{StockMove, StockMoveType};
