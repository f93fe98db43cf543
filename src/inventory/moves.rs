use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Type of a stock movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StockMoveType {
    /// Quantity set aside for a work order.
    Reserved,
    /// Reservation returned to the pool.
    Released,
    /// Stock left the shop (invoiced).
    Out,
}

impl StockMoveType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Reserved => "RESERVED",
            Self::Released => "RELEASED",
            Self::Out => "OUT",
        }
    }
}

/// One row of the inventory audit trail. Write-once: never mutated or
/// deleted after it is appended.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockMove {
    pub id: i64,
    pub product_id: i64,
    pub sku: String,
    /// Signed quantity: positive for reservations, negative for stock
    /// returned to the pool or leaving the shop.
    pub quantity: Decimal,
    pub move_type: StockMoveType,
    /// Free-text reference, e.g. "WO-12" or "INV-7".
    pub reference: String,
    pub notes: Option<String>,
    pub recorded_at: DateTime<Utc>,
}
