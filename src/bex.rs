//! Supplier-ordering integration point (Bex wholesale API).
//!
//! Placeholder surface: the back-order lifecycle runs identically with
//! or without a supplier client, so this module only pins down the
//! trait the integration will implement. [`create_bex_client`] returns
//! `None` until the integration lands.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BexError {
    #[error("bex integration is not enabled")]
    NotEnabled,
}

/// An order to place at the supplier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupplierOrder {
    pub sku: String,
    pub quantity: Decimal,
    /// Our reference, e.g. the back-order id.
    pub reference: String,
}

/// Tracking state of a placed supplier order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderTracking {
    pub reference: String,
    pub status: String,
}

/// The surface a supplier integration has to provide.
pub trait SupplierClient: Send + Sync {
    fn place_order(&self, order: &SupplierOrder) -> Result<OrderTracking, BexError>;
    fn check_availability(&self, sku: &str, quantity: Decimal) -> Result<bool, BexError>;
    fn order_status(&self, reference: &str) -> Result<OrderTracking, BexError>;
}

/// Whether the Bex integration is configured. Always false for now.
pub fn is_bex_enabled() -> bool {
    false
}

/// A client when the integration is enabled — currently never.
pub fn create_bex_client() -> Option<Box<dyn SupplierClient>> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integration_is_disabled() {
        assert!(!is_bex_enabled());
        assert!(create_bex_client().is_none());
    }
}
