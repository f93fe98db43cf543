//! Error types for the two module surfaces.
//!
//! The VAT path propagates errors upward: an invoice must never be
//! computed with a guessed tax rate, so configuration and lookup
//! failures abort the calculation. The inventory and back-order paths
//! report every failure through `Result` and never panic; callers
//! branch on the error (place a back-order, fix the counts) instead of
//! aborting the request.

use thiserror::Error;

#[cfg(feature = "inventory")]
use rust_decimal::Decimal;

/// Errors from the VAT configuration and calculation surface.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum VatError {
    /// The settings document is missing, malformed, or the active rate
    /// set is empty. Hard error — there is no fallback rate.
    #[error("vat configuration error: {0}")]
    Configuration(String),

    /// A rate code that does not exist in the active-rate catalog.
    #[error("{0} not found")]
    NotFound(String),
}

/// Errors from the inventory reservation ledger.
#[cfg(feature = "inventory")]
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StockError {
    /// Unknown product or missing inventory record.
    #[error("{0} not found")]
    NotFound(String),

    /// A reservation asked for more than is available. The caller is
    /// expected to fall back to creating a back-order.
    #[error("insufficient stock: {available} available, {requested} requested")]
    InsufficientStock {
        available: Decimal,
        requested: Decimal,
    },
}

/// Errors from the back-order lifecycle.
#[cfg(feature = "backorder")]
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum OrderError {
    /// Unknown back-order or missing parent work order.
    #[error("{0} not found")]
    NotFound(String),
}
