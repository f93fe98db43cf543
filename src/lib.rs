//! # werkplaats
//!
//! Computational core of a garage/workshop management system:
//! Dutch BTW (VAT) invoice calculation, an inventory reservation ledger
//! with an append-only movement log, and back-order lifecycle tracking.
//!
//! All monetary values and quantities use [`rust_decimal::Decimal`] — never
//! floating point. Rate percentages, the default rate, and the EU country
//! list come from a persisted settings document; a malformed document fails
//! loudly instead of falling back to a guessed tax rate.
//!
//! ## Quick Start
//!
//! ```rust
//! use werkplaats::vat::*;
//! use rust_decimal_macros::dec;
//!
//! let store = VatStore::new(MemoryBackend::with_dutch_defaults());
//! let customer = CustomerVatInfo::default();
//! let lines = vec![
//!     InvoiceLine { amount: dec!(100), vat_rate_code: "HIGH".into() },
//!     InvoiceLine { amount: dec!(30), vat_rate_code: "LOW".into() },
//! ];
//!
//! let breakdown = calculate_invoice_vat(&store, &lines, &customer).unwrap();
//! assert_eq!(breakdown.vat_total, dec!(23.70));
//! assert_eq!(breakdown.total_amount, dec!(153.70));
//! assert!(validate_invoice_totals(&breakdown).valid);
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `vat` (default) | Rate/settings store, line calculator, rate resolver, invoice aggregator |
//! | `inventory` (default) | Reservation ledger, stock-move audit log |
//! | `backorder` (default) | Back-order lifecycle, work-order registry |
//! | `bex` | Supplier-ordering integration point (disabled stub) |
//! | `all` | Everything |

pub mod error;

#[cfg(feature = "vat")]
pub mod vat;

#[cfg(feature = "inventory")]
pub mod inventory;

#[cfg(feature = "backorder")]
pub mod workshop;

#[cfg(feature = "backorder")]
pub mod backorder;

#[cfg(feature = "bex")]
pub mod bex;

pub use crate::error::*;
