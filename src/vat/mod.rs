//! BTW calculation: rate catalog, settings, line pricing, customer rate
//! resolution, and invoice breakdown aggregation.
//!
//! Rates and business rules (auto reverse-charge for B2B, EU country
//! list, seller country) live in a persisted settings document and rate
//! catalog behind [`VatStore`]. Nothing in this module hardcodes a
//! percentage or a country list.
//!
//! # Example
//!
//! ```rust
//! use werkplaats::vat::*;
//! use rust_decimal_macros::dec;
//!
//! let store = VatStore::new(MemoryBackend::with_dutch_defaults());
//! let line = calculate_line_vat(&store, dec!(100), "HIGH").unwrap();
//! assert_eq!(line.vat_amount, dec!(21));
//! assert_eq!(line.total, dec!(121));
//! ```

mod aggregator;
mod calculator;
mod resolver;
mod settings;
mod store;

pub use aggregator::{
    InvoiceLine, InvoiceVatBreakdown, REVERSE_CHARGE_NOTE, TotalsCheck, calculate_invoice_vat,
    validate_invoice_totals,
};
pub use calculator::{LineVat, calculate_line_vat, format_amount};
pub use resolver::rate_for_customer;
pub use settings::{
    CustomerVatInfo, RateSlot, RateSlots, SaleContext, VatSettings, parse_settings,
};
pub use store::{MemoryBackend, VatBackend, VatRate, VatStore};
