//! Pure line-level VAT arithmetic.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::store::VatStore;
use crate::error::VatError;

/// Result of pricing a single VAT-exclusive amount.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineVat {
    pub subtotal: Decimal,
    pub vat_percentage: Decimal,
    pub vat_amount: Decimal,
    pub total: Decimal,
    pub vat_rate_id: i64,
    pub vat_rate_code: String,
}

/// Compute subtotal, VAT amount, and total for one line.
///
/// `amount` is VAT-exclusive and may be negative — credit lines flow
/// through the same arithmetic. The computation is exact `Decimal`
/// arithmetic with no rounding; truncation for display is
/// [`format_amount`]'s job. Propagates [`VatError::NotFound`] from the
/// rate lookup.
pub fn calculate_line_vat(
    store: &VatStore,
    amount: Decimal,
    vat_rate_code: &str,
) -> Result<LineVat, VatError> {
    let rate = store.rate_by_code(vat_rate_code)?;
    let vat_amount = amount * rate.percentage / Decimal::ONE_HUNDRED;
    Ok(LineVat {
        subtotal: amount,
        vat_percentage: rate.percentage,
        vat_amount,
        total: amount + vat_amount,
        vat_rate_id: rate.id,
        vat_rate_code: rate.code,
    })
}

/// Truncate (never round) an amount to two decimals for display.
pub fn format_amount(amount: Decimal) -> String {
    format!("{:.2}", amount.trunc_with_scale(2))
}
