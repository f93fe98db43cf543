//! Folds priced lines into the per-invoice VAT breakdown.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::calculator::calculate_line_vat;
use super::settings::CustomerVatInfo;
use super::store::VatStore;
use crate::error::VatError;

/// Fixed legal citation printed on reverse-charged invoices.
pub const REVERSE_CHARGE_NOTE: &str = "BTW verlegd o.g.v. artikel 12, lid 3 Wet OB 1968";

/// One invoice line with its rate code already resolved by the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceLine {
    /// VAT-exclusive amount, any sign.
    pub amount: Decimal,
    pub vat_rate_code: String,
}

/// Grouped VAT totals for one invoice. Produced fresh per calculation;
/// persisting it is the surrounding application's job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InvoiceVatBreakdown {
    pub subtotal_amount: Decimal,
    pub vat_subtotal_high: Decimal,
    pub vat_amount_high: Decimal,
    pub vat_subtotal_low: Decimal,
    pub vat_amount_low: Decimal,
    /// Zero and reversed rate codes share this bucket — both contribute
    /// 0 VAT but their subtotals are still tracked.
    pub vat_subtotal_zero: Decimal,
    pub vat_total: Decimal,
    pub total_amount: Decimal,
    pub vat_reversed: bool,
    pub vat_reversed_text: Option<String>,
    pub vat_exempt: bool,
}

/// Fold a list of priced lines into a grouped breakdown.
///
/// Lines are bracketed by matching their rate code against the codes
/// configured in the settings slots; codes outside the four slots still
/// count toward the running subtotal and VAT totals.
///
/// The summary `vat_reversed` flag is derived from the customer alone
/// (`vat_reversed || (business && vat_number_validated)`) — it does not
/// look at the rate codes actually applied to the lines, nor at the
/// EU-crossing condition the resolver uses. A validated domestic B2B
/// customer can therefore carry the flag while every line is priced at
/// the default rate; see `DESIGN.md` before changing this.
pub fn calculate_invoice_vat(
    store: &VatStore,
    lines: &[InvoiceLine],
    customer: &CustomerVatInfo,
) -> Result<InvoiceVatBreakdown, VatError> {
    let settings = store.settings()?;
    let mut breakdown = InvoiceVatBreakdown::default();

    for line in lines {
        let priced = calculate_line_vat(store, line.amount, &line.vat_rate_code)?;
        breakdown.subtotal_amount += priced.subtotal;
        breakdown.vat_total += priced.vat_amount;

        if priced.vat_rate_code == settings.rates.high.code {
            breakdown.vat_subtotal_high += priced.subtotal;
            breakdown.vat_amount_high += priced.vat_amount;
        } else if priced.vat_rate_code == settings.rates.low.code {
            breakdown.vat_subtotal_low += priced.subtotal;
            breakdown.vat_amount_low += priced.vat_amount;
        } else if priced.vat_rate_code == settings.rates.zero.code
            || priced.vat_rate_code == settings.rates.reversed.code
        {
            breakdown.vat_subtotal_zero += priced.subtotal;
        }
    }

    breakdown.total_amount = breakdown.subtotal_amount + breakdown.vat_total;
    breakdown.vat_reversed =
        customer.vat_reversed || (customer.is_business_customer && customer.vat_number_validated);
    breakdown.vat_reversed_text = breakdown
        .vat_reversed
        .then(|| REVERSE_CHARGE_NOTE.to_string());
    breakdown.vat_exempt = customer.vat_exempt;

    Ok(breakdown)
}

/// Outcome of [`validate_invoice_totals`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TotalsCheck {
    pub valid: bool,
    pub errors: Vec<String>,
}

/// Re-derive the breakdown's arithmetic identities.
///
/// Exact `Decimal` equality, no epsilon: the arithmetic is exact
/// throughout, so any mismatch signals a caller bug, not rounding
/// noise. Diagnostic only — returns the failures instead of erroring.
pub fn validate_invoice_totals(breakdown: &InvoiceVatBreakdown) -> TotalsCheck {
    let mut errors = Vec::new();

    let derived_total = breakdown.subtotal_amount + breakdown.vat_total;
    if derived_total != breakdown.total_amount {
        errors.push(format!(
            "total amount mismatch: subtotal {} + vat {} = {}, recorded total is {}",
            breakdown.subtotal_amount, breakdown.vat_total, derived_total, breakdown.total_amount
        ));
    }

    let bucket_subtotals =
        breakdown.vat_subtotal_high + breakdown.vat_subtotal_low + breakdown.vat_subtotal_zero;
    if bucket_subtotals != breakdown.subtotal_amount {
        errors.push(format!(
            "subtotal mismatch: rate buckets sum to {}, recorded subtotal is {}",
            bucket_subtotals, breakdown.subtotal_amount
        ));
    }

    let bucket_vat = breakdown.vat_amount_high + breakdown.vat_amount_low;
    if bucket_vat != breakdown.vat_total {
        errors.push(format!(
            "vat total mismatch: rate buckets sum to {}, recorded vat total is {}",
            bucket_vat, breakdown.vat_total
        ));
    }

    TotalsCheck {
        valid: errors.is_empty(),
        errors,
    }
}
