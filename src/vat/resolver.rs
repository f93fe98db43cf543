//! Decides which rate code applies to a customer/line.

use super::settings::{CustomerVatInfo, SaleContext, VatSettings};
use super::store::{VatRate, VatStore};
use crate::error::VatError;

/// Pick the VAT rate for a customer line.
///
/// Strict ordered decision list — the first matching branch wins:
///
/// 1. An explicit `override_code` resolves and wins unconditionally.
/// 2. No customer → the default rate.
/// 3. A VAT-exempt customer → the configured zero slot.
/// 4. `auto_reverse_b2b` + business customer + validated VAT number +
///    cross-border EU → the reversed slot.
/// 5. Manual `vat_reversed` flag on the customer → the reversed slot.
///    Note: this branch does not check the EU-crossing condition — the
///    manual flag is an unconditional override, also for domestic B2B.
/// 6. The default rate.
///
/// Cross-border EU holds when the destination country (from `context`,
/// upper-cased), the seller country (from settings), and the EU list
/// (from settings) agree: both countries present, differing, and the
/// destination a member of the list. No country data is hardcoded.
pub fn rate_for_customer(
    store: &VatStore,
    customer: Option<&CustomerVatInfo>,
    override_code: Option<&str>,
    context: Option<&SaleContext>,
) -> Result<VatRate, VatError> {
    if let Some(code) = override_code {
        return store.rate_by_code(code);
    }
    let Some(customer) = customer else {
        return store.default_rate();
    };

    let settings = store.settings()?;
    if customer.vat_exempt {
        return store.rate_by_code(&settings.rates.zero.code);
    }

    if settings.auto_reverse_b2b
        && customer.is_business_customer
        && customer.vat_number_validated
        && is_cross_border_eu(&settings, context)
    {
        return store.rate_by_code(&settings.rates.reversed.code);
    }

    if customer.vat_reversed {
        return store.rate_by_code(&settings.rates.reversed.code);
    }

    store.default_rate()
}

fn is_cross_border_eu(settings: &VatSettings, context: Option<&SaleContext>) -> bool {
    let Some(destination) = context.and_then(|c| c.destination_country.as_deref()) else {
        return false;
    };
    let destination = destination.to_uppercase();
    let Some(seller) = settings.seller_country_code.as_deref() else {
        return false;
    };
    if destination == seller {
        return false;
    }
    settings
        .eu_country_codes
        .as_ref()
        .is_some_and(|eu| eu.contains(&destination))
}
