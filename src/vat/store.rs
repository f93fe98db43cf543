//! Rate catalog and settings access with in-process caching.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use std::time::{Duration, Instant};

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::settings::{VatSettings, parse_settings};
use crate::error::VatError;

/// One row of the persisted VAT rate catalog.
///
/// Rates are never hard-deleted; retiring a rate means `is_active =
/// false`. At most one rate in the active set should be the default,
/// enforced by whoever writes the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VatRate {
    pub id: i64,
    /// Unique rate code, e.g. "HIGH" or "REVERSED".
    pub code: String,
    pub name: String,
    /// Non-negative percentage, two implied fractional digits.
    pub percentage: Decimal,
    pub is_active: bool,
    pub is_default: bool,
}

/// Data source for the rate catalog and the settings document.
///
/// The surrounding application implements this against its relational
/// store; [`MemoryBackend`] is the in-process implementation used for
/// seeding and tests.
pub trait VatBackend: Send + Sync {
    /// Raw settings document for group "vat", if one exists.
    fn load_settings(&self) -> Result<Option<Value>, VatError>;

    /// Active rows of the rate catalog.
    fn load_active_rates(&self) -> Result<Vec<VatRate>, VatError>;
}

impl<B: VatBackend + ?Sized> VatBackend for std::sync::Arc<B> {
    fn load_settings(&self) -> Result<Option<Value>, VatError> {
        (**self).load_settings()
    }

    fn load_active_rates(&self) -> Result<Vec<VatRate>, VatError> {
        (**self).load_active_rates()
    }
}

struct CacheSlot<T> {
    value: T,
    loaded_at: Instant,
}

/// Cached read access to VAT settings and the active rate catalog.
///
/// The first successful load of each is held in process memory until
/// [`VatStore::clear_cache`] or, when a TTL is set, until it expires.
/// Callers that write settings on another instance must either bust the
/// cache or run with a short TTL.
pub struct VatStore {
    backend: Box<dyn VatBackend>,
    ttl: Option<Duration>,
    settings: RwLock<Option<CacheSlot<VatSettings>>>,
    rates: RwLock<Option<CacheSlot<HashMap<String, VatRate>>>>,
}

impl VatStore {
    /// Store that caches indefinitely until [`clear_cache`](Self::clear_cache).
    pub fn new(backend: impl VatBackend + 'static) -> Self {
        Self::build(Box::new(backend), None)
    }

    /// Store whose cached reads expire after `ttl`.
    pub fn with_ttl(backend: impl VatBackend + 'static, ttl: Duration) -> Self {
        Self::build(Box::new(backend), Some(ttl))
    }

    fn build(backend: Box<dyn VatBackend>, ttl: Option<Duration>) -> Self {
        Self {
            backend,
            ttl,
            settings: RwLock::new(None),
            rates: RwLock::new(None),
        }
    }

    /// The validated settings document.
    ///
    /// Fails with [`VatError::Configuration`] when no document exists or
    /// when it does not match the required shape.
    pub fn settings(&self) -> Result<VatSettings, VatError> {
        if let Some(cached) = self.read_cache(&self.settings) {
            return Ok(cached);
        }
        let doc = self.backend.load_settings()?.ok_or_else(|| {
            VatError::Configuration("no settings document found for group \"vat\"".into())
        })?;
        let parsed = parse_settings(&doc)?;
        self.write_cache(&self.settings, parsed.clone());
        Ok(parsed)
    }

    /// Active rates keyed by code.
    ///
    /// Fails with [`VatError::Configuration`] when zero active rates
    /// exist — an empty catalog must never be papered over.
    pub fn rates(&self) -> Result<HashMap<String, VatRate>, VatError> {
        if let Some(cached) = self.read_cache(&self.rates) {
            return Ok(cached);
        }
        let rows = self.backend.load_active_rates()?;
        if rows.is_empty() {
            return Err(VatError::Configuration(
                "no active vat rates configured".into(),
            ));
        }
        let map: HashMap<String, VatRate> =
            rows.into_iter().map(|r| (r.code.clone(), r)).collect();
        self.write_cache(&self.rates, map.clone());
        Ok(map)
    }

    /// Exact lookup in the active-rate map.
    pub fn rate_by_code(&self, code: &str) -> Result<VatRate, VatError> {
        self.rates()?
            .remove(code)
            .ok_or_else(|| VatError::NotFound(format!("vat rate with code '{code}'")))
    }

    /// The rate named by `settings.default_rate`.
    pub fn default_rate(&self) -> Result<VatRate, VatError> {
        let settings = self.settings()?;
        self.rate_by_code(&settings.default_rate)
    }

    /// Drop both caches; the next read re-queries the backend.
    pub fn clear_cache(&self) {
        *self
            .settings
            .write()
            .unwrap_or_else(PoisonError::into_inner) = None;
        *self.rates.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    fn read_cache<T: Clone>(&self, cell: &RwLock<Option<CacheSlot<T>>>) -> Option<T> {
        let guard = cell.read().unwrap_or_else(PoisonError::into_inner);
        let slot = guard.as_ref()?;
        if let Some(ttl) = self.ttl {
            if slot.loaded_at.elapsed() >= ttl {
                return None;
            }
        }
        Some(slot.value.clone())
    }

    fn write_cache<T>(&self, cell: &RwLock<Option<CacheSlot<T>>>, value: T) {
        *cell.write().unwrap_or_else(PoisonError::into_inner) = Some(CacheSlot {
            value,
            loaded_at: Instant::now(),
        });
    }
}

/// In-process [`VatBackend`] holding the settings document and rate
/// rows behind locks. Used for tests and seeding.
#[derive(Default)]
pub struct MemoryBackend {
    settings: RwLock<Option<Value>>,
    rates: RwLock<Vec<VatRate>>,
}

impl MemoryBackend {
    /// Empty backend: no settings document, no rates.
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend seeded with the Dutch rate catalog (HIGH 21%, LOW 9%,
    /// ZERO 0%, REVERSED 0%) and a matching settings document with
    /// seller country NL and the EU member-state list.
    pub fn with_dutch_defaults() -> Self {
        let backend = Self::new();
        backend.put_rates(vec![
            rate(1, "HIGH", "Hoog tarief", dec!(21), true),
            rate(2, "LOW", "Laag tarief", dec!(9), false),
            rate(3, "ZERO", "Nultarief", dec!(0), false),
            rate(4, "REVERSED", "BTW verlegd", dec!(0), false),
        ]);
        backend.put_settings(json!({
            "rates": {
                "high": { "percentage": 21, "name": "Hoog tarief", "code": "HIGH" },
                "low": { "percentage": 9, "name": "Laag tarief", "code": "LOW" },
                "zero": { "percentage": 0, "name": "Nultarief", "code": "ZERO" },
                "reversed": { "percentage": 0, "name": "BTW verlegd", "code": "REVERSED" },
            },
            "defaultRate": "HIGH",
            "viesCheckEnabled": false,
            "autoReverseB2B": true,
            "sellerCountryCode": "NL",
            "euCountryCodes": [
                "AT", "BE", "BG", "CY", "CZ", "DE", "DK", "EE", "ES", "FI", "FR", "GR",
                "HR", "HU", "IE", "IT", "LT", "LU", "LV", "MT", "NL", "PL", "PT", "RO",
                "SE", "SI", "SK",
            ],
        }));
        backend
    }

    /// Replace the settings document.
    pub fn put_settings(&self, doc: Value) {
        *self
            .settings
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(doc);
    }

    /// Replace the rate catalog (active and inactive rows).
    pub fn put_rates(&self, rates: Vec<VatRate>) {
        *self.rates.write().unwrap_or_else(PoisonError::into_inner) = rates;
    }
}

impl VatBackend for MemoryBackend {
    fn load_settings(&self) -> Result<Option<Value>, VatError> {
        Ok(self
            .settings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn load_active_rates(&self) -> Result<Vec<VatRate>, VatError> {
        Ok(self
            .rates
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|r| r.is_active)
            .cloned()
            .collect())
    }
}

fn rate(id: i64, code: &str, name: &str, percentage: Decimal, is_default: bool) -> VatRate {
    VatRate {
        id,
        code: code.into(),
        name: name.into(),
        percentage,
        is_active: true,
        is_default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_document_is_a_configuration_error() {
        let store = VatStore::new(MemoryBackend::new());
        let err = store.settings().unwrap_err();
        assert!(matches!(err, VatError::Configuration(_)));
    }

    #[test]
    fn empty_rate_catalog_is_a_configuration_error() {
        let store = VatStore::new(MemoryBackend::new());
        let err = store.rates().unwrap_err();
        assert!(err.to_string().contains("no active vat rates"));
    }

    #[test]
    fn inactive_rates_are_invisible() {
        let backend = MemoryBackend::new();
        backend.put_rates(vec![
            rate(1, "HIGH", "Hoog tarief", dec!(21), true),
            VatRate {
                is_active: false,
                ..rate(2, "OLD", "Oud tarief", dec!(19), false)
            },
        ]);
        let store = VatStore::new(backend);
        assert!(store.rate_by_code("HIGH").is_ok());
        let err = store.rate_by_code("OLD").unwrap_err();
        assert!(matches!(err, VatError::NotFound(_)));
    }

    #[test]
    fn default_rate_resolves_through_settings() {
        let store = VatStore::new(MemoryBackend::with_dutch_defaults());
        let rate = store.default_rate().unwrap();
        assert_eq!(rate.code, "HIGH");
        assert_eq!(rate.percentage, dec!(21));
    }

    #[test]
    fn cache_serves_stale_reads_until_cleared() {
        let backend = std::sync::Arc::new(MemoryBackend::with_dutch_defaults());
        let store = VatStore::new(backend.clone());
        assert_eq!(store.rate_by_code("HIGH").unwrap().percentage, dec!(21));

        backend.put_rates(vec![rate(1, "HIGH", "Hoog tarief", dec!(20), true)]);
        // Still served from cache after the write.
        assert_eq!(store.rate_by_code("HIGH").unwrap().percentage, dec!(21));

        store.clear_cache();
        assert_eq!(store.rate_by_code("HIGH").unwrap().percentage, dec!(20));
    }

    #[test]
    fn zero_ttl_always_requeries() {
        let backend = std::sync::Arc::new(MemoryBackend::with_dutch_defaults());
        let store = VatStore::with_ttl(backend.clone(), Duration::ZERO);
        assert_eq!(store.rate_by_code("HIGH").unwrap().percentage, dec!(21));

        backend.put_rates(vec![rate(1, "HIGH", "Hoog tarief", dec!(20), true)]);
        assert_eq!(store.rate_by_code("HIGH").unwrap().percentage, dec!(20));
    }
}
