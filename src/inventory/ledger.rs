use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockWriteGuard};

use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::moves::{StockMove, StockMoveType};
use crate::error::StockError;

/// On-hand and reserved counts for one product (1:1 with the product).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductInventory {
    pub product_id: i64,
    pub sku: String,
    /// On-hand quantity, never negative.
    pub qty: Decimal,
    /// Reserved quantity, never negative. Intended to stay ≤ `qty`;
    /// callers check availability before committing a reservation.
    pub qty_reserved: Decimal,
    pub is_in_stock: bool,
}

/// Snapshot returned by ledger operations and [`InventoryLedger::summary`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InventoryLevels {
    pub qty: Decimal,
    pub qty_reserved: Decimal,
    pub qty_available: Decimal,
    pub is_in_stock: bool,
}

#[derive(Default)]
struct LedgerState {
    products: HashMap<i64, ProductInventory>,
    moves: Vec<StockMove>,
    next_move_id: i64,
}

/// Available-vs-reserved bookkeeping per product plus the append-only
/// movement log.
///
/// Every mutation runs its check and its write under one write lock, so
/// two concurrent reservations can never both pass the availability
/// check against the same product. All operations report failure
/// through `Result` and never panic.
pub struct InventoryLedger {
    state: RwLock<LedgerState>,
}

impl InventoryLedger {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(LedgerState {
                next_move_id: 1,
                ..LedgerState::default()
            }),
        }
    }

    /// Create or replace the inventory record for a product. Seeding
    /// only — no stock move is written.
    pub fn register_product(&self, product_id: i64, sku: impl Into<String>, qty: Decimal) {
        let mut state = self.write();
        state.products.insert(
            product_id,
            ProductInventory {
                product_id,
                sku: sku.into(),
                qty,
                qty_reserved: Decimal::ZERO,
                is_in_stock: qty > Decimal::ZERO,
            },
        );
    }

    /// Reserve `quantity` for a work-order parts line.
    ///
    /// Fails with [`StockError::NotFound`] when the product has no
    /// inventory record, and [`StockError::InsufficientStock`] carrying
    /// the available/requested numbers when the pool is short — the
    /// caller falls back to creating a back-order; this function never
    /// creates one itself.
    pub fn reserve(
        &self,
        product_id: i64,
        quantity: Decimal,
        work_order_id: i64,
        parts_line_id: i64,
    ) -> Result<InventoryLevels, StockError> {
        let mut state = self.write();
        let product = get_product(&mut state, product_id)?;

        let available = product.qty - product.qty_reserved;
        if available < quantity {
            return Err(StockError::InsufficientStock {
                available,
                requested: quantity,
            });
        }

        product.qty_reserved += quantity;
        let levels = levels_of(product);
        let sku = product.sku.clone();
        append_move(
            &mut state,
            product_id,
            sku,
            quantity,
            StockMoveType::Reserved,
            format!("WO-{work_order_id}"),
            Some(format!("reserved for parts line {parts_line_id}")),
        );
        info!(product_id, %quantity, work_order_id, parts_line_id, "reserved inventory");
        Ok(levels)
    }

    /// Return a reservation to the pool.
    ///
    /// Over-release clamps `qty_reserved` at zero instead of failing:
    /// release is often triggered by deletion flows where the exact
    /// prior state is uncertain. The move records the negated quantity.
    pub fn release(
        &self,
        product_id: i64,
        quantity: Decimal,
        work_order_id: i64,
        parts_line_id: i64,
        reason: Option<&str>,
    ) -> Result<InventoryLevels, StockError> {
        let mut state = self.write();
        let product = get_product(&mut state, product_id)?;

        product.qty_reserved = (product.qty_reserved - quantity).max(Decimal::ZERO);
        let levels = levels_of(product);
        let sku = product.sku.clone();
        let notes = reason
            .map(str::to_owned)
            .unwrap_or_else(|| format!("released reservation for parts line {parts_line_id}"));
        append_move(
            &mut state,
            product_id,
            sku,
            -quantity,
            StockMoveType::Released,
            format!("WO-{work_order_id}"),
            Some(notes),
        );
        info!(product_id, %quantity, work_order_id, parts_line_id, "released reservation");
        Ok(levels)
    }

    /// Take reserved stock out for good when the parts line is invoiced.
    ///
    /// Decrements both `qty` and `qty_reserved`, each floored at zero.
    /// `is_in_stock` is judged on the unfloored subtraction: consuming
    /// down to exactly zero or past it marks the product out of stock.
    pub fn consume(
        &self,
        product_id: i64,
        quantity: Decimal,
        work_order_id: i64,
        invoice_id: i64,
        parts_line_id: i64,
    ) -> Result<InventoryLevels, StockError> {
        let mut state = self.write();
        let product = get_product(&mut state, product_id)?;

        product.is_in_stock = product.qty - quantity > Decimal::ZERO;
        product.qty = (product.qty - quantity).max(Decimal::ZERO);
        product.qty_reserved = (product.qty_reserved - quantity).max(Decimal::ZERO);
        let levels = levels_of(product);
        let sku = product.sku.clone();
        append_move(
            &mut state,
            product_id,
            sku,
            -quantity,
            StockMoveType::Out,
            format!("INV-{invoice_id}"),
            Some(format!(
                "consumed for work order {work_order_id}, parts line {parts_line_id}"
            )),
        );
        info!(product_id, %quantity, invoice_id, "consumed reserved inventory");
        Ok(levels)
    }

    /// Quantity available to reserve; zero when the product is unknown.
    /// Never errors — used for optimistic UI checks.
    pub fn available_quantity(&self, product_id: i64) -> Decimal {
        self.read()
            .products
            .get(&product_id)
            .map_or(Decimal::ZERO, |p| p.qty - p.qty_reserved)
    }

    /// Whether `quantity` can currently be reserved.
    pub fn is_available(&self, product_id: i64, quantity: Decimal) -> bool {
        self.available_quantity(product_id) >= quantity
    }

    /// Current levels; zeroed defaults when the product is unknown.
    pub fn summary(&self, product_id: i64) -> InventoryLevels {
        self.read()
            .products
            .get(&product_id)
            .map_or_else(InventoryLevels::default, levels_of)
    }

    /// The audit trail for one product, oldest first.
    pub fn moves_for(&self, product_id: i64) -> Vec<StockMove> {
        self.read()
            .moves
            .iter()
            .filter(|m| m.product_id == product_id)
            .cloned()
            .collect()
    }

    fn write(&self) -> RwLockWriteGuard<'_, LedgerState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, LedgerState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for InventoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

fn get_product<'a>(
    state: &'a mut LedgerState,
    product_id: i64,
) -> Result<&'a mut ProductInventory, StockError> {
    state
        .products
        .get_mut(&product_id)
        .ok_or_else(|| StockError::NotFound(format!("inventory for product {product_id}")))
}

fn levels_of(product: &ProductInventory) -> InventoryLevels {
    InventoryLevels {
        qty: product.qty,
        qty_reserved: product.qty_reserved,
        qty_available: product.qty - product.qty_reserved,
        is_in_stock: product.is_in_stock,
    }
}

fn append_move(
    state: &mut LedgerState,
    product_id: i64,
    sku: String,
    quantity: Decimal,
    move_type: StockMoveType,
    reference: String,
    notes: Option<String>,
) {
    let id = state.next_move_id;
    state.next_move_id += 1;
    state.moves.push(StockMove {
        id,
        product_id,
        sku,
        quantity,
        move_type,
        reference,
        notes,
        recorded_at: Utc::now(),
    });
}
