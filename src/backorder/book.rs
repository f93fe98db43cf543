use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockWriteGuard};

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{info, warn};

use super::order::{
    BackOrder, BackOrderStats, BackOrderStatus, NewBackOrder, OrderPlacement,
    priority_for_schedule,
};
use crate::error::OrderError;
use crate::inventory::InventoryLedger;
use crate::workshop::{PartsLineStatus, WorkOrderRegistry};

#[derive(Default)]
struct BookState {
    orders: HashMap<i64, BackOrder>,
    next_id: i64,
}

/// The back-order state machine. All operations report failure through
/// `Result` and never panic; transitions that the state diagram forbids
/// are not guarded here — preventing a re-order of a cancelled row is
/// the caller's responsibility.
pub struct BackOrderBook {
    registry: Arc<WorkOrderRegistry>,
    ledger: Arc<InventoryLedger>,
    state: RwLock<BookState>,
}

impl BackOrderBook {
    pub fn new(registry: Arc<WorkOrderRegistry>, ledger: Arc<InventoryLedger>) -> Self {
        Self {
            registry,
            ledger,
            state: RwLock::new(BookState {
                next_id: 1,
                ..BookState::default()
            }),
        }
    }

    /// Create a PENDING back-order for a parts line that could not be
    /// reserved. Fails with [`OrderError::NotFound`] when the parent
    /// work order does not exist.
    pub fn create(&self, new: NewBackOrder) -> Result<BackOrder, OrderError> {
        let work_order = self.registry.work_order(new.work_order_id).ok_or_else(|| {
            OrderError::NotFound(format!("work order {}", new.work_order_id))
        })?;
        let priority = new
            .priority
            .unwrap_or_else(|| priority_for_schedule(work_order.scheduled_at, Utc::now()));

        let mut state = self.write();
        let id = state.next_id;
        state.next_id += 1;

        let order = BackOrder {
            id,
            parts_line_id: new.parts_line_id,
            work_order_id: new.work_order_id,
            product_id: new.product_id,
            product_name: new.product_name,
            sku: new.sku,
            quantity_needed: new.quantity_needed,
            quantity_ordered: None,
            quantity_received: Decimal::ZERO,
            status: BackOrderStatus::Pending,
            priority,
            supplier: None,
            order_date: None,
            expected_date: None,
            order_reference: None,
            unit_cost: None,
            total_cost: None,
            // Snapshot of the work order at creation time.
            work_order_number: work_order.number,
            customer_name: work_order.customer_name,
            vehicle_plate: work_order.vehicle_plate,
            work_order_scheduled: work_order.scheduled_at,
            notes: new.notes,
            created_by: new.created_by,
            updated_by: None,
            created_at: Utc::now(),
            updated_at: None,
            received_date: None,
        };
        state.orders.insert(id, order.clone());
        info!(
            back_order_id = id,
            work_order_id = order.work_order_id,
            priority = priority.as_str(),
            "created back-order"
        );
        Ok(order)
    }

    /// Record that the part was ordered at a supplier. The transition
    /// to ORDERED is unconditional. `total_cost` is computed when a
    /// unit cost is given.
    pub fn mark_ordered(&self, id: i64, placement: OrderPlacement) -> Result<BackOrder, OrderError> {
        let mut state = self.write();
        let order = get_order(&mut state, id)?;

        order.status = BackOrderStatus::Ordered;
        order.supplier = Some(placement.supplier);
        order.order_date = Some(placement.order_date);
        order.expected_date = placement.expected_date;
        order.order_reference = placement.order_reference;
        order.quantity_ordered = Some(placement.quantity_ordered);
        order.total_cost = placement.unit_cost.map(|c| c * placement.quantity_ordered);
        order.unit_cost = placement.unit_cost;
        order.updated_by = placement.updated_by;
        order.updated_at = Some(Utc::now());
        info!(back_order_id = id, "back-order placed at supplier");
        Ok(order.clone())
    }

    /// Record a (possibly partial) delivery.
    ///
    /// The received accumulator is monotonic and not clamped to
    /// `quantity_needed`. Status becomes RECEIVED once the accumulator
    /// reaches the need (setting `received_date` on that transition and
    /// flipping the parts line to ONTVANGEN), else PARTIALLY_RECEIVED
    /// while it is positive.
    ///
    /// When a product is attached, the received amount is re-reserved
    /// against the original work order. That reservation is best-effort:
    /// a failure is logged and does not roll back the receive, because
    /// the physical stock did arrive.
    pub fn receive(
        &self,
        id: i64,
        quantity_received: Decimal,
        updated_by: Option<&str>,
    ) -> Result<BackOrder, OrderError> {
        let updated = {
            let mut state = self.write();
            let order = get_order(&mut state, id)?;

            let new_total = order.quantity_received + quantity_received;
            order.quantity_received = new_total;
            if new_total >= order.quantity_needed {
                if order.status != BackOrderStatus::Received {
                    order.received_date = Some(Utc::now());
                }
                order.status = BackOrderStatus::Received;
            } else if new_total > Decimal::ZERO {
                order.status = BackOrderStatus::PartiallyReceived;
            }
            order.updated_by = updated_by.map(str::to_owned);
            order.updated_at = Some(Utc::now());
            order.clone()
        };

        if let Some(product_id) = updated.product_id {
            if quantity_received > Decimal::ZERO {
                if let Err(err) = self.ledger.reserve(
                    product_id,
                    quantity_received,
                    updated.work_order_id,
                    updated.parts_line_id,
                ) {
                    warn!(
                        back_order_id = id,
                        product_id,
                        error = %err,
                        "received stock could not be reserved"
                    );
                }
            }
        }

        if updated.status == BackOrderStatus::Received
            && !self
                .registry
                .set_parts_line_status(updated.parts_line_id, PartsLineStatus::Ontvangen)
        {
            warn!(
                back_order_id = id,
                parts_line_id = updated.parts_line_id,
                "parts line missing, status not flipped to ONTVANGEN"
            );
        }

        info!(
            back_order_id = id,
            %quantity_received,
            status = updated.status.as_str(),
            "received back-order delivery"
        );
        Ok(updated)
    }

    /// Cancel the back-order. The cancellation reason overwrites any
    /// prior notes.
    pub fn cancel(
        &self,
        id: i64,
        reason: &str,
        updated_by: Option<&str>,
    ) -> Result<BackOrder, OrderError> {
        let mut state = self.write();
        let order = get_order(&mut state, id)?;

        order.status = BackOrderStatus::Cancelled;
        order.notes = Some(reason.to_string());
        order.updated_by = updated_by.map(str::to_owned);
        order.updated_at = Some(Utc::now());
        info!(back_order_id = id, reason, "cancelled back-order");
        Ok(order.clone())
    }

    pub fn get(&self, id: i64) -> Option<BackOrder> {
        self.read().orders.get(&id).cloned()
    }

    /// Non-terminal back-orders, highest priority first, then the
    /// soonest-scheduled work order; unscheduled rows sort last.
    pub fn active(&self) -> Vec<BackOrder> {
        let mut orders: Vec<BackOrder> = self
            .read()
            .orders
            .values()
            .filter(|o| o.status.is_active())
            .cloned()
            .collect();
        orders.sort_by(|a, b| {
            b.priority.cmp(&a.priority).then_with(|| {
                match (a.work_order_scheduled, b.work_order_scheduled) {
                    (Some(x), Some(y)) => x.cmp(&y),
                    (Some(_), None) => Ordering::Less,
                    (None, Some(_)) => Ordering::Greater,
                    (None, None) => Ordering::Equal,
                }
            })
        });
        orders
    }

    pub fn for_work_order(&self, work_order_id: i64) -> Vec<BackOrder> {
        self.read()
            .orders
            .values()
            .filter(|o| o.work_order_id == work_order_id)
            .cloned()
            .collect()
    }

    pub fn for_product(&self, product_id: i64) -> Vec<BackOrder> {
        self.read()
            .orders
            .values()
            .filter(|o| o.product_id == Some(product_id))
            .cloned()
            .collect()
    }

    /// Counts per status bucket, plus the active total.
    pub fn stats(&self) -> BackOrderStats {
        let state = self.read();
        let mut stats = BackOrderStats::default();
        for order in state.orders.values() {
            match order.status {
                BackOrderStatus::Pending => stats.pending += 1,
                BackOrderStatus::Ordered => stats.ordered += 1,
                BackOrderStatus::PartiallyReceived => stats.partially_received += 1,
                BackOrderStatus::Received => stats.received += 1,
                BackOrderStatus::Cancelled => stats.cancelled += 1,
            }
            if order.status.is_active() {
                stats.active += 1;
            }
        }
        stats
    }

    /// Whether the parts line already has a PENDING, ORDERED, or
    /// PARTIALLY_RECEIVED back-order.
    pub fn has_active(&self, parts_line_id: i64) -> bool {
        self.read()
            .orders
            .values()
            .any(|o| o.parts_line_id == parts_line_id && o.status.is_active())
    }

    fn write(&self) -> RwLockWriteGuard<'_, BookState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, BookState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }
}

fn get_order<'a>(state: &'a mut BookState, id: i64) -> Result<&'a mut BackOrder, OrderError> {
    state
        .orders
        .get_mut(&id)
        .ok_or_else(|| OrderError::NotFound(format!("back-order {id}")))
}
