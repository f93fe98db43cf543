//! Minimal work-order registry backing the back-order module.
//!
//! Holds just enough of the planning domain — work orders and their
//! parts lines — for the back-order lifecycle: the parent-exists check,
//! priority computation from the scheduled date, the denormalized
//! snapshot fields, and the parts-line status flip on full receipt.
//! The full planning domain lives in the surrounding application.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A planned workshop job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkOrder {
    pub id: i64,
    pub number: String,
    pub customer_name: Option<String>,
    pub vehicle_plate: Option<String>,
    pub scheduled_at: Option<DateTime<Utc>>,
}

/// Parts line status as shown on the work order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PartsLineStatus {
    Nieuw,
    Besteld,
    Ontvangen,
}

impl PartsLineStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Nieuw => "NIEUW",
            Self::Besteld => "BESTELD",
            Self::Ontvangen => "ONTVANGEN",
        }
    }
}

/// One part needed by a work order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartsLine {
    pub id: i64,
    pub work_order_id: i64,
    /// Absent for non-catalog/custom parts.
    pub product_id: Option<i64>,
    pub description: String,
    pub quantity: Decimal,
    pub status: PartsLineStatus,
}

#[derive(Default)]
struct RegistryState {
    work_orders: HashMap<i64, WorkOrder>,
    parts_lines: HashMap<i64, PartsLine>,
}

/// In-process registry of work orders and their parts lines.
#[derive(Default)]
pub struct WorkOrderRegistry {
    state: RwLock<RegistryState>,
}

impl WorkOrderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_work_order(&self, work_order: WorkOrder) {
        self.write().work_orders.insert(work_order.id, work_order);
    }

    pub fn put_parts_line(&self, line: PartsLine) {
        self.write().parts_lines.insert(line.id, line);
    }

    pub fn work_order(&self, id: i64) -> Option<WorkOrder> {
        self.read().work_orders.get(&id).cloned()
    }

    pub fn parts_line(&self, id: i64) -> Option<PartsLine> {
        self.read().parts_lines.get(&id).cloned()
    }

    /// Returns false when the parts line does not exist.
    pub fn set_parts_line_status(&self, id: i64, status: PartsLineStatus) -> bool {
        match self.write().parts_lines.get_mut(&id) {
            Some(line) => {
                line.status = status;
                true
            }
            None => false,
        }
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, RegistryState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, RegistryState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }
}
