use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Back-order lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BackOrderStatus {
    Pending,
    Ordered,
    PartiallyReceived,
    Received,
    Cancelled,
}

impl BackOrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Ordered => "ORDERED",
            Self::PartiallyReceived => "PARTIALLY_RECEIVED",
            Self::Received => "RECEIVED",
            Self::Cancelled => "CANCELLED",
        }
    }

    /// RECEIVED and CANCELLED accept no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Received | Self::Cancelled)
    }

    /// PENDING, ORDERED, or PARTIALLY_RECEIVED.
    pub fn is_active(&self) -> bool {
        !self.is_terminal()
    }
}

/// Urgency bucket. Declared low-to-high so `Ord` compares directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BackOrderPriority {
    Low,
    Normal,
    High,
}

impl BackOrderPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Normal => "NORMAL",
            Self::High => "HIGH",
        }
    }
}

/// A tracked supplier order for a part that could not be reserved.
///
/// The `work_order_*` fields are a snapshot of the parent work order
/// taken at creation time, for display without joins. They deliberately
/// do not track later edits to the work order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackOrder {
    pub id: i64,
    pub parts_line_id: i64,
    pub work_order_id: i64,
    /// Absent for non-catalog/custom parts.
    pub product_id: Option<i64>,
    pub product_name: String,
    pub sku: Option<String>,
    pub quantity_needed: Decimal,
    pub quantity_ordered: Option<Decimal>,
    /// Monotonic accumulator; may exceed `quantity_needed` when the
    /// supplier over-delivers.
    pub quantity_received: Decimal,
    pub status: BackOrderStatus,
    pub priority: BackOrderPriority,
    pub supplier: Option<String>,
    pub order_date: Option<DateTime<Utc>>,
    pub expected_date: Option<DateTime<Utc>>,
    pub order_reference: Option<String>,
    pub unit_cost: Option<Decimal>,
    pub total_cost: Option<Decimal>,
    pub work_order_number: String,
    pub customer_name: Option<String>,
    pub vehicle_plate: Option<String>,
    pub work_order_scheduled: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub created_by: Option<String>,
    pub updated_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub received_date: Option<DateTime<Utc>>,
}

/// Parameters for [`crate::backorder::BackOrderBook::create`].
#[derive(Debug, Clone)]
pub struct NewBackOrder {
    pub parts_line_id: i64,
    pub work_order_id: i64,
    pub product_id: Option<i64>,
    pub product_name: String,
    pub sku: Option<String>,
    pub quantity_needed: Decimal,
    /// When absent, priority is computed from the work order's
    /// scheduled date.
    pub priority: Option<BackOrderPriority>,
    pub notes: Option<String>,
    pub created_by: Option<String>,
}

/// Supplier/order details for [`crate::backorder::BackOrderBook::mark_ordered`].
#[derive(Debug, Clone)]
pub struct OrderPlacement {
    pub supplier: String,
    pub order_date: DateTime<Utc>,
    pub expected_date: Option<DateTime<Utc>>,
    pub order_reference: Option<String>,
    pub quantity_ordered: Decimal,
    pub unit_cost: Option<Decimal>,
    pub updated_by: Option<String>,
}

/// Counts per status bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackOrderStats {
    pub pending: usize,
    pub ordered: usize,
    pub partially_received: usize,
    pub received: usize,
    pub cancelled: usize,
    pub active: usize,
}

/// Urgency from the work order's scheduled date: due within 2 days is
/// HIGH, more than 14 days out is LOW, otherwise NORMAL. No scheduled
/// date means NORMAL.
pub(crate) fn priority_for_schedule(
    scheduled_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> BackOrderPriority {
    let Some(scheduled) = scheduled_at else {
        return BackOrderPriority::Normal;
    };
    let days_until = (scheduled - now).num_days();
    if days_until <= 2 {
        BackOrderPriority::High
    } else if days_until > 14 {
        BackOrderPriority::Low
    } else {
        BackOrderPriority::Normal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn priority_ordering_is_low_to_high() {
        assert!(BackOrderPriority::High > BackOrderPriority::Normal);
        assert!(BackOrderPriority::Normal > BackOrderPriority::Low);
    }

    #[test]
    fn schedule_tomorrow_is_high() {
        let now = Utc::now();
        let p = priority_for_schedule(Some(now + Duration::days(1)), now);
        assert_eq!(p, BackOrderPriority::High);
    }

    #[test]
    fn schedule_in_a_week_is_normal() {
        let now = Utc::now();
        let p = priority_for_schedule(Some(now + Duration::days(7)), now);
        assert_eq!(p, BackOrderPriority::Normal);
    }

    #[test]
    fn schedule_in_three_weeks_is_low() {
        let now = Utc::now();
        let p = priority_for_schedule(Some(now + Duration::days(20)), now);
        assert_eq!(p, BackOrderPriority::Low);
    }

    #[test]
    fn overdue_schedule_is_high() {
        let now = Utc::now();
        let p = priority_for_schedule(Some(now - Duration::days(3)), now);
        assert_eq!(p, BackOrderPriority::High);
    }

    #[test]
    fn no_schedule_is_normal() {
        assert_eq!(
            priority_for_schedule(None, Utc::now()),
            BackOrderPriority::Normal
        );
    }

    #[test]
    fn terminal_states() {
        assert!(BackOrderStatus::Received.is_terminal());
        assert!(BackOrderStatus::Cancelled.is_terminal());
        assert!(BackOrderStatus::PartiallyReceived.is_active());
    }
}
