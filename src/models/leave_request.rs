//! Leave request records read from the external request store.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::LeaveType;

/// Lifecycle status of a leave request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LeaveStatus {
    /// Awaiting approval.
    Pending,
    /// Approved; counts as used.
    Approved,
    /// Rejected by an approver.
    Rejected,
    /// Withdrawn by the employee.
    Cancelled,
}

/// A leave request as stored by the request store.
///
/// `total_days` is the authoritative duration (half days are `0.5`). The
/// store may hand back rows where it is missing; aggregation treats those as
/// zero days.
///
/// # Example
///
/// ```
/// use leave_engine::models::{LeaveRequestRecord, LeaveStatus, LeaveType};
///
/// let json = r#"{
///     "id": "req_1",
///     "employee_id": "emp_001",
///     "leave_type": "VACATION",
///     "start_date": "2025-04-07",
///     "end_date": "2025-04-07",
///     "total_days": "0.5",
///     "status": "APPROVED",
///     "created_at": "2025-03-30T08:15:00"
/// }"#;
///
/// let record: LeaveRequestRecord = serde_json::from_str(json).unwrap();
/// assert_eq!(record.leave_type, LeaveType::Vacation);
/// assert_eq!(record.status, LeaveStatus::Approved);
/// assert_eq!(record.days().to_string(), "0.5");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveRequestRecord {
    /// Request identifier.
    pub id: String,
    /// Owning employee.
    pub employee_id: String,
    /// Leave type requested.
    pub leave_type: LeaveType,
    /// First day of leave.
    pub start_date: NaiveDate,
    /// Last day of leave.
    pub end_date: NaiveDate,
    /// Days charged; `None` when the store has no value.
    #[serde(default)]
    pub total_days: Option<Decimal>,
    /// Lifecycle status.
    pub status: LeaveStatus,
    /// When the request was created.
    pub created_at: NaiveDateTime,
}

impl LeaveRequestRecord {
    /// Days charged by this request, with a missing total read as zero.
    pub fn days(&self) -> Decimal {
        self.total_days.unwrap_or(Decimal::ZERO)
    }
}
