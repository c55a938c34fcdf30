//! Usage aggregation.
//!
//! Sums the days charged by leave requests per leave type, for one employee,
//! one status and one date window. Requests are attributed to the window that
//! contains their start date.
//!
//! Requests whose day total is missing are counted as zero days. They are
//! reported through [`UsageTotals::missing_totals`] and a `tracing` warning
//! instead of failing the aggregation.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::calendar::DateWindow;
use crate::error::EngineResult;
use crate::models::{AuditWarning, LeaveRequestRecord, LeaveStatus, LeaveTable, LeaveType, Severity};

/// Warning code attached to requests read without a day total.
pub const MISSING_DAY_TOTAL: &str = "MISSING_DAY_TOTAL";

/// Read access to an employee's leave requests.
///
/// The engine only ever reads history; implementations backed by an external
/// store report read failures as [`crate::error::EngineError::HistoryUnavailable`].
pub trait LeaveHistory {
    /// Returns the requests of `employee_id` with a status in `statuses`
    /// whose start date falls inside `window`.
    fn requests(
        &self,
        employee_id: &str,
        statuses: &[LeaveStatus],
        window: &DateWindow,
    ) -> EngineResult<Vec<LeaveRequestRecord>>;
}

impl<H: LeaveHistory + ?Sized> LeaveHistory for &H {
    fn requests(
        &self,
        employee_id: &str,
        statuses: &[LeaveStatus],
        window: &DateWindow,
    ) -> EngineResult<Vec<LeaveRequestRecord>> {
        (**self).requests(employee_id, statuses, window)
    }
}

/// An in-memory request history.
///
/// # Example
///
/// ```
/// use leave_engine::calculation::{year_window, LeaveHistory, RequestLedger};
/// use leave_engine::models::{LeaveRequestRecord, LeaveStatus, LeaveType};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let start = NaiveDate::from_ymd_opt(2025, 4, 7).unwrap();
/// let ledger: RequestLedger = vec![LeaveRequestRecord {
///     id: "req_1".to_string(),
///     employee_id: "emp_001".to_string(),
///     leave_type: LeaveType::Vacation,
///     start_date: start,
///     end_date: start,
///     total_days: Some(Decimal::ONE),
///     status: LeaveStatus::Approved,
///     created_at: start.and_hms_opt(9, 0, 0).unwrap(),
/// }]
/// .into_iter()
/// .collect();
///
/// let window = year_window(2025).unwrap();
/// let found = ledger.requests("emp_001", &[LeaveStatus::Approved], &window).unwrap();
/// assert_eq!(found.len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestLedger {
    records: Vec<LeaveRequestRecord>,
}

impl RequestLedger {
    /// Creates a ledger holding `records`.
    pub fn new(records: Vec<LeaveRequestRecord>) -> Self {
        Self { records }
    }

    /// Appends a request.
    pub fn push(&mut self, record: LeaveRequestRecord) {
        self.records.push(record);
    }

    /// All requests in insertion order.
    pub fn records(&self) -> &[LeaveRequestRecord] {
        &self.records
    }

    /// Number of requests held.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if the ledger holds no requests.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl FromIterator<LeaveRequestRecord> for RequestLedger {
    fn from_iter<I: IntoIterator<Item = LeaveRequestRecord>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl LeaveHistory for RequestLedger {
    fn requests(
        &self,
        employee_id: &str,
        statuses: &[LeaveStatus],
        window: &DateWindow,
    ) -> EngineResult<Vec<LeaveRequestRecord>> {
        Ok(self
            .records
            .iter()
            .filter(|r| r.employee_id == employee_id)
            .filter(|r| statuses.contains(&r.status))
            .filter(|r| window.contains(r.start_date))
            .cloned()
            .collect())
    }
}

/// Summed usage for one status in one window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageTotals {
    /// Status the requests were filtered on.
    pub status: LeaveStatus,
    /// Window the request start dates fall in.
    pub window: DateWindow,
    /// Days per leave type.
    pub by_type: LeaveTable,
    /// Number of requests summed.
    pub request_count: usize,
    /// Ids of requests read without a day total.
    pub missing_totals: Vec<String>,
}

impl UsageTotals {
    /// Days used for `leave_type`.
    pub fn get(&self, leave_type: LeaveType) -> Decimal {
        self.by_type.get(leave_type)
    }

    /// Total days across all leave types.
    pub fn total(&self) -> Decimal {
        self.by_type.total()
    }

    /// One `MISSING_DAY_TOTAL` warning per request read without a total.
    pub fn warnings(&self) -> Vec<AuditWarning> {
        self.missing_totals
            .iter()
            .map(|request_id| AuditWarning {
                code: MISSING_DAY_TOTAL.to_string(),
                message: format!(
                    "{:?} request {} between {} and {} has no day total; counted as 0 days",
                    self.status,
                    request_id,
                    self.window.start(),
                    self.window.end()
                ),
                severity: Severity::Low,
            })
            .collect()
    }
}

/// Sums the days of `employee_id`'s requests with `status` starting inside
/// `window`.
///
/// # Errors
///
/// A failed history read propagates unchanged. Missing day totals never
/// fail the aggregation.
///
/// # Example
///
/// ```
/// use leave_engine::calculation::{aggregate_usage, year_window, RequestLedger};
/// use leave_engine::models::LeaveStatus;
///
/// let ledger = RequestLedger::default();
/// let totals = aggregate_usage(&ledger, "emp_001", LeaveStatus::Approved, &year_window(2025).unwrap())
///     .unwrap();
/// assert!(totals.by_type.is_empty());
/// assert_eq!(totals.request_count, 0);
/// ```
pub fn aggregate_usage<H: LeaveHistory + ?Sized>(
    history: &H,
    employee_id: &str,
    status: LeaveStatus,
    window: &DateWindow,
) -> EngineResult<UsageTotals> {
    let requests = history.requests(employee_id, &[status], window)?;

    let mut by_type = LeaveTable::new();
    let mut missing_totals = Vec::new();
    for request in &requests {
        if request.total_days.is_none() {
            warn!(
                employee_id = %employee_id,
                request_id = %request.id,
                leave_type = %request.leave_type,
                "Leave request has no day total; counting it as zero days"
            );
            missing_totals.push(request.id.clone());
        }
        by_type.add(request.leave_type, request.days());
    }

    Ok(UsageTotals {
        status,
        window: *window,
        by_type,
        request_count: requests.len(),
        missing_totals,
    })
}
