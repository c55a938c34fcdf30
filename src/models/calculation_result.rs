//! Balance calculation result models.
//!
//! This module contains the [`BalanceSummary`] type produced by the balance
//! composer, together with the audit trace structures every calculation step
//! writes into.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{LeaveTable, LeaveType, Severity};

/// A single step in the audit trace recording a calculation decision.
///
/// Each step captures the input, output, and reasoning for a policy rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// The unique identifier of the rule that was applied.
    pub rule_id: String,
    /// The human-readable name of the rule.
    pub rule_name: String,
    /// Reference to the policy section for this rule.
    pub policy_ref: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}

/// A warning generated during calculation.
///
/// Warnings indicate data-quality problems that were tolerated rather than
/// failing the calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditWarning {
    /// A code identifying the type of warning (e.g. `MISSING_DAY_TOTAL`).
    pub code: String,
    /// A human-readable description of the warning.
    pub message: String,
    /// The severity level.
    pub severity: Severity,
}

/// The complete audit trace for a calculation.
///
/// # Example
///
/// ```
/// use leave_engine::models::AuditTrace;
///
/// let trace = AuditTrace::default();
/// assert!(trace.steps.is_empty());
/// assert!(trace.warnings.is_empty());
/// assert_eq!(trace.duration_us, 0);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditTrace {
    /// The sequence of calculation steps.
    pub steps: Vec<AuditStep>,
    /// Any warnings generated during calculation.
    pub warnings: Vec<AuditWarning>,
    /// Calculation duration in microseconds.
    pub duration_us: u64,
}

impl AuditTrace {
    /// The step number the next appended step should carry.
    pub fn next_step_number(&self) -> u32 {
        self.steps.len() as u32 + 1
    }

    /// Appends `warning` unless an identical one is already recorded.
    pub fn warn(&mut self, warning: AuditWarning) {
        if !self.warnings.contains(&warning) {
            self.warnings.push(warning);
        }
    }
}

/// The final balance for one leave type.
///
/// `available` is the larger of accrued and entitled plus carry-over, and
/// `remaining` is floored at zero even when usage exceeds availability.
///
/// # Example
///
/// ```
/// use leave_engine::models::{BalanceRecord, LeaveType};
/// use rust_decimal::Decimal;
///
/// let record = BalanceRecord::compose(
///     LeaveType::Vacation,
///     Decimal::from(21),
///     Decimal::new(105, 1),
///     Decimal::from(5),
///     Decimal::from(30),
///     Decimal::ZERO,
/// );
/// assert_eq!(record.available, Decimal::from(26));
/// assert_eq!(record.remaining, Decimal::ZERO);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceRecord {
    /// The leave type this record describes.
    pub leave_type: LeaveType,
    /// Full annual entitlement.
    pub entitled: Decimal,
    /// Accrued to date.
    pub accrued: Decimal,
    /// Carried over from the prior year.
    pub carried_over: Decimal,
    /// Approved days in the year.
    pub used: Decimal,
    /// Pending days in the year.
    pub pending: Decimal,
    /// `max(accrued, entitled) + carried_over`.
    pub available: Decimal,
    /// `max(0, available - used - pending)`.
    pub remaining: Decimal,
}

impl BalanceRecord {
    /// Composes a record from its inputs, deriving `available` and `remaining`.
    pub fn compose(
        leave_type: LeaveType,
        entitled: Decimal,
        accrued: Decimal,
        carried_over: Decimal,
        used: Decimal,
        pending: Decimal,
    ) -> Self {
        let available = accrued.max(entitled) + carried_over;
        let remaining = (available - used - pending).max(Decimal::ZERO);
        Self {
            leave_type,
            entitled,
            accrued,
            carried_over,
            used,
            pending,
            available,
            remaining,
        }
    }
}

/// Approved usage for one historical year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearUsageSummary {
    /// Calendar year.
    pub year: i32,
    /// Total approved days across all types.
    pub total_days: Decimal,
    /// Approved days per type.
    pub by_type: LeaveTable,
}

/// The complete result of a balance calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceSummary {
    /// Unique identifier for this calculation.
    pub calculation_id: Uuid,
    /// The engine version that produced the summary.
    pub engine_version: String,
    /// The employee the balances belong to.
    pub employee_id: String,
    /// The calendar year the balances describe.
    pub year: i32,
    /// The instant the balances were computed as of.
    pub as_of: NaiveDateTime,
    /// Whole years of service at `as_of`.
    pub tenure_years: u32,
    /// Months of service inside `year` used for accrual.
    pub months_worked: Decimal,
    /// One record per leave type, in [`LeaveType::ALL`] order.
    pub balances: Vec<BalanceRecord>,
    /// Approved usage for the trailing years, newest first.
    pub history: Vec<YearUsageSummary>,
    /// Steps and warnings recorded while computing.
    pub audit_trace: AuditTrace,
}

impl BalanceSummary {
    /// Returns the balance record for `leave_type`.
    pub fn balance(&self, leave_type: LeaveType) -> Option<&BalanceRecord> {
        self.balances.iter().find(|b| b.leave_type == leave_type)
    }
}
