//! Reconciliation verification.
//!
//! The verifier recomputes entitlements and accruals for an employee and
//! compares them against the production derivation, then re-derives per-type
//! balances directly from raw approved and pending request sums to flag
//! policy violations.
//!
//! Both derivations go through the same resolver and accrual functions. They
//! only diverge when the verifier is given a different reference policy or a
//! different month formula, which makes any drift an explicit choice.

use chrono::{Datelike, NaiveDateTime};
use rust_decimal::Decimal;
use tracing::{info, warn};
use uuid::Uuid;

use super::accrual::calculate_accrual;
use super::calendar::{tenure_years, year_window, MonthFraction};
use super::entitlement::resolve_entitlements;
use super::usage::{aggregate_usage, LeaveHistory};
use crate::config::LeavePolicy;
use crate::error::EngineResult;
use crate::models::{
    ComparisonResult, Discrepancy, EmployeeProfile, Issue, IssueKind, LeaveStatus, LeaveTable,
    LeaveType, Priority, Recommendation, RecommendationKind, Severity, VerificationReport,
    VerifiedBalance,
};

/// Default tolerance for table comparisons (0.1 days).
pub const DEFAULT_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 1);

/// Zero-based month index after which untouched leave is flagged (July).
const UNUSED_LEAVE_AFTER_MONTH0: u32 = 6;

/// Compares two per-type tables within `tolerance`.
///
/// Every leave type present in either table is compared; a type missing from
/// one side reads as zero. A type mismatches when
/// `|expected - actual| > tolerance`.
///
/// # Example
///
/// ```
/// use leave_engine::calculation::compare_tables;
/// use leave_engine::models::{LeaveTable, LeaveType};
/// use rust_decimal::Decimal;
///
/// let expected: LeaveTable = [(LeaveType::Vacation, Decimal::new(105, 1))].into_iter().collect();
/// let actual: LeaveTable = [(LeaveType::Vacation, Decimal::new(104, 1))].into_iter().collect();
///
/// assert!(compare_tables(&expected, &actual, Decimal::new(1, 1)).matches);
/// assert!(!compare_tables(&expected, &actual, Decimal::new(5, 2)).matches);
/// ```
pub fn compare_tables(
    expected: &LeaveTable,
    actual: &LeaveTable,
    tolerance: Decimal,
) -> ComparisonResult {
    let discrepancies: Vec<Discrepancy> = expected
        .union_keys(actual)
        .into_iter()
        .filter_map(|leave_type| {
            let expected_days = expected.get(leave_type);
            let actual_days = actual.get(leave_type);
            let difference = actual_days - expected_days;
            (difference.abs() > tolerance).then_some(Discrepancy {
                leave_type,
                expected: expected_days,
                actual: actual_days,
                difference,
            })
        })
        .collect();

    ComparisonResult {
        expected: expected.clone(),
        actual: actual.clone(),
        tolerance,
        matches: discrepancies.is_empty(),
        discrepancies,
    }
}

/// Recomputes balances independently and reports discrepancies and policy
/// violations.
///
/// # Example
///
/// ```
/// use leave_engine::calculation::{ReconciliationVerifier, RequestLedger};
/// use leave_engine::config::LeavePolicy;
/// use leave_engine::models::{EmployeeProfile, Role};
/// use chrono::NaiveDate;
///
/// let employee = EmployeeProfile {
///     id: "emp_001".to_string(),
///     name: "Sipho Dlamini".to_string(),
///     employee_number: "E-001".to_string(),
///     department: "Operations".to_string(),
///     hire_date: NaiveDate::from_ymd_opt(2021, 1, 1).unwrap(),
///     role: Role::Employee,
/// };
/// let as_of = NaiveDate::from_ymd_opt(2025, 5, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
///
/// let verifier = ReconciliationVerifier::new(LeavePolicy::bcea());
/// let report = verifier
///     .verify_balances(&employee, &RequestLedger::default(), 2025, as_of)
///     .unwrap();
/// assert!(report.is_clean());
/// ```
#[derive(Debug, Clone)]
pub struct ReconciliationVerifier {
    policy: LeavePolicy,
    reference_policy: Option<LeavePolicy>,
    cross_check: MonthFraction,
    tolerance: Decimal,
}

impl ReconciliationVerifier {
    /// Creates a verifier whose reference derivation matches production.
    pub fn new(policy: LeavePolicy) -> Self {
        Self {
            policy,
            reference_policy: None,
            cross_check: MonthFraction::CalendarExact,
            tolerance: DEFAULT_TOLERANCE,
        }
    }

    /// Recomputes expected figures against `policy` instead of the engine
    /// policy.
    pub fn with_reference_policy(mut self, policy: LeavePolicy) -> Self {
        self.reference_policy = Some(policy);
        self
    }

    /// Counts expected months with `method`.
    ///
    /// [`MonthFraction::AverageMonth`] reproduces the 30.44-day derivation;
    /// its drift from the calendar formula shows up in the accrual check.
    pub fn with_cross_check(mut self, method: MonthFraction) -> Self {
        self.cross_check = method;
        self
    }

    /// Sets the comparison tolerance.
    pub fn with_tolerance(mut self, tolerance: Decimal) -> Self {
        self.tolerance = tolerance.abs();
        self
    }

    /// Returns the month formula used for expected figures.
    pub fn cross_check(&self) -> MonthFraction {
        self.cross_check
    }

    /// Returns the comparison tolerance.
    pub fn tolerance(&self) -> Decimal {
        self.tolerance
    }

    fn reference_policy(&self) -> &LeavePolicy {
        self.reference_policy.as_ref().unwrap_or(&self.policy)
    }

    /// Verifies the balances of `employee` for `year` as of `as_of`.
    ///
    /// # Algorithm
    ///
    /// 1. Resolve entitlements and accruals with the engine policy and the
    ///    calendar formula ("actual").
    /// 2. Resolve them again with the reference policy and the cross-check
    ///    formula ("expected") and compare both pairs.
    /// 3. Sum approved and pending requests starting in `year` and derive a
    ///    signed balance per type.
    /// 4. Raise `OVERUSE` when used exceeds accrued and `NEGATIVE_BALANCE`
    ///    when the signed balance is below zero.
    /// 5. Recommend using `UNUSED_LEAVE` for entitled types untouched after
    ///    July, and note a `MID_YEAR_HIRE` proration.
    ///
    /// Tenure is measured at `as_of`, or at December 31 of `year` when
    /// verifying a year that has already ended.
    ///
    /// # Errors
    ///
    /// Propagates history read failures and calendar range errors.
    /// Mismatches and violations are reported, never returned as errors.
    pub fn verify_balances<H: LeaveHistory + ?Sized>(
        &self,
        employee: &EmployeeProfile,
        history: &H,
        year: i32,
        as_of: NaiveDateTime,
    ) -> EngineResult<VerificationReport> {
        let report_id = Uuid::new_v4();
        let window = year_window(year)?;
        // A past year is verified with the tenure held at its last day.
        let tenure = tenure_years(employee.hire_date, as_of.date().min(window.end()));
        let reference = self.reference_policy();

        let actual_entitlement = resolve_entitlements(&self.policy, employee.role, tenure, year, 1);
        let actual_accrual = calculate_accrual(
            &self.policy,
            &actual_entitlement.entitlements,
            employee.hire_date,
            year,
            as_of,
            MonthFraction::CalendarExact,
            1,
        )?;

        let expected_entitlement = resolve_entitlements(reference, employee.role, tenure, year, 1);
        let expected_accrual = calculate_accrual(
            reference,
            &expected_entitlement.entitlements,
            employee.hire_date,
            year,
            as_of,
            self.cross_check,
            1,
        )?;

        let entitlement_check = compare_tables(
            &expected_entitlement.entitlements,
            &actual_entitlement.entitlements,
            self.tolerance,
        );
        let accrual_check = compare_tables(
            &expected_accrual.accrued,
            &actual_accrual.accrued,
            self.tolerance,
        );

        let used = aggregate_usage(history, &employee.id, LeaveStatus::Approved, &window)?;
        let pending = aggregate_usage(history, &employee.id, LeaveStatus::Pending, &window)?;

        let mut balances = Vec::with_capacity(LeaveType::ALL.len());
        let mut issues = Vec::new();
        let mut recommendations = Vec::new();

        for leave_type in LeaveType::ALL {
            let entitled = actual_entitlement.get(leave_type);
            let accrued = actual_accrual.get(leave_type);
            let used_days = used.get(leave_type);
            let pending_days = pending.get(leave_type);
            let balance = accrued - used_days - pending_days;

            if used_days > accrued {
                issues.push(Issue {
                    kind: IssueKind::Overuse,
                    severity: Severity::High,
                    leave_type,
                    message: format!(
                        "{} used {} days but only {} accrued ({} over)",
                        leave_type,
                        used_days.normalize(),
                        accrued.normalize(),
                        (used_days - accrued).normalize()
                    ),
                });
            }

            if balance < Decimal::ZERO {
                issues.push(Issue {
                    kind: IssueKind::NegativeBalance,
                    severity: Severity::High,
                    leave_type,
                    message: format!(
                        "{} balance is {} (accrued {} - used {} - pending {})",
                        leave_type,
                        balance.normalize(),
                        accrued.normalize(),
                        used_days.normalize(),
                        pending_days.normalize()
                    ),
                });
            }

            if entitled > Decimal::ZERO
                && used_days.is_zero()
                && as_of.month0() > UNUSED_LEAVE_AFTER_MONTH0
            {
                recommendations.push(Recommendation {
                    kind: RecommendationKind::UnusedLeave,
                    priority: Priority::Medium,
                    leave_type: Some(leave_type),
                    message: format!(
                        "No {} used yet in {}; {} of {} days accrued",
                        leave_type,
                        year,
                        accrued.normalize(),
                        entitled.normalize()
                    ),
                });
            }

            balances.push(VerifiedBalance {
                leave_type,
                entitled,
                accrued,
                used: used_days,
                pending: pending_days,
                balance,
            });
        }

        if employee.hire_date > window.start() && window.contains(employee.hire_date) {
            recommendations.push(Recommendation {
                kind: RecommendationKind::MidYearHire,
                priority: Priority::Info,
                leave_type: None,
                message: format!(
                    "Hired on {}; {} accruals are prorated over {} months",
                    employee.hire_date,
                    year,
                    actual_accrual.months_worked.round_dp(2).normalize()
                ),
            });
        }

        for check in [&entitlement_check, &accrual_check] {
            for discrepancy in &check.discrepancies {
                warn!(
                    report_id = %report_id,
                    employee_id = %employee.id,
                    leave_type = %discrepancy.leave_type,
                    expected = %discrepancy.expected,
                    actual = %discrepancy.actual,
                    "Reconciliation discrepancy"
                );
            }
        }

        info!(
            report_id = %report_id,
            employee_id = %employee.id,
            year = year,
            cross_check = ?self.cross_check,
            entitlements_match = entitlement_check.matches,
            accruals_match = accrual_check.matches,
            issues = issues.len(),
            recommendations = recommendations.len(),
            "Verification complete"
        );

        Ok(VerificationReport {
            report_id,
            employee_id: employee.id.clone(),
            year,
            as_of,
            months_worked: expected_accrual.months_worked,
            entitlement_check,
            accrual_check,
            balances,
            issues,
            recommendations,
        })
    }
}
