//! Accrual calculation.
//!
//! Accruing leave types are earned monthly in proportion to the time served
//! inside the calendar year. All other types are granted in full on day one.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use super::calendar::{months_elapsed_fraction, year_window, MonthFraction, MONTHS_PER_YEAR};
use super::entitlement::policy_ref;
use crate::config::LeavePolicy;
use crate::error::EngineResult;
use crate::models::{AuditStep, LeaveTable, LeaveType};

/// Accrued-to-date days for one employee in one year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccrualSnapshot {
    /// The calendar year accrued in.
    pub year: i32,
    /// Formula used to count months.
    pub method: MonthFraction,
    /// Months of service inside the year, in `[0, 12]`.
    pub months_worked: Decimal,
    /// Accrued days per leave type, rounded to one decimal place.
    pub accrued: LeaveTable,
    /// Audit steps for the month count and the proration.
    pub audit_steps: Vec<AuditStep>,
}

impl AccrualSnapshot {
    /// Accrued days for `leave_type`.
    pub fn get(&self, leave_type: LeaveType) -> Decimal {
        self.accrued.get(leave_type)
    }
}

/// Prorates an annual entitlement over `months_worked`.
///
/// The result is rounded to one decimal place, half away from zero, and
/// never exceeds the entitlement. A non-positive entitlement accrues zero.
///
/// # Example
///
/// ```
/// use leave_engine::calculation::prorate_entitlement;
/// use rust_decimal::Decimal;
///
/// let accrued = prorate_entitlement(Decimal::from(21), Decimal::from(6));
/// assert_eq!(accrued, Decimal::new(105, 1));
/// ```
pub fn prorate_entitlement(entitlement: Decimal, months_worked: Decimal) -> Decimal {
    if entitlement <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    let months = months_worked.clamp(Decimal::ZERO, MONTHS_PER_YEAR);
    let accrued = (entitlement * months / MONTHS_PER_YEAR)
        .round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero);
    accrued.min(entitlement)
}

/// Calculates accrued days for every leave type in `entitlements`.
///
/// # Algorithm
///
/// 1. The accrual window runs from the later of the hire date and January 1
///    to the end of December 31, cut off at `as_of`.
/// 2. Months worked are counted over that window with `method`.
/// 3. Types in the policy's accruing set are prorated with
///    [`prorate_entitlement`]; every other type receives its full
///    entitlement.
///
/// A hire date after the year, or after `as_of`, gives zero months.
///
/// # Arguments
///
/// * `policy` - Supplies the accruing set
/// * `entitlements` - Annual entitlements from the resolver
/// * `hire_date` - Service counts from midnight on this date
/// * `year` - Calendar year to accrue in
/// * `as_of` - Instant the accrual is measured at
/// * `method` - Month counting formula
/// * `step_number` - Number given to the first audit step
///
/// # Example
///
/// ```
/// use leave_engine::calculation::{calculate_accrual, resolve_entitlements, MonthFraction};
/// use leave_engine::config::LeavePolicy;
/// use leave_engine::models::{LeaveType, Role};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let policy = LeavePolicy::bcea();
/// let table = resolve_entitlements(&policy, Role::Employee, 0, 2025, 1);
/// let hired = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
/// let as_of = NaiveDate::from_ymd_opt(2025, 7, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
///
/// let accrual = calculate_accrual(
///     &policy,
///     &table.entitlements,
///     hired,
///     2025,
///     as_of,
///     MonthFraction::CalendarExact,
///     1,
/// )
/// .unwrap();
///
/// assert_eq!(accrual.months_worked, Decimal::from(6));
/// assert_eq!(accrual.get(LeaveType::Vacation), Decimal::new(105, 1));
/// assert_eq!(accrual.get(LeaveType::Maternity), Decimal::from(120));
/// ```
pub fn calculate_accrual(
    policy: &LeavePolicy,
    entitlements: &LeaveTable,
    hire_date: NaiveDate,
    year: i32,
    as_of: NaiveDateTime,
    method: MonthFraction,
    step_number: u32,
) -> EngineResult<AccrualSnapshot> {
    let window = year_window(year)?;
    let accrual_start = hire_date.and_time(NaiveTime::MIN).max(window.start_instant());
    let accrual_end = window.end_instant();

    let months_worked = if accrual_start >= accrual_end {
        Decimal::ZERO
    } else {
        months_elapsed_fraction(accrual_start, accrual_end, as_of, method)?
    };

    let mut steps = Vec::with_capacity(2);
    steps.push(AuditStep {
        step_number,
        rule_id: "months_worked".to_string(),
        rule_name: "Months Worked In Year".to_string(),
        policy_ref: policy_ref(policy, "entitlements.accruing"),
        input: serde_json::json!({
            "hire_date": hire_date.to_string(),
            "year": year,
            "window_start": accrual_start.to_string(),
            "as_of": as_of.to_string(),
            "method": method
        }),
        output: serde_json::json!({
            "months_worked": months_worked.round_dp(4).normalize().to_string()
        }),
        reasoning: format!(
            "Service counted from {} up to {} gives {} months in {}",
            accrual_start.date(),
            as_of,
            months_worked.round_dp(4).normalize(),
            year
        ),
    });

    let mut accrued = LeaveTable::new();
    let mut prorated = 0usize;
    for (leave_type, entitlement) in entitlements.iter() {
        if policy.accrues(leave_type) {
            accrued.set(leave_type, prorate_entitlement(entitlement, months_worked));
            prorated += 1;
        } else {
            accrued.set(leave_type, entitlement.max(Decimal::ZERO));
        }
    }

    steps.push(AuditStep {
        step_number: step_number + 1,
        rule_id: "monthly_accrual".to_string(),
        rule_name: "Monthly Accrual".to_string(),
        policy_ref: policy_ref(policy, "entitlements.accruing"),
        input: serde_json::json!({
            "entitlements": entitlements.to_audit_json(),
            "months_worked": months_worked.round_dp(4).normalize().to_string()
        }),
        output: accrued.to_audit_json(),
        reasoning: format!(
            "Prorated {} accruing types over {} months; {} types granted in full",
            prorated,
            months_worked.round_dp(2).normalize(),
            entitlements.len() - prorated
        ),
    });

    tracing::debug!(
        year = year,
        months_worked = %months_worked.round_dp(4),
        accruing_types = prorated,
        "Calculated accrual"
    );

    Ok(AccrualSnapshot {
        year,
        method,
        months_worked,
        accrued,
        audit_steps: steps,
    })
}
