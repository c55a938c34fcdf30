//! Balance composition.
//!
//! The [`BalanceEngine`] runs the full pipeline for one employee: entitlement
//! resolution, accrual, carry-over and usage aggregation, then composes one
//! [`BalanceRecord`] per leave type and a trailing history of approved usage.

use std::time::Instant;

use chrono::{Datelike, NaiveDateTime};
use rust_decimal::Decimal;
use tracing::{info, warn};
use uuid::Uuid;

use super::accrual::calculate_accrual;
use super::calendar::{tenure_years, year_window, MonthFraction};
use super::carry_over::calculate_carry_over;
use super::entitlement::{policy_ref, resolve_entitlements};
use super::usage::{aggregate_usage, LeaveHistory};
use crate::config::LeavePolicy;
use crate::error::EngineResult;
use crate::models::{
    AuditStep, AuditTrace, BalanceRecord, BalanceSummary, EmployeeProfile, LeaveStatus, LeaveTable,
    LeaveType, YearUsageSummary,
};

/// Number of years in the usage history: the balance year and the two before it.
pub const DEFAULT_HISTORY_YEARS: u32 = 3;

/// Deepest usage history an engine will roll up.
pub const MAX_HISTORY_YEARS: u32 = 100;

/// Computes leave balances against a policy.
///
/// # Example
///
/// ```
/// use leave_engine::calculation::{BalanceEngine, RequestLedger};
/// use leave_engine::config::LeavePolicy;
/// use leave_engine::models::{EmployeeProfile, LeaveType, Role};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let employee = EmployeeProfile {
///     id: "emp_001".to_string(),
///     name: "Sipho Dlamini".to_string(),
///     employee_number: "E-001".to_string(),
///     department: "Operations".to_string(),
///     hire_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
///     role: Role::Employee,
/// };
/// let as_of = NaiveDate::from_ymd_opt(2025, 7, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
///
/// let engine = BalanceEngine::new(LeavePolicy::bcea());
/// let summary = engine
///     .compute_balances(&employee, &RequestLedger::default(), as_of)
///     .unwrap();
///
/// let vacation = summary.balance(LeaveType::Vacation).unwrap();
/// assert_eq!(vacation.accrued, Decimal::new(105, 1));
/// assert_eq!(vacation.remaining, Decimal::from(21));
/// ```
#[derive(Debug, Clone)]
pub struct BalanceEngine {
    policy: LeavePolicy,
    history_years: u32,
}

impl BalanceEngine {
    /// Creates an engine for `policy` with the default history depth.
    pub fn new(policy: LeavePolicy) -> Self {
        Self {
            policy,
            history_years: DEFAULT_HISTORY_YEARS,
        }
    }

    /// Sets how many years the usage history covers, clamped to
    /// `1..=MAX_HISTORY_YEARS`.
    pub fn with_history_years(mut self, years: u32) -> Self {
        self.history_years = years.clamp(1, MAX_HISTORY_YEARS);
        self
    }

    /// Returns the policy balances are computed against.
    pub fn policy(&self) -> &LeavePolicy {
        &self.policy
    }

    /// Returns the number of years in the usage history.
    pub fn history_years(&self) -> u32 {
        self.history_years
    }

    /// Computes every leave balance of `employee` for the calendar year of
    /// `as_of`.
    ///
    /// For each leave type:
    ///
    /// - `available = max(accrued, entitled) + carried_over`
    /// - `remaining = max(0, available - used - pending)`
    ///
    /// where `used` and `pending` are the approved and pending requests
    /// starting in the year.
    ///
    /// # Errors
    ///
    /// Propagates history read failures and calendar range errors. Requests
    /// without a day total are counted as zero and recorded as
    /// `MISSING_DAY_TOTAL` warnings instead.
    pub fn compute_balances<H: LeaveHistory + ?Sized>(
        &self,
        employee: &EmployeeProfile,
        history: &H,
        as_of: NaiveDateTime,
    ) -> EngineResult<BalanceSummary> {
        let start_time = Instant::now();
        let calculation_id = Uuid::new_v4();
        let year = as_of.year();
        let policy = &self.policy;

        info!(
            calculation_id = %calculation_id,
            employee_id = %employee.id,
            year = year,
            "Computing leave balances"
        );

        let mut trace = AuditTrace::default();
        let tenure = tenure_years(employee.hire_date, as_of.date());

        let entitlement =
            resolve_entitlements(policy, employee.role, tenure, year, trace.next_step_number());
        trace.steps.extend(entitlement.audit_steps.iter().cloned());

        let accrual = calculate_accrual(
            policy,
            &entitlement.entitlements,
            employee.hire_date,
            year,
            as_of,
            MonthFraction::CalendarExact,
            trace.next_step_number(),
        )?;
        trace.steps.extend(accrual.audit_steps.iter().cloned());

        let carry_over =
            calculate_carry_over(policy, employee, history, year, trace.next_step_number())?;
        trace.steps.extend(carry_over.audit_steps.iter().cloned());
        for warning in &carry_over.warnings {
            trace.warn(warning.clone());
        }

        let window = year_window(year)?;
        let used = aggregate_usage(history, &employee.id, LeaveStatus::Approved, &window)?;
        let pending = aggregate_usage(history, &employee.id, LeaveStatus::Pending, &window)?;
        for warning in used.warnings().into_iter().chain(pending.warnings()) {
            trace.warn(warning);
        }

        trace.steps.push(AuditStep {
            step_number: trace.next_step_number(),
            rule_id: "usage_totals".to_string(),
            rule_name: "Current Year Usage".to_string(),
            policy_ref: policy_ref(policy, "usage"),
            input: serde_json::json!({
                "year": year,
                "approved_requests": used.request_count,
                "pending_requests": pending.request_count
            }),
            output: serde_json::json!({
                "used": used.by_type.to_audit_json(),
                "pending": pending.by_type.to_audit_json()
            }),
            reasoning: format!(
                "{} approved days and {} pending days start in {}",
                used.total().normalize(),
                pending.total().normalize(),
                year
            ),
        });

        let balances: Vec<BalanceRecord> = LeaveType::ALL
            .iter()
            .map(|&leave_type| {
                BalanceRecord::compose(
                    leave_type,
                    entitlement.get(leave_type),
                    accrual.get(leave_type),
                    carry_over.get(leave_type),
                    used.get(leave_type),
                    pending.get(leave_type),
                )
            })
            .collect();

        let exhausted: Vec<&str> = balances
            .iter()
            .filter(|b| b.used + b.pending > b.available)
            .map(|b| b.leave_type.code())
            .collect();
        if !exhausted.is_empty() {
            warn!(
                calculation_id = %calculation_id,
                employee_id = %employee.id,
                leave_types = ?exhausted,
                "Usage exceeds availability; remaining floored at zero"
            );
        }

        trace.steps.push(AuditStep {
            step_number: trace.next_step_number(),
            rule_id: "balance_composition".to_string(),
            rule_name: "Balance Composition".to_string(),
            policy_ref: policy_ref(policy, "balance"),
            input: serde_json::json!({
                "formula": "available = max(accrued, entitled) + carried_over; remaining = max(0, available - used - pending)"
            }),
            output: balances
                .iter()
                .map(|b| (b.leave_type, b.remaining))
                .collect::<LeaveTable>()
                .to_audit_json(),
            reasoning: if exhausted.is_empty() {
                format!("Composed {} balances", balances.len())
            } else {
                format!(
                    "Composed {} balances; {} floored at zero",
                    balances.len(),
                    exhausted.join(", ")
                )
            },
        });

        let depth = i32::try_from(self.history_years).unwrap_or(MAX_HISTORY_YEARS as i32);
        let mut history_summary = Vec::with_capacity(depth as usize);
        for offset in 0..depth {
            let history_year = year - offset;
            let approved = if offset == 0 {
                used.clone()
            } else {
                aggregate_usage(
                    history,
                    &employee.id,
                    LeaveStatus::Approved,
                    &year_window(history_year)?,
                )?
            };
            for warning in approved.warnings() {
                trace.warn(warning);
            }
            history_summary.push(YearUsageSummary {
                year: history_year,
                total_days: approved.total(),
                by_type: approved.by_type,
            });
        }

        for warning in &trace.warnings {
            warn!(
                calculation_id = %calculation_id,
                employee_id = %employee.id,
                code = %warning.code,
                "{}",
                warning.message
            );
        }

        trace.duration_us = start_time.elapsed().as_micros() as u64;

        let remaining_total: Decimal = balances.iter().map(|b| b.remaining).sum();
        info!(
            calculation_id = %calculation_id,
            employee_id = %employee.id,
            year = year,
            tenure_years = tenure,
            remaining_total = %remaining_total,
            warnings = trace.warnings.len(),
            duration_us = trace.duration_us,
            "Leave balances computed"
        );

        Ok(BalanceSummary {
            calculation_id,
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            employee_id: employee.id.clone(),
            year,
            as_of,
            tenure_years: tenure,
            months_worked: accrual.months_worked,
            balances,
            history: history_summary,
            audit_trace: trace,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculation::usage::RequestLedger;
    use crate::error::EngineError;
    use crate::calculation::calendar::DateWindow;
    use crate::models::{LeaveRequestRecord, Role};
    use chrono::{NaiveDate, NaiveTime};
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn midnight(y: i32, m: u32, d: u32) -> NaiveDateTime {
        date(y, m, d).and_time(NaiveTime::MIN)
    }

    fn employee(role: Role, hire_date: NaiveDate) -> EmployeeProfile {
        EmployeeProfile {
            id: "emp_200".to_string(),
            name: "Lerato Mokoena".to_string(),
            employee_number: "E-200".to_string(),
            department: "Engineering".to_string(),
            hire_date,
            role,
        }
    }

    fn request(
        id: &str,
        leave_type: LeaveType,
        start: NaiveDate,
        days: Option<&str>,
        status: LeaveStatus,
    ) -> LeaveRequestRecord {
        LeaveRequestRecord {
            id: id.to_string(),
            employee_id: "emp_200".to_string(),
            leave_type,
            start_date: start,
            end_date: start,
            total_days: days.map(dec),
            status,
            created_at: start.and_hms_opt(8, 0, 0).unwrap(),
        }
    }

    fn engine() -> BalanceEngine {
        BalanceEngine::new(LeavePolicy::bcea())
    }

    #[test]
    fn test_new_hire_midyear_balances() {
        let summary = engine()
            .compute_balances(
                &employee(Role::Employee, date(2025, 1, 1)),
                &RequestLedger::default(),
                midnight(2025, 7, 1),
            )
            .unwrap();

        assert_eq!(summary.year, 2025);
        assert_eq!(summary.tenure_years, 0);
        assert_eq!(summary.months_worked, dec("6"));
        assert_eq!(summary.balances.len(), 9);

        let vacation = summary.balance(LeaveType::Vacation).unwrap();
        assert_eq!(vacation.entitled, dec("21"));
        assert_eq!(vacation.accrued, dec("10.5"));
        assert_eq!(vacation.carried_over, Decimal::ZERO);
        assert_eq!(vacation.available, dec("21"));
        assert_eq!(vacation.remaining, dec("21"));
    }

    #[test]
    fn test_balances_follow_leave_type_order() {
        let summary = engine()
            .compute_balances(
                &employee(Role::Employee, date(2020, 1, 1)),
                &RequestLedger::default(),
                midnight(2025, 3, 1),
            )
            .unwrap();
        let order: Vec<LeaveType> = summary.balances.iter().map(|b| b.leave_type).collect();
        assert_eq!(order, LeaveType::ALL.to_vec());
    }

    #[test]
    fn test_carry_over_and_usage_flow_into_balance() {
        let ledger = RequestLedger::new(vec![
            request("r1", LeaveType::Vacation, date(2024, 3, 4), Some("10"), LeaveStatus::Approved),
            request("r2", LeaveType::Vacation, date(2025, 2, 3), Some("4"), LeaveStatus::Approved),
            request("r3", LeaveType::Vacation, date(2025, 9, 1), Some("2.5"), LeaveStatus::Pending),
            request("r4", LeaveType::SickLeave, date(2025, 4, 1), Some("1"), LeaveStatus::Rejected),
        ]);

        let summary = engine()
            .compute_balances(&employee(Role::Employee, date(2022, 6, 1)), &ledger, midnight(2025, 7, 1))
            .unwrap();

        let vacation = summary.balance(LeaveType::Vacation).unwrap();
        assert_eq!(vacation.carried_over, dec("5"));
        assert_eq!(vacation.used, dec("4"));
        assert_eq!(vacation.pending, dec("2.5"));
        assert_eq!(vacation.available, dec("26"));
        assert_eq!(vacation.remaining, dec("19.5"));

        let sick = summary.balance(LeaveType::SickLeave).unwrap();
        assert_eq!(sick.used, Decimal::ZERO);
    }

    #[test]
    fn test_overuse_floors_remaining_at_zero() {
        let ledger = RequestLedger::new(vec![request(
            "r1",
            LeaveType::Personal,
            date(2025, 2, 3),
            Some("9"),
            LeaveStatus::Approved,
        )]);

        let summary = engine()
            .compute_balances(&employee(Role::Employee, date(2025, 1, 1)), &ledger, midnight(2025, 7, 1))
            .unwrap();

        let personal = summary.balance(LeaveType::Personal).unwrap();
        assert_eq!(personal.available, dec("3"));
        assert_eq!(personal.remaining, Decimal::ZERO);
        let composition = summary
            .audit_trace
            .steps
            .iter()
            .find(|s| s.rule_id == "balance_composition")
            .unwrap();
        assert!(composition.reasoning.contains("PERSONAL floored at zero"));
    }

    #[test]
    fn test_history_covers_three_years_newest_first() {
        let ledger = RequestLedger::new(vec![
            request("r1", LeaveType::Vacation, date(2023, 5, 2), Some("6"), LeaveStatus::Approved),
            request("r2", LeaveType::SickLeave, date(2024, 8, 12), Some("2"), LeaveStatus::Approved),
            request("r3", LeaveType::Vacation, date(2025, 1, 20), Some("1"), LeaveStatus::Approved),
            request("r4", LeaveType::Vacation, date(2022, 5, 2), Some("9"), LeaveStatus::Approved),
        ]);

        let summary = engine()
            .compute_balances(&employee(Role::Employee, date(2019, 1, 1)), &ledger, midnight(2025, 6, 1))
            .unwrap();

        let years: Vec<i32> = summary.history.iter().map(|h| h.year).collect();
        assert_eq!(years, vec![2025, 2024, 2023]);
        assert_eq!(summary.history[0].total_days, dec("1"));
        assert_eq!(summary.history[1].by_type.get(LeaveType::SickLeave), dec("2"));
        assert_eq!(summary.history[2].total_days, dec("6"));
    }

    #[test]
    fn test_history_depth_is_configurable() {
        let summary = engine()
            .with_history_years(5)
            .compute_balances(
                &employee(Role::Employee, date(2019, 1, 1)),
                &RequestLedger::default(),
                midnight(2025, 6, 1),
            )
            .unwrap();
        assert_eq!(summary.history.len(), 5);
        assert_eq!(summary.history[4].year, 2021);

        assert_eq!(engine().with_history_years(0).history_years(), 1);
    }

    #[test]
    fn test_history_depth_is_capped() {
        let engine = engine().with_history_years(u32::MAX);
        assert_eq!(engine.history_years(), MAX_HISTORY_YEARS);

        let summary = engine
            .compute_balances(
                &employee(Role::Employee, date(2019, 1, 1)),
                &RequestLedger::default(),
                midnight(2025, 6, 1),
            )
            .unwrap();
        assert_eq!(summary.history.len(), MAX_HISTORY_YEARS as usize);
        assert_eq!(summary.history.last().unwrap().year, 1926);
    }

    #[test]
    fn test_missing_totals_recorded_once() {
        let ledger = RequestLedger::new(vec![
            request("r1", LeaveType::Vacation, date(2025, 2, 3), None, LeaveStatus::Approved),
            request("r2", LeaveType::Vacation, date(2025, 3, 3), Some("2"), LeaveStatus::Approved),
        ]);

        let summary = engine()
            .compute_balances(&employee(Role::Employee, date(2020, 1, 1)), &ledger, midnight(2025, 7, 1))
            .unwrap();

        assert_eq!(summary.balance(LeaveType::Vacation).unwrap().used, dec("2"));
        assert_eq!(summary.audit_trace.warnings.len(), 1);
        assert_eq!(summary.audit_trace.warnings[0].code, "MISSING_DAY_TOTAL");
    }

    #[test]
    fn test_audit_steps_are_sequential() {
        let summary = engine()
            .compute_balances(
                &employee(Role::Intern, date(2025, 2, 1)),
                &RequestLedger::default(),
                midnight(2025, 8, 1),
            )
            .unwrap();

        let steps = &summary.audit_trace.steps;
        for (index, step) in steps.iter().enumerate() {
            assert_eq!(step.step_number, index as u32 + 1);
        }
        let rule_ids: Vec<&str> = steps.iter().map(|s| s.rule_id.as_str()).collect();
        assert_eq!(
            rule_ids,
            vec![
                "base_entitlement",
                "tenure_ladder",
                "special_adjustment",
                "months_worked",
                "monthly_accrual",
                "carry_over",
                "usage_totals",
                "balance_composition",
            ]
        );
    }

    #[test]
    fn test_history_failure_propagates() {
        struct Offline;

        impl LeaveHistory for Offline {
            fn requests(
                &self,
                _employee_id: &str,
                _statuses: &[LeaveStatus],
                _window: &DateWindow,
            ) -> EngineResult<Vec<LeaveRequestRecord>> {
                Err(EngineError::HistoryUnavailable {
                    message: "timeout".to_string(),
                })
            }
        }

        let result = engine().compute_balances(
            &employee(Role::Employee, date(2020, 1, 1)),
            &Offline,
            midnight(2025, 7, 1),
        );
        assert!(matches!(result, Err(EngineError::HistoryUnavailable { .. })));
    }

    #[test]
    fn test_summary_metadata() {
        let summary = engine()
            .compute_balances(
                &employee(Role::Director, date(2013, 3, 15)),
                &RequestLedger::default(),
                midnight(2025, 12, 31),
            )
            .unwrap();

        assert_eq!(summary.employee_id, "emp_200");
        assert_eq!(summary.engine_version, env!("CARGO_PKG_VERSION"));
        assert_eq!(summary.tenure_years, 12);
        assert_eq!(summary.balance(LeaveType::Vacation).unwrap().entitled, dec("30"));
    }
}
