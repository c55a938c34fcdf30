//! Carry-over calculation.
//!
//! Unused leave of the carry-eligible types rolls from the prior calendar
//! year into the current one, capped at
//! `min(max_days, floor(prior_entitlement / divisor))`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::calendar::{tenure_years, year_window};
use super::entitlement::{policy_ref, resolve_entitlements};
use super::usage::{aggregate_usage, LeaveHistory};
use crate::config::{CarryOverRule, LeavePolicy};
use crate::error::EngineResult;
use crate::models::{AuditStep, AuditWarning, EmployeeProfile, LeaveStatus, LeaveTable, LeaveType};

/// Days carried into a year from the one before it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarryOverSnapshot {
    /// The year receiving the carried days.
    pub year: i32,
    /// The year the days come from.
    pub prior_year: i32,
    /// Entitlements recomputed for the prior year.
    pub prior_entitlement: LeaveTable,
    /// Approved usage in the prior year.
    pub prior_used: LeaveTable,
    /// Carried days; zero for every type outside the eligible set.
    pub carried_over: LeaveTable,
    /// The carry-over audit step.
    pub audit_steps: Vec<AuditStep>,
    /// Data-quality warnings from the prior-year usage read.
    pub warnings: Vec<AuditWarning>,
}

impl CarryOverSnapshot {
    /// Carried days for `leave_type`.
    pub fn get(&self, leave_type: LeaveType) -> Decimal {
        self.carried_over.get(leave_type)
    }
}

/// Carry cap for a prior-year entitlement.
///
/// # Example
///
/// ```
/// use leave_engine::calculation::carry_over_cap;
/// use leave_engine::config::LeavePolicy;
/// use rust_decimal::Decimal;
///
/// let rule = LeavePolicy::bcea().carry_over().clone();
/// assert_eq!(carry_over_cap(&rule, Decimal::from(21)), Decimal::from(5));
/// assert_eq!(carry_over_cap(&rule, Decimal::from(10)), Decimal::from(3));
/// ```
pub fn carry_over_cap(rule: &CarryOverRule, prior_entitlement: Decimal) -> Decimal {
    let proportional = (prior_entitlement.max(Decimal::ZERO) / rule.divisor).floor();
    rule.max_days.min(proportional).max(Decimal::ZERO)
}

/// Calculates the days `employee` carries into `current_year`.
///
/// Prior-year entitlements are recomputed with the tenure the employee had on
/// December 31 of the prior year. Only approved requests count as used. An
/// employee hired after the prior year ended carries nothing.
///
/// # Errors
///
/// Propagates history read failures.
pub fn calculate_carry_over<H: LeaveHistory + ?Sized>(
    policy: &LeavePolicy,
    employee: &EmployeeProfile,
    history: &H,
    current_year: i32,
    step_number: u32,
) -> EngineResult<CarryOverSnapshot> {
    let prior_year = current_year - 1;
    let prior_window = year_window(prior_year)?;
    let rule = policy.carry_over();
    let mut carried_over = LeaveTable::zeroed();

    if employee.hire_date > prior_window.end() {
        let step = AuditStep {
            step_number,
            rule_id: "carry_over".to_string(),
            rule_name: "Prior Year Carry-Over".to_string(),
            policy_ref: policy_ref(policy, "entitlements.carry_over"),
            input: serde_json::json!({
                "hire_date": employee.hire_date.to_string(),
                "prior_year": prior_year
            }),
            output: carried_over.to_audit_json(),
            reasoning: format!(
                "Hired on {}, after {} ended; nothing to carry over",
                employee.hire_date, prior_year
            ),
        };
        return Ok(CarryOverSnapshot {
            year: current_year,
            prior_year,
            prior_entitlement: LeaveTable::new(),
            prior_used: LeaveTable::new(),
            carried_over,
            audit_steps: vec![step],
            warnings: Vec::new(),
        });
    }

    let prior_tenure = tenure_years(employee.hire_date, prior_window.end());
    let prior = resolve_entitlements(policy, employee.role, prior_tenure, prior_year, step_number);
    let used = aggregate_usage(history, &employee.id, LeaveStatus::Approved, &prior_window)?;

    let mut details = Vec::with_capacity(rule.eligible.len());
    for &leave_type in &rule.eligible {
        let entitled = prior.get(leave_type);
        let unused = entitled - used.get(leave_type);
        let cap = carry_over_cap(rule, entitled);
        let carry = unused.max(Decimal::ZERO).min(cap);
        carried_over.set(leave_type, carry);
        details.push(serde_json::json!({
            "leave_type": leave_type.code(),
            "prior_entitlement": entitled.normalize().to_string(),
            "used": used.get(leave_type).normalize().to_string(),
            "unused": unused.normalize().to_string(),
            "cap": cap.normalize().to_string(),
            "carried": carry.normalize().to_string()
        }));
    }

    let step = AuditStep {
        step_number,
        rule_id: "carry_over".to_string(),
        rule_name: "Prior Year Carry-Over".to_string(),
        policy_ref: policy_ref(policy, "entitlements.carry_over"),
        input: serde_json::json!({
            "prior_year": prior_year,
            "prior_tenure_years": prior_tenure,
            "max_days": rule.max_days.normalize().to_string(),
            "divisor": rule.divisor.normalize().to_string(),
            "eligible": details
        }),
        output: carried_over.to_audit_json(),
        reasoning: format!(
            "Carried {} days of unused {} leave into {}",
            carried_over.total().normalize(),
            prior_year,
            current_year
        ),
    };

    tracing::debug!(
        employee_id = %employee.id,
        prior_year = prior_year,
        carried = %carried_over.total(),
        "Calculated carry-over"
    );

    Ok(CarryOverSnapshot {
        year: current_year,
        prior_year,
        prior_entitlement: prior.entitlements,
        warnings: used.warnings(),
        prior_used: used.by_type,
        carried_over,
        audit_steps: vec![step],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculation::usage::RequestLedger;
    use crate::models::{LeaveRequestRecord, Role};
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn employee(role: Role, hire_date: NaiveDate) -> EmployeeProfile {
        EmployeeProfile {
            id: "emp_100".to_string(),
            name: "Thandi Nkosi".to_string(),
            employee_number: "E-100".to_string(),
            department: "Finance".to_string(),
            hire_date,
            role,
        }
    }

    fn vacation(id: &str, start: NaiveDate, days: Option<&str>, status: LeaveStatus) -> LeaveRequestRecord {
        LeaveRequestRecord {
            id: id.to_string(),
            employee_id: "emp_100".to_string(),
            leave_type: LeaveType::Vacation,
            start_date: start,
            end_date: start,
            total_days: days.map(dec),
            status,
            created_at: start.and_hms_opt(8, 0, 0).unwrap(),
        }
    }

    fn carry(role: Role, hire_date: NaiveDate, requests: Vec<LeaveRequestRecord>) -> CarryOverSnapshot {
        let ledger = RequestLedger::new(requests);
        calculate_carry_over(&LeavePolicy::bcea(), &employee(role, hire_date), &ledger, 2025, 1)
            .unwrap()
    }

    #[test]
    fn test_unused_above_cap_is_capped() {
        let snapshot = carry(
            Role::Employee,
            date(2022, 1, 10),
            vec![vacation("r1", date(2024, 4, 1), Some("10"), LeaveStatus::Approved)],
        );

        assert_eq!(snapshot.prior_year, 2024);
        assert_eq!(snapshot.prior_entitlement.get(LeaveType::Vacation), dec("21"));
        assert_eq!(snapshot.prior_used.get(LeaveType::Vacation), dec("10"));
        assert_eq!(snapshot.get(LeaveType::Vacation), dec("5"));
    }

    #[test]
    fn test_unused_below_cap_carries_in_full() {
        let snapshot = carry(
            Role::Employee,
            date(2022, 1, 10),
            vec![vacation("r1", date(2024, 4, 1), Some("19"), LeaveStatus::Approved)],
        );
        assert_eq!(snapshot.get(LeaveType::Vacation), dec("2"));
    }

    #[test]
    fn test_overuse_carries_nothing() {
        let snapshot = carry(
            Role::Employee,
            date(2022, 1, 10),
            vec![vacation("r1", date(2024, 4, 1), Some("24"), LeaveStatus::Approved)],
        );
        assert_eq!(snapshot.get(LeaveType::Vacation), Decimal::ZERO);
    }

    #[test]
    fn test_only_eligible_types_carry() {
        let snapshot = carry(Role::Employee, date(2022, 1, 10), Vec::new());
        assert_eq!(snapshot.get(LeaveType::Vacation), dec("5"));
        for leave_type in LeaveType::ALL.into_iter().filter(|t| *t != LeaveType::Vacation) {
            assert_eq!(snapshot.get(leave_type), Decimal::ZERO);
        }
    }

    #[test]
    fn test_pending_and_current_year_usage_ignored() {
        let snapshot = carry(
            Role::Employee,
            date(2022, 1, 10),
            vec![
                vacation("r1", date(2024, 11, 1), Some("18"), LeaveStatus::Pending),
                vacation("r2", date(2025, 1, 6), Some("18"), LeaveStatus::Approved),
            ],
        );
        assert_eq!(snapshot.prior_used.get(LeaveType::Vacation), Decimal::ZERO);
        assert_eq!(snapshot.get(LeaveType::Vacation), dec("5"));
    }

    #[test]
    fn test_hired_after_prior_year_carries_nothing() {
        let snapshot = carry(Role::Employee, date(2025, 2, 1), Vec::new());
        assert_eq!(snapshot.carried_over.total(), Decimal::ZERO);
        assert!(snapshot.prior_entitlement.is_empty());
        assert!(snapshot.audit_steps[0].reasoning.contains("after 2024 ended"));
    }

    #[test]
    fn test_tenure_measured_at_prior_year_end() {
        // Five years of service is reached in 2025, not by December 31, 2024.
        let snapshot = carry(Role::Employee, date(2020, 3, 1), Vec::new());
        assert_eq!(snapshot.prior_entitlement.get(LeaveType::Vacation), dec("21"));

        let snapshot = carry(Role::Employee, date(2019, 12, 1), Vec::new());
        assert_eq!(snapshot.prior_entitlement.get(LeaveType::Vacation), dec("25"));
    }

    #[test]
    fn test_intern_cap_uses_adjusted_entitlement() {
        let snapshot = carry(
            Role::Intern,
            date(2024, 2, 1),
            vec![vacation("r1", date(2024, 7, 1), Some("12"), LeaveStatus::Approved)],
        );
        assert_eq!(snapshot.prior_entitlement.get(LeaveType::Vacation), dec("15"));
        assert_eq!(snapshot.get(LeaveType::Vacation), dec("3"));
    }

    #[test]
    fn test_missing_prior_total_warns() {
        let snapshot = carry(
            Role::Employee,
            date(2022, 1, 10),
            vec![vacation("r1", date(2024, 4, 1), None, LeaveStatus::Approved)],
        );
        assert_eq!(snapshot.get(LeaveType::Vacation), dec("5"));
        assert_eq!(snapshot.warnings.len(), 1);
        assert_eq!(snapshot.warnings[0].code, "MISSING_DAY_TOTAL");
    }

    #[test]
    fn test_cap_follows_rule() {
        let rule = CarryOverRule {
            eligible: vec![LeaveType::Vacation],
            max_days: dec("10"),
            divisor: dec("3"),
        };
        assert_eq!(carry_over_cap(&rule, dec("21")), dec("7"));
        assert_eq!(carry_over_cap(&rule, dec("35")), dec("10"));
        assert_eq!(carry_over_cap(&rule, dec("2")), dec("0"));
    }
}
