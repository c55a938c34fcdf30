//! Entitlement resolution.
//!
//! This module derives the annual entitlement per leave type for an employee
//! from their role and tenure, by walking the policy tables in a fixed order:
//! base table, managerial override or tenure ladder, special adjustments, and
//! a final non-negative clamp.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::LeavePolicy;
use crate::models::{AuditStep, LeaveTable, LeaveType, Role};

/// The resolved annual entitlements for one employee in one year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitlementTable {
    /// The calendar year the entitlements apply to.
    pub year: i32,
    /// The role they were resolved for.
    pub role: Role,
    /// Whole years of service used for the tenure ladder.
    pub tenure_years: u32,
    /// Days per leave type, all non-negative.
    pub entitlements: LeaveTable,
    /// Audit steps explaining each stage of the resolution.
    pub audit_steps: Vec<AuditStep>,
}

impl EntitlementTable {
    /// Entitled days for `leave_type`.
    pub fn get(&self, leave_type: LeaveType) -> Decimal {
        self.entitlements.get(leave_type)
    }
}

pub(crate) fn policy_ref(policy: &LeavePolicy, section: &str) -> String {
    format!("{}/{}", policy.metadata().code, section)
}

/// Resolves the annual entitlement table for `role` with `tenure_years` of
/// service in `year`.
///
/// # Algorithm
///
/// 1. Start from the policy base table.
/// 2. Managerial roles have the listed leave types replaced by fixed values;
///    the tenure ladder is skipped for them.
/// 3. Other roles walk the tenure ladder; the highest rung reached replaces
///    the laddered leave type's value.
/// 4. Non-managerial roles then receive their special adjustments in order.
/// 5. Every value is clamped to at least zero.
///
/// # Examples
///
/// ```
/// use leave_engine::calculation::resolve_entitlements;
/// use leave_engine::config::LeavePolicy;
/// use leave_engine::models::{LeaveType, Role};
/// use rust_decimal::Decimal;
///
/// let policy = LeavePolicy::bcea();
///
/// let director = resolve_entitlements(&policy, Role::Director, 12, 2025, 1);
/// assert_eq!(director.get(LeaveType::Vacation), Decimal::from(30));
/// assert_eq!(director.get(LeaveType::Personal), Decimal::from(5));
///
/// let intern = resolve_entitlements(&policy, Role::Intern, 0, 2025, 1);
/// assert_eq!(intern.get(LeaveType::Vacation), Decimal::from(15));
/// ```
pub fn resolve_entitlements(
    policy: &LeavePolicy,
    role: Role,
    tenure_years: u32,
    year: i32,
    step_number: u32,
) -> EntitlementTable {
    let mut steps = Vec::new();
    let mut step = step_number;
    let mut table = policy.base().clone();

    steps.push(AuditStep {
        step_number: step,
        rule_id: "base_entitlement".to_string(),
        rule_name: "Base Entitlement".to_string(),
        policy_ref: policy_ref(policy, "base"),
        input: serde_json::json!({
            "role": role.code(),
            "tenure_years": tenure_years,
            "year": year
        }),
        output: table.to_audit_json(),
        reasoning: format!(
            "Seeded {} leave types from the {} statutory base table",
            table.len(),
            policy.metadata().code
        ),
    });
    step += 1;

    let managerial = policy.managerial_override(role);
    match managerial {
        Some(overrides) => {
            for (leave_type, days) in overrides.iter() {
                table.set(leave_type, days);
            }
            steps.push(AuditStep {
                step_number: step,
                rule_id: "managerial_override".to_string(),
                rule_name: "Managerial Override".to_string(),
                policy_ref: policy_ref(policy, "roles.managerial"),
                input: serde_json::json!({ "role": role.code() }),
                output: overrides.to_audit_json(),
                reasoning: format!(
                    "{} is a managerial role; {} leave types replaced with fixed values and the tenure ladder skipped",
                    role,
                    overrides.len()
                ),
            });
            step += 1;
        }
        None => {
            let tenure = policy.tenure();
            let before = table.get(tenure.leave_type);
            let rung = tenure
                .ladder
                .iter()
                .filter(|rung| rung.min_years <= tenure_years)
                .last();

            let reasoning = match rung {
                Some(rung) => {
                    table.set(tenure.leave_type, rung.days);
                    format!(
                        "{} years of service reaches the {}-year rung: {} set to {} days",
                        tenure_years,
                        rung.min_years,
                        tenure.leave_type,
                        rung.days.normalize()
                    )
                }
                None => format!(
                    "{} years of service is below the first rung; {} stays at {} days",
                    tenure_years,
                    tenure.leave_type,
                    before.normalize()
                ),
            };

            steps.push(AuditStep {
                step_number: step,
                rule_id: "tenure_ladder".to_string(),
                rule_name: "Tenure Ladder".to_string(),
                policy_ref: policy_ref(policy, "tenure"),
                input: serde_json::json!({
                    "tenure_years": tenure_years,
                    "leave_type": tenure.leave_type.code(),
                    "before": before.normalize().to_string()
                }),
                output: serde_json::json!({
                    "rung_min_years": rung.map(|r| r.min_years),
                    "days": table.get(tenure.leave_type).normalize().to_string()
                }),
                reasoning,
            });
            step += 1;

            let adjustments = policy.special_adjustments(role);
            if !adjustments.is_empty() {
                let mut applied = Vec::with_capacity(adjustments.len());
                for adjustment in adjustments {
                    let before = table.get(adjustment.leave_type);
                    let after = adjustment.apply(before);
                    table.set(adjustment.leave_type, after);
                    applied.push(format!(
                        "{} {} -> {}",
                        adjustment.leave_type,
                        before.normalize(),
                        after.normalize()
                    ));
                }

                steps.push(AuditStep {
                    step_number: step,
                    rule_id: "special_adjustment".to_string(),
                    rule_name: "Special Role Adjustment".to_string(),
                    policy_ref: policy_ref(policy, "roles.special_adjustments"),
                    input: serde_json::json!({
                        "role": role.code(),
                        "adjustments": adjustments
                    }),
                    output: table.to_audit_json(),
                    reasoning: format!("Applied {} adjustments: {}", role, applied.join(", ")),
                });
                step += 1;
            }
        }
    }

    let negatives: Vec<LeaveType> = table
        .iter()
        .filter(|(_, days)| *days < Decimal::ZERO)
        .map(|(leave_type, _)| leave_type)
        .collect();
    if !negatives.is_empty() {
        table.clamp_non_negative();
        steps.push(AuditStep {
            step_number: step,
            rule_id: "entitlement_floor".to_string(),
            rule_name: "Entitlement Floor".to_string(),
            policy_ref: policy_ref(policy, "base"),
            input: serde_json::json!({
                "negative_types": negatives.iter().map(LeaveType::code).collect::<Vec<_>>()
            }),
            output: table.to_audit_json(),
            reasoning: format!("Clamped {} negative entitlements to zero", negatives.len()),
        });
    }

    EntitlementTable {
        year,
        role,
        tenure_years,
        entitlements: table,
        audit_steps: steps,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AdjustmentMode, RolesConfig, SpecialAdjustment};
    use std::collections::BTreeMap;

    fn days(value: i64) -> Decimal {
        Decimal::from(value)
    }

    fn resolve(role: Role, tenure_years: u32) -> EntitlementTable {
        resolve_entitlements(&LeavePolicy::bcea(), role, tenure_years, 2025, 1)
    }

    #[test]
    fn test_new_employee_gets_base_table() {
        let table = resolve(Role::Employee, 0);

        assert_eq!(table.get(LeaveType::Vacation), days(21));
        assert_eq!(table.get(LeaveType::SickLeave), days(30));
        assert_eq!(table.get(LeaveType::Personal), days(3));
        assert_eq!(table.get(LeaveType::Emergency), days(0));
        assert_eq!(table.get(LeaveType::Maternity), days(120));
        assert_eq!(table.get(LeaveType::Paternity), days(10));
        assert_eq!(table.get(LeaveType::Bereavement), days(3));
        assert_eq!(table.get(LeaveType::StudyLeave), days(0));
        assert_eq!(table.get(LeaveType::UnpaidLeave), days(0));
    }

    #[test]
    fn test_tenure_ladder_rungs_replace_vacation() {
        let cases = [
            (1, 21),
            (4, 21),
            (5, 25),
            (9, 25),
            (10, 30),
            (15, 32),
            (19, 32),
            (20, 35),
            (40, 35),
        ];
        for (tenure, expected) in cases {
            let table = resolve(Role::Employee, tenure);
            assert_eq!(
                table.get(LeaveType::Vacation),
                days(expected),
                "tenure {} should give {} vacation days",
                tenure,
                expected
            );
        }
    }

    #[test]
    fn test_director_override_ignores_tenure_ladder() {
        let table = resolve(Role::Director, 12);

        assert_eq!(table.get(LeaveType::Vacation), days(30));
        assert_eq!(table.get(LeaveType::Personal), days(5));
        assert_eq!(table.get(LeaveType::StudyLeave), days(15));
        assert_eq!(table.get(LeaveType::SickLeave), days(30));

        let long_serving = resolve(Role::Director, 25);
        assert_eq!(long_serving.get(LeaveType::Vacation), days(30));
    }

    #[test]
    fn test_managerial_roles_skip_special_adjustments() {
        let table = resolve(Role::Supervisor, 0);
        let rule_ids: Vec<&str> = table
            .audit_steps
            .iter()
            .map(|s| s.rule_id.as_str())
            .collect();
        assert_eq!(rule_ids, vec!["base_entitlement", "managerial_override"]);
        assert_eq!(table.get(LeaveType::Vacation), days(23));
    }

    #[test]
    fn test_intern_adjustment_respects_floor() {
        let table = resolve(Role::Intern, 0);
        assert_eq!(table.get(LeaveType::Vacation), days(15));
        assert_eq!(table.get(LeaveType::StudyLeave), days(5));

        let second_year = resolve(Role::Intern, 5);
        assert_eq!(second_year.get(LeaveType::Vacation), days(19));
    }

    #[test]
    fn test_senior_employee_vacation_takes_maximum() {
        assert_eq!(
            resolve(Role::SeniorEmployee, 2).get(LeaveType::Vacation),
            days(25)
        );
        assert_eq!(
            resolve(Role::SeniorEmployee, 20).get(LeaveType::Vacation),
            days(35)
        );
        assert_eq!(
            resolve(Role::SeniorEmployee, 2).get(LeaveType::StudyLeave),
            days(5)
        );
    }

    #[test]
    fn test_super_admin_adjustments() {
        let table = resolve(Role::SuperAdmin, 3);
        assert_eq!(table.get(LeaveType::Vacation), days(30));
        assert_eq!(table.get(LeaveType::Personal), days(5));
        assert_eq!(table.get(LeaveType::StudyLeave), days(10));
    }

    #[test]
    fn test_unrecognized_role_falls_through_to_ladder() {
        let unknown = resolve(Role::Other, 0);
        assert_eq!(unknown.entitlements, resolve(Role::Employee, 0).entitlements);
        assert_eq!(unknown.audit_steps.len(), 2);
        assert_eq!(resolve(Role::Other, 10).get(LeaveType::Vacation), days(30));
    }

    #[test]
    fn test_audit_steps_are_numbered_from_start() {
        let table = resolve_entitlements(&LeavePolicy::bcea(), Role::Intern, 0, 2025, 4);
        let numbers: Vec<u32> = table.audit_steps.iter().map(|s| s.step_number).collect();
        assert_eq!(numbers, vec![4, 5, 6]);
        assert_eq!(table.audit_steps[1].rule_id, "tenure_ladder");
        assert_eq!(table.audit_steps[2].rule_id, "special_adjustment");
        assert_eq!(
            table.audit_steps[2].policy_ref,
            "BCEA-LEAVE/roles.special_adjustments"
        );
        assert!(table.audit_steps[2].reasoning.contains("VACATION 21 -> 15"));
    }

    #[test]
    fn test_negative_result_is_clamped_with_audit_step() {
        let policy = LeavePolicy::bcea();
        let mut special_adjustments = BTreeMap::new();
        special_adjustments.insert(
            Role::Employee,
            vec![SpecialAdjustment {
                leave_type: LeaveType::Personal,
                mode: AdjustmentMode::Add,
                days: days(-10),
                floor: None,
            }],
        );
        let custom = LeavePolicy::new(
            policy.metadata().clone(),
            crate::config::EntitlementsConfig {
                base: policy.base().clone(),
                accruing: vec![LeaveType::Vacation],
                carry_over: policy.carry_over().clone(),
            },
            RolesConfig {
                managerial: BTreeMap::new(),
                special_adjustments,
            },
            policy.tenure().clone(),
        )
        .unwrap();

        let table = resolve_entitlements(&custom, Role::Employee, 0, 2025, 1);

        assert_eq!(table.get(LeaveType::Personal), Decimal::ZERO);
        let last = table.audit_steps.last().unwrap();
        assert_eq!(last.rule_id, "entitlement_floor");
        assert_eq!(last.input["negative_types"][0], "PERSONAL");
    }

    #[test]
    fn test_table_records_inputs() {
        let table = resolve(Role::HrManager, 7);
        assert_eq!(table.year, 2025);
        assert_eq!(table.role, Role::HrManager);
        assert_eq!(table.tenure_years, 7);
    }
}
