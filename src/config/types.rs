//! Leave policy configuration types.
//!
//! This module contains the strongly-typed policy tables that drive
//! entitlement resolution, accrual and carry-over. They are deserialized from
//! YAML configuration files or built from the BCEA defaults.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::models::{LeaveTable, LeaveType, Role};

/// Metadata about the leave policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyMetadata {
    /// Short policy code used in audit references (e.g. "BCEA-LEAVE").
    pub code: String,
    /// The human-readable name of the policy.
    pub name: String,
    /// The version or effective date of the policy.
    pub version: String,
    /// URL to the statutory source the defaults are seeded from.
    pub source_url: String,
}

/// Carry-over rule for unused leave.
///
/// The cap for a year is `min(max_days, floor(prior_entitlement / divisor))`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarryOverRule {
    /// Leave types whose unused balance may roll into the next year.
    pub eligible: Vec<LeaveType>,
    /// Absolute ceiling on carried days.
    pub max_days: Decimal,
    /// Divisor applied to the prior entitlement for the proportional cap.
    pub divisor: Decimal,
}

/// Contents of `entitlements.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitlementsConfig {
    /// Statutory base entitlement per leave type.
    pub base: LeaveTable,
    /// Leave types that accrue monthly; all others are granted up front.
    pub accruing: Vec<LeaveType>,
    /// Carry-over rule.
    pub carry_over: CarryOverRule,
}

/// How a special adjustment combines with the current value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentMode {
    /// Take the larger of the current value and `days`.
    AtLeast,
    /// Add the signed `days`, never dropping below `floor`.
    Add,
}

/// A role-specific adjustment applied after the tenure ladder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialAdjustment {
    /// The leave type adjusted.
    pub leave_type: LeaveType,
    /// How the adjustment combines with the current value.
    pub mode: AdjustmentMode,
    /// The adjustment amount (may be negative for [`AdjustmentMode::Add`]).
    pub days: Decimal,
    /// Lowest value an additive adjustment may produce.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub floor: Option<Decimal>,
}

impl SpecialAdjustment {
    /// Applies this adjustment to `current`.
    pub fn apply(&self, current: Decimal) -> Decimal {
        match self.mode {
            AdjustmentMode::AtLeast => current.max(self.days),
            AdjustmentMode::Add => {
                let adjusted = current + self.days;
                match self.floor {
                    Some(floor) => adjusted.max(floor),
                    None => adjusted,
                }
            }
        }
    }
}

/// Contents of `roles.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RolesConfig {
    /// Fixed values that replace the base table for managerial roles.
    pub managerial: BTreeMap<Role, LeaveTable>,
    /// Adjustments for non-managerial roles.
    #[serde(default)]
    pub special_adjustments: BTreeMap<Role, Vec<SpecialAdjustment>>,
}

/// One rung of the tenure ladder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenureStep {
    /// Whole years of service required to reach this rung.
    pub min_years: u32,
    /// Entitlement granted from this rung on.
    pub days: Decimal,
}

/// Contents of `tenure.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenureConfig {
    /// The leave type the ladder overrides.
    pub leave_type: LeaveType,
    /// Rungs in ascending `min_years` order.
    pub ladder: Vec<TenureStep>,
}

/// The complete leave policy.
///
/// Every calculation function takes the policy as a parameter so tests and
/// callers can substitute alternative tables.
///
/// # Example
///
/// ```
/// use leave_engine::config::LeavePolicy;
/// use leave_engine::models::{LeaveType, Role};
/// use rust_decimal::Decimal;
///
/// let policy = LeavePolicy::bcea();
/// assert_eq!(policy.base().get(LeaveType::Vacation), Decimal::from(21));
/// assert!(policy.is_managerial(Role::Director));
/// assert!(!policy.is_managerial(Role::Intern));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeavePolicy {
    metadata: PolicyMetadata,
    entitlements: EntitlementsConfig,
    roles: RolesConfig,
    tenure: TenureConfig,
}

impl LeavePolicy {
    /// Creates a policy from its component tables, validating them.
    pub fn new(
        metadata: PolicyMetadata,
        entitlements: EntitlementsConfig,
        roles: RolesConfig,
        tenure: TenureConfig,
    ) -> EngineResult<Self> {
        let policy = Self {
            metadata,
            entitlements,
            roles,
            tenure,
        };
        policy.validate()?;
        Ok(policy)
    }

    /// The built-in policy seeded from the BCEA statutory minimums.
    pub fn bcea() -> Self {
        fn days(value: i64) -> Decimal {
            Decimal::from(value)
        }

        let metadata = PolicyMetadata {
            code: "BCEA-LEAVE".to_string(),
            name: "Basic Conditions of Employment Act leave policy".to_string(),
            version: "2024-01-01".to_string(),
            source_url: "https://www.labour.gov.za/basic-conditions-of-employment".to_string(),
        };

        let base: LeaveTable = [
            (LeaveType::Vacation, days(21)),
            (LeaveType::SickLeave, days(30)),
            (LeaveType::Personal, days(3)),
            (LeaveType::Emergency, days(0)),
            (LeaveType::Maternity, days(120)),
            (LeaveType::Paternity, days(10)),
            (LeaveType::Bereavement, days(3)),
            (LeaveType::StudyLeave, days(0)),
            (LeaveType::UnpaidLeave, days(0)),
        ]
        .into_iter()
        .collect();

        let entitlements = EntitlementsConfig {
            base,
            accruing: vec![
                LeaveType::Vacation,
                LeaveType::SickLeave,
                LeaveType::Personal,
                LeaveType::StudyLeave,
            ],
            carry_over: CarryOverRule {
                eligible: vec![LeaveType::Vacation],
                max_days: days(5),
                divisor: days(3),
            },
        };

        let managerial_table = |vacation: i64, personal: i64, study: i64| -> LeaveTable {
            [
                (LeaveType::Vacation, days(vacation)),
                (LeaveType::Personal, days(personal)),
                (LeaveType::StudyLeave, days(study)),
            ]
            .into_iter()
            .collect()
        };

        let mut managerial = BTreeMap::new();
        managerial.insert(Role::Director, managerial_table(30, 5, 15));
        managerial.insert(Role::HrDirector, managerial_table(30, 5, 15));
        managerial.insert(Role::DepartmentManager, managerial_table(25, 4, 10));
        managerial.insert(Role::HrManager, managerial_table(25, 4, 10));
        managerial.insert(Role::Supervisor, managerial_table(23, 3, 5));

        let at_least = |leave_type, value: i64| SpecialAdjustment {
            leave_type,
            mode: AdjustmentMode::AtLeast,
            days: days(value),
            floor: None,
        };
        let add = |leave_type, value: i64, floor: Option<i64>| SpecialAdjustment {
            leave_type,
            mode: AdjustmentMode::Add,
            days: days(value),
            floor: floor.map(days),
        };

        let mut special_adjustments = BTreeMap::new();
        special_adjustments.insert(
            Role::SuperAdmin,
            vec![
                at_least(LeaveType::Vacation, 30),
                add(LeaveType::Personal, 2, None),
                add(LeaveType::StudyLeave, 10, None),
            ],
        );
        special_adjustments.insert(
            Role::SeniorEmployee,
            vec![
                at_least(LeaveType::Vacation, 25),
                add(LeaveType::StudyLeave, 5, None),
            ],
        );
        special_adjustments.insert(
            Role::Intern,
            vec![
                add(LeaveType::Vacation, -6, Some(15)),
                add(LeaveType::StudyLeave, 5, None),
            ],
        );

        let tenure = TenureConfig {
            leave_type: LeaveType::Vacation,
            ladder: [(1, 21), (5, 25), (10, 30), (15, 32), (20, 35)]
                .into_iter()
                .map(|(min_years, value)| TenureStep {
                    min_years,
                    days: days(value),
                })
                .collect(),
        };

        Self {
            metadata,
            entitlements,
            roles: RolesConfig {
                managerial,
                special_adjustments,
            },
            tenure,
        }
    }

    /// Checks the tables for internal consistency.
    ///
    /// Rejects negative base values, a tenure ladder that is not strictly
    /// ascending, a non-positive carry-over divisor, and negative floors.
    pub fn validate(&self) -> EngineResult<()> {
        if let Some((leave_type, days)) = self
            .entitlements
            .base
            .iter()
            .find(|(_, days)| *days < Decimal::ZERO)
        {
            return Err(EngineError::InvalidPolicy {
                message: format!("base entitlement for {} is negative ({})", leave_type, days),
            });
        }

        let ascending = self
            .tenure
            .ladder
            .windows(2)
            .all(|pair| pair[0].min_years < pair[1].min_years);
        if !ascending {
            return Err(EngineError::InvalidPolicy {
                message: "tenure ladder is not strictly ascending".to_string(),
            });
        }

        let carry_over = &self.entitlements.carry_over;
        if carry_over.divisor <= Decimal::ZERO {
            return Err(EngineError::InvalidPolicy {
                message: format!(
                    "carry-over divisor must be positive, got {}",
                    carry_over.divisor
                ),
            });
        }
        if carry_over.max_days < Decimal::ZERO {
            return Err(EngineError::InvalidPolicy {
                message: format!(
                    "carry-over ceiling must not be negative, got {}",
                    carry_over.max_days
                ),
            });
        }

        for (role, adjustments) in &self.roles.special_adjustments {
            if let Some(adjustment) = adjustments
                .iter()
                .find(|a| a.floor.is_some_and(|floor| floor < Decimal::ZERO))
            {
                return Err(EngineError::InvalidPolicy {
                    message: format!(
                        "{} adjustment for {} has a negative floor",
                        role, adjustment.leave_type
                    ),
                });
            }
        }

        Ok(())
    }

    /// Returns the policy metadata.
    pub fn metadata(&self) -> &PolicyMetadata {
        &self.metadata
    }

    /// Returns the base entitlement table.
    pub fn base(&self) -> &LeaveTable {
        &self.entitlements.base
    }

    /// Returns true if `leave_type` accrues monthly.
    pub fn accrues(&self, leave_type: LeaveType) -> bool {
        self.entitlements.accruing.contains(&leave_type)
    }

    /// Returns the carry-over rule.
    pub fn carry_over(&self) -> &CarryOverRule {
        &self.entitlements.carry_over
    }

    /// Returns true if `role` receives a managerial override.
    pub fn is_managerial(&self, role: Role) -> bool {
        self.roles.managerial.contains_key(&role)
    }

    /// Returns the managerial override table for `role`, if any.
    pub fn managerial_override(&self, role: Role) -> Option<&LeaveTable> {
        self.roles.managerial.get(&role)
    }

    /// Returns the special adjustments for `role` (empty when none apply).
    pub fn special_adjustments(&self, role: Role) -> &[SpecialAdjustment] {
        self.roles
            .special_adjustments
            .get(&role)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Returns the tenure ladder configuration.
    pub fn tenure(&self) -> &TenureConfig {
        &self.tenure
    }
}

impl Default for LeavePolicy {
    fn default() -> Self {
        Self::bcea()
    }
}
