//! Verification report models.
//!
//! A [`VerificationReport`] is the output of the reconciliation pass. A
//! mismatch or a policy violation is a populated report entry, never an error.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{LeaveTable, LeaveType};

/// Severity of an issue or warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    /// Needs human review.
    High,
    /// Worth a look.
    Medium,
    /// Informational data-quality note.
    Low,
}

/// Priority of an advisory recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    /// Should be acted on.
    Medium,
    /// For information only.
    Info,
}

/// Kinds of policy violations the verifier raises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueKind {
    /// More days used than accrued.
    Overuse,
    /// Accrued minus used minus pending is below zero.
    NegativeBalance,
}

/// Kinds of advisory recommendations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecommendationKind {
    /// Entitlement untouched late in the year.
    UnusedLeave,
    /// Entitlements prorated because of a hire inside the year.
    MidYearHire,
}

/// A policy violation found during verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// What was violated.
    pub kind: IssueKind,
    /// How serious it is.
    pub severity: Severity,
    /// The affected leave type.
    pub leave_type: LeaveType,
    /// Human-readable description, including the signed figures.
    pub message: String,
}

/// An advisory nudge produced during verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    /// The recommendation kind.
    pub kind: RecommendationKind,
    /// How urgent it is.
    pub priority: Priority,
    /// The leave type it concerns, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leave_type: Option<LeaveType>,
    /// Human-readable description.
    pub message: String,
}

/// A single leave type whose expected and actual values differ by more than
/// the tolerance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discrepancy {
    /// The leave type that differs.
    pub leave_type: LeaveType,
    /// Value from the reference derivation.
    pub expected: Decimal,
    /// Value from the production derivation.
    pub actual: Decimal,
    /// `actual - expected`.
    pub difference: Decimal,
}

/// Outcome of comparing two per-type tables within a tolerance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonResult {
    /// Reference values.
    pub expected: LeaveTable,
    /// Production values.
    pub actual: LeaveTable,
    /// Maximum absolute difference treated as a match.
    pub tolerance: Decimal,
    /// True when no discrepancy exceeds the tolerance.
    pub matches: bool,
    /// Every type outside tolerance.
    pub discrepancies: Vec<Discrepancy>,
}

/// A per-type balance re-derived from raw request sums.
///
/// Unlike [`super::BalanceRecord`], `balance` is signed so a deficit is
/// visible.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifiedBalance {
    /// The leave type.
    pub leave_type: LeaveType,
    /// Annual entitlement.
    pub entitled: Decimal,
    /// Accrued to date.
    pub accrued: Decimal,
    /// Approved days in the year.
    pub used: Decimal,
    /// Pending days in the year.
    pub pending: Decimal,
    /// `accrued - used - pending`, unfloored.
    pub balance: Decimal,
}

/// The complete result of a verification pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationReport {
    /// Unique identifier for this report.
    pub report_id: Uuid,
    /// The employee verified.
    pub employee_id: String,
    /// The year verified.
    pub year: i32,
    /// The instant verification ran as of.
    pub as_of: NaiveDateTime,
    /// Months worked in the year per the reference derivation.
    pub months_worked: Decimal,
    /// Reference versus production entitlements.
    pub entitlement_check: ComparisonResult,
    /// Reference versus production accruals.
    pub accrual_check: ComparisonResult,
    /// Re-derived balances, one per leave type.
    pub balances: Vec<VerifiedBalance>,
    /// Policy violations.
    pub issues: Vec<Issue>,
    /// Advisory recommendations.
    pub recommendations: Vec<Recommendation>,
}

impl VerificationReport {
    /// True when both comparisons match and no issue was raised.
    ///
    /// Recommendations are advisory and do not affect the outcome.
    pub fn is_clean(&self) -> bool {
        self.entitlement_check.matches && self.accrual_check.matches && self.issues.is_empty()
    }

    /// Issues of a given kind.
    pub fn issues_of(&self, kind: IssueKind) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(move |issue| issue.kind == kind)
    }

    /// Recommendations of a given kind.
    pub fn recommendations_of(
        &self,
        kind: RecommendationKind,
    ) -> impl Iterator<Item = &Recommendation> {
        self.recommendations
            .iter()
            .filter(move |recommendation| recommendation.kind == kind)
    }
}
