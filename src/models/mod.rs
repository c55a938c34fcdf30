//! Core data models for the Leave Entitlement Engine.
//!
//! This module contains all the domain models used throughout the engine.

mod calculation_result;
mod employee;
mod leave;
mod leave_request;
mod verification;

pub use calculation_result::{
    AuditStep, AuditTrace, AuditWarning, BalanceRecord, BalanceSummary, YearUsageSummary,
};
pub use employee::{EmployeeProfile, Role};
pub use leave::{LeaveTable, LeaveType};
pub use leave_request::{LeaveRequestRecord, LeaveStatus};
pub use verification::{
    ComparisonResult, Discrepancy, Issue, IssueKind, Priority, Recommendation,
    RecommendationKind, Severity, VerificationReport, VerifiedBalance,
};
