//! Employee profile model and organisational roles.
//!
//! Profiles are owned by the external employee directory. The engine reads
//! them and never mutates them.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The organisational role that drives entitlement policy.
///
/// Unrecognized role strings deserialize to [`Role::Other`], which receives
/// default (tenure ladder) treatment.
///
/// # Example
///
/// ```
/// use leave_engine::models::Role;
///
/// let role: Role = serde_json::from_str("\"HR_DIRECTOR\"").unwrap();
/// assert_eq!(role, Role::HrDirector);
///
/// let unknown: Role = serde_json::from_str("\"CONTRACTOR\"").unwrap();
/// assert_eq!(unknown, Role::Other);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// System super administrator.
    SuperAdmin,
    /// Company director.
    Director,
    /// Director of human resources.
    HrDirector,
    /// Manager of a department.
    DepartmentManager,
    /// Human resources manager.
    HrManager,
    /// Team supervisor.
    Supervisor,
    /// Senior individual contributor.
    SeniorEmployee,
    /// Regular employee.
    Employee,
    /// Intern.
    Intern,
    /// Any role the policy does not recognise.
    #[serde(other)]
    Other,
}

impl Role {
    /// Returns the wire code for this role.
    pub fn code(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "SUPER_ADMIN",
            Role::Director => "DIRECTOR",
            Role::HrDirector => "HR_DIRECTOR",
            Role::DepartmentManager => "DEPARTMENT_MANAGER",
            Role::HrManager => "HR_MANAGER",
            Role::Supervisor => "SUPERVISOR",
            Role::SeniorEmployee => "SENIOR_EMPLOYEE",
            Role::Employee => "EMPLOYEE",
            Role::Intern => "INTERN",
            Role::Other => "OTHER",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// An employee as returned by the directory lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeProfile {
    /// Stable identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Employee number as printed on payslips.
    pub employee_number: String,
    /// Department name.
    pub department: String,
    /// First day of employment.
    pub hire_date: NaiveDate,
    /// Organisational role.
    pub role: Role,
}
