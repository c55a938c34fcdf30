//! Leave type codes and per-type day tables.
//!
//! Every figure the engine produces (entitlements, accruals, carry-over,
//! usage sums) is a [`LeaveTable`]: a map from [`LeaveType`] to a day count
//! in which absent entries read as zero.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The closed set of leave types known to the policy.
///
/// # Example
///
/// ```
/// use leave_engine::models::LeaveType;
///
/// let json = serde_json::to_string(&LeaveType::SickLeave).unwrap();
/// assert_eq!(json, "\"SICK_LEAVE\"");
/// assert_eq!(LeaveType::ALL.len(), 9);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LeaveType {
    /// Annual (vacation) leave.
    Vacation,
    /// Sick leave.
    SickLeave,
    /// Personal days.
    Personal,
    /// Emergency leave.
    Emergency,
    /// Maternity leave.
    Maternity,
    /// Paternity leave.
    Paternity,
    /// Bereavement (family responsibility) leave.
    Bereavement,
    /// Study leave.
    StudyLeave,
    /// Unpaid leave.
    UnpaidLeave,
}

impl LeaveType {
    /// All leave types, in reporting order.
    pub const ALL: [LeaveType; 9] = [
        LeaveType::Vacation,
        LeaveType::SickLeave,
        LeaveType::Personal,
        LeaveType::Emergency,
        LeaveType::Maternity,
        LeaveType::Paternity,
        LeaveType::Bereavement,
        LeaveType::StudyLeave,
        LeaveType::UnpaidLeave,
    ];

    /// Returns the wire code for this leave type (e.g. `"STUDY_LEAVE"`).
    pub fn code(&self) -> &'static str {
        match self {
            LeaveType::Vacation => "VACATION",
            LeaveType::SickLeave => "SICK_LEAVE",
            LeaveType::Personal => "PERSONAL",
            LeaveType::Emergency => "EMERGENCY",
            LeaveType::Maternity => "MATERNITY",
            LeaveType::Paternity => "PATERNITY",
            LeaveType::Bereavement => "BEREAVEMENT",
            LeaveType::StudyLeave => "STUDY_LEAVE",
            LeaveType::UnpaidLeave => "UNPAID_LEAVE",
        }
    }
}

impl fmt::Display for LeaveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Day counts keyed by leave type.
///
/// Lookups for a type that has no entry return zero, so callers never have
/// to special-case a sparse table.
///
/// # Example
///
/// ```
/// use leave_engine::models::{LeaveTable, LeaveType};
/// use rust_decimal::Decimal;
///
/// let mut table = LeaveTable::new();
/// table.add(LeaveType::Vacation, Decimal::new(15, 1));
/// table.add(LeaveType::Vacation, Decimal::ONE);
///
/// assert_eq!(table.get(LeaveType::Vacation), Decimal::new(25, 1));
/// assert_eq!(table.get(LeaveType::Maternity), Decimal::ZERO);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LeaveTable(BTreeMap<LeaveType, Decimal>);

impl LeaveTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Creates a table with every leave type set to zero.
    pub fn zeroed() -> Self {
        LeaveType::ALL
            .iter()
            .map(|leave_type| (*leave_type, Decimal::ZERO))
            .collect()
    }

    /// Returns the days recorded for `leave_type`, or zero.
    pub fn get(&self, leave_type: LeaveType) -> Decimal {
        self.0.get(&leave_type).copied().unwrap_or(Decimal::ZERO)
    }

    /// Replaces the days recorded for `leave_type`.
    pub fn set(&mut self, leave_type: LeaveType, days: Decimal) {
        self.0.insert(leave_type, days);
    }

    /// Adds `days` to the value recorded for `leave_type`.
    pub fn add(&mut self, leave_type: LeaveType, days: Decimal) {
        *self.0.entry(leave_type).or_insert(Decimal::ZERO) += days;
    }

    /// Returns true if `leave_type` has an explicit entry.
    pub fn contains(&self, leave_type: LeaveType) -> bool {
        self.0.contains_key(&leave_type)
    }

    /// Iterates entries in leave type order.
    pub fn iter(&self) -> impl Iterator<Item = (LeaveType, Decimal)> + '_ {
        self.0.iter().map(|(leave_type, days)| (*leave_type, *days))
    }

    /// Returns the leave types present in either table.
    pub fn union_keys(&self, other: &LeaveTable) -> BTreeSet<LeaveType> {
        self.0.keys().chain(other.0.keys()).copied().collect()
    }

    /// Sum of all entries.
    pub fn total(&self) -> Decimal {
        self.0.values().copied().sum()
    }

    /// Number of explicit entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the table has no explicit entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Clamps every entry to be at least zero.
    pub fn clamp_non_negative(&mut self) {
        for days in self.0.values_mut() {
            if *days < Decimal::ZERO {
                *days = Decimal::ZERO;
            }
        }
    }

    /// Serializes the table as a JSON object of normalized decimal strings.
    pub fn to_audit_json(&self) -> serde_json::Value {
        let map: serde_json::Map<String, serde_json::Value> = self
            .iter()
            .map(|(leave_type, days)| {
                (
                    leave_type.code().to_string(),
                    serde_json::Value::String(days.normalize().to_string()),
                )
            })
            .collect();
        serde_json::Value::Object(map)
    }
}

impl FromIterator<(LeaveType, Decimal)> for LeaveTable {
    fn from_iter<I: IntoIterator<Item = (LeaveType, Decimal)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
