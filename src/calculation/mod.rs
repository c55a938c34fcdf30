//! Calculation logic for the Leave Entitlement & Balance Engine.
//!
//! This module contains the calendar arithmetic, entitlement resolution,
//! monthly accrual, prior-year carry-over, usage aggregation, balance
//! composition, and the reconciliation verifier that independently rechecks
//! the balance figures.
//!
//! Every function takes the [`LeavePolicy`](crate::config::LeavePolicy) and
//! the as-of instant explicitly; nothing here reads the system clock.

mod accrual;
mod balance;
mod calendar;
mod carry_over;
mod entitlement;
mod usage;
mod verification;

pub use accrual::{AccrualSnapshot, calculate_accrual, prorate_entitlement};
pub use balance::{BalanceEngine, DEFAULT_HISTORY_YEARS, MAX_HISTORY_YEARS};
pub use calendar::{
    AVERAGE_DAYS_PER_MONTH, DateWindow, MONTHS_PER_YEAR, MonthFraction, inclusive_day_count,
    months_elapsed_fraction, tenure_years, year_window,
};
pub use carry_over::{CarryOverSnapshot, calculate_carry_over, carry_over_cap};
pub use entitlement::{EntitlementTable, resolve_entitlements};
pub use usage::{LeaveHistory, MISSING_DAY_TOTAL, RequestLedger, UsageTotals, aggregate_usage};
pub use verification::{DEFAULT_TOLERANCE, ReconciliationVerifier, compare_tables};
