//! Async service shell around the calculation engine.
//!
//! This module defines the store traits the engine reads employees and leave
//! requests through, in-memory implementations of them, and the
//! [`LeaveBalanceService`] that wires the stores to the engine.

mod leave_balance;
mod store;

pub use leave_balance::LeaveBalanceService;
pub use store::{
    EmployeeDirectory, InMemoryEmployeeDirectory, InMemoryLeaveRequestStore, LeaveRequestStore,
    RequestQuery,
};
