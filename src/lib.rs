//! Leave Entitlement & Balance Engine
//!
//! This crate computes, for one employee, the annual leave entitlement per
//! leave type, the portion accrued to date, the days carried over from the
//! prior year, and the balance remaining after approved and pending requests.
//! A separate reconciliation pass recomputes the same figures and reports
//! discrepancies and policy violations.
//!
//! The default policy is seeded from the BCEA statutory minimums and can be
//! replaced by YAML policy files.

#![warn(missing_docs)]

pub mod calculation;
pub mod config;
pub mod error;
pub mod models;
pub mod service;
