//! Leave policy configuration.
//!
//! This module provides the declarative policy tables (base entitlements,
//! managerial overrides, tenure ladder, special adjustments, carry-over rule)
//! and functionality to load them from YAML files.
//!
//! # Example
//!
//! ```no_run
//! use leave_engine::config::ConfigLoader;
//!
//! let loader = ConfigLoader::load("./config/bcea").unwrap();
//! println!("Loaded policy: {}", loader.metadata().name);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    AdjustmentMode, CarryOverRule, EntitlementsConfig, LeavePolicy, PolicyMetadata, RolesConfig,
    SpecialAdjustment, TenureConfig, TenureStep,
};
