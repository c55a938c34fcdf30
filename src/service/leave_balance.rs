//! The caller-level balance service.
//!
//! [`LeaveBalanceService`] looks up the employee and reads their request
//! history concurrently, then hands both to the synchronous engine.

use std::sync::Arc;
use std::time::Instant;

use chrono::{Datelike, NaiveDateTime};
use tracing::{info, warn};
use uuid::Uuid;

use super::store::{EmployeeDirectory, LeaveRequestStore, RequestQuery};
use crate::calculation::{
    BalanceEngine, DateWindow, MAX_HISTORY_YEARS, ReconciliationVerifier, RequestLedger, year_window,
};
use crate::config::LeavePolicy;
use crate::error::{EngineError, EngineResult};
use crate::models::{BalanceSummary, EmployeeProfile, LeaveStatus, VerificationReport};

/// Computes and verifies balances for employees held in external stores.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
///
/// use leave_engine::config::LeavePolicy;
/// use leave_engine::error::EngineError;
/// use leave_engine::service::{
///     InMemoryEmployeeDirectory, InMemoryLeaveRequestStore, LeaveBalanceService,
/// };
/// use chrono::NaiveDate;
///
/// let runtime = tokio::runtime::Runtime::new().unwrap();
/// runtime.block_on(async {
///     let service = LeaveBalanceService::new(
///         LeavePolicy::bcea(),
///         Arc::new(InMemoryEmployeeDirectory::new()),
///         Arc::new(InMemoryLeaveRequestStore::new()),
///     );
///     let as_of = NaiveDate::from_ymd_opt(2025, 7, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
///
///     let result = service.balances("emp_404", as_of).await;
///     assert!(matches!(result, Err(EngineError::EmployeeNotFound { .. })));
/// });
/// ```
#[derive(Clone)]
pub struct LeaveBalanceService {
    engine: Arc<BalanceEngine>,
    verifier: Arc<ReconciliationVerifier>,
    directory: Arc<dyn EmployeeDirectory>,
    requests: Arc<dyn LeaveRequestStore>,
}

impl LeaveBalanceService {
    /// Creates a service computing against `policy`.
    pub fn new(
        policy: LeavePolicy,
        directory: Arc<dyn EmployeeDirectory>,
        requests: Arc<dyn LeaveRequestStore>,
    ) -> Self {
        Self {
            verifier: Arc::new(ReconciliationVerifier::new(policy.clone())),
            engine: Arc::new(BalanceEngine::new(policy)),
            directory,
            requests,
        }
    }

    /// Replaces the balance engine (for a different history depth).
    pub fn with_engine(mut self, engine: BalanceEngine) -> Self {
        self.engine = Arc::new(engine);
        self
    }

    /// Replaces the verifier (for a reference policy or cross-check formula).
    pub fn with_verifier(mut self, verifier: ReconciliationVerifier) -> Self {
        self.verifier = Arc::new(verifier);
        self
    }

    /// Returns the balance engine.
    pub fn engine(&self) -> &BalanceEngine {
        &self.engine
    }

    /// Computes the balances of `employee_id` for the year of `as_of`.
    ///
    /// # Errors
    ///
    /// - `EmployeeNotFound` when the directory has no such employee
    /// - `HistoryUnavailable` when either store read fails
    pub async fn balances(
        &self,
        employee_id: &str,
        as_of: NaiveDateTime,
    ) -> EngineResult<BalanceSummary> {
        let correlation_id = Uuid::new_v4();
        info!(
            correlation_id = %correlation_id,
            employee_id = %employee_id,
            as_of = %as_of,
            "Processing balance request"
        );

        let year = as_of.year();
        // Carry-over needs the prior year even when the history is one year deep.
        let depth = i32::try_from(self.engine.history_years()).unwrap_or(MAX_HISTORY_YEARS as i32);
        let earliest = year - (depth - 1).max(1);
        let window = DateWindow::new(year_window(earliest)?.start(), year_window(year)?.end())?;

        let start_time = Instant::now();
        let (employee, ledger) = self.fetch(correlation_id, employee_id, window).await?;
        let summary = self.engine.compute_balances(&employee, &ledger, as_of)?;

        info!(
            correlation_id = %correlation_id,
            calculation_id = %summary.calculation_id,
            employee_id = %employee_id,
            requests = ledger.len(),
            duration_us = start_time.elapsed().as_micros() as u64,
            "Balance request completed"
        );
        Ok(summary)
    }

    /// Verifies the balances of `employee_id` for `year` as of `as_of`.
    ///
    /// # Errors
    ///
    /// - `EmployeeNotFound` when the directory has no such employee
    /// - `HistoryUnavailable` when either store read fails
    pub async fn verify(
        &self,
        employee_id: &str,
        year: i32,
        as_of: NaiveDateTime,
    ) -> EngineResult<VerificationReport> {
        let correlation_id = Uuid::new_v4();
        info!(
            correlation_id = %correlation_id,
            employee_id = %employee_id,
            year = year,
            "Processing verification request"
        );

        let (employee, ledger) = self
            .fetch(correlation_id, employee_id, year_window(year)?)
            .await?;
        let report = self
            .verifier
            .verify_balances(&employee, &ledger, year, as_of)?;

        info!(
            correlation_id = %correlation_id,
            report_id = %report.report_id,
            clean = report.is_clean(),
            "Verification request completed"
        );
        Ok(report)
    }

    /// Reads the profile and the approved and pending requests in `window`
    /// concurrently.
    async fn fetch(
        &self,
        correlation_id: Uuid,
        employee_id: &str,
        window: DateWindow,
    ) -> EngineResult<(EmployeeProfile, RequestLedger)> {
        let query = RequestQuery {
            employee_id: employee_id.to_string(),
            statuses: vec![LeaveStatus::Approved, LeaveStatus::Pending],
            window,
        };

        let result = tokio::try_join!(
            self.directory.find_employee(employee_id),
            self.requests.find_requests(&query)
        );
        let (employee, records) = match result {
            Ok(fetched) => fetched,
            Err(err) => {
                warn!(
                    correlation_id = %correlation_id,
                    employee_id = %employee_id,
                    error = %err,
                    "Store read failed"
                );
                return Err(err);
            }
        };

        let Some(employee) = employee else {
            warn!(
                correlation_id = %correlation_id,
                employee_id = %employee_id,
                "Employee not found"
            );
            return Err(EngineError::EmployeeNotFound {
                employee_id: employee_id.to_string(),
            });
        };

        Ok((employee, RequestLedger::new(records)))
    }
}
