//! External store traits and in-memory implementations.
//!
//! The engine never talks to a database itself. Callers provide an
//! [`EmployeeDirectory`] and a [`LeaveRequestStore`]; the in-memory versions
//! here back tests, benchmarks and embedding without a persistence layer.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::calculation::{DateWindow, LeaveHistory, RequestLedger};
use crate::error::EngineResult;
use crate::models::{EmployeeProfile, LeaveRequestRecord, LeaveStatus};

/// Filter for a leave request read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestQuery {
    /// Owning employee.
    pub employee_id: String,
    /// Statuses to include.
    pub statuses: Vec<LeaveStatus>,
    /// Window the request start dates must fall in.
    pub window: DateWindow,
}

/// Looks up employee profiles.
#[async_trait]
pub trait EmployeeDirectory: Send + Sync {
    /// Returns the profile for `employee_id`, or `None` when unknown.
    async fn find_employee(&self, employee_id: &str) -> EngineResult<Option<EmployeeProfile>>;
}

/// Reads leave requests.
#[async_trait]
pub trait LeaveRequestStore: Send + Sync {
    /// Returns the requests matching `query`.
    async fn find_requests(&self, query: &RequestQuery) -> EngineResult<Vec<LeaveRequestRecord>>;
}

/// In-memory implementation of [`EmployeeDirectory`].
#[derive(Debug, Default)]
pub struct InMemoryEmployeeDirectory {
    employees: RwLock<HashMap<String, EmployeeProfile>>,
}

impl InMemoryEmployeeDirectory {
    /// Creates an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a profile.
    pub async fn insert(&self, employee: EmployeeProfile) {
        self.employees
            .write()
            .await
            .insert(employee.id.clone(), employee);
    }

    /// Number of profiles held.
    pub async fn count(&self) -> usize {
        self.employees.read().await.len()
    }
}

#[async_trait]
impl EmployeeDirectory for InMemoryEmployeeDirectory {
    async fn find_employee(&self, employee_id: &str) -> EngineResult<Option<EmployeeProfile>> {
        Ok(self.employees.read().await.get(employee_id).cloned())
    }
}

/// In-memory implementation of [`LeaveRequestStore`].
#[derive(Debug, Default)]
pub struct InMemoryLeaveRequestStore {
    ledger: RwLock<RequestLedger>,
}

impl InMemoryLeaveRequestStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a request.
    pub async fn insert(&self, record: LeaveRequestRecord) {
        self.ledger.write().await.push(record);
    }

    /// Appends several requests.
    pub async fn extend(&self, records: impl IntoIterator<Item = LeaveRequestRecord>) {
        let mut ledger = self.ledger.write().await;
        for record in records {
            ledger.push(record);
        }
    }

    /// Number of requests held.
    pub async fn count(&self) -> usize {
        self.ledger.read().await.len()
    }
}

#[async_trait]
impl LeaveRequestStore for InMemoryLeaveRequestStore {
    async fn find_requests(&self, query: &RequestQuery) -> EngineResult<Vec<LeaveRequestRecord>> {
        self.ledger
            .read()
            .await
            .requests(&query.employee_id, &query.statuses, &query.window)
    }
}
