//! Document store adapter.
//!
//! A [`DocumentStore`] owns one logical collection of employee documents and
//! the uniqueness constraint on `employee_id`. Two backends:
//!
//!   - [`postgres::PgStore`] (default): one table per collection, `sqlx` pool.
//!   - [`memory::MemoryStore`]: in-process map, for tests and local demos.
//!
//! Results from [`DocumentStore::find`] are always ordered by `joining_date`
//! descending, ties broken by `employee_id` ascending.

use async_trait::async_trait;
use std::cmp::Ordering;
use thiserror::Error;

use crate::codec::{DocumentChanges, EmployeeDocument};
use crate::models::analytics::DepartmentSalary;

pub mod memory;
pub mod postgres;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("duplicate key: employee_id '{0}' already exists")]
    Duplicate(String),

    #[error("invalid collection name '{0}'")]
    InvalidCollection(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Exact-match predicates. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmployeeFilter {
    pub department: Option<String>,
    /// Matches when the skills list contains this exact string.
    pub skill: Option<String>,
}

impl EmployeeFilter {
    pub fn matches(&self, doc: &EmployeeDocument) -> bool {
        if let Some(department) = &self.department {
            if &doc.department != department {
                return false;
            }
        }
        if let Some(skill) = &self.skill {
            if !doc.skills.iter().any(|s| s == skill) {
                return false;
            }
        }
        true
    }
}

/// Skip/limit window applied after sorting. `limit: None` returns everything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Window {
    pub skip: u64,
    pub limit: Option<u64>,
}

impl Window {
    pub fn all() -> Self {
        Self::default()
    }
}

/// Canonical result ordering shared by every backend.
pub fn newest_first(a: &EmployeeDocument, b: &EmployeeDocument) -> Ordering {
    b.joining_date
        .cmp(&a.joining_date)
        .then_with(|| a.employee_id.cmp(&b.employee_id))
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Name of the single collection this adapter serves.
    fn collection(&self) -> &str;

    /// Create the collection and the unique constraint on `employee_id`.
    /// Idempotent; call once before serving traffic.
    async fn ensure_schema(&self) -> Result<(), StoreError>;

    /// Cheap round trip to the backend.
    async fn ping(&self) -> Result<(), StoreError>;

    /// Fails with [`StoreError::Duplicate`] without writing anything when the
    /// `employee_id` is taken.
    async fn insert_one(&self, doc: &EmployeeDocument) -> Result<(), StoreError>;

    async fn find_one(&self, employee_id: &str) -> Result<Option<EmployeeDocument>, StoreError>;

    /// Returns whether a document matched.
    async fn update_one(
        &self,
        employee_id: &str,
        changes: &DocumentChanges,
    ) -> Result<bool, StoreError>;

    /// Returns whether a document was removed.
    async fn delete_one(&self, employee_id: &str) -> Result<bool, StoreError>;

    async fn find(
        &self,
        filter: &EmployeeFilter,
        window: Window,
    ) -> Result<Vec<EmployeeDocument>, StoreError>;

    /// Mean salary per department, rounded half to even, ordered by
    /// department name.
    async fn average_salary_by_department(&self) -> Result<Vec<DepartmentSalary>, StoreError>;
}
