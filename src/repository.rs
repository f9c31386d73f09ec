//! Employee repository: the only writer of the collection.
//!
//! "Not found" is `Ok(None)` / `Ok(false)`, never an error.

use std::sync::Arc;

use thiserror::Error;
use uuid::Uuid;

use crate::codec::{self, CodecError, EmployeeDocument};
use crate::models::analytics::DepartmentSalary;
use crate::models::employee::{Employee, EmployeeUpdate, NewEmployee};
use crate::store::{DocumentStore, EmployeeFilter, StoreError, Window};

pub const DEFAULT_PAGE_LIMIT: i64 = 20;
pub const MAX_PAGE_LIMIT: i64 = 100;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("employee_id '{0}' already exists")]
    DuplicateIdentifier(String),

    #[error(transparent)]
    InvalidDate(#[from] CodecError),

    /// A concurrent delete won the race between insert and read-back.
    #[error("employee '{0}' was removed before it could be read back")]
    Vanished(String),

    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for RepoError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate(id) => RepoError::DuplicateIdentifier(id),
            other => RepoError::Store(other),
        }
    }
}

pub type RepoResult<T> = Result<T, RepoError>;

/// Effective pagination after clamping. `page` is 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub limit: i64,
}

impl PageRequest {
    /// Page below 1 becomes 1; limit is clamped to `1..=MAX_PAGE_LIMIT`.
    pub fn new(page: Option<i64>, limit: Option<i64>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit.unwrap_or(DEFAULT_PAGE_LIMIT).clamp(1, MAX_PAGE_LIMIT),
        }
    }

    fn window(&self) -> Window {
        let page = u64::try_from(self.page - 1).unwrap_or(0);
        let limit = u64::try_from(self.limit).unwrap_or(1);
        Window {
            skip: page.saturating_mul(limit),
            limit: Some(limit),
        }
    }
}

/// Decoded records plus the pagination that produced them.
#[derive(Debug, Clone)]
pub struct Listing {
    pub page: PageRequest,
    pub results: Vec<Employee>,
}

#[derive(Clone)]
pub struct EmployeeRepository {
    store: Arc<dyn DocumentStore>,
}

impl EmployeeRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    pub async fn create(&self, record: NewEmployee) -> RepoResult<Employee> {
        let doc = codec::to_storage(&record, Uuid::new_v4())?;
        self.store.insert_one(&doc).await?;
        tracing::info!(employee_id = %doc.employee_id, id = %doc.id, "employee created");

        // Re-read so the caller sees exactly what was persisted.
        let stored = self.store.find_one(&doc.employee_id).await?;
        codec::from_storage(stored).ok_or(RepoError::Vanished(doc.employee_id))
    }

    pub async fn get(&self, employee_id: &str) -> RepoResult<Option<Employee>> {
        let doc = self.store.find_one(employee_id).await?;
        Ok(codec::from_storage(doc))
    }

    /// Sets exactly the supplied fields. An empty update is a plain read.
    pub async fn update(
        &self,
        employee_id: &str,
        update: &EmployeeUpdate,
    ) -> RepoResult<Option<Employee>> {
        if update.is_empty() {
            return self.get(employee_id).await;
        }

        let changes = codec::encode_changes(update)?;
        if !self.store.update_one(employee_id, &changes).await? {
            return Ok(None);
        }
        tracing::info!(employee_id = %employee_id, "employee updated");
        self.get(employee_id).await
    }

    pub async fn delete(&self, employee_id: &str) -> RepoResult<bool> {
        let deleted = self.store.delete_one(employee_id).await?;
        if deleted {
            tracing::info!(employee_id = %employee_id, "employee deleted");
        }
        Ok(deleted)
    }

    /// Empty `department` means no filter.
    pub async fn list(&self, department: Option<&str>, page: PageRequest) -> RepoResult<Listing> {
        let filter = EmployeeFilter {
            department: department.filter(|d| !d.is_empty()).map(str::to_string),
            skill: None,
        };
        let docs = self.store.find(&filter, page.window()).await?;
        Ok(Listing {
            page,
            results: decode_all(docs),
        })
    }

    pub async fn average_salary_by_department(&self) -> RepoResult<Vec<DepartmentSalary>> {
        Ok(self.store.average_salary_by_department().await?)
    }

    pub async fn search_by_skill(&self, skill: &str) -> RepoResult<Vec<Employee>> {
        let filter = EmployeeFilter {
            department: None,
            skill: Some(skill.to_string()),
        };
        let docs = self.store.find(&filter, Window::all()).await?;
        Ok(decode_all(docs))
    }
}

fn decode_all(docs: Vec<EmployeeDocument>) -> Vec<Employee> {
    docs.into_iter()
        .filter_map(|doc| codec::from_storage(Some(doc)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_request_clamps() {
        assert_eq!(PageRequest::new(None, None), PageRequest { page: 1, limit: 20 });
        assert_eq!(PageRequest::new(Some(0), Some(5)), PageRequest { page: 1, limit: 5 });
        assert_eq!(PageRequest::new(Some(-7), Some(0)), PageRequest { page: 1, limit: 1 });
        assert_eq!(PageRequest::new(Some(3), Some(10_000)), PageRequest { page: 3, limit: 100 });
    }

    #[test]
    fn test_page_request_window() {
        let window = PageRequest::new(Some(3), Some(10)).window();
        assert_eq!(window, Window { skip: 20, limit: Some(10) });

        let window = PageRequest::new(Some(i64::MAX), Some(100)).window();
        assert_eq!(window.skip, u64::MAX);
    }

    #[test]
    fn test_duplicate_store_error_maps_to_duplicate_identifier() {
        let err: RepoError = StoreError::Duplicate("E1".into()).into();
        assert!(matches!(err, RepoError::DuplicateIdentifier(id) if id == "E1"));

        let err: RepoError = StoreError::InvalidCollection("x-y".into()).into();
        assert!(matches!(err, RepoError::Store(_)));
    }
}
