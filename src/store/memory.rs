use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{newest_first, DocumentStore, EmployeeFilter, StoreError, Window};
use crate::codec::{DocumentChanges, EmployeeDocument};
use crate::models::analytics::DepartmentSalary;

/// In-process collection keyed by `employee_id`.
///
/// The map key is the uniqueness constraint, so `ensure_schema` has nothing
/// to create. Contents are lost on restart.
pub struct MemoryStore {
    collection: String,
    docs: RwLock<BTreeMap<String, EmployeeDocument>>,
}

impl MemoryStore {
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            docs: RwLock::new(BTreeMap::new()),
        }
    }

    pub async fn count(&self) -> usize {
        self.docs.read().await.len()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new("employees")
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    fn collection(&self) -> &str {
        &self.collection
    }

    async fn ensure_schema(&self) -> Result<(), StoreError> {
        tracing::debug!(collection = %self.collection, "memory store: schema is implicit");
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn insert_one(&self, doc: &EmployeeDocument) -> Result<(), StoreError> {
        let mut docs = self.docs.write().await;
        if docs.contains_key(&doc.employee_id) {
            return Err(StoreError::Duplicate(doc.employee_id.clone()));
        }
        docs.insert(doc.employee_id.clone(), doc.clone());
        Ok(())
    }

    async fn find_one(&self, employee_id: &str) -> Result<Option<EmployeeDocument>, StoreError> {
        Ok(self.docs.read().await.get(employee_id).cloned())
    }

    async fn update_one(
        &self,
        employee_id: &str,
        changes: &DocumentChanges,
    ) -> Result<bool, StoreError> {
        let mut docs = self.docs.write().await;
        match docs.get_mut(employee_id) {
            Some(doc) => {
                changes.apply(doc);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_one(&self, employee_id: &str) -> Result<bool, StoreError> {
        Ok(self.docs.write().await.remove(employee_id).is_some())
    }

    async fn find(
        &self,
        filter: &EmployeeFilter,
        window: Window,
    ) -> Result<Vec<EmployeeDocument>, StoreError> {
        let mut matched: Vec<EmployeeDocument> = self
            .docs
            .read()
            .await
            .values()
            .filter(|doc| filter.matches(doc))
            .cloned()
            .collect();
        matched.sort_by(newest_first);

        let skip = usize::try_from(window.skip).unwrap_or(usize::MAX);
        let take = window
            .limit
            .map(|l| usize::try_from(l).unwrap_or(usize::MAX))
            .unwrap_or(usize::MAX);
        Ok(matched.into_iter().skip(skip).take(take).collect())
    }

    async fn average_salary_by_department(&self) -> Result<Vec<DepartmentSalary>, StoreError> {
        let mut groups: BTreeMap<String, (i128, i128)> = BTreeMap::new();
        for doc in self.docs.read().await.values() {
            let entry = groups.entry(doc.department.clone()).or_insert((0, 0));
            entry.0 += i128::from(doc.salary);
            entry.1 += 1;
        }

        Ok(groups
            .into_iter()
            .map(|(department, (sum, count))| DepartmentSalary {
                department,
                avg_salary: rounded_mean(sum, count),
            })
            .collect())
    }
}

/// Integer mean rounded half to even, so a mean of 150.5 becomes 150 and
/// 151.5 becomes 152.
fn rounded_mean(sum: i128, count: i128) -> i64 {
    let quotient = sum / count;
    let twice_remainder = 2 * (sum % count).abs();
    let adjusted = if twice_remainder > count || (twice_remainder == count && quotient % 2 != 0) {
        quotient + sum.signum()
    } else {
        quotient
    };
    i64::try_from(adjusted).unwrap_or(if adjusted > 0 { i64::MAX } else { i64::MIN })
}
