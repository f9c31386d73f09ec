use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, QueryBuilder};

use super::{DocumentStore, EmployeeFilter, StoreError, Window};
use crate::codec::{DocumentChanges, EmployeeDocument};
use crate::models::analytics::DepartmentSalary;

const COLUMNS: &str = "id, employee_id, name, department, salary, joining_date, skills";

/// PostgreSQL-backed collection: one table named after the collection.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
    collection: String,
}

impl PgStore {
    pub async fn connect(
        database_url: &str,
        collection: &str,
        max_connections: u32,
    ) -> Result<Self, StoreError> {
        validate_collection_name(collection)?;
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self {
            pool,
            collection: collection.to_string(),
        })
    }

    /// Wrap an existing pool, e.g. one shared with other components.
    pub fn from_pool(pool: PgPool, collection: &str) -> Result<Self, StoreError> {
        validate_collection_name(collection)?;
        Ok(Self {
            pool,
            collection: collection.to_string(),
        })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }

    fn table(&self) -> String {
        format!("\"{}\"", self.collection)
    }
}

/// The collection name is interpolated into SQL, so only plain identifiers
/// are allowed.
pub fn validate_collection_name(name: &str) -> Result<(), StoreError> {
    let mut chars = name.chars();
    let valid_head = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    let valid_tail = chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid_head && valid_tail && name.len() <= 63 {
        Ok(())
    } else {
        Err(StoreError::InvalidCollection(name.to_string()))
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.is_unique_violation(),
        _ => false,
    }
}

fn to_i64(n: u64) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

#[async_trait]
impl DocumentStore for PgStore {
    fn collection(&self) -> &str {
        &self.collection
    }

    async fn ensure_schema(&self) -> Result<(), StoreError> {
        let table = self.table();
        sqlx::query(&format!(
            r#"CREATE TABLE IF NOT EXISTS {table} (
                   id UUID PRIMARY KEY,
                   employee_id TEXT NOT NULL,
                   name TEXT NOT NULL,
                   department TEXT NOT NULL,
                   salary BIGINT NOT NULL,
                   joining_date TIMESTAMPTZ NOT NULL,
                   skills TEXT[] NOT NULL DEFAULT '{{}}'
               )"#
        ))
        .execute(&self.pool)
        .await?;

        sqlx::query(&format!(
            "CREATE UNIQUE INDEX IF NOT EXISTS \"{c}_employee_id_key\" ON {table} (employee_id)",
            c = self.collection
        ))
        .execute(&self.pool)
        .await?;

        sqlx::query(&format!(
            "CREATE INDEX IF NOT EXISTS \"{c}_department_joining_idx\" ON {table} (department, joining_date DESC)",
            c = self.collection
        ))
        .execute(&self.pool)
        .await?;

        tracing::info!(collection = %self.collection, "schema ensured");
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn insert_one(&self, doc: &EmployeeDocument) -> Result<(), StoreError> {
        let result = sqlx::query(&format!(
            "INSERT INTO {} ({COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7)",
            self.table()
        ))
        .bind(doc.id)
        .bind(&doc.employee_id)
        .bind(&doc.name)
        .bind(&doc.department)
        .bind(doc.salary)
        .bind(doc.joining_date)
        .bind(&doc.skills)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) if is_unique_violation(&e) => Err(StoreError::Duplicate(doc.employee_id.clone())),
            Err(e) => Err(e.into()),
        }
    }

    async fn find_one(&self, employee_id: &str) -> Result<Option<EmployeeDocument>, StoreError> {
        let doc = sqlx::query_as::<_, EmployeeDocument>(&format!(
            "SELECT {COLUMNS} FROM {} WHERE employee_id = $1",
            self.table()
        ))
        .bind(employee_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(doc)
    }

    async fn update_one(
        &self,
        employee_id: &str,
        changes: &DocumentChanges,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(&format!(
            r#"UPDATE {} SET
                   name = COALESCE($2, name),
                   department = COALESCE($3, department),
                   salary = COALESCE($4, salary),
                   joining_date = COALESCE($5, joining_date),
                   skills = COALESCE($6, skills)
               WHERE employee_id = $1"#,
            self.table()
        ))
        .bind(employee_id)
        .bind(&changes.name)
        .bind(&changes.department)
        .bind(changes.salary)
        .bind(changes.joining_date)
        .bind(&changes.skills)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_one(&self, employee_id: &str) -> Result<bool, StoreError> {
        let result = sqlx::query(&format!("DELETE FROM {} WHERE employee_id = $1", self.table()))
            .bind(employee_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn find(
        &self,
        filter: &EmployeeFilter,
        window: Window,
    ) -> Result<Vec<EmployeeDocument>, StoreError> {
        let mut qb: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {COLUMNS} FROM {} WHERE TRUE", self.table()));
        if let Some(department) = &filter.department {
            qb.push(" AND department = ").push_bind(department.clone());
        }
        if let Some(skill) = &filter.skill {
            qb.push(" AND ").push_bind(skill.clone()).push(" = ANY(skills)");
        }
        // COLLATE "C" keeps the tie-break byte-ordered, same as the memory store.
        qb.push(" ORDER BY joining_date DESC, employee_id COLLATE \"C\" ASC");
        if let Some(limit) = window.limit {
            qb.push(" LIMIT ").push_bind(to_i64(limit));
        }
        qb.push(" OFFSET ").push_bind(to_i64(window.skip));

        let docs = qb
            .build_query_as::<EmployeeDocument>()
            .fetch_all(&self.pool)
            .await?;
        Ok(docs)
    }

    async fn average_salary_by_department(&self) -> Result<Vec<DepartmentSalary>, StoreError> {
        let rows = sqlx::query_as::<_, DepartmentSalary>(&format!(
            r#"SELECT department,
                      (CASE
                           WHEN ABS(mean - TRUNC(mean)) = 0.5 AND MOD(ROUND(mean), 2) <> 0
                               THEN TRUNC(mean)
                           ELSE ROUND(mean)
                       END)::BIGINT AS avg_salary
               FROM (SELECT department, AVG(salary) AS mean FROM {} GROUP BY department) g
               ORDER BY department COLLATE "C""#,
            self.table()
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_name_accepts_identifiers() {
        assert!(validate_collection_name("employees").is_ok());
        assert!(validate_collection_name("_staff_2024").is_ok());
    }

    #[test]
    fn test_collection_name_rejects_injection() {
        let too_long = "a".repeat(64);
        for bad in ["", "2024", "emp-loyees", "employees; DROP TABLE x", "e\"x", too_long.as_str()] {
            assert!(
                matches!(validate_collection_name(bad), Err(StoreError::InvalidCollection(_))),
                "{bad:?} should be rejected"
            );
        }
    }
}
