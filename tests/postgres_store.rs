//! PostgreSQL store tests.
//!
//! **Requirements:** a reachable PostgreSQL at `DATABASE_URL`. Without it
//! every test returns early. Each test works in its own throwaway table.

use std::sync::Arc;

use employee_api::models::analytics::DepartmentSalary;
use employee_api::models::employee::{EmployeeUpdate, NewEmployee};
use employee_api::repository::{EmployeeRepository, PageRequest, RepoError};
use employee_api::store::postgres::PgStore;
use employee_api::store::DocumentStore;

async fn scratch_store() -> Option<PgStore> {
    let url = match std::env::var("DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            eprintln!("DATABASE_URL not set; skipping");
            return None;
        }
    };
    let collection = format!("employees_test_{}", uuid::Uuid::new_v4().simple());
    let store = PgStore::connect(&url, &collection, 2).await.unwrap();
    store.ensure_schema().await.unwrap();
    Some(store)
}

async fn drop_table(store: &PgStore) {
    sqlx::query(&format!("DROP TABLE IF EXISTS \"{}\"", store.collection()))
        .execute(store.pool())
        .await
        .unwrap();
    store.close().await;
}

fn record(id: &str, department: &str, salary: i64, joining_date: &str, skills: &[&str]) -> NewEmployee {
    NewEmployee {
        employee_id: id.into(),
        name: format!("Employee {id}"),
        department: department.into(),
        salary,
        joining_date: joining_date.into(),
        skills: skills.iter().map(|s| s.to_string()).collect(),
    }
}

#[tokio::test]
async fn test_pg_crud_cycle() {
    let Some(store) = scratch_store().await else { return };
    // Idempotent.
    store.ensure_schema().await.unwrap();
    let repo = EmployeeRepository::new(Arc::new(store.clone()));

    let created = repo
        .create(record("E1", "Eng", 100, "2023-01-15", &["Rust"]))
        .await
        .unwrap();
    assert_eq!(created.joining_date, "2023-01-15");
    assert_eq!(repo.get("E1").await.unwrap(), Some(created.clone()));

    let err = repo
        .create(record("E1", "Sales", 1, "2024-01-01", &[]))
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::DuplicateIdentifier(_)));

    let update = EmployeeUpdate {
        salary: Some(175),
        ..Default::default()
    };
    let updated = repo.update("E1", &update).await.unwrap().unwrap();
    assert_eq!(updated.salary, 175);
    assert_eq!(updated.department, "Eng");
    assert_eq!(updated.skills, vec!["Rust"]);

    assert!(repo.delete("E1").await.unwrap());
    assert!(!repo.delete("E1").await.unwrap());
    assert_eq!(repo.get("E1").await.unwrap(), None);

    drop_table(&store).await;
}

#[tokio::test]
async fn test_pg_ordering_paging_and_analytics() {
    let Some(store) = scratch_store().await else { return };
    let repo = EmployeeRepository::new(Arc::new(store.clone()));

    for input in [
        record("E1", "Eng", 100, "2021-03-01", &["Rust"]),
        record("E2", "Eng", 201, "2023-07-10", &["Go", "Rust"]),
        record("e0", "Eng", 150, "2023-07-10", &["rust"]),
        record("S1", "Sales", 50, "2022-01-01", &[]),
    ] {
        repo.create(input).await.unwrap();
    }

    let page = repo
        .list(Some("Eng"), PageRequest::new(Some(1), Some(2)))
        .await
        .unwrap();
    let ids: Vec<_> = page.results.iter().map(|e| e.employee_id.as_str()).collect();
    // Byte order: uppercase sorts before lowercase.
    assert_eq!(ids, ["E2", "e0"]);

    let hits = repo.search_by_skill("Rust").await.unwrap();
    let ids: Vec<_> = hits.iter().map(|e| e.employee_id.as_str()).collect();
    assert_eq!(ids, ["E2", "E1"]);

    assert_eq!(
        repo.average_salary_by_department().await.unwrap(),
        vec![
            DepartmentSalary {
                department: "Eng".into(),
                avg_salary: 150
            },
            DepartmentSalary {
                department: "Sales".into(),
                avg_salary: 50
            },
        ]
    );

    store.ping().await.unwrap();
    drop_table(&store).await;
}

#[tokio::test]
async fn test_pg_average_rounds_ties_to_even() {
    let Some(store) = scratch_store().await else { return };
    let repo = EmployeeRepository::new(Arc::new(store.clone()));

    for input in [
        record("A", "Eng", 100, "2023-01-01", &[]),
        record("B", "Eng", 201, "2023-01-02", &[]),
        record("C", "Ops", 2, "2023-01-03", &[]),
        record("D", "Ops", 3, "2023-01-04", &[]),
        record("E", "Sales", 151, "2023-01-05", &[]),
        record("F", "Sales", 152, "2023-01-06", &[]),
        record("G", "Support", -5, "2023-01-07", &[]),
        record("H", "Support", 0, "2023-01-08", &[]),
    ] {
        repo.create(input).await.unwrap();
    }

    let averages: Vec<(String, i64)> = repo
        .average_salary_by_department()
        .await
        .unwrap()
        .into_iter()
        .map(|row| (row.department, row.avg_salary))
        .collect();
    assert_eq!(
        averages,
        vec![
            ("Eng".to_string(), 150),
            ("Ops".to_string(), 2),
            ("Sales".to_string(), 152),
            ("Support".to_string(), -2),
        ]
    );

    drop_table(&store).await;
}
