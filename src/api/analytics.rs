use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use serde::Deserialize;

use super::handlers::query_params;
use crate::errors::AppError;
use crate::models::analytics::DepartmentSalary;
use crate::models::employee::Employee;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SkillQuery {
    pub skill: String,
}

/// GET /employees/avg-salary: one row per department, rounded mean salary.
pub async fn average_salary(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<DepartmentSalary>>, AppError> {
    let rows = state.repo.average_salary_by_department().await?;
    Ok(Json(rows))
}

/// GET /employees/search?skill=: exact, case-sensitive element match.
pub async fn search_by_skill(
    State(state): State<Arc<AppState>>,
    params: Result<Query<SkillQuery>, QueryRejection>,
) -> Result<Json<Vec<Employee>>, AppError> {
    let SkillQuery { skill } = query_params(params)?;
    let results = state.repo.search_by_skill(&skill).await?;
    Ok(Json(results))
}
