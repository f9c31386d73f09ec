use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::AuthUser;
use crate::codec;
use crate::errors::AppError;
use crate::models::employee::{Employee, EmployeePage, EmployeeUpdate, NewEmployee};
use crate::repository::PageRequest;
use crate::AppState;

// ── Request DTOs ─────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub department: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

// ── Validation ───────────────────────────────────────────────

/// Unwrap a JSON body, turning any extractor rejection into a 400.
pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| AppError::Validation(rejection.body_text()))
}

pub(crate) fn query_params<T>(params: Result<Query<T>, QueryRejection>) -> Result<T, AppError> {
    params
        .map(|Query(p)| p)
        .map_err(|rejection| AppError::Validation(rejection.body_text()))
}

fn validate_joining_date(raw: &str) -> Result<(), AppError> {
    codec::parse_joining_date(raw)
        .map(|_| ())
        .map_err(|e| AppError::Validation(e.to_string()))
}

// ── Handlers ─────────────────────────────────────────────────

/// POST /employees: create a record (auth required)
pub async fn create_employee(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    payload: Result<Json<NewEmployee>, JsonRejection>,
) -> Result<(StatusCode, Json<Employee>), AppError> {
    let record = json_body(payload)?;
    validate_joining_date(&record.joining_date)?;

    tracing::debug!(subject = %user.subject, employee_id = %record.employee_id, "create_employee");
    let created = state.repo.create(record).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /employees/:employee_id
pub async fn get_employee(
    State(state): State<Arc<AppState>>,
    Path(employee_id): Path<String>,
) -> Result<Json<Employee>, AppError> {
    state
        .repo
        .get(&employee_id)
        .await?
        .map(Json)
        .ok_or(AppError::EmployeeNotFound)
}

/// PUT /employees/:employee_id: partial update (auth required)
pub async fn update_employee(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(employee_id): Path<String>,
    payload: Result<Json<EmployeeUpdate>, JsonRejection>,
) -> Result<Json<Employee>, AppError> {
    let update = json_body(payload)?;
    if let Some(date) = &update.joining_date {
        validate_joining_date(date)?;
    }

    tracing::debug!(subject = %user.subject, employee_id = %employee_id, "update_employee");
    state
        .repo
        .update(&employee_id, &update)
        .await?
        .map(Json)
        .ok_or(AppError::EmployeeNotFound)
}

/// DELETE /employees/:employee_id (auth required)
pub async fn delete_employee(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(employee_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    tracing::debug!(subject = %user.subject, employee_id = %employee_id, "delete_employee");
    if state.repo.delete(&employee_id).await? {
        Ok(Json(json!({ "detail": "Employee deleted" })))
    } else {
        Err(AppError::EmployeeNotFound)
    }
}

/// GET /employees?department=&page=&limit=: newest joiners first
pub async fn list_employees(
    State(state): State<Arc<AppState>>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<EmployeePage>, AppError> {
    let params = query_params(params)?;
    let page = PageRequest::new(params.page, params.limit);

    let listing = state.repo.list(params.department.as_deref(), page).await?;
    Ok(Json(EmployeePage {
        page: listing.page.page,
        limit: listing.page.limit,
        results: listing.results,
    }))
}
