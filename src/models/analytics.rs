use serde::{Deserialize, Serialize};

/// Mean salary of one department, rounded to the nearest integer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct DepartmentSalary {
    pub department: String,
    pub avg_salary: i64,
}
