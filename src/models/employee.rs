use serde::{Deserialize, Deserializer, Serialize};

/// An employee record as it appears on the wire.
///
/// `id` is the store-assigned identifier; `employee_id` is the externally
/// supplied, unique and immutable business key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub id: String,
    pub employee_id: String,
    pub name: String,
    pub department: String,
    pub salary: i64,
    /// `YYYY-MM-DD`
    pub joining_date: String,
    pub skills: Vec<String>,
}

/// Body of `POST /employees`. Every field is required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEmployee {
    pub employee_id: String,
    pub name: String,
    pub department: String,
    pub salary: i64,
    pub joining_date: String,
    pub skills: Vec<String>,
}

/// Body of `PUT /employees/{employee_id}`.
///
/// A field is either present with a value or absent. An explicit `null` is a
/// deserialization error. Fields not listed here are ignored, so a full record
/// sent back with `id` and `employee_id` still applies, and `employee_id`
/// never changes after creation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeUpdate {
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub salary: Option<i64>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub joining_date: Option<String>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub skills: Option<Vec<String>>,
}

impl EmployeeUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.department.is_none()
            && self.salary.is_none()
            && self.joining_date.is_none()
            && self.skills.is_none()
    }
}

/// One page of `GET /employees`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployeePage {
    pub page: i64,
    pub limit: i64,
    pub results: Vec<Employee>,
}

// ── Serde Helpers ────────────────────────────────────────────

/// Only invoked when the key is present, so `null` fails against `T` instead
/// of collapsing into "absent".
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

// ── Tests ────────────────────────────────────────────────────
