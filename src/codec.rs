//! Record codec: wire representation ⇄ stored document.
//!
//! The wire carries `joining_date` as a `YYYY-MM-DD` string; the store keeps a
//! UTC timestamp at midnight. The store-assigned UUID is rendered as a string
//! on the way out. Everything else passes through unchanged.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::models::employee::{Employee, EmployeeUpdate, NewEmployee};

const WIRE_DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    #[error("joining_date must be YYYY-MM-DD, got '{0}'")]
    InvalidDateFormat(String),
}

/// An employee as persisted by a [`crate::store::DocumentStore`].
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct EmployeeDocument {
    pub id: Uuid,
    pub employee_id: String,
    pub name: String,
    pub department: String,
    pub salary: i64,
    pub joining_date: DateTime<Utc>,
    pub skills: Vec<String>,
}

/// Fields to overwrite on an existing document. `None` means "leave as is".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentChanges {
    pub name: Option<String>,
    pub department: Option<String>,
    pub salary: Option<i64>,
    pub joining_date: Option<DateTime<Utc>>,
    pub skills: Option<Vec<String>>,
}

impl DocumentChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.department.is_none()
            && self.salary.is_none()
            && self.joining_date.is_none()
            && self.skills.is_none()
    }

    /// Apply to a document in place. Used by backends without a native `SET`.
    pub fn apply(&self, doc: &mut EmployeeDocument) {
        if let Some(name) = &self.name {
            doc.name = name.clone();
        }
        if let Some(department) = &self.department {
            doc.department = department.clone();
        }
        if let Some(salary) = self.salary {
            doc.salary = salary;
        }
        if let Some(joining_date) = self.joining_date {
            doc.joining_date = joining_date;
        }
        if let Some(skills) = &self.skills {
            doc.skills = skills.clone();
        }
    }
}

/// Strict `YYYY-MM-DD` calendar date.
pub fn parse_joining_date(raw: &str) -> Result<NaiveDate, CodecError> {
    // chrono accepts unpadded fields; the wire format does not.
    if raw.len() != 10 {
        return Err(CodecError::InvalidDateFormat(raw.to_string()));
    }
    NaiveDate::parse_from_str(raw, WIRE_DATE_FORMAT)
        .map_err(|_| CodecError::InvalidDateFormat(raw.to_string()))
}

fn encode_date(raw: &str) -> Result<DateTime<Utc>, CodecError> {
    let date = parse_joining_date(raw)?;
    Ok(date.and_time(NaiveTime::MIN).and_utc())
}

fn decode_date(stored: &DateTime<Utc>) -> String {
    stored.date_naive().format(WIRE_DATE_FORMAT).to_string()
}

pub fn to_storage(record: &NewEmployee, id: Uuid) -> Result<EmployeeDocument, CodecError> {
    Ok(EmployeeDocument {
        id,
        employee_id: record.employee_id.clone(),
        name: record.name.clone(),
        department: record.department.clone(),
        salary: record.salary,
        joining_date: encode_date(&record.joining_date)?,
        skills: record.skills.clone(),
    })
}

pub fn from_storage(doc: Option<EmployeeDocument>) -> Option<Employee> {
    let doc = doc?;
    Some(Employee {
        id: doc.id.to_string(),
        joining_date: decode_date(&doc.joining_date),
        employee_id: doc.employee_id,
        name: doc.name,
        department: doc.department,
        salary: doc.salary,
        skills: doc.skills,
    })
}

pub fn encode_changes(update: &EmployeeUpdate) -> Result<DocumentChanges, CodecError> {
    let joining_date = update.joining_date.as_deref().map(encode_date).transpose()?;
    Ok(DocumentChanges {
        name: update.name.clone(),
        department: update.department.clone(),
        salary: update.salary,
        joining_date,
        skills: update.skills.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> NewEmployee {
        NewEmployee {
            employee_id: "E100".into(),
            name: "Grace Hopper".into(),
            department: "Eng".into(),
            salary: 120_000,
            joining_date: "2021-03-14".into(),
            skills: vec!["COBOL".into(), "Rust".into(), "Rust".into()],
        }
    }

    #[test]
    fn test_roundtrip_preserves_wire_fields() {
        let record = sample();
        let id = Uuid::new_v4();
        let decoded = from_storage(Some(to_storage(&record, id).unwrap())).unwrap();

        assert_eq!(decoded.id, id.to_string());
        assert_eq!(decoded.employee_id, record.employee_id);
        assert_eq!(decoded.joining_date, record.joining_date);
        assert_eq!(decoded.skills, record.skills);
        assert_eq!(decoded.salary, record.salary);
    }

    #[test]
    fn test_to_storage_uses_utc_midnight() {
        let doc = to_storage(&sample(), Uuid::new_v4()).unwrap();
        assert_eq!(doc.joining_date.to_rfc3339(), "2021-03-14T00:00:00+00:00");
    }

    #[test]
    fn test_from_storage_empty_input() {
        assert!(from_storage(None).is_none());
    }

    #[test]
    fn test_invalid_dates_rejected() {
        for bad in ["2021-02-30", "2021-13-01", "14/03/2021", "2021-3-14", "", "2021-03-14T00:00:00"] {
            let mut record = sample();
            record.joining_date = bad.into();
            assert_eq!(
                to_storage(&record, Uuid::new_v4()),
                Err(CodecError::InvalidDateFormat(bad.into())),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn test_leap_day_accepted() {
        assert!(parse_joining_date("2024-02-29").is_ok());
        assert!(parse_joining_date("2023-02-29").is_err());
    }

    #[test]
    fn test_encode_changes_revalidates_date() {
        let update = EmployeeUpdate {
            joining_date: Some("2020-1-1".into()),
            ..Default::default()
        };
        assert!(encode_changes(&update).is_err());

        let update = EmployeeUpdate {
            joining_date: Some("2020-01-01".into()),
            salary: Some(5),
            ..Default::default()
        };
        let changes = encode_changes(&update).unwrap();
        assert_eq!(changes.salary, Some(5));
        assert_eq!(decode_date(&changes.joining_date.unwrap()), "2020-01-01");
        assert!(changes.name.is_none());
    }

    #[test]
    fn test_apply_changes_touches_only_supplied_fields() {
        let mut doc = to_storage(&sample(), Uuid::new_v4()).unwrap();
        let before = doc.clone();
        let changes = DocumentChanges {
            salary: Some(1),
            ..Default::default()
        };
        changes.apply(&mut doc);

        assert_eq!(doc.salary, 1);
        assert_eq!(doc.name, before.name);
        assert_eq!(doc.joining_date, before.joining_date);
        assert_eq!(doc.skills, before.skills);
    }
}
