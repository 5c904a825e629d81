//! Static column allow-lists for every writable table.
//!
//! Request bodies reach the SQL builders only through
//! [`ColumnMap::from_body`], which drops nothing silently: unknown columns,
//! wrong types and missing required fields are all reported back.

use serde_json::{Map, Value};
use std::collections::BTreeMap;
use thiserror::Error;

use super::sql_builder::ColumnMap;
use super::value::{ColumnKind, SqlValue};

#[derive(Debug, Clone, Copy)]
pub struct ColumnSpec {
    pub name: &'static str,
    pub kind: ColumnKind,
    /// NOT NULL and must be supplied on create
    pub required: bool,
    pub updatable: bool,
}

impl ColumnSpec {
    const fn new(name: &'static str, kind: ColumnKind, required: bool, updatable: bool) -> Self {
        Self { name, kind, required, updatable }
    }
}

#[derive(Debug)]
pub struct TableSpec {
    pub name: &'static str,
    pub key: &'static str,
    pub columns: &'static [ColumnSpec],
}

impl TableSpec {
    pub fn column(&self, name: &str) -> Option<&ColumnSpec> {
        self.columns.iter().find(|c| c.name == name)
    }
}

pub static COMPANIES: TableSpec = TableSpec {
    name: "companies",
    key: "handle",
    columns: &[
        ColumnSpec::new("handle", ColumnKind::Text, true, true),
        ColumnSpec::new("name", ColumnKind::Text, true, true),
        ColumnSpec::new("num_employees", ColumnKind::Integer, false, true),
        ColumnSpec::new("description", ColumnKind::Text, false, true),
        ColumnSpec::new("logo_url", ColumnKind::Text, false, true),
    ],
};

// id and date_posted are assigned by the database; a job never moves between companies
pub static JOBS: TableSpec = TableSpec {
    name: "jobs",
    key: "id",
    columns: &[
        ColumnSpec::new("title", ColumnKind::Text, true, true),
        ColumnSpec::new("salary", ColumnKind::Float, true, true),
        ColumnSpec::new("equity", ColumnKind::Float, true, true),
        ColumnSpec::new("company_handle", ColumnKind::Text, true, false),
    ],
};

// is_admin is only settable from the admin CLI
pub static USERS: TableSpec = TableSpec {
    name: "users",
    key: "username",
    columns: &[
        ColumnSpec::new("username", ColumnKind::Text, true, true),
        ColumnSpec::new("password", ColumnKind::Text, true, true),
        ColumnSpec::new("first_name", ColumnKind::Text, true, true),
        ColumnSpec::new("last_name", ColumnKind::Text, true, true),
        ColumnSpec::new("email", ColumnKind::Text, true, true),
        ColumnSpec::new("photo_url", ColumnKind::Text, false, true),
    ],
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    Create,
    Update,
}

/// Every problem found in a request body, keyed by field
#[derive(Debug, Error, PartialEq)]
#[error("Invalid fields for {table}")]
pub struct ColumnError {
    pub table: &'static str,
    pub fields: BTreeMap<String, String>,
}

impl ColumnMap {
    /// Validate a JSON body against a table allow-list and coerce it into an
    /// ordered column map. Key order of the body is preserved.
    pub fn from_body(
        spec: &'static TableSpec,
        body: &Map<String, Value>,
        mode: WriteMode,
    ) -> Result<ColumnMap, ColumnError> {
        let mut fields = BTreeMap::new();
        let mut map = ColumnMap::new();

        for (key, value) in body {
            let column = match spec.column(key) {
                Some(c) if mode == WriteMode::Create || c.updatable => c,
                Some(_) => {
                    fields.insert(key.clone(), "This field cannot be updated".to_string());
                    continue;
                }
                None => {
                    fields.insert(key.clone(), "Unknown field".to_string());
                    continue;
                }
            };

            match coerce(column, value) {
                Ok(v) => map.insert(column.name, v),
                Err(msg) => {
                    fields.insert(key.clone(), msg);
                }
            }
        }

        match mode {
            WriteMode::Create => {
                for column in spec.columns.iter().filter(|c| c.required) {
                    if !body.contains_key(column.name) {
                        fields.insert(column.name.to_string(), "This field is required".to_string());
                    }
                }
            }
            WriteMode::Update => {
                if body.is_empty() {
                    fields.insert("body".to_string(), "At least one field must be updated".to_string());
                }
            }
        }

        if fields.is_empty() {
            Ok(map)
        } else {
            Err(ColumnError { table: spec.name, fields })
        }
    }
}

fn coerce(column: &ColumnSpec, value: &Value) -> Result<SqlValue, String> {
    let mismatch = || format!("Expected {}", column.kind.name());

    match (column.kind, value) {
        (_, Value::Null) if column.required => Err("This field cannot be null".to_string()),
        (kind, Value::Null) => Ok(SqlValue::null(kind)),
        (ColumnKind::Text, Value::String(s)) => Ok(SqlValue::from(s.as_str())),
        (ColumnKind::Boolean, Value::Bool(b)) => Ok(SqlValue::from(*b)),
        // Integer columns are Postgres INTEGER, so values must fit in an i32
        (ColumnKind::Integer, Value::Number(n)) => {
            let whole = match n.as_i64() {
                Some(i) => i32::try_from(i).ok(),
                None => n
                    .as_f64()
                    .filter(|f| f.fract() == 0.0 && *f >= i32::MIN as f64 && *f <= i32::MAX as f64)
                    .map(|f| f as i32),
            };
            whole.map(SqlValue::from).ok_or_else(mismatch)
        }
        (ColumnKind::Float, Value::Number(n)) => n.as_f64().map(SqlValue::from).ok_or_else(mismatch),
        _ => Err(mismatch()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body(v: Value) -> Map<String, Value> {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn create_keeps_body_order() {
        let map = ColumnMap::from_body(
            &COMPANIES,
            &body(json!({ "name": "The Sample Company", "handle": "sample" })),
            WriteMode::Create,
        )
        .unwrap();
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["name", "handle"]);
    }

    #[test]
    fn create_reports_missing_required_fields() {
        let err = ColumnMap::from_body(&JOBS, &body(json!({ "title": "Barista" })), WriteMode::Create)
            .unwrap_err();
        assert_eq!(err.table, "jobs");
        assert!(err.fields.contains_key("salary"));
        assert!(err.fields.contains_key("equity"));
        assert!(err.fields.contains_key("company_handle"));
        assert!(!err.fields.contains_key("title"));
    }

    #[test]
    fn unknown_columns_are_rejected() {
        let err = ColumnMap::from_body(
            &USERS,
            &body(json!({ "first_name": "Jane", "is_admin": true, "1=1; --": "x" })),
            WriteMode::Update,
        )
        .unwrap_err();
        assert_eq!(err.fields.get("is_admin").map(String::as_str), Some("Unknown field"));
        assert!(err.fields.contains_key("1=1; --"));
    }

    #[test]
    fn integers_widen_to_float_columns() {
        let map = ColumnMap::from_body(
            &JOBS,
            &body(json!({ "title": "QA Tester", "salary": 80000 })),
            WriteMode::Update,
        )
        .unwrap();
        assert_eq!(map.get("salary"), Some(&SqlValue::from(80000.0)));
    }

    #[test]
    fn integer_columns_accept_whole_floats_only() {
        let ok = ColumnMap::from_body(&COMPANIES, &body(json!({ "num_employees": 888.0 })), WriteMode::Update)
            .unwrap();
        assert_eq!(ok.get("num_employees"), Some(&SqlValue::from(888)));

        let err = ColumnMap::from_body(&COMPANIES, &body(json!({ "num_employees": 8.5 })), WriteMode::Update)
            .unwrap_err();
        assert_eq!(err.fields.get("num_employees").map(String::as_str), Some("Expected integer"));
    }

    #[test]
    fn integer_columns_reject_values_outside_i32() {
        let err = ColumnMap::from_body(
            &COMPANIES,
            &body(json!({ "num_employees": 3000000000u64, "logo_url": null })),
            WriteMode::Update,
        )
        .unwrap_err();
        assert_eq!(err.fields.get("num_employees").map(String::as_str), Some("Expected integer"));

        let err = ColumnMap::from_body(&COMPANIES, &body(json!({ "num_employees": -3.0e9 })), WriteMode::Update)
            .unwrap_err();
        assert_eq!(err.fields.get("num_employees").map(String::as_str), Some("Expected integer"));

        let ok = ColumnMap::from_body(&COMPANIES, &body(json!({ "num_employees": i32::MAX })), WriteMode::Update)
            .unwrap();
        assert_eq!(ok.get("num_employees"), Some(&SqlValue::from(i32::MAX)));
    }

    #[test]
    fn nullable_columns_bind_typed_nulls() {
        let map = ColumnMap::from_body(
            &COMPANIES,
            &body(json!({ "num_employees": null, "logo_url": null })),
            WriteMode::Update,
        )
        .unwrap();
        assert_eq!(map.get("num_employees"), Some(&SqlValue::Integer(None)));
        assert_eq!(map.get("logo_url"), Some(&SqlValue::Text(None)));
    }

    #[test]
    fn required_columns_reject_null() {
        let err = ColumnMap::from_body(&COMPANIES, &body(json!({ "name": null })), WriteMode::Update)
            .unwrap_err();
        assert!(err.fields.contains_key("name"));
    }

    #[test]
    fn empty_update_is_rejected() {
        let err = ColumnMap::from_body(&COMPANIES, &Map::new(), WriteMode::Update).unwrap_err();
        assert!(err.fields.contains_key("body"));
    }

    #[test]
    fn fixed_columns_cannot_be_updated() {
        let err = ColumnMap::from_body(&JOBS, &body(json!({ "company_handle": "example" })), WriteMode::Update)
            .unwrap_err();
        assert_eq!(
            err.fields.get("company_handle").map(String::as_str),
            Some("This field cannot be updated")
        );
    }

    #[test]
    fn wrong_types_are_reported() {
        let err = ColumnMap::from_body(
            &JOBS,
            &body(json!({ "title": 5, "salary": "lots" })),
            WriteMode::Update,
        )
        .unwrap_err();
        assert_eq!(err.fields.get("title").map(String::as_str), Some("Expected string"));
        assert_eq!(err.fields.get("salary").map(String::as_str), Some("Expected number"));
    }
}
