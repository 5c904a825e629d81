use serde::Serialize;

/// Column type as declared in the table allow-lists
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Integer,
    Float,
    Boolean,
}

impl ColumnKind {
    pub fn name(&self) -> &'static str {
        match self {
            ColumnKind::Text => "string",
            ColumnKind::Integer => "integer",
            ColumnKind::Float => "number",
            ColumnKind::Boolean => "boolean",
        }
    }
}

/// A scalar bound to a positional SQL parameter.
///
/// Nulls keep their column type (`Text(None)`, `Integer(None)`, ...) so that
/// Postgres receives a correctly typed NULL instead of an untyped text one.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SqlValue {
    Text(Option<String>),
    Integer(Option<i64>),
    Float(Option<f64>),
    Boolean(Option<bool>),
}

impl SqlValue {
    /// Typed NULL for a column kind
    pub fn null(kind: ColumnKind) -> Self {
        match kind {
            ColumnKind::Text => SqlValue::Text(None),
            ColumnKind::Integer => SqlValue::Integer(None),
            ColumnKind::Float => SqlValue::Float(None),
            ColumnKind::Boolean => SqlValue::Boolean(None),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(
            self,
            SqlValue::Text(None) | SqlValue::Integer(None) | SqlValue::Float(None) | SqlValue::Boolean(None)
        )
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            SqlValue::Text(Some(s)) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        SqlValue::Text(Some(v.to_string()))
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        SqlValue::Text(Some(v))
    }
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        SqlValue::Integer(Some(v))
    }
}

impl From<i32> for SqlValue {
    fn from(v: i32) -> Self {
        SqlValue::Integer(Some(v as i64))
    }
}

impl From<f64> for SqlValue {
    fn from(v: f64) -> Self {
        SqlValue::Float(Some(v))
    }
}

impl From<bool> for SqlValue {
    fn from(v: bool) -> Self {
        SqlValue::Boolean(Some(v))
    }
}
