//! Parameterized SQL for INSERT and partial UPDATE statements.
//!
//! Both builders are pure: an ordered [`ColumnMap`] goes in, a
//! [`GeneratedQuery`] comes out. Placeholder `$N` always binds to
//! `params[N - 1]`, and columns appear in the order they were inserted into
//! the map.
//!
//! Identifiers are written into the statement verbatim. Callers must only
//! pass table and column names from the static allow-lists in
//! [`crate::database::columns`], never raw request keys.

use thiserror::Error;

use super::value::SqlValue;

#[derive(Debug, Error, PartialEq)]
pub enum BuildError {
    #[error("No columns supplied for table '{table}'")]
    EmptyColumnMap { table: String },
}

/// Ordered column -> value mapping
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnMap {
    entries: Vec<(String, SqlValue)>,
}

impl ColumnMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a column. Replacing keeps the original position.
    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<SqlValue>) {
        let column = column.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(name, _)| *name == column) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((column, value)),
        }
    }

    pub fn with(mut self, column: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        self.insert(column, value);
        self
    }

    pub fn get(&self, column: &str) -> Option<&SqlValue> {
        self.entries.iter().find(|(name, _)| name == column).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &SqlValue> {
        self.entries.iter().map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SqlValue)> {
        self.entries.iter().map(|(name, v)| (name.as_str(), v))
    }
}

impl<K: Into<String>, V: Into<SqlValue>> FromIterator<(K, V)> for ColumnMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = ColumnMap::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

/// Statement text plus its positional parameters
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedQuery {
    pub query: String,
    pub params: Vec<SqlValue>,
}

fn placeholders(count: usize) -> String {
    (1..=count).map(|i| format!("${}", i)).collect::<Vec<_>>().join(", ")
}

/// `INSERT INTO {table} (c1, c2) VALUES ($1, $2) RETURNING *`
pub fn sql_for_insert(table: &str, items: &ColumnMap) -> Result<GeneratedQuery, BuildError> {
    if items.is_empty() {
        return Err(BuildError::EmptyColumnMap { table: table.to_string() });
    }

    let columns = items.keys().collect::<Vec<_>>().join(", ");
    let query = format!(
        "INSERT INTO {} ({}) VALUES ({}) RETURNING *",
        table,
        columns,
        placeholders(items.len())
    );

    Ok(GeneratedQuery {
        query,
        params: items.values().cloned().collect(),
    })
}

/// `UPDATE {table} SET c1=$1, c2=$2 WHERE {key_column}=$3 RETURNING *`
///
/// The key value is always the last parameter.
pub fn sql_for_partial_update(
    table: &str,
    items: &ColumnMap,
    key_column: &str,
    key_value: impl Into<SqlValue>,
) -> Result<GeneratedQuery, BuildError> {
    if items.is_empty() {
        return Err(BuildError::EmptyColumnMap { table: table.to_string() });
    }

    let set_clauses: Vec<String> = items
        .keys()
        .enumerate()
        .map(|(i, column)| format!("{}=${}", column, i + 1))
        .collect();

    let query = format!(
        "UPDATE {} SET {} WHERE {}=${} RETURNING *",
        table,
        set_clauses.join(", "),
        key_column,
        items.len() + 1
    );

    let mut params: Vec<SqlValue> = items.values().cloned().collect();
    params.push(key_value.into());

    Ok(GeneratedQuery { query, params })
}

/// Accumulates `AND`-joined conditions with sequential placeholders.
///
/// Each template ends right before its placeholder, e.g. `"salary >= "`.
#[derive(Debug, Default)]
pub struct WhereClauses {
    conditions: Vec<String>,
    params: Vec<SqlValue>,
}

impl WhereClauses {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, template: &str, value: impl Into<SqlValue>) -> &mut Self {
        self.params.push(value.into());
        self.conditions.push(format!("{}${}", template, self.params.len()));
        self
    }

    pub fn push_opt<T: Into<SqlValue>>(&mut self, template: &str, value: Option<T>) -> &mut Self {
        if let Some(v) = value {
            self.push(template, v);
        }
        self
    }

    /// Append the WHERE clause (if any) to a base SELECT
    pub fn finish(self, base: &str) -> GeneratedQuery {
        let query = if self.conditions.is_empty() {
            base.to_string()
        } else {
            format!("{} WHERE {}", base, self.conditions.join(" AND "))
        };
        GeneratedQuery { query, params: self.params }
    }
}
