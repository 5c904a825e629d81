pub mod columns;
pub mod manager;
pub mod models;
pub mod query;
pub mod sql_builder;
pub mod value;

pub use columns::{ColumnError, TableSpec, WriteMode, COMPANIES, JOBS, USERS};
pub use manager::{DatabaseError, DatabaseManager};
pub use sql_builder::{sql_for_insert, sql_for_partial_update, BuildError, ColumnMap, GeneratedQuery, WhereClauses};
pub use value::{ColumnKind, SqlValue};
