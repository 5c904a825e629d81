use crate::cli::{utils::output_success, OutputFormat};
use crate::database::DatabaseManager;

/// `jobly init-db`
pub async fn init(db: &DatabaseManager, output_format: OutputFormat) -> anyhow::Result<()> {
    db.ensure_schema().await?;
    output_success(output_format, "Database schema applied", None)
}
