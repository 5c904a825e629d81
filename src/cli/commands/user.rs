use clap::Args;
use serde_json::json;

use crate::cli::{utils::output_success, OutputFormat};
use crate::config::AppConfig;
use crate::database::models::User;
use crate::database::{ColumnMap, DatabaseManager};

#[derive(Args, Debug)]
pub struct CreateUserArgs {
    pub username: String,

    #[arg(long)]
    pub password: String,

    #[arg(long)]
    pub first_name: String,

    #[arg(long)]
    pub last_name: String,

    #[arg(long)]
    pub email: String,

    #[arg(long, help = "Grant admin rights")]
    pub admin: bool,
}

impl CreateUserArgs {
    // The only path that may set is_admin
    fn column_map(&self) -> ColumnMap {
        ColumnMap::new()
            .with("username", self.username.as_str())
            .with("password", self.password.as_str())
            .with("first_name", self.first_name.as_str())
            .with("last_name", self.last_name.as_str())
            .with("email", self.email.as_str())
            .with("is_admin", self.admin)
    }
}

/// `jobly create-user`
pub async fn create(
    db: &DatabaseManager,
    config: &AppConfig,
    args: CreateUserArgs,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    let user = User::create(db.pool(), &args.column_map(), config.security.bcrypt_cost).await?;

    output_success(
        output_format,
        &format!("Created user {}", user.username),
        Some(json!({ "user": user })),
    )
}
