use anyhow::Context;
use serde_json::json;

use crate::auth::{generate_jwt, Claims};
use crate::cli::{utils::output_success, OutputFormat};
use crate::config::AppConfig;
use crate::database::models::User;
use crate::database::DatabaseManager;

/// `jobly token <username>`
pub async fn issue(
    db: &DatabaseManager,
    config: &AppConfig,
    username: &str,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    let user = User::get(db.pool(), username).await?;
    let claims = Claims::new(&user.username, user.is_admin, config.security.jwt_expiry_hours);
    let token = generate_jwt(&claims, &config.security.jwt_secret).context("failed to sign token")?;

    match output_format {
        OutputFormat::Json => output_success(
            output_format,
            &format!("Token issued for {}", user.username),
            Some(json!({ "token": token })),
        ),
        OutputFormat::Text => {
            println!("{}", token);
            Ok(())
        }
    }
}
