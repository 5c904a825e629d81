pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::config::AppConfig;
use crate::database::DatabaseManager;

#[derive(Parser)]
#[command(name = "jobly")]
#[command(about = "Jobly admin CLI - database setup and user management")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Create the jobly tables if they do not exist")]
    InitDb,

    #[command(about = "Create a user directly in the database")]
    CreateUser(commands::user::CreateUserArgs),

    #[command(about = "Mint a JWT for an existing user")]
    Token {
        #[arg(help = "Username to issue the token for")]
        username: String,
    },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    let config = AppConfig::from_env();
    config.validate()?;
    let db = DatabaseManager::connect(&config.database).await?;

    let result = match cli.command {
        Commands::InitDb => commands::db::init(&db, output_format).await,
        Commands::CreateUser(args) => commands::user::create(&db, &config, args, output_format).await,
        Commands::Token { username } => commands::token::issue(&db, &config, &username, output_format).await,
    };

    db.close().await;
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_create_user() {
        let cli = Cli::try_parse_from([
            "jobly",
            "create-user",
            "admin",
            "--password",
            "hunter22",
            "--first-name",
            "Ada",
            "--last-name",
            "Lovelace",
            "--email",
            "ada@example.com",
            "--admin",
            "--json",
        ])
        .unwrap();

        assert_eq!(OutputFormat::from_cli(&cli), OutputFormat::Json);
        match cli.command {
            Commands::CreateUser(args) => {
                assert_eq!(args.username, "admin");
                assert!(args.admin);
            }
            _ => panic!("expected create-user"),
        }
    }

    #[test]
    fn create_user_requires_password() {
        assert!(Cli::try_parse_from(["jobly", "create-user", "admin"]).is_err());
    }

    #[test]
    fn parses_token_and_init() {
        let cli = Cli::try_parse_from(["jobly", "token", "bob"]).unwrap();
        assert!(matches!(cli.command, Commands::Token { ref username } if username == "bob"));

        let cli = Cli::try_parse_from(["jobly", "init-db"]).unwrap();
        assert!(matches!(cli.command, Commands::InitDb));
        assert_eq!(OutputFormat::from_cli(&cli), OutputFormat::Text);
    }
}
