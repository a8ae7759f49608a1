//! CLI administration tool for portfolio-content.
//!
//! Generates the admin bearer token, inspects storage and removes entities
//! without going through the HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # Generate a token and print the ADMIN_TOKEN_HASH to configure
//! cargo run --bin admin -- token create
//!
//! # Hash an existing token
//! cargo run --bin admin -- token hash "my-token"
//!
//! # View entity and attachment counts
//! cargo run --bin admin -- stats
//!
//! # Check database connection
//! cargo run --bin admin -- db check
//!
//! # Delete a project with all attachments
//! cargo run --bin admin -- entity delete project 12
//! ```
//!
//! # Environment Variables
//!
//! - `TOKEN_SIGNING_SECRET`: required by `token` commands
//! - `DATABASE_URL` or `DB_*`: required by `stats`, `db` and `entity` commands

use portfolio_content::application::services::auth_service::{generate_token, hash_token};
use portfolio_content::config::{Config, mask_connection_string};
use portfolio_content::domain::entities::EntityKind;
use portfolio_content::domain::repositories::ContentRepository;
use portfolio_content::infrastructure::persistence::PgContentRepository;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use sqlx::PgPool;
use std::sync::Arc;

/// CLI tool for managing portfolio-content.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Manage the admin bearer token
    Token {
        #[command(subcommand)]
        action: TokenAction,
    },

    /// Show entity and attachment counts
    Stats,

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },

    /// Entity maintenance
    Entity {
        #[command(subcommand)]
        action: EntityAction,
    },
}

#[derive(Subcommand)]
enum TokenAction {
    /// Generate a token and print the matching ADMIN_TOKEN_HASH
    Create {
        /// Custom token value (optional, auto-generated if not provided)
        #[arg(short, long)]
        token: Option<String>,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Print the ADMIN_TOKEN_HASH for a token
    Hash {
        token: String,
    },
}

#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,
}

#[derive(Subcommand)]
enum EntityAction {
    /// Delete an entity and all of its attachments
    Delete {
        /// `project` or `blog`
        kind: EntityKind,

        id: i64,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Token { action } => handle_token_action(action),
        Commands::Stats => handle_stats(&connect().await?).await,
        Commands::Db { action } => handle_db_action(action).await,
        Commands::Entity { action } => handle_entity_action(action, &connect().await?).await,
    }
}

async fn connect() -> Result<PgPool> {
    let database_url = Config::load_database_url()?
        .context("DATABASE_URL (or DB_HOST/DB_USER/DB_PASSWORD/DB_NAME) must be set")?;

    PgPool::connect(&database_url)
        .await
        .with_context(|| format!("Failed to connect to {}", mask_connection_string(&database_url)))
}

fn signing_secret() -> Result<String> {
    let secret = std::env::var("TOKEN_SIGNING_SECRET").context("TOKEN_SIGNING_SECRET must be set")?;
    if secret.is_empty() {
        anyhow::bail!("TOKEN_SIGNING_SECRET must not be empty");
    }
    Ok(secret)
}

fn handle_token_action(action: TokenAction) -> Result<()> {
    let secret = signing_secret()?;

    match action {
        TokenAction::Create { token, yes } => create_token(&secret, token, yes),
        TokenAction::Hash { token } => {
            // Plain output so it can be captured by the shell.
            println!("{}", hash_token(&secret, &token));
            Ok(())
        }
    }
}

/// Generates (or accepts) a token and prints the hash to configure.
///
/// The raw token is shown once; only its HMAC goes into the server
/// configuration.
fn create_token(secret: &str, token: Option<String>, skip_confirm: bool) -> Result<()> {
    println!("{}", "🔑 Create admin token".bright_blue().bold());
    println!();

    let token_value = match token {
        Some(t) => {
            println!("{}", "⚠️  Using provided token value".yellow());
            t
        }
        None => {
            println!("{}", "✨ Generated new token".green());
            generate_token()
        }
    };

    println!();
    println!("  Token: {}", token_value.bright_yellow().bold());
    println!();
    println!(
        "{}",
        "⚠️  IMPORTANT: Save this token now! Only its hash is configured on the server."
            .red()
            .bold()
    );
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Use this token?")
            .default(true)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    let token_hash = hash_token(secret, &token_value);

    println!();
    println!("{}", "Add this to the server environment:".bright_white());
    println!(
        "  {}={}",
        "ADMIN_TOKEN_HASH".bright_cyan(),
        token_hash.bright_yellow()
    );
    println!();
    println!("{}", "Example request:".bright_white());
    println!(
        "  curl -X DELETE -H \"Authorization: Bearer {}\" http://localhost:3000/api/Project/1",
        token_value.bright_yellow()
    );
    println!();

    Ok(())
}

/// Displays entity and attachment counts per kind.
async fn handle_stats(pool: &PgPool) -> Result<()> {
    println!("{}", "📊 Statistics".bright_blue().bold());
    println!();

    let repo = PgContentRepository::new(Arc::new(pool.clone()));

    println!(
        "  {:<10} {:>10} {:>12} {:>14}",
        "Kind".bright_white().bold(),
        "Entities".bright_white().bold(),
        "Attachments".bright_white().bold(),
        "Bytes".bright_white().bold()
    );
    println!("  {}", "─".repeat(49).bright_black());

    for kind in [EntityKind::Project, EntityKind::Blog] {
        let entities = repo
            .count(kind)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to count {kind} entities: {e}"))?;
        let attachments = repo
            .attachment_stats(kind)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to count {kind} attachments: {e}"))?;

        println!(
            "  {:<10} {:>10} {:>12} {:>14}",
            kind.route_name().cyan(),
            entities.to_string().bright_green().bold(),
            attachments.count.to_string().bright_green(),
            attachments.total_bytes.to_string().bright_black()
        );
    }
    println!();

    Ok(())
}

async fn handle_db_action(action: DbAction) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "🔍 Checking database connection...".bright_blue());

            let pool = connect().await?;
            sqlx::query("SELECT 1").fetch_one(&pool).await?;

            let version: String = sqlx::query_scalar("SELECT version()")
                .fetch_one(&pool)
                .await?;

            println!("{}", "✅ Database connection OK".green().bold());
            println!("  PostgreSQL: {}", version.bright_white());
        }
    }

    Ok(())
}

async fn handle_entity_action(action: EntityAction, pool: &PgPool) -> Result<()> {
    let repo = PgContentRepository::new(Arc::new(pool.clone()));

    match action {
        EntityAction::Delete { kind, id, yes } => {
            println!("{}", "🗑  Delete entity".bright_blue().bold());
            println!();

            let detail = repo
                .find_by_id(kind, id)
                .await
                .map_err(|e| anyhow::anyhow!("Database error: {e}"))?
                .with_context(|| format!("{} {id} not found", kind.route_name()))?;

            println!("  Kind:        {}", kind.route_name().cyan());
            println!("  Name:        {}", detail.entity.fields.name.cyan());
            println!(
                "  Attachments: {}",
                detail.attachments.len().to_string().bright_black()
            );
            println!();

            if !yes {
                let confirmed = Confirm::new()
                    .with_prompt("Delete this entity and all of its attachments?")
                    .default(false)
                    .interact()?;

                if !confirmed {
                    println!("{}", "❌ Cancelled".red());
                    return Ok(());
                }
            }

            let deleted = repo
                .delete(kind, id)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to delete: {e}"))?;

            if deleted {
                println!("{}", "✅ Entity deleted".green().bold());
            } else {
                println!("{}", "⚠️  Entity was already gone".yellow());
            }
        }
    }

    Ok(())
}
