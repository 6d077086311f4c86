//! Grant (or revoke) the operator claim on an existing console account.
//!
//! Usage:
//!   DATABASE_URL=... set-admin-claim --email admin@example.com
//!   DATABASE_URL=... set-admin-claim --email admin@example.com --revoke

use anyhow::{Context, Result};
use clap::Parser;
use sqlx::postgres::PgPoolOptions;

#[derive(Parser)]
#[command(name = "set-admin-claim", about = "Toggle the operator claim on a console account")]
struct Args {
    /// Account email
    #[arg(short, long)]
    email: String,

    /// Revoke the claim instead of granting it
    #[arg(long)]
    revoke: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let args = Args::parse();
    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL required")?;

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .context("Failed to connect to database")?;

    let grant = !args.revoke;
    let result = sqlx::query(
        "UPDATE admin_users SET is_operator = $2, updated_at = now() WHERE email = $1",
    )
    .bind(&args.email)
    .bind(grant)
    .execute(&pool)
    .await
    .context("Failed to update admin user")?;

    if result.rows_affected() == 0 {
        anyhow::bail!("No account with email {}", args.email);
    }

    println!(
        "Successfully {} operator claim for {}",
        if grant { "granted" } else { "revoked" },
        args.email
    );

    Ok(())
}
