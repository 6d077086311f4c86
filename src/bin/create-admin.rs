//! Create a console account, optionally with the operator claim.
//!
//! Usage:
//!   DATABASE_URL=... create-admin --email admin@example.com --password secret --operator

use anyhow::{Context, Result};
use clap::Parser;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "create-admin", about = "Create a jinro admin console account")]
struct Args {
    /// Account email
    #[arg(short, long)]
    email: String,

    /// Account password (bcrypt-hashed before storage)
    #[arg(short, long)]
    password: String,

    /// Grant the operator claim immediately
    #[arg(long)]
    operator: bool,
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

    let password_hash = bcrypt::hash(&args.password, bcrypt::DEFAULT_COST)
        .context("Failed to hash password")?;

    let id: Uuid = sqlx::query_scalar(
        "INSERT INTO admin_users (email, password_hash, is_operator)
         VALUES ($1, $2, $3)
         RETURNING id",
    )
    .bind(&args.email)
    .bind(&password_hash)
    .bind(args.operator)
    .fetch_one(&pool)
    .await
    .context("Failed to create admin user (email already taken?)")?;

    println!("Successfully created admin user:");
    println!("  id:       {id}");
    println!("  email:    {}", args.email);
    println!("  operator: {}", args.operator);

    Ok(())
}
