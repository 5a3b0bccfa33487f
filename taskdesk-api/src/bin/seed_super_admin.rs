//! Creates the initial super admin account
//!
//! Idempotent: exits successfully without changes when the username is
//! already taken.
//!
//! ```bash
//! SEED_SUPERADMIN_USERNAME=root SEED_SUPERADMIN_PASSWORD=changeme \
//!     cargo run -p taskdesk-api --bin seed-super-admin
//! ```
//!
//! Defaults to `superAdmin` / `12345678`; change the password right away.

use std::env;
use taskdesk_shared::{
    auth::password::{hash_password_async, validate_password_length},
    db::{
        migrations::run_migrations,
        pool::{close_pool, create_pool, DatabaseConfig},
    },
    models::{role::Role, user::CreateUser},
    store::{postgres::PgStore, StoreError, UserStore},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_USERNAME: &str = "superAdmin";
const DEFAULT_PASSWORD: &str = "12345678";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "seed_super_admin=info,taskdesk_shared=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();

    let username = env::var("SEED_SUPERADMIN_USERNAME")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_USERNAME.to_string());
    let password = env::var("SEED_SUPERADMIN_PASSWORD")
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| DEFAULT_PASSWORD.to_string());

    validate_password_length(&password).map_err(anyhow::Error::msg)?;

    let database_url = env::var("DATABASE_URL")
        .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

    let pool = create_pool(DatabaseConfig {
        url: database_url,
        max_connections: 1,
        ..Default::default()
    })
    .await?;
    run_migrations(&pool).await?;

    let store = PgStore::new(pool.clone());

    if let Some(existing) = store.user_by_username(&username).await? {
        tracing::info!(user_id = existing.id, username = %username, "Super admin already exists");
        close_pool(pool).await;
        return Ok(());
    }

    let password_hash = hash_password_async(password).await?;

    let created = store
        .insert_user(CreateUser {
            username: username.clone(),
            password_hash,
            role: Role::SuperAdmin,
        })
        .await;

    match created {
        Ok(user) => {
            tracing::info!(user_id = user.id, username = %user.username, "Created super admin");
            tracing::warn!("Change the super admin password immediately");
        }
        // Created concurrently by another seeder
        Err(StoreError::Conflict(_)) => {
            tracing::info!(username = %username, "Super admin already exists");
        }
        Err(e) => return Err(e.into()),
    }

    close_pool(pool).await;
    Ok(())
}
