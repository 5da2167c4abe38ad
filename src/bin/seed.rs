use pedidos_api::{
    config::AppConfig,
    db::{create_pool, run_migrations},
    services::auth_service::hash_password,
};
use uuid::Uuid;

/// Ensures an administrator account exists. Reads ADMIN_EMAIL and
/// ADMIN_PASSWORD, falling back to the defaults the dashboard ships with.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    run_migrations(&pool).await?;

    let admin_email =
        std::env::var("ADMIN_EMAIL").unwrap_or_else(|_| "admin@admin.com".to_string());
    let admin_password =
        std::env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "Admin@123".to_string());

    let existing: Option<(Uuid,)> =
        sqlx::query_as("SELECT id FROM users WHERE role = 'admin' LIMIT 1")
            .fetch_optional(&pool)
            .await?;

    if let Some((id,)) = existing {
        println!("Admin user already present ({id}); nothing to do");
        return Ok(());
    }

    let senha_hash = hash_password(&admin_password)?;

    let (id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO users (id, nome, email, senha_hash, role)
        VALUES ($1, $2, $3, $4, 'admin')
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind("Administrador")
    .bind(&admin_email)
    .bind(&senha_hash)
    .fetch_one(&pool)
    .await?;

    println!("Seeded admin {admin_email} ({id})");
    Ok(())
}
