use std::str::FromStr;

use sqlx::{
    migrate::MigrateDatabase,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Pool, Sqlite,
};
use tracing::info;

/// Opens the SQLite pool, creating the database file if needed, and applies
/// the embedded migrations.
pub async fn connect(
    database_url: &str,
    max_connections: u32,
) -> Result<Pool<Sqlite>, sqlx::Error> {
    // Check if the database exists, if not, create it
    if !Sqlite::database_exists(database_url).await.unwrap_or(false) {
        info!(database_url, "creating database");
        Sqlite::create_database(database_url).await?;
    }

    let options = SqliteConnectOptions::from_str(database_url)?.foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("database schema is up to date");

    Ok(pool)
}

#[cfg(test)]
pub(crate) async fn insert_user(pool: &Pool<Sqlite>, id: &str) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"INSERT INTO "user" (id, name, email, created_at, updated_at) VALUES (?, ?, ?, 0, 0)"#,
    )
    .bind(id)
    .bind(id)
    .bind(format!("{id}@example.com"))
    .execute(pool)
    .await?;
    Ok(())
}

#[cfg(test)]
pub(crate) async fn insert_session(
    pool: &Pool<Sqlite>,
    user_id: &str,
    token: &str,
    expires_at_millis: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO session (id, token, user_id, expires_at, created_at, updated_at) \
         VALUES (?, ?, ?, ?, 0, 0)",
    )
    .bind(format!("session-{token}"))
    .bind(token)
    .bind(user_id)
    .bind(expires_at_millis)
    .execute(pool)
    .await?;
    Ok(())
}
