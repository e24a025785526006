use sqlx::SqlitePool;

/// Create the `persons` table if it does not exist yet. Safe to run on
/// every open.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS persons (
            uid INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            local_address TEXT,
            permanent_address TEXT,
            national_id TEXT,
            phone TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
