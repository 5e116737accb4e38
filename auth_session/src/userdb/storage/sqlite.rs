use sqlx::{Pool, Sqlite};

use crate::storage::validate_sqlite_table_schema;
use crate::userdb::{criteria::UserCriteria, errors::UserError, types::User};

use super::config::DB_TABLE_USERS;

pub(super) async fn create_tables_sqlite(pool: &Pool<Sqlite>) -> Result<(), UserError> {
    let table_name = DB_TABLE_USERS.as_str();

    // Usernames are not UNIQUE; lookups report duplicates
    sqlx::query(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS {table_name} (
            id TEXT PRIMARY KEY NOT NULL,
            username TEXT NOT NULL,
            password_hash TEXT NOT NULL,
            auth_token TEXT NOT NULL,
            is_admin BOOLEAN NOT NULL DEFAULT false,
            created_at TIMESTAMP NOT NULL,
            updated_at TIMESTAMP NOT NULL
        )
        "#
    ))
    .execute(pool)
    .await?;

    sqlx::query(&format!(
        "CREATE INDEX IF NOT EXISTS idx_{table_name}_username ON {table_name} (username)"
    ))
    .execute(pool)
    .await?;

    Ok(())
}

pub(super) async fn validate_user_tables_sqlite(pool: &Pool<Sqlite>) -> Result<(), UserError> {
    let expected_columns = [
        ("id", "TEXT"),
        ("username", "TEXT"),
        ("password_hash", "TEXT"),
        ("auth_token", "TEXT"),
        ("is_admin", "BOOLEAN"),
        ("created_at", "TIMESTAMP"),
        ("updated_at", "TIMESTAMP"),
    ];

    validate_sqlite_table_schema(
        pool,
        DB_TABLE_USERS.as_str(),
        &expected_columns,
        UserError::Storage,
    )
    .await
}

pub(super) async fn get_all_users_sqlite(pool: &Pool<Sqlite>) -> Result<Vec<User>, UserError> {
    let table_name = DB_TABLE_USERS.as_str();

    Ok(sqlx::query_as::<_, User>(&format!(
        "SELECT * FROM {table_name} ORDER BY created_at ASC"
    ))
    .fetch_all(pool)
    .await?)
}

/// Up to two matches, enough for the caller to detect ambiguity
pub(super) async fn find_users_sqlite(
    pool: &Pool<Sqlite>,
    criteria: &UserCriteria,
) -> Result<Vec<User>, UserError> {
    let table_name = DB_TABLE_USERS.as_str();

    let (condition, value) = match criteria {
        UserCriteria::Id(id) => ("id = ?", id),
        UserCriteria::Username(name) => ("username = ?", name),
        UserCriteria::UsernameIgnoreCase(name) => ("username = ? COLLATE NOCASE", name),
    };

    Ok(sqlx::query_as::<_, User>(&format!(
        "SELECT * FROM {table_name} WHERE {condition} LIMIT 2"
    ))
    .bind(value)
    .fetch_all(pool)
    .await?)
}

pub(super) async fn upsert_user_sqlite(pool: &Pool<Sqlite>, user: User) -> Result<User, UserError> {
    let table_name = DB_TABLE_USERS.as_str();
    let now = chrono::Utc::now();

    sqlx::query(&format!(
        r#"
        INSERT INTO {table_name} (id, username, password_hash, auth_token, is_admin, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT (id) DO UPDATE SET
            username = excluded.username,
            password_hash = excluded.password_hash,
            auth_token = excluded.auth_token,
            is_admin = excluded.is_admin,
            updated_at = excluded.updated_at
        "#
    ))
    .bind(&user.id)
    .bind(&user.username)
    .bind(&user.password_hash)
    .bind(&user.auth_token)
    .bind(user.is_admin)
    .bind(user.created_at)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(sqlx::query_as::<_, User>(&format!("SELECT * FROM {table_name} WHERE id = ?"))
        .bind(&user.id)
        .fetch_one(pool)
        .await?)
}

pub(super) async fn delete_user_sqlite(pool: &Pool<Sqlite>, id: &str) -> Result<(), UserError> {
    let table_name = DB_TABLE_USERS.as_str();

    sqlx::query(&format!("DELETE FROM {table_name} WHERE id = ?"))
        .bind(id)
        .execute(pool)
        .await?;

    Ok(())
}
