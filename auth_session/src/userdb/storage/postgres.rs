use sqlx::{Pool, Postgres};

use crate::storage::validate_postgres_table_schema;
use crate::userdb::{criteria::UserCriteria, errors::UserError, types::User};

use super::config::DB_TABLE_USERS;

pub(super) async fn create_tables_postgres(pool: &Pool<Postgres>) -> Result<(), UserError> {
    let table_name = DB_TABLE_USERS.as_str();

    sqlx::query(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS {table_name} (
            id TEXT PRIMARY KEY NOT NULL,
            username TEXT NOT NULL,
            password_hash TEXT NOT NULL,
            auth_token TEXT NOT NULL,
            is_admin BOOLEAN NOT NULL DEFAULT FALSE,
            created_at TIMESTAMPTZ NOT NULL,
            updated_at TIMESTAMPTZ NOT NULL
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

pub(super) async fn validate_user_tables_postgres(pool: &Pool<Postgres>) -> Result<(), UserError> {
    let expected_columns = [
        ("id", "text"),
        ("username", "text"),
        ("password_hash", "text"),
        ("auth_token", "text"),
        ("is_admin", "boolean"),
        ("created_at", "timestamp with time zone"),
        ("updated_at", "timestamp with time zone"),
    ];

    validate_postgres_table_schema(
        pool,
        DB_TABLE_USERS.as_str(),
        &expected_columns,
        UserError::Storage,
    )
    .await
}

pub(super) async fn get_all_users_postgres(pool: &Pool<Postgres>) -> Result<Vec<User>, UserError> {
    let table_name = DB_TABLE_USERS.as_str();

    Ok(sqlx::query_as::<_, User>(&format!(
        "SELECT * FROM {table_name} ORDER BY created_at ASC"
    ))
    .fetch_all(pool)
    .await?)
}

pub(super) async fn find_users_postgres(
    pool: &Pool<Postgres>,
    criteria: &UserCriteria,
) -> Result<Vec<User>, UserError> {
    let table_name = DB_TABLE_USERS.as_str();

    let (condition, value) = match criteria {
        UserCriteria::Id(id) => ("id = $1", id),
        UserCriteria::Username(name) => ("username = $1", name),
        UserCriteria::UsernameIgnoreCase(name) => ("LOWER(username) = LOWER($1)", name),
    };

    Ok(sqlx::query_as::<_, User>(&format!(
        "SELECT * FROM {table_name} WHERE {condition} LIMIT 2"
    ))
    .bind(value)
    .fetch_all(pool)
    .await?)
}

pub(super) async fn upsert_user_postgres(
    pool: &Pool<Postgres>,
    user: User,
) -> Result<User, UserError> {
    let table_name = DB_TABLE_USERS.as_str();
    let now = chrono::Utc::now();

    Ok(sqlx::query_as::<_, User>(&format!(
        r#"
        INSERT INTO {table_name} (id, username, password_hash, auth_token, is_admin, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        ON CONFLICT (id) DO UPDATE SET
            username = EXCLUDED.username,
            password_hash = EXCLUDED.password_hash,
            auth_token = EXCLUDED.auth_token,
            is_admin = EXCLUDED.is_admin,
            updated_at = EXCLUDED.updated_at
        RETURNING *
        "#
    ))
    .bind(&user.id)
    .bind(&user.username)
    .bind(&user.password_hash)
    .bind(&user.auth_token)
    .bind(user.is_admin)
    .bind(user.created_at)
    .bind(now)
    .fetch_one(pool)
    .await?)
}

pub(super) async fn delete_user_postgres(pool: &Pool<Postgres>, id: &str) -> Result<(), UserError> {
    let table_name = DB_TABLE_USERS.as_str();

    sqlx::query(&format!("DELETE FROM {table_name} WHERE id = $1"))
        .bind(id)
        .execute(pool)
        .await?;

    Ok(())
}
