//! Database-backed bearer tokens: one opaque key per user, issued on
//! registration/login and deleted on logout.

use actix_web::HttpRequest;
use chrono::Utc;
use rand::distributions::Alphanumeric;
use rand::Rng;
use sqlx::SqlitePool;

use crate::errors::AppError;
use crate::models::user::User;

const TOKEN_LENGTH: usize = 40;

fn generate_key() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

/// Returns the user's current token, creating one if none exists.
pub async fn issue(pool: &SqlitePool, user_id: i64) -> Result<String, sqlx::Error> {
    if let Some(key) =
        sqlx::query_scalar::<_, String>("SELECT key FROM tokens WHERE user_id = ?")
            .bind(user_id)
            .fetch_optional(pool)
            .await?
    {
        return Ok(key);
    }

    let key = generate_key();
    match sqlx::query("INSERT INTO tokens (key, user_id, created) VALUES (?, ?, ?)")
        .bind(&key)
        .bind(user_id)
        .bind(Utc::now())
        .execute(pool)
        .await
    {
        Ok(_) => Ok(key),
        // Lost a race against a concurrent login for the same user; the
        // winning token is the one to hand out.
        Err(err) if crate::db::is_unique_violation(&err) => {
            sqlx::query_scalar::<_, String>("SELECT key FROM tokens WHERE user_id = ?")
                .bind(user_id)
                .fetch_one(pool)
                .await
        }
        Err(err) => Err(err),
    }
}

/// Resolves a bearer key to its user, or `None` for an unknown key.
pub async fn resolve(pool: &SqlitePool, key: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        r#"
        SELECT u.id, u.email, u.password, u.first_name, u.last_name
        FROM users u
        JOIN tokens t ON t.user_id = u.id
        WHERE t.key = ?
        "#,
    )
    .bind(key)
    .fetch_optional(pool)
    .await
}

/// Deletes the user's token. Returns whether a token existed.
pub async fn revoke(pool: &SqlitePool, user_id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM tokens WHERE user_id = ?")
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Resolves the request's `Authorization: Bearer <key>` header to a user.
/// Handlers call this first; every endpoint past registration/login
/// rejects unauthenticated callers.
pub async fn authenticate(req: &HttpRequest, pool: &SqlitePool) -> Result<User, AppError> {
    let key = req
        .headers()
        .get("Authorization")
        .and_then(|auth| auth.to_str().ok())
        .and_then(|auth| auth.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .ok_or_else(|| AppError::Unauthenticated("Login failed".to_string()))?;

    resolve(pool, key)
        .await?
        .ok_or_else(|| AppError::Unauthenticated("Login failed".to_string()))
}
