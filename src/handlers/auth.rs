use actix_web::{web, HttpRequest, HttpResponse};
use argon2::{password_hash::PasswordHasher, password_hash::SaltString, Argon2, PasswordVerifier};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use validator::Validate;

use crate::db;
use crate::errors::AppError;
use crate::models::user::User;
use crate::utils::token;
use crate::utils::validation::validate_payload;

#[derive(Deserialize, Validate)]
pub struct RegistrationRequest {
    #[validate(email, length(max = 64))]
    email: String,
    #[validate(length(min = 8, max = 128))]
    password: String,
    #[validate(length(min = 1, max = 64))]
    first_name: String,
    #[validate(length(min = 1, max = 64))]
    last_name: String,
}

#[derive(Deserialize, Validate)]
pub struct AuthRequest {
    #[validate(email)]
    email: String,
    #[validate(length(min = 1))]
    password: String,
}

#[derive(Serialize)]
struct TokenResponse {
    success: bool,
    message: String,
    token: String,
}

#[derive(Serialize)]
struct LogoutResponse {
    success: bool,
    message: String,
}

fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut rand::thread_rng());
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AppError::InternalServerError("Hashing error".to_string()))
}

async fn find_user_by_email(pool: &SqlitePool, email: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "SELECT id, email, password, first_name, last_name FROM users WHERE email = ?",
    )
    .bind(email.to_lowercase())
    .fetch_optional(pool)
    .await
}

/// POST /registration — create an account and hand out a bearer token.
pub async fn register(
    req: web::Json<RegistrationRequest>,
    pool: web::Data<SqlitePool>,
) -> Result<HttpResponse, actix_web::Error> {
    validate_payload(&req.0)?;

    let email = req.0.email.to_lowercase();
    let password_hash = hash_password(&req.0.password)?;

    let user_id = match sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO users (email, password, first_name, last_name)
        VALUES (?, ?, ?, ?)
        RETURNING id
        "#,
    )
    .bind(&email)
    .bind(&password_hash)
    .bind(&req.0.first_name)
    .bind(&req.0.last_name)
    .fetch_one(&**pool)
    .await
    {
        Ok(id) => id,
        Err(err) if db::is_unique_violation(&err) => {
            return Err(AppError::Conflict("Email already exists".to_string()).into());
        }
        Err(err) => return Err(AppError::from(err).into()),
    };

    let key = token::issue(&pool, user_id).await.map_err(AppError::from)?;

    Ok(HttpResponse::Ok().json(TokenResponse {
        success: true,
        message: "Success".to_string(),
        token: key,
    }))
}

/// POST /authorization — exchange email+password for a bearer token.
pub async fn authorize(
    req: web::Json<AuthRequest>,
    pool: web::Data<SqlitePool>,
) -> Result<HttpResponse, actix_web::Error> {
    validate_payload(&req.0)?;

    let user = find_user_by_email(&pool, &req.0.email)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::Unauthenticated("Login failed".to_string()))?;

    let parsed_hash = argon2::PasswordHash::new(&user.password)
        .map_err(|_| AppError::InternalServerError("Invalid password hash".to_string()))?;
    Argon2::default()
        .verify_password(req.0.password.as_bytes(), &parsed_hash)
        .map_err(|_| AppError::Unauthenticated("Login failed".to_string()))?;

    let key = token::issue(&pool, user.id).await.map_err(AppError::from)?;

    Ok(HttpResponse::Ok().json(TokenResponse {
        success: true,
        message: "Success".to_string(),
        token: key,
    }))
}

/// POST|GET /logout — invalidate the caller's token.
pub async fn logout(
    req: HttpRequest,
    pool: web::Data<SqlitePool>,
) -> Result<HttpResponse, actix_web::Error> {
    let user = token::authenticate(&req, &pool).await?;
    token::revoke(&pool, user.id).await.map_err(AppError::from)?;

    Ok(HttpResponse::Ok().json(LogoutResponse {
        success: true,
        message: "Logout".to_string(),
    }))
}
