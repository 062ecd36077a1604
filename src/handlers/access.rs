use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;
use sqlx::SqlitePool;
use validator::Validate;

use crate::errors::AppError;
use crate::handlers::files::find_by_file_id;
use crate::models::file::{AccessEntry, File};
use crate::models::user::User;
use crate::utils::token;
use crate::utils::validation::validate_payload;

#[derive(Deserialize, Validate)]
pub struct AccessRequest {
    #[validate(email)]
    email: String,
}

/// The file's access listing: the owner tagged `author` followed by each
/// grantee tagged `co-author`, in grant order.
pub async fn access_report(
    pool: &SqlitePool,
    owner: &User,
    file: &File,
) -> Result<Vec<AccessEntry>, AppError> {
    let grantees = sqlx::query_as::<_, User>(
        r#"
        SELECT u.id, u.email, u.password, u.first_name, u.last_name
        FROM users u
        JOIN file_permissions p ON p.user_id = u.id
        WHERE p.file_id = ?
        ORDER BY p.id
        "#,
    )
    .bind(file.id)
    .fetch_all(pool)
    .await?;

    let mut entries = vec![AccessEntry::author(owner.fullname(), owner.email.clone())];
    entries.extend(
        grantees
            .into_iter()
            .map(|u| AccessEntry::co_author(u.fullname(), u.email.clone())),
    );
    Ok(entries)
}

async fn owned_file(pool: &SqlitePool, owner: &User, file_id: &str) -> Result<File, AppError> {
    let file = find_by_file_id(pool, file_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Not found".to_string()))?;
    if file.owner_id != owner.id {
        return Err(AppError::Forbidden("Forbidden for you".to_string()));
    }
    Ok(file)
}

async fn find_user_by_email(pool: &SqlitePool, email: &str) -> Result<User, AppError> {
    sqlx::query_as::<_, User>(
        "SELECT id, email, password, first_name, last_name FROM users WHERE email = ?",
    )
    .bind(email.to_lowercase())
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Not found".to_string()))
}

/// POST /files/{file_id}/accesses — grant co-owner access by email.
/// Grants carry set semantics: a repeated grant is a no-op, and the owner
/// is never stored as their own grantee.
pub async fn grant(
    req: HttpRequest,
    pool: web::Data<SqlitePool>,
    path: web::Path<String>,
    body: web::Json<AccessRequest>,
) -> Result<HttpResponse, actix_web::Error> {
    let user = token::authenticate(&req, &pool).await?;
    validate_payload(&body.0)?;

    let file = owned_file(&pool, &user, &path).await?;
    let grantee = find_user_by_email(&pool, &body.email).await?;

    if grantee.id != user.id {
        sqlx::query("INSERT OR IGNORE INTO file_permissions (file_id, user_id) VALUES (?, ?)")
            .bind(file.id)
            .bind(grantee.id)
            .execute(&**pool)
            .await
            .map_err(AppError::from)?;
    }

    let report = access_report(&pool, &user, &file).await?;
    Ok(HttpResponse::Ok().json(report))
}

/// DELETE /files/{file_id}/accesses — revoke a grantee's access.
/// 404 when the target was never granted; the listing is left untouched.
pub async fn revoke(
    req: HttpRequest,
    pool: web::Data<SqlitePool>,
    path: web::Path<String>,
    body: web::Json<AccessRequest>,
) -> Result<HttpResponse, actix_web::Error> {
    let user = token::authenticate(&req, &pool).await?;
    validate_payload(&body.0)?;

    let file = owned_file(&pool, &user, &path).await?;
    let grantee = find_user_by_email(&pool, &body.email).await?;

    let result = sqlx::query("DELETE FROM file_permissions WHERE file_id = ? AND user_id = ?")
        .bind(file.id)
        .bind(grantee.id)
        .execute(&**pool)
        .await
        .map_err(AppError::from)?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Not found".to_string()).into());
    }

    let report = access_report(&pool, &user, &file).await?;
    Ok(HttpResponse::Ok().json(report))
}
