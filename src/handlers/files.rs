use actix_multipart::Multipart;
use actix_web::{web, HttpRequest, HttpResponse};
use futures_util::TryStreamExt;
use serde::Serialize;
use serde_json::json;
use sqlx::SqlitePool;

use crate::config::AppConfig;
use crate::errors::AppError;
use crate::handlers::access::access_report;
use crate::models::file::{AccessEntry, File};
use crate::utils::naming;
use crate::utils::token;
use crate::utils::validation::{validate_extension, validate_size, MAX_FILE_SIZE};

#[derive(Serialize)]
struct FileListing {
    file_id: String,
    name: String,
    url: String,
    accesses: Vec<AccessEntry>,
}

pub async fn find_by_file_id(
    pool: &SqlitePool,
    file_id: &str,
) -> Result<Option<File>, sqlx::Error> {
    sqlx::query_as::<_, File>(
        "SELECT id, name, file_id, owner_id FROM files WHERE file_id = ?",
    )
    .bind(file_id)
    .fetch_optional(pool)
    .await
}

pub fn file_url(config: &AppConfig, file_id: &str) -> String {
    format!("{}/files/{}", config.base_url, file_id)
}

/// POST /files — multipart batch upload. Validation failures are reported
/// per file and never abort sibling files; the batch itself answers 200.
pub async fn upload(
    req: HttpRequest,
    pool: web::Data<SqlitePool>,
    config: web::Data<AppConfig>,
    mut payload: Multipart,
) -> Result<HttpResponse, actix_web::Error> {
    let user = token::authenticate(&req, &pool).await?;

    let mut reports = Vec::new();
    while let Some(mut field) = payload
        .try_next()
        .await
        .map_err(|_| AppError::Validation("Malformed multipart payload".to_string()))?
    {
        let filename = match field.content_disposition().get_filename() {
            Some(name) => name.to_owned(),
            // Non-file form fields are ignored.
            None => continue,
        };

        // Buffer at most the ceiling; past it only the true size is
        // tracked while the rest of the field is drained.
        let mut data = web::BytesMut::new();
        let mut size: usize = 0;
        while let Some(chunk) = field
            .try_next()
            .await
            .map_err(|_| AppError::Validation("Malformed multipart payload".to_string()))?
        {
            size += chunk.len();
            if data.len() + chunk.len() <= MAX_FILE_SIZE {
                data.extend_from_slice(&chunk);
            }
        }

        // The client-supplied name is never a filesystem path; only its
        // final component becomes the display name.
        let desired = match naming::sanitize_filename(&filename) {
            Some(base) => base.to_owned(),
            None => {
                reports.push(json!({
                    "success": false,
                    "message": { "name": "Invalid filename" },
                    "name": filename,
                }));
                continue;
            }
        };

        let mut failures = serde_json::Map::new();
        if !validate_extension(&desired) {
            failures.insert("extension".to_string(), json!("Extension not allowed"));
        }
        if !validate_size(size) {
            failures.insert("size".to_string(), json!("Size is too large"));
        }
        if !failures.is_empty() {
            reports.push(json!({
                "success": false,
                "message": failures,
                "name": desired,
            }));
            continue;
        }

        let file = naming::allocate(&pool, user.id, &desired).await?;
        if let Err(err) = config.storage.save(&user.email, &file.name, &data).await {
            // Undo the record so it never points at bytes that were
            // never written, then propagate the fault.
            if let Err(del_err) = sqlx::query("DELETE FROM files WHERE id = ?")
                .bind(file.id)
                .execute(&**pool)
                .await
            {
                log::error!("Failed to undo file record {}: {:?}", file.id, del_err);
            }
            return Err(err.into());
        }

        reports.push(json!({
            "success": true,
            "message": "Success",
            "name": file.name,
            "url": file_url(&config, &file.file_id),
            "file_id": file.file_id,
        }));
    }

    Ok(HttpResponse::Ok().json(reports))
}

/// GET /files — the caller's own files, each with its access report.
pub async fn list(
    req: HttpRequest,
    pool: web::Data<SqlitePool>,
    config: web::Data<AppConfig>,
) -> Result<HttpResponse, actix_web::Error> {
    let user = token::authenticate(&req, &pool).await?;

    let files = sqlx::query_as::<_, File>(
        "SELECT id, name, file_id, owner_id FROM files WHERE owner_id = ? ORDER BY id",
    )
    .bind(user.id)
    .fetch_all(&**pool)
    .await
    .map_err(AppError::from)?;

    let mut listings = Vec::with_capacity(files.len());
    for file in files {
        let accesses = access_report(&pool, &user, &file).await?;
        listings.push(FileListing {
            url: file_url(&config, &file.file_id),
            file_id: file.file_id,
            name: file.name,
            accesses,
        });
    }

    Ok(HttpResponse::Ok().json(listings))
}

/// GET /files/{file_id} — the stored bytes, for the owner or a grantee.
pub async fn retrieve(
    req: HttpRequest,
    pool: web::Data<SqlitePool>,
    config: web::Data<AppConfig>,
    path: web::Path<String>,
) -> Result<HttpResponse, actix_web::Error> {
    let user = token::authenticate(&req, &pool).await?;

    let file = find_by_file_id(&pool, &path)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::NotFound("Not found".to_string()))?;

    let is_grantee = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM file_permissions WHERE file_id = ? AND user_id = ?)",
    )
    .bind(file.id)
    .bind(user.id)
    .fetch_one(&**pool)
    .await
    .map_err(AppError::from)?;

    if file.owner_id != user.id && !is_grantee {
        return Err(AppError::Forbidden("Forbidden for you".to_string()).into());
    }

    let owner_email = if file.owner_id == user.id {
        user.email
    } else {
        sqlx::query_scalar::<_, String>("SELECT email FROM users WHERE id = ?")
            .bind(file.owner_id)
            .fetch_one(&**pool)
            .await
            .map_err(AppError::from)?
    };

    // A record without bytes is surfaced as 404 by the storage layer.
    let bytes = config.storage.load(&owner_email, &file.name).await?;

    Ok(HttpResponse::Ok()
        .content_type("application/octet-stream")
        .body(bytes))
}
