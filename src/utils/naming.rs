//! Collision-free display names and public file-ids.

use rand::distributions::Alphanumeric;
use rand::Rng;
use sqlx::SqlitePool;

use crate::db;
use crate::errors::AppError;
use crate::models::file::File;

pub const FILE_ID_LENGTH: usize = 10;

/// Reduces a client-supplied filename to its final path component.
/// Browsers on some platforms send full client paths, and a name with
/// separators would otherwise escape the owner's directory. Returns
/// `None` when no usable component remains.
pub fn sanitize_filename(name: &str) -> Option<&str> {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name).trim();
    if base.is_empty() || base == "." || base == ".." {
        None
    } else {
        Some(base)
    }
}

/// Splits a filename into stem and extension at the last dot; the dot
/// stays with the extension. A dot at position zero does not start an
/// extension, so `.profile` is all stem.
pub fn split_filename(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(idx) if idx > 0 => name.split_at(idx),
        _ => (name, ""),
    }
}

/// Draws a 10-character id uniform over A-Z, a-z, 0-9. Uniqueness is the
/// caller's concern; `allocate` retries on collision.
pub fn generate_file_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(FILE_ID_LENGTH)
        .map(char::from)
        .collect()
}

/// Returns `desired` if the owner has no file of that name, otherwise
/// probes `stem (1)ext`, `stem (2)ext`, ... until an unused name is found.
/// Comparison is exact and case-sensitive. Probing is unbounded: it
/// terminates because the owner holds finitely many names.
pub async fn correct_filename(
    pool: &SqlitePool,
    owner_id: i64,
    desired: &str,
) -> Result<String, sqlx::Error> {
    let (stem, ext) = split_filename(desired);
    let mut candidate = desired.to_string();
    let mut i = 1u64;
    loop {
        let taken = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM files WHERE owner_id = ? AND name = ?)",
        )
        .bind(owner_id)
        .bind(&candidate)
        .fetch_one(pool)
        .await?;

        if !taken {
            return Ok(candidate);
        }
        candidate = format!("{} ({}){}", stem, i, ext);
        i += 1;
    }
}

/// Corrects the display name, generates a file-id and inserts the record.
/// Uniqueness of both the file-id and the (owner, name) pair is enforced
/// by database constraints; a violation from a concurrent upload restarts
/// the whole step, so two racing requests never both keep the same id or
/// corrected name.
pub async fn allocate(
    pool: &SqlitePool,
    owner_id: i64,
    desired: &str,
) -> Result<File, AppError> {
    loop {
        let name = correct_filename(pool, owner_id, desired).await?;
        let file_id = generate_file_id();

        match sqlx::query_as::<_, File>(
            r#"
            INSERT INTO files (name, file_id, owner_id)
            VALUES (?, ?, ?)
            RETURNING id, name, file_id, owner_id
            "#,
        )
        .bind(&name)
        .bind(&file_id)
        .bind(owner_id)
        .fetch_one(pool)
        .await
        {
            Ok(file) => return Ok(file),
            Err(err) if db::is_unique_violation(&err) => continue,
            Err(err) => return Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_strips_directory_components() {
        assert_eq!(sanitize_filename("report.pdf"), Some("report.pdf"));
        assert_eq!(sanitize_filename("../../escaped.pdf"), Some("escaped.pdf"));
        assert_eq!(sanitize_filename("..\\..\\win.png"), Some("win.png"));
        assert_eq!(sanitize_filename("/etc/passwd"), Some("passwd"));
        assert_eq!(
            sanitize_filename("../bob@example.com/report.pdf"),
            Some("report.pdf")
        );
    }

    #[test]
    fn sanitize_rejects_names_with_no_component() {
        assert_eq!(sanitize_filename(""), None);
        assert_eq!(sanitize_filename("dir/"), None);
        assert_eq!(sanitize_filename("."), None);
        assert_eq!(sanitize_filename(".."), None);
    }

    #[test]
    fn split_keeps_dot_with_extension() {
        assert_eq!(split_filename("report.pdf"), ("report", ".pdf"));
        assert_eq!(split_filename("archive.tar.gz"), ("archive.tar", ".gz"));
    }

    #[test]
    fn split_without_extension() {
        assert_eq!(split_filename("README"), ("README", ""));
        assert_eq!(split_filename(".profile"), (".profile", ""));
    }

    #[test]
    fn file_id_is_ten_alphanumerics() {
        for _ in 0..100 {
            let id = generate_file_id();
            assert_eq!(id.len(), FILE_ID_LENGTH);
            assert!(id.chars().all(|c| c.is_ascii_alphanumeric()));
        }
    }
}
