use std::env;
use std::io;

use crate::storage::FileStorage;

/// Shared application state handed to the handlers.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub storage: FileStorage,
    /// Base used when building public file URLs, no trailing slash.
    pub base_url: String,
}

impl AppConfig {
    pub fn from_env() -> io::Result<Self> {
        let media_root = env::var("MEDIA_ROOT").unwrap_or_else(|_| "media".to_string());
        let base_url = env::var("PUBLIC_BASE_URL")
            .unwrap_or_else(|_| "http://127.0.0.1:8080".to_string());
        Ok(AppConfig {
            storage: FileStorage::new(media_root)?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}
