use serde::{Deserialize, Serialize};

/// Logical file record. `file_id` is the short random public identifier
/// used in URLs; `name` is the display name, unique per owner only.
#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone)]
pub struct File {
    pub id: i64,
    pub name: String,
    pub file_id: String,
    pub owner_id: i64,
}

/// One entry of a file's access report: the owner tagged `author`,
/// each grantee tagged `co-author`.
#[derive(Serialize, Debug, Clone)]
pub struct AccessEntry {
    pub fullname: String,
    pub email: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
}

impl AccessEntry {
    pub fn author(fullname: String, email: String) -> Self {
        AccessEntry { fullname, email, kind: "author" }
    }

    pub fn co_author(fullname: String, email: String) -> Self {
        AccessEntry { fullname, email, kind: "co-author" }
    }
}
