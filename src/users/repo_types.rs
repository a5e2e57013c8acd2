use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// User record in the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,                // assigned on insert, never changes
    pub username: String,        // login name, unique
    #[serde(skip_serializing)]
    pub password_hash: String,   // Argon2 PHC string, not exposed in JSON
    pub is_admin: bool,
    pub age: i32,
    pub hobbies: Vec<String>,
}

/// Validated field set for a create or a full overwrite.
#[derive(Debug, Clone)]
pub struct UserDraft {
    pub username: String,
    pub password: String,
    pub is_admin: bool,
    pub age: i32,
    pub hobbies: Vec<String>,
}
