use std::collections::HashMap;

use serde::Deserialize;

use crate::error::AppError;
use crate::users::repo_types::UserDraft;

/// Body of `POST /users` and `PUT /users/{id}`. Any `id` sent by the caller is ignored.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPayload {
    pub username: Option<String>,
    pub password: Option<String>,
    #[serde(default)]
    pub is_admin: bool,
    pub age: Option<i32>,
    pub hobbies: Option<Vec<String>>,
}

impl UserPayload {
    pub fn validate(self) -> Result<UserDraft, AppError> {
        let username = self
            .username
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty())
            .ok_or_else(|| AppError::validation("Username is required"))?;
        let password = self
            .password
            .filter(|p| !p.is_empty())
            .ok_or_else(|| AppError::validation("Password is required"))?;
        let age = self
            .age
            .ok_or_else(|| AppError::validation("Age is required"))?;
        let hobbies = self
            .hobbies
            .ok_or_else(|| AppError::validation("Hobbies are required"))?;

        Ok(UserDraft {
            username,
            password,
            is_admin: self.is_admin,
            age,
            hobbies,
        })
    }
}

/// Field name to value, e.g. `{"username": "rahul", "age": "30"}`.
pub type SearchRequest = HashMap<String, String>;

#[derive(Debug, Deserialize)]
pub struct ExportRequest {
    #[serde(default)]
    pub filters: HashMap<String, String>,
    pub format: Option<String>,
}
