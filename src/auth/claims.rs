use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::users::repo_types::User;

/// Role carried in the token; serialized as `"Admin"` / `"User"`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Role {
    Admin,
    User,
}

impl Role {
    pub fn of(user: &User) -> Self {
        if user.is_admin {
            Role::Admin
        } else {
            Role::User
        }
    }
}

/// JWT payload used for authentication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,    // username
    pub uid: Uuid,      // user ID, used for ownership checks
    pub role: Role,
    pub iat: usize,     // issued at (unix timestamp)
    pub exp: usize,     // expires at (unix timestamp)
    pub iss: String,    // issuer
    pub aud: String,    // audience
}
