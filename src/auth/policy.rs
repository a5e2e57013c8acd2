//! Per-request authorization predicates.
//!
//! A [`Principal`] is built from verified claims; endpoints ask it to satisfy a
//! [`Capability`]. Nothing is cached between requests.

use uuid::Uuid;

use crate::auth::claims::{Claims, Role};
use crate::error::AppError;

/// Identity of the caller, taken from a verified token.
#[derive(Debug, Clone)]
pub struct Principal {
    pub user_id: Uuid,
    pub username: String,
    pub role: Role,
}

impl From<Claims> for Principal {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.uid,
            username: claims.sub,
            role: claims.role,
        }
    }
}

impl Principal {
    pub fn require(&self, capability: &impl Capability) -> Result<(), AppError> {
        if capability.permits(self) {
            Ok(())
        } else {
            tracing::warn!(user_id = %self.user_id, role = ?self.role, "capability check failed");
            Err(AppError::Forbidden)
        }
    }
}

pub trait Capability {
    fn permits(&self, principal: &Principal) -> bool;
}

/// Holder of the `Admin` role.
pub struct Admin;

impl Capability for Admin {
    fn permits(&self, principal: &Principal) -> bool {
        principal.role == Role::Admin
    }
}

/// The user the target record belongs to.
pub struct Owner(pub Uuid);

impl Capability for Owner {
    fn permits(&self, principal: &Principal) -> bool {
        principal.user_id == self.0
    }
}

pub struct AnyOf<A, B>(pub A, pub B);

impl<A: Capability, B: Capability> Capability for AnyOf<A, B> {
    fn permits(&self, principal: &Principal) -> bool {
        self.0.permits(principal) || self.1.permits(principal)
    }
}
