use anyhow::Context;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::auth::password::hash_password;
use crate::config::BootstrapAdmin;
use crate::error::AppError;
use crate::users::repo::UserStore;
use crate::users::repo_types::{User, UserDraft};

/// Inserts a new user under a freshly generated id.
#[instrument(skip(store, draft), fields(username = %draft.username))]
pub async fn create_user(store: &dyn UserStore, draft: UserDraft) -> Result<User, AppError> {
    let user = User {
        id: Uuid::new_v4(),
        password_hash: hash_password(&draft.password)?,
        username: draft.username,
        is_admin: draft.is_admin,
        age: draft.age,
        hobbies: draft.hobbies,
    };
    let created = store.insert(&user).await?;
    info!(user_id = %created.id, "user created");
    Ok(created)
}

/// Overwrites every field of `existing` except its id.
#[instrument(skip(store, existing, draft), fields(user_id = %existing.id))]
pub async fn update_user(
    store: &dyn UserStore,
    existing: User,
    draft: UserDraft,
) -> Result<User, AppError> {
    let user = User {
        id: existing.id,
        password_hash: hash_password(&draft.password)?,
        username: draft.username,
        is_admin: draft.is_admin,
        age: draft.age,
        hobbies: draft.hobbies,
    };
    let updated = store
        .update(&user)
        .await?
        .ok_or_else(|| AppError::not_found(format!("User with ID {} not found", existing.id)))?;
    info!("user updated");
    Ok(updated)
}

/// Creates the configured admin unless a user with that name already exists.
pub async fn ensure_bootstrap_admin(
    store: &dyn UserStore,
    admin: &BootstrapAdmin,
) -> anyhow::Result<()> {
    let existing = store
        .find_by_username(&admin.username)
        .await
        .context("look up bootstrap admin")?;
    if existing.is_some() {
        info!(username = %admin.username, "bootstrap admin already present");
        return Ok(());
    }

    let draft = UserDraft {
        username: admin.username.clone(),
        password: admin.password.clone(),
        is_admin: true,
        age: 0,
        hobbies: Vec::new(),
    };
    create_user(store, draft)
        .await
        .context("create bootstrap admin")?;
    Ok(())
}
