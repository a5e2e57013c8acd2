use std::sync::OnceLock;

use tracing::{debug, instrument};

use crate::auth::password::{hash_password, verify_password};
use crate::users::repo::UserStore;
use crate::users::repo_types::User;

/// Returns the user only when `username` matches exactly and `password`
/// verifies against the stored hash.
#[instrument(skip(store, password))]
pub async fn authenticate(
    store: &dyn UserStore,
    username: &str,
    password: &str,
) -> anyhow::Result<Option<User>> {
    let Some(user) = store.find_by_username(username).await? else {
        debug!("unknown username");
        // spend the same argon2 work as a real mismatch
        if let Some(hash) = dummy_hash() {
            let _ = verify_password(password, hash);
        }
        return Ok(None);
    };

    if verify_password(password, &user.password_hash)? {
        Ok(Some(user))
    } else {
        debug!(user_id = %user.id, "password mismatch");
        Ok(None)
    }
}

/// Hash of a throwaway secret, computed once with the live argon2 parameters.
fn dummy_hash() -> Option<&'static str> {
    static DUMMY: OnceLock<Option<String>> = OnceLock::new();
    DUMMY
        .get_or_init(|| hash_password("userdir-timing-equalizer").ok())
        .as_deref()
}
