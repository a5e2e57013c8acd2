use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use crate::users::filter::UserFilter;
use crate::users::repo::{StoreError, UserStore};
use crate::users::repo_types::User;

/// In-process store with the same contract as `PgUserStore`, used by tests.
#[derive(Default)]
pub struct MemoryUserStore {
    rows: Mutex<Vec<User>>,
}

impl MemoryUserStore {
    fn rows(&self) -> std::sync::MutexGuard<'_, Vec<User>> {
        self.rows.lock().expect("user store mutex poisoned")
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn list(&self, filter: &UserFilter) -> Result<Vec<User>, StoreError> {
        let mut users: Vec<User> = self
            .rows()
            .iter()
            .filter(|u| filter.matches(u))
            .cloned()
            .collect();
        users.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(users)
    }

    async fn get(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.rows().iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        Ok(self.rows().iter().find(|u| u.username == username).cloned())
    }

    async fn insert(&self, user: &User) -> Result<User, StoreError> {
        let mut rows = self.rows();
        if rows.iter().any(|u| u.username == user.username) {
            return Err(StoreError::Duplicate(user.username.clone()));
        }
        rows.push(user.clone());
        Ok(user.clone())
    }

    async fn update(&self, user: &User) -> Result<Option<User>, StoreError> {
        let mut rows = self.rows();
        if rows
            .iter()
            .any(|u| u.id != user.id && u.username == user.username)
        {
            return Err(StoreError::Duplicate(user.username.clone()));
        }
        match rows.iter_mut().find(|u| u.id == user.id) {
            Some(row) => {
                *row = user.clone();
                Ok(Some(user.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut rows = self.rows();
        let before = rows.len();
        rows.retain(|u| u.id != id);
        Ok(rows.len() != before)
    }
}
