use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::debug;
use uuid::Uuid;

use crate::users::filter::UserFilter;
use crate::users::repo_types::User;

const SELECT_USERS: &str = "SELECT id, username, password_hash, is_admin, age, hobbies FROM users";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("username {0:?} is already taken")]
    Duplicate(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Persistence seam for user records.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Users matching `filter`, ordered by username.
    async fn list(&self, filter: &UserFilter) -> Result<Vec<User>, StoreError>;
    async fn get(&self, id: Uuid) -> Result<Option<User>, StoreError>;
    /// Exact, case-sensitive lookup.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;
    async fn insert(&self, user: &User) -> Result<User, StoreError>;
    /// Overwrites every column but `id`. `None` when no row has that id.
    async fn update(&self, user: &User) -> Result<Option<User>, StoreError>;
    /// `false` when no row has that id.
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;
}

#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_unique_violation(err: sqlx::Error, username: &str) -> StoreError {
    if let Some(db_err) = err.as_database_error() {
        if db_err.code().as_deref() == Some("23505") {
            return StoreError::Duplicate(username.to_string());
        }
    }
    StoreError::Database(err)
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn list(&self, filter: &UserFilter) -> Result<Vec<User>, StoreError> {
        let mut query = QueryBuilder::<Postgres>::new(SELECT_USERS);
        filter.push_where(&mut query);
        query.push(" ORDER BY username");
        debug!(sql = query.sql(), "listing users");

        let users = query.build_query_as::<User>().fetch_all(&self.pool).await?;
        Ok(users)
    }

    async fn get(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password_hash, is_admin, age, hobbies
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password_hash, is_admin, age, hobbies
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn insert(&self, user: &User) -> Result<User, StoreError> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, username, password_hash, is_admin, age, hobbies)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, username, password_hash, is_admin, age, hobbies
            "#,
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.is_admin)
        .bind(user.age)
        .bind(&user.hobbies)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, &user.username))
    }

    async fn update(&self, user: &User) -> Result<Option<User>, StoreError> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users
               SET username = $2, password_hash = $3, is_admin = $4, age = $5, hobbies = $6
             WHERE id = $1
            RETURNING id, username, password_hash, is_admin, age, hobbies
            "#,
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.is_admin)
        .bind(user.age)
        .bind(&user.hobbies)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, &user.username))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
