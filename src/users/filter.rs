//! Translation of a flat `{field: value}` request into a conjunction of
//! predicates over users.
//!
//! The same [`UserFilter`] drives the search endpoint and the export endpoint,
//! and it can be evaluated both in memory ([`UserFilter::matches`]) and as SQL
//! ([`UserFilter::push_where`]).

use std::collections::HashMap;

use sqlx::{Postgres, QueryBuilder};

use crate::users::repo_types::User;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// Case-insensitive substring match on `username`.
    ///
    /// Case folding is exact for ASCII. For other scripts the in-memory
    /// matcher folds with Unicode rules while Postgres `lower()` follows the
    /// database collation, so the two can disagree.
    UsernameContains(String),
    AgeEquals(i32),
}

impl Predicate {
    fn from_pair(key: &str, value: &str) -> Option<Self> {
        match key.to_lowercase().as_str() {
            "username" => Some(Self::UsernameContains(value.to_string())),
            "age" => value.trim().parse::<i32>().ok().map(Self::AgeEquals),
            _ => None,
        }
    }

    pub fn matches(&self, user: &User) -> bool {
        match self {
            Self::UsernameContains(needle) => user
                .username
                .to_lowercase()
                .contains(&needle.to_lowercase()),
            Self::AgeEquals(age) => user.age == *age,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserFilter {
    predicates: Vec<Predicate>,
}

impl UserFilter {
    /// Filter that keeps every user.
    pub fn all() -> Self {
        Self::default()
    }

    /// Unknown keys and unparsable ages are dropped; keys compare case-insensitively.
    pub fn build(filters: &HashMap<String, String>) -> Self {
        let mut keys: Vec<&String> = filters.keys().collect();
        keys.sort();

        let predicates = keys
            .into_iter()
            .filter_map(|key| Predicate::from_pair(key, &filters[key]))
            .collect();
        Self { predicates }
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    pub fn matches(&self, user: &User) -> bool {
        self.predicates.iter().all(|p| p.matches(user))
    }

    /// Appends ` WHERE ...` (nothing when empty) with bound parameters.
    pub fn push_where(&self, query: &mut QueryBuilder<'_, Postgres>) {
        for (i, predicate) in self.predicates.iter().enumerate() {
            query.push(if i == 0 { " WHERE " } else { " AND " });
            match predicate {
                // strpos keeps `%` and `_` in the needle literal
                Predicate::UsernameContains(needle) => {
                    query.push("strpos(lower(username), lower(");
                    query.push_bind(needle.clone());
                    query.push(")) > 0");
                }
                Predicate::AgeEquals(age) => {
                    query.push("age = ");
                    query.push_bind(*age);
                }
            }
        }
    }
}
