use async_trait::async_trait;

use crate::storage::DataStore;
use crate::userdb::{
    criteria::UserCriteria,
    errors::UserError,
    traits::UserRepository,
    types::{User, UserId},
};

use super::postgres::*;
use super::sqlite::*;

/// SQL-backed user records
pub struct UserStore {
    store: Box<dyn DataStore>,
}

impl UserStore {
    pub fn new(store: Box<dyn DataStore>) -> Self {
        Self { store }
    }

    /// Create the users table if needed and check its schema
    pub async fn init(&self) -> Result<(), UserError> {
        match (self.store.as_sqlite(), self.store.as_postgres()) {
            (Some(pool), _) => {
                create_tables_sqlite(pool).await?;
                validate_user_tables_sqlite(pool).await
            }
            (_, Some(pool)) => {
                create_tables_postgres(pool).await?;
                validate_user_tables_postgres(pool).await
            }
            _ => Err(UserError::Storage("Unsupported database type".to_string())),
        }
    }

    pub async fn get_all_users(&self) -> Result<Vec<User>, UserError> {
        if let Some(pool) = self.store.as_sqlite() {
            get_all_users_sqlite(pool).await
        } else if let Some(pool) = self.store.as_postgres() {
            get_all_users_postgres(pool).await
        } else {
            Err(UserError::Storage("Unsupported database type".to_string()))
        }
    }

    /// Get a user by their ID
    #[tracing::instrument(skip(self), fields(user_id = %id))]
    pub async fn get_user(&self, id: &str) -> Result<Option<User>, UserError> {
        self.find_unique_user(&UserCriteria::Id(id.to_string()))
            .await
    }

    /// Zero or one user matching `criteria`
    #[tracing::instrument(skip(self, criteria), fields(criteria = %criteria))]
    pub async fn find_unique_user(
        &self,
        criteria: &UserCriteria,
    ) -> Result<Option<User>, UserError> {
        let result = if let Some(pool) = self.store.as_sqlite() {
            find_users_sqlite(pool, criteria).await
        } else if let Some(pool) = self.store.as_postgres() {
            find_users_postgres(pool, criteria).await
        } else {
            Err(UserError::Storage("Unsupported database type".to_string()))
        };

        let result = result.and_then(|mut users| {
            if users.len() > 1 {
                Err(UserError::NonUnique(criteria.to_string()))
            } else {
                Ok(users.pop())
            }
        });

        match &result {
            Ok(found) => {
                tracing::debug!(found = found.is_some(), "User lookup completed");
            }
            Err(e) => {
                tracing::error!(error = %e, "User lookup failed");
            }
        }

        result
    }

    /// Create or update a user
    #[tracing::instrument(skip(self, user), fields(user_id = %user.id))]
    pub async fn upsert_user(&self, user: User) -> Result<User, UserError> {
        tracing::debug!(username = %user.username, "Upserting user");

        let result = if let Some(pool) = self.store.as_sqlite() {
            upsert_user_sqlite(pool, user).await
        } else if let Some(pool) = self.store.as_postgres() {
            upsert_user_postgres(pool, user).await
        } else {
            Err(UserError::Storage("Unsupported database type".to_string()))
        };

        match &result {
            Ok(user) => {
                tracing::info!(
                    user_id = %user.id,
                    is_admin = user.is_admin,
                    "User upsert completed"
                );
            }
            Err(e) => {
                tracing::error!(error = %e, "User upsert failed");
            }
        }

        result
    }

    /// Hash the password and persist a new user
    pub async fn create_user(&self, username: &str, password: &str) -> Result<User, UserError> {
        self.upsert_user(User::new(username, password)?).await
    }

    pub async fn delete_user(&self, id: &str) -> Result<(), UserError> {
        if let Some(pool) = self.store.as_sqlite() {
            delete_user_sqlite(pool, id).await
        } else if let Some(pool) = self.store.as_postgres() {
            delete_user_postgres(pool, id).await
        } else {
            Err(UserError::Storage("Unsupported database type".to_string()))
        }
    }
}

#[async_trait]
impl UserRepository for UserStore {
    type User = User;

    async fn find_unique(&self, criteria: &UserCriteria) -> Result<Option<User>, UserError> {
        self.find_unique_user(criteria).await
    }

    async fn load(&self, id: &UserId) -> Result<Option<User>, UserError> {
        self.get_user(id.as_str()).await
    }

    fn identifier(&self, user: &User) -> UserId {
        user.user_id()
    }
}
