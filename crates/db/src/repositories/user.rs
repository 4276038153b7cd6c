//! User repository.

use agora_common::{AppError, AppResult};

use crate::records::User;
use crate::store::Store;

/// User repository for store operations.
#[derive(Clone)]
pub struct UserRepository {
    store: Store,
}

impl UserRepository {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    /// Create a user.
    pub async fn create(&self, user: User) -> AppResult<User> {
        let mut tables = self.store.write().await;
        if tables.users.contains_key(&user.id) {
            return Err(AppError::Store(format!("duplicate user id: {}", user.id)));
        }
        tables.users.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    /// Find a user by ID.
    pub async fn find_by_id(&self, user_id: &str) -> AppResult<Option<User>> {
        Ok(self.store.read().await.users.get(user_id).cloned())
    }

    /// Get a user by ID, returning an error if not found.
    pub async fn get_by_id(&self, user_id: &str) -> AppResult<User> {
        self.find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User not found: {user_id}")))
    }

    /// Find a user by username.
    pub async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        Ok(self
            .store
            .read()
            .await
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    /// Users for a list of ids, in input order, skipping unknown ids.
    pub async fn find_many(&self, user_ids: &[String]) -> AppResult<Vec<User>> {
        let tables = self.store.read().await;
        Ok(user_ids
            .iter()
            .filter_map(|id| tables.users.get(id))
            .cloned()
            .collect())
    }
}
