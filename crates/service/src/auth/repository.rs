use async_trait::async_trait;
use chrono::Duration;
use uuid::Uuid;

use super::domain::{AuthUser, Credentials};
use super::errors::AuthError;

/// Repository abstraction for auth-related persistence.
#[async_trait]
pub trait AuthRepository: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<AuthUser>, AuthError>;
    async fn create_user(&self, email: &str, name: &str, role: &str) -> Result<AuthUser, AuthError>;

    async fn get_credentials(&self, user_id: Uuid) -> Result<Option<Credentials>, AuthError>;
    async fn upsert_password(&self, user_id: Uuid, password_hash: String, password_algorithm: String) -> Result<Credentials, AuthError>;

    async fn store_reset_token(&self, user_id: Uuid, token: &str, ttl: Duration) -> Result<(), AuthError>;
    /// Marks the token spent and returns the user it belonged to.
    async fn consume_reset_token(&self, token: &str) -> Result<Option<AuthUser>, AuthError>;
}

/// Simple in-memory mock repository for tests and doc examples
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct MockAuthRepository {
        users: Mutex<HashMap<String, AuthUser>>,  // key: email
        creds: Mutex<HashMap<Uuid, Credentials>>, // key: user_id
        resets: Mutex<HashMap<String, Uuid>>,     // key: token
    }

    #[async_trait]
    impl AuthRepository for MockAuthRepository {
        async fn find_user_by_email(&self, email: &str) -> Result<Option<AuthUser>, AuthError> {
            let users = self.users.lock().unwrap();
            Ok(users.get(email).cloned())
        }

        async fn create_user(&self, email: &str, name: &str, role: &str) -> Result<AuthUser, AuthError> {
            let mut users = self.users.lock().unwrap();
            if users.contains_key(email) {
                return Err(AuthError::Conflict);
            }
            let user = AuthUser {
                id: Uuid::new_v4(),
                email: email.to_string(),
                name: name.to_string(),
                role: role.to_string(),
            };
            users.insert(email.to_string(), user.clone());
            Ok(user)
        }

        async fn get_credentials(&self, user_id: Uuid) -> Result<Option<Credentials>, AuthError> {
            let creds = self.creds.lock().unwrap();
            Ok(creds.get(&user_id).cloned())
        }

        async fn upsert_password(&self, user_id: Uuid, password_hash: String, password_algorithm: String) -> Result<Credentials, AuthError> {
            let mut creds = self.creds.lock().unwrap();
            let c = Credentials { user_id, password_hash, password_algorithm };
            creds.insert(user_id, c.clone());
            Ok(c)
        }

        async fn store_reset_token(&self, user_id: Uuid, token: &str, _ttl: Duration) -> Result<(), AuthError> {
            let mut resets = self.resets.lock().unwrap();
            resets.insert(token.to_string(), user_id);
            Ok(())
        }

        async fn consume_reset_token(&self, token: &str) -> Result<Option<AuthUser>, AuthError> {
            let user_id = { self.resets.lock().unwrap().remove(token) };
            let Some(user_id) = user_id else { return Ok(None) };
            let users = self.users.lock().unwrap();
            Ok(users.values().find(|u| u.id == user_id).cloned())
        }
    }
}
