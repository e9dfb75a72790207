use chrono::Duration;
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::auth::domain::{AuthUser, Credentials};
use crate::auth::errors::AuthError;
use crate::auth::repository::AuthRepository;

pub struct SeaOrmAuthRepository {
    pub db: DatabaseConnection,
}

fn to_auth_user(u: models::user::Model) -> AuthUser {
    AuthUser { id: u.id, email: u.email, name: u.name, role: u.role }
}

#[async_trait::async_trait]
impl AuthRepository for SeaOrmAuthRepository {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<AuthUser>, AuthError> {
        let res = models::user::find_by_email(&self.db, email)
            .await
            .map_err(|e| AuthError::Repository(e.to_string()))?;
        Ok(res.map(to_auth_user))
    }

    async fn create_user(&self, email: &str, name: &str, role: &str) -> Result<AuthUser, AuthError> {
        let created = models::user::create(&self.db, email, name, role)
            .await
            .map_err(|e| AuthError::Validation(e.to_string()))?;
        Ok(to_auth_user(created))
    }

    async fn get_credentials(&self, user_id: Uuid) -> Result<Option<Credentials>, AuthError> {
        let res = models::user_credentials::find_by_user(&self.db, user_id)
            .await
            .map_err(|e| AuthError::Repository(e.to_string()))?;
        Ok(res.map(|c| Credentials {
            user_id: c.user_id,
            password_hash: c.password_hash,
            password_algorithm: c.password_algorithm,
        }))
    }

    async fn upsert_password(&self, user_id: Uuid, password_hash: String, password_algorithm: String) -> Result<Credentials, AuthError> {
        let c = models::user_credentials::upsert_password(&self.db, user_id, password_hash, &password_algorithm)
            .await
            .map_err(|e| AuthError::Repository(e.to_string()))?;
        Ok(Credentials {
            user_id: c.user_id,
            password_hash: c.password_hash,
            password_algorithm: c.password_algorithm,
        })
    }

    async fn store_reset_token(&self, user_id: Uuid, token: &str, ttl: Duration) -> Result<(), AuthError> {
        models::password_reset_token::create(&self.db, user_id, token, ttl)
            .await
            .map_err(|e| AuthError::Repository(e.to_string()))?;
        Ok(())
    }

    async fn consume_reset_token(&self, token: &str) -> Result<Option<AuthUser>, AuthError> {
        let Some(row) = models::password_reset_token::find_valid(&self.db, token)
            .await
            .map_err(|e| AuthError::Repository(e.to_string()))?
        else {
            return Ok(None);
        };
        let user_id = row.user_id;
        models::password_reset_token::mark_consumed(&self.db, row)
            .await
            .map_err(|e| AuthError::Repository(e.to_string()))?;
        use sea_orm::EntityTrait;
        let user = models::user::Entity::find_by_id(user_id)
            .one(&self.db)
            .await
            .map_err(|e| AuthError::Repository(e.to_string()))?;
        Ok(user.map(to_auth_user))
    }
}
