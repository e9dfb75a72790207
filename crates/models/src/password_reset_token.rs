use chrono::{Duration, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ConnectionTrait, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::user;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "password_reset_token")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub token: String,
    pub expires_at: DateTimeWithTimeZone,
    pub consumed_at: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { User }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::User => Entity::belongs_to(user::Entity)
                .from(Column::UserId)
                .to(user::Column::Id)
                .into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Store a fresh token for the user with the given lifetime.
pub async fn create<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
    token: &str,
    ttl: Duration,
) -> Result<Model, crate::errors::ModelError> {
    let now = Utc::now();
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        token: Set(token.to_string()),
        expires_at: Set((now + ttl).into()),
        consumed_at: Set(None),
        created_at: Set(now.into()),
    };
    am.insert(db).await.map_err(|e| crate::errors::ModelError::Db(e.to_string()))
}

/// Look up a token that is neither consumed nor expired.
pub async fn find_valid<C: ConnectionTrait>(
    db: &C,
    token: &str,
) -> Result<Option<Model>, crate::errors::ModelError> {
    let now: DateTimeWithTimeZone = Utc::now().into();
    Entity::find()
        .filter(Column::Token.eq(token))
        .filter(Column::ConsumedAt.is_null())
        .filter(Column::ExpiresAt.gt(now))
        .one(db)
        .await
        .map_err(|e| crate::errors::ModelError::Db(e.to_string()))
}

pub async fn mark_consumed<C: ConnectionTrait>(
    db: &C,
    model: Model,
) -> Result<Model, crate::errors::ModelError> {
    let mut am: ActiveModel = model.into();
    am.consumed_at = Set(Some(Utc::now().into()));
    am.update(db).await.map_err(|e| crate::errors::ModelError::Db(e.to_string()))
}
