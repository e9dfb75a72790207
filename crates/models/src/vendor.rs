use chrono::Utc;
use sea_orm::{entity::prelude::*, ConnectionTrait, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{errors, user};

pub const STATUS_PENDING: &str = "PENDING";
pub const STATUS_APPROVED: &str = "APPROVED";
pub const STATUS_SUSPENDED: &str = "SUSPENDED";

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "vendor")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub owner_id: Uuid,
    pub business_name: String,
    pub category: String,
    pub description: String,
    pub city: String,
    pub status: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Owner }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Owner => Entity::belongs_to(user::Entity)
                .from(Column::OwnerId)
                .to(user::Column::Id)
                .into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_business_name(name: &str) -> Result<(), errors::ModelError> {
    if name.trim().is_empty() || name.len() > 128 {
        return Err(errors::ModelError::Validation("business name required".into()));
    }
    Ok(())
}

pub async fn create<C: ConnectionTrait>(
    db: &C,
    owner_id: Uuid,
    business_name: &str,
    category: &str,
    description: &str,
    city: &str,
) -> Result<Model, errors::ModelError> {
    validate_business_name(business_name)?;
    if category.trim().is_empty() {
        return Err(errors::ModelError::Validation("category required".into()));
    }
    let now = Utc::now().into();
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        owner_id: Set(owner_id),
        business_name: Set(business_name.to_string()),
        category: Set(category.to_lowercase()),
        description: Set(description.to_string()),
        city: Set(city.to_string()),
        status: Set(STATUS_PENDING.into()),
        created_at: Set(now),
        updated_at: Set(now),
    };
    am.insert(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
}

pub async fn find_by_owner<C: ConnectionTrait>(
    db: &C,
    owner_id: Uuid,
) -> Result<Option<Model>, errors::ModelError> {
    Entity::find()
        .filter(Column::OwnerId.eq(owner_id))
        .one(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))
}
