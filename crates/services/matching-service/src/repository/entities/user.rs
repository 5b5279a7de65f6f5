//! User database entity for SeaORM.

use sea_orm::entity::prelude::*;

use domain::{DomainError, User};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    #[sea_orm(unique)]
    pub email: String,
    pub password_hash: String,
    /// `donor` or `receiver`
    pub role: String,
    pub organization_name: Option<String>,
    pub location: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::food_request::Entity")]
    FoodRequests,
    #[sea_orm(has_many = "super::donation::Entity")]
    Donations,
}

impl Related<super::food_request::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FoodRequests.def()
    }
}

impl Related<super::donation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Donations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Convert database model to domain entity
impl TryFrom<Model> for User {
    type Error = DomainError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(User {
            id: model.id,
            name: model.name,
            email: model.email,
            password_hash: model.password_hash,
            role: model.role.parse()?,
            organization_name: model.organization_name,
            location: model.location,
            created_at: model.created_at,
        })
    }
}
