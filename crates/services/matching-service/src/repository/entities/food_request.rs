//! Food request database entity for SeaORM.

use sea_orm::entity::prelude::*;

use domain::{DomainError, FoodRequest};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "food_requests")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub receiver_id: i32,
    pub food_type: String,
    pub quantity: i32,
    pub location: String,
    pub description: String,
    pub status: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::ReceiverId",
        to = "super::user::Column::Id"
    )]
    Receiver,
    #[sea_orm(has_many = "super::donation::Entity")]
    Donations,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Receiver.def()
    }
}

impl Related<super::donation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Donations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for FoodRequest {
    type Error = DomainError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(FoodRequest {
            id: model.id,
            receiver_id: model.receiver_id,
            food_type: model.food_type,
            quantity: model.quantity,
            location: model.location,
            description: model.description,
            status: model.status.parse()?,
            created_at: model.created_at,
        })
    }
}
