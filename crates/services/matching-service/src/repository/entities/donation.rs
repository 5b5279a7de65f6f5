//! Donation database entity for SeaORM.

use sea_orm::entity::prelude::*;

use domain::{DomainError, Donation};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "donations")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub donor_id: i32,
    pub request_id: i32,
    pub message: Option<String>,
    pub status: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::DonorId",
        to = "super::user::Column::Id"
    )]
    Donor,
    #[sea_orm(
        belongs_to = "super::food_request::Entity",
        from = "Column::RequestId",
        to = "super::food_request::Column::Id"
    )]
    Request,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Donor.def()
    }
}

impl Related<super::food_request::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Request.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Donation {
    type Error = DomainError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Donation {
            id: model.id,
            donor_id: model.donor_id,
            request_id: model.request_id,
            message: model.message,
            status: model.status.parse()?,
            created_at: model.created_at,
        })
    }
}
