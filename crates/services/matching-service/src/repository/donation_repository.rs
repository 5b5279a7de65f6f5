//! Donation ledger: the donations table.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    FromQueryResult, JoinType, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    RelationTrait, Set,
};

use super::entities::{donation, food_request, user};
use common::{error::is_unique_violation, AppError, AppResult};
use domain::matching::ALREADY_CLAIMED;
use domain::{Donation, DonationStatus, DonorDonation};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Donation repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait DonationRepository: Send + Sync {
    /// Find donation by ID
    async fn find_by_id(&self, id: i32) -> AppResult<Option<Donation>>;

    /// A donor's donations with what they cover, newest first
    async fn list_by_donor(&self, donor_id: i32) -> AppResult<Vec<DonorDonation>>;
}

/// Row shape of a donor's listing.
#[derive(Debug, FromQueryResult)]
struct DonorDonationRow {
    id: i32,
    donor_id: i32,
    request_id: i32,
    message: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
    food_type: String,
    quantity: i32,
    receiver_name: String,
}

impl TryFrom<DonorDonationRow> for DonorDonation {
    type Error = AppError;

    fn try_from(row: DonorDonationRow) -> AppResult<Self> {
        Ok(DonorDonation {
            donation: Donation {
                id: row.id,
                donor_id: row.donor_id,
                request_id: row.request_id,
                message: row.message,
                status: row.status.parse::<DonationStatus>()?,
                created_at: row.created_at,
            },
            food_type: row.food_type,
            quantity: row.quantity,
            receiver_name: row.receiver_name,
        })
    }
}

fn to_domain(model: donation::Model) -> AppResult<Donation> {
    Donation::try_from(model).map_err(AppError::from)
}

/// Donation queries over any connection: the pool or an open transaction.
pub struct DonationLedger<'a, C: ConnectionTrait> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> DonationLedger<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    /// Insert a pending donation. Losing the race for the request's single
    /// active slot is reported as a `Conflict`.
    pub async fn create(
        &self,
        donor_id: i32,
        request_id: i32,
        message: Option<String>,
    ) -> AppResult<Donation> {
        let active_model = donation::ActiveModel {
            donor_id: Set(donor_id),
            request_id: Set(request_id),
            message: Set(message),
            status: Set(DonationStatus::Pending.as_str().to_string()),
            created_at: Set(Utc::now()),
            ..Default::default()
        };

        let model = active_model.insert(self.conn).await.map_err(|e| {
            if is_unique_violation(&e) {
                AppError::conflict(ALREADY_CLAIMED)
            } else {
                AppError::from(e)
            }
        })?;

        to_domain(model)
    }

    pub async fn find_by_id(&self, id: i32) -> AppResult<Option<Donation>> {
        donation::Entity::find_by_id(id)
            .one(self.conn)
            .await?
            .map(to_domain)
            .transpose()
    }

    /// Whether a pending or in_progress donation references the request.
    pub async fn has_active(&self, request_id: i32) -> AppResult<bool> {
        let count = donation::Entity::find()
            .filter(donation::Column::RequestId.eq(request_id))
            .filter(
                donation::Column::Status
                    .is_in(DonationStatus::ACTIVE.iter().map(|s| s.as_str())),
            )
            .count(self.conn)
            .await?;

        Ok(count > 0)
    }

    pub async fn list_by_donor(&self, donor_id: i32) -> AppResult<Vec<DonorDonation>> {
        let rows = donation::Entity::find()
            .column_as(food_request::Column::FoodType, "food_type")
            .column_as(food_request::Column::Quantity, "quantity")
            .column_as(user::Column::Name, "receiver_name")
            .join(JoinType::InnerJoin, donation::Relation::Request.def())
            .join(JoinType::InnerJoin, food_request::Relation::Receiver.def())
            .filter(donation::Column::DonorId.eq(donor_id))
            .order_by_desc(donation::Column::Id)
            .into_model::<DonorDonationRow>()
            .all(self.conn)
            .await?;

        rows.into_iter().map(DonorDonation::try_from).collect()
    }

    /// Set status to fulfilled. Repeating the call is a no-op; an unknown
    /// id yields `None`.
    pub async fn mark_fulfilled(&self, id: i32) -> AppResult<Option<Donation>> {
        let Some(model) = donation::Entity::find_by_id(id).one(self.conn).await? else {
            return Ok(None);
        };

        let current: DonationStatus = model.status.parse()?;
        if current == DonationStatus::Fulfilled {
            return to_domain(model).map(Some);
        }
        if !current.can_transition_to(DonationStatus::Fulfilled) {
            return Err(AppError::internal(format!(
                "Donation {} cannot move from {} to fulfilled",
                id, current
            )));
        }

        let mut active: donation::ActiveModel = model.into();
        active.status = Set(DonationStatus::Fulfilled.as_str().to_string());
        let model = active.update(self.conn).await?;

        to_domain(model).map(Some)
    }
}

/// Pool-backed implementation of DonationRepository
pub struct DonationStore {
    db: DatabaseConnection,
}

impl DonationStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn ledger(&self) -> DonationLedger<'_, DatabaseConnection> {
        DonationLedger::new(&self.db)
    }
}

#[async_trait]
impl DonationRepository for DonationStore {
    async fn find_by_id(&self, id: i32) -> AppResult<Option<Donation>> {
        self.ledger().find_by_id(id).await
    }

    async fn list_by_donor(&self, donor_id: i32) -> AppResult<Vec<DonorDonation>> {
        self.ledger().list_by_donor(donor_id).await
    }
}
