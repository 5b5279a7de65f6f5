//! Request ledger: the food_requests table.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::{Expr, Func, IntoCondition, LikeExpr, Query};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    FromQueryResult, JoinType, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set,
};

use super::entities::{donation, food_request, user};
use common::{AppError, AppResult};
use domain::{
    DonationStatus, FoodRequest, NewFoodRequest, OpenRequest, ReceiverRequest, RequestStatus,
};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Request repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait RequestRepository: Send + Sync {
    /// Insert a pending request owned by `receiver_id`
    async fn create(&self, receiver_id: i32, request: NewFoodRequest) -> AppResult<FoodRequest>;

    /// Find request by ID
    async fn find_by_id(&self, id: i32) -> AppResult<Option<FoodRequest>>;

    /// Pending requests nobody has claimed yet, newest first
    async fn list_open(&self, location: Option<String>) -> AppResult<Vec<OpenRequest>>;

    /// A receiver's requests with their active donation, newest first
    async fn list_by_receiver(&self, receiver_id: i32) -> AppResult<Vec<ReceiverRequest>>;
}

/// Row shape of the open-request listing.
#[derive(Debug, FromQueryResult)]
struct OpenRequestRow {
    id: i32,
    receiver_id: i32,
    food_type: String,
    quantity: i32,
    location: String,
    description: String,
    status: String,
    created_at: DateTime<Utc>,
    receiver_name: String,
}

/// Row shape of a receiver's own listing.
#[derive(Debug, FromQueryResult)]
struct ReceiverRequestRow {
    id: i32,
    receiver_id: i32,
    food_type: String,
    quantity: i32,
    location: String,
    description: String,
    status: String,
    created_at: DateTime<Utc>,
    active_donation_id: Option<i32>,
}

impl TryFrom<OpenRequestRow> for OpenRequest {
    type Error = AppError;

    fn try_from(row: OpenRequestRow) -> AppResult<Self> {
        Ok(OpenRequest {
            request: FoodRequest {
                id: row.id,
                receiver_id: row.receiver_id,
                food_type: row.food_type,
                quantity: row.quantity,
                location: row.location,
                description: row.description,
                status: row.status.parse::<RequestStatus>()?,
                created_at: row.created_at,
            },
            receiver_name: row.receiver_name,
        })
    }
}

impl TryFrom<ReceiverRequestRow> for ReceiverRequest {
    type Error = AppError;

    fn try_from(row: ReceiverRequestRow) -> AppResult<Self> {
        Ok(ReceiverRequest {
            request: FoodRequest {
                id: row.id,
                receiver_id: row.receiver_id,
                food_type: row.food_type,
                quantity: row.quantity,
                location: row.location,
                description: row.description,
                status: row.status.parse::<RequestStatus>()?,
                created_at: row.created_at,
            },
            active_donation_id: row.active_donation_id,
        })
    }
}

fn to_domain(model: food_request::Model) -> AppResult<FoodRequest> {
    FoodRequest::try_from(model).map_err(AppError::from)
}

/// Needs no quoting in any backend's string literal.
const LIKE_ESCAPE: char = '!';

/// Lowercased `%needle%` with LIKE metacharacters escaped, so what a donor
/// types is matched literally.
fn contains_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.to_lowercase().chars() {
        if matches!(c, LIKE_ESCAPE | '%' | '_') {
            pattern.push(LIKE_ESCAPE);
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Request queries over any connection: the pool or an open transaction.
pub struct RequestLedger<'a, C: ConnectionTrait> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> RequestLedger<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    pub async fn create(&self, receiver_id: i32, request: NewFoodRequest) -> AppResult<FoodRequest> {
        let active_model = food_request::ActiveModel {
            receiver_id: Set(receiver_id),
            food_type: Set(request.food_type),
            quantity: Set(request.quantity),
            location: Set(request.location),
            description: Set(request.description),
            status: Set(RequestStatus::Pending.as_str().to_string()),
            created_at: Set(Utc::now()),
            ..Default::default()
        };

        let model = active_model.insert(self.conn).await?;
        to_domain(model)
    }

    pub async fn find_by_id(&self, id: i32) -> AppResult<Option<FoodRequest>> {
        food_request::Entity::find_by_id(id)
            .one(self.conn)
            .await?
            .map(to_domain)
            .transpose()
    }

    /// Like [`Self::find_by_id`], holding the row lock until the enclosing
    /// transaction ends. The lock clause is dropped on SQLite, where the
    /// whole database is locked by the writer anyway.
    pub async fn find_by_id_for_update(&self, id: i32) -> AppResult<Option<FoodRequest>> {
        food_request::Entity::find_by_id(id)
            .lock_exclusive()
            .one(self.conn)
            .await?
            .map(to_domain)
            .transpose()
    }

    /// Status pending and no pending/in_progress donation. A blank filter
    /// matches everything; otherwise the location must contain it,
    /// ignoring case.
    pub async fn list_open(&self, location: Option<&str>) -> AppResult<Vec<OpenRequest>> {
        let claimed = Query::select()
            .column(donation::Column::RequestId)
            .from(donation::Entity)
            .and_where(
                donation::Column::Status
                    .is_in(DonationStatus::ACTIVE.iter().map(|s| s.as_str())),
            )
            .to_owned();

        let mut query = food_request::Entity::find()
            .column_as(user::Column::Name, "receiver_name")
            .join(JoinType::InnerJoin, food_request::Relation::Receiver.def())
            .filter(food_request::Column::Status.eq(RequestStatus::Pending.as_str()))
            .filter(food_request::Column::Id.not_in_subquery(claimed));

        if let Some(needle) = location.map(str::trim).filter(|s| !s.is_empty()) {
            query = query.filter(
                Expr::expr(Func::lower(Expr::col((
                    food_request::Entity,
                    food_request::Column::Location,
                ))))
                .like(LikeExpr::new(contains_pattern(needle)).escape(LIKE_ESCAPE)),
            );
        }

        let rows = query
            .order_by_desc(food_request::Column::Id)
            .into_model::<OpenRequestRow>()
            .all(self.conn)
            .await?;

        rows.into_iter().map(OpenRequest::try_from).collect()
    }

    /// Every request of one receiver, left-joined with its active donation.
    pub async fn list_by_receiver(&self, receiver_id: i32) -> AppResult<Vec<ReceiverRequest>> {
        let active_donation = food_request::Relation::Donations
            .def()
            .on_condition(|_request, donation_table| {
                Expr::col((donation_table, donation::Column::Status))
                    .ne(DonationStatus::Fulfilled.as_str())
                    .into_condition()
            });

        let rows = food_request::Entity::find()
            .column_as(donation::Column::Id, "active_donation_id")
            .join(JoinType::LeftJoin, active_donation)
            .filter(food_request::Column::ReceiverId.eq(receiver_id))
            .order_by_desc(food_request::Column::Id)
            .into_model::<ReceiverRequestRow>()
            .all(self.conn)
            .await?;

        rows.into_iter().map(ReceiverRequest::try_from).collect()
    }

    /// Set status to fulfilled. Repeating the call is a no-op; an unknown
    /// id yields `None` and the caller decides whether that is an error.
    pub async fn mark_fulfilled(&self, id: i32) -> AppResult<Option<FoodRequest>> {
        let Some(model) = food_request::Entity::find_by_id(id).one(self.conn).await? else {
            return Ok(None);
        };

        if model.status == RequestStatus::Fulfilled.as_str() {
            return to_domain(model).map(Some);
        }

        let mut active: food_request::ActiveModel = model.into();
        active.status = Set(RequestStatus::Fulfilled.as_str().to_string());
        let model = active.update(self.conn).await?;

        to_domain(model).map(Some)
    }
}

/// Pool-backed implementation of RequestRepository
pub struct RequestStore {
    db: DatabaseConnection,
}

impl RequestStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn ledger(&self) -> RequestLedger<'_, DatabaseConnection> {
        RequestLedger::new(&self.db)
    }
}

#[async_trait]
impl RequestRepository for RequestStore {
    async fn create(&self, receiver_id: i32, request: NewFoodRequest) -> AppResult<FoodRequest> {
        self.ledger().create(receiver_id, request).await
    }

    async fn find_by_id(&self, id: i32) -> AppResult<Option<FoodRequest>> {
        self.ledger().find_by_id(id).await
    }

    async fn list_open(&self, location: Option<String>) -> AppResult<Vec<OpenRequest>> {
        self.ledger().list_open(location.as_deref()).await
    }

    async fn list_by_receiver(&self, receiver_id: i32) -> AppResult<Vec<ReceiverRequest>> {
        self.ledger().list_by_receiver(receiver_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_pattern_escapes_wildcards() {
        assert_eq!(contains_pattern("Spring"), "%spring%");
        assert_eq!(contains_pattern("S_r"), "%s!_r%");
        assert_eq!(contains_pattern("100%"), "%100!%%");
        assert_eq!(contains_pattern("Hey!"), "%hey!!%");
        assert_eq!(contains_pattern("a\\b"), "%a\\b%");
    }
}
