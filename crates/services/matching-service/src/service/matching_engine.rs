//! Matching engine - the donation state machine.
//!
//! Request: `Open -> Claimed -> Fulfilled`. Donation:
//! `Pending/InProgress -> Fulfilled`. Donate and Confirm run their checks
//! and writes inside one transaction with the request row locked, so two
//! donors racing for the same request cannot both claim it.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use utoipa::ToSchema;

use crate::infra::UnitOfWork;
use crate::with_transaction;
use common::{AppError, AppResult, OptionExt};
use domain::matching::{ensure_claimable, ensure_confirmable, ensure_owner, require_role};
use domain::{
    Actor, Donation, DonorDonation, FoodRequest, NewFoodRequest, OpenRequest, ReceiverRequests,
    RequestState, Role,
};

/// Result of a confirmation: both sides of the closed match.
#[derive(Debug, Serialize, ToSchema)]
pub struct Confirmation {
    pub request: FoodRequest,
    pub donation: Donation,
}

/// Landing data, chosen by the caller's role.
#[derive(Debug, Serialize, ToSchema)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum Dashboard {
    Donor {
        open_requests: Vec<OpenRequest>,
        donations: Vec<DonorDonation>,
    },
    Receiver {
        requests: ReceiverRequests,
    },
}

/// Matching operations, each guarded by the actor's role.
#[async_trait]
pub trait MatchingService: Send + Sync {
    /// Receiver posts a new pending request
    async fn submit_request(&self, actor: Actor, request: NewFoodRequest)
        -> AppResult<FoodRequest>;

    /// Receiver's own requests, split into open and fulfilled
    async fn list_own_requests(&self, actor: Actor) -> AppResult<ReceiverRequests>;

    /// Requests a donor may claim, optionally narrowed by location
    async fn list_open_requests(
        &self,
        actor: Actor,
        location: Option<String>,
    ) -> AppResult<Vec<OpenRequest>>;

    /// Donor claims an open request
    async fn donate(
        &self,
        actor: Actor,
        request_id: i32,
        message: Option<String>,
    ) -> AppResult<Donation>;

    /// Donor's own donations
    async fn list_own_donations(&self, actor: Actor) -> AppResult<Vec<DonorDonation>>;

    /// Receiver confirms delivery, closing request and donation together
    async fn confirm_donation(
        &self,
        actor: Actor,
        donation_id: i32,
        request_id: i32,
    ) -> AppResult<Confirmation>;

    /// Role-specific landing data
    async fn dashboard(&self, actor: Actor) -> AppResult<Dashboard>;
}

/// Concrete implementation of MatchingService using Unit of Work.
pub struct MatchingEngine<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> MatchingEngine<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> MatchingService for MatchingEngine<U> {
    async fn submit_request(
        &self,
        actor: Actor,
        request: NewFoodRequest,
    ) -> AppResult<FoodRequest> {
        require_role(&actor, Role::Receiver)?;
        let request = request.validated()?;

        let created = self.uow.requests().create(actor.user_id, request).await?;
        tracing::info!(
            request_id = created.id,
            receiver_id = actor.user_id,
            "Food request created"
        );

        Ok(created)
    }

    async fn list_own_requests(&self, actor: Actor) -> AppResult<ReceiverRequests> {
        require_role(&actor, Role::Receiver)?;

        let requests = self.uow.requests().list_by_receiver(actor.user_id).await?;
        Ok(ReceiverRequests::partition(requests))
    }

    async fn list_open_requests(
        &self,
        actor: Actor,
        location: Option<String>,
    ) -> AppResult<Vec<OpenRequest>> {
        require_role(&actor, Role::Donor)?;

        self.uow.requests().list_open(location).await
    }

    async fn donate(
        &self,
        actor: Actor,
        request_id: i32,
        message: Option<String>,
    ) -> AppResult<Donation> {
        require_role(&actor, Role::Donor)?;
        let message = message
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty());

        let donation = with_transaction!(self.uow, [message], |ctx| {
            let request = ctx
                .requests()
                .find_by_id_for_update(request_id)
                .await?
                .ok_or_not_found()?;

            let has_active = ctx.donations().has_active(request.id).await?;
            ensure_claimable(RequestState::derive(request.status, has_active))?;

            ctx.donations()
                .create(actor.user_id, request.id, message)
                .await
        })?;

        tracing::info!(
            donation_id = donation.id,
            request_id = donation.request_id,
            donor_id = actor.user_id,
            "Donation created, request claimed"
        );

        Ok(donation)
    }

    async fn list_own_donations(&self, actor: Actor) -> AppResult<Vec<DonorDonation>> {
        require_role(&actor, Role::Donor)?;

        self.uow.donations().list_by_donor(actor.user_id).await
    }

    async fn confirm_donation(
        &self,
        actor: Actor,
        donation_id: i32,
        request_id: i32,
    ) -> AppResult<Confirmation> {
        require_role(&actor, Role::Receiver)?;

        let confirmation = with_transaction!(self.uow, |ctx| {
            let request = ctx
                .requests()
                .find_by_id_for_update(request_id)
                .await?
                .ok_or_not_found()?;
            ensure_owner(&actor, &request)?;

            let donation = ctx
                .donations()
                .find_by_id(donation_id)
                .await?
                .ok_or_not_found()?;
            ensure_confirmable(&actor, &request, &donation)?;

            // Both writes are no-ops for an already closed pair, and a pair
            // left half-fulfilled is completed here.
            let donation = ctx
                .donations()
                .mark_fulfilled(donation.id)
                .await?
                .ok_or_not_found()?;
            let request = ctx
                .requests()
                .mark_fulfilled(request.id)
                .await?
                .ok_or_not_found()?;

            Ok::<_, AppError>(Confirmation { request, donation })
        })?;

        tracing::info!(
            donation_id,
            request_id,
            receiver_id = actor.user_id,
            "Donation confirmed, request fulfilled"
        );

        Ok(confirmation)
    }

    async fn dashboard(&self, actor: Actor) -> AppResult<Dashboard> {
        match actor.role {
            Role::Donor => {
                let requests = self.uow.requests();
                let donations = self.uow.donations();
                let (open_requests, donations) = tokio::try_join!(
                    requests.list_open(None),
                    donations.list_by_donor(actor.user_id)
                )?;

                Ok(Dashboard::Donor {
                    open_requests,
                    donations,
                })
            }
            Role::Receiver => Ok(Dashboard::Receiver {
                requests: self.list_own_requests(actor).await?,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use mockall::predicate::eq;

    use super::*;
    use crate::repository::{MockDonationRepository, MockRequestRepository, MockUserRepository};
    use crate::service::test_support::TestUnitOfWork;
    use domain::{Donation, DonationStatus, ReceiverRequest, RequestStatus};

    const DONOR: Actor = Actor {
        user_id: 1,
        role: Role::Donor,
    };
    const RECEIVER: Actor = Actor {
        user_id: 2,
        role: Role::Receiver,
    };

    fn engine(uow: TestUnitOfWork) -> MatchingEngine<TestUnitOfWork> {
        MatchingEngine::new(Arc::new(uow))
    }

    fn with_requests(requests: MockRequestRepository) -> MatchingEngine<TestUnitOfWork> {
        engine(TestUnitOfWork::new(
            MockUserRepository::new(),
            requests,
            MockDonationRepository::new(),
        ))
    }

    fn food_request(id: i32, status: RequestStatus) -> FoodRequest {
        FoodRequest {
            id,
            receiver_id: RECEIVER.user_id,
            food_type: "rice".to_string(),
            quantity: 5,
            location: "Springfield".to_string(),
            description: String::new(),
            status,
            created_at: Utc::now(),
        }
    }

    fn new_request() -> NewFoodRequest {
        NewFoodRequest {
            food_type: "rice".to_string(),
            quantity: 5,
            location: "Springfield".to_string(),
            description: "for the shelter".to_string(),
        }
    }

    #[tokio::test]
    async fn test_donor_cannot_submit_request() {
        let mut requests = MockRequestRepository::new();
        requests.expect_create().never();

        let result = with_requests(requests).submit_request(DONOR, new_request()).await;
        assert!(matches!(result, Err(AppError::Forbidden)));
    }

    #[tokio::test]
    async fn test_submit_request_validates_before_writing() {
        let mut requests = MockRequestRepository::new();
        requests.expect_create().never();

        let invalid = NewFoodRequest {
            quantity: 0,
            ..new_request()
        };
        let result = with_requests(requests).submit_request(RECEIVER, invalid).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_submit_request_stores_under_actor() {
        let mut requests = MockRequestRepository::new();
        requests
            .expect_create()
            .with(eq(RECEIVER.user_id), eq(new_request()))
            .times(1)
            .returning(|_, _| Ok(food_request(10, RequestStatus::Pending)));

        let created = with_requests(requests)
            .submit_request(RECEIVER, new_request())
            .await
            .unwrap();
        assert_eq!(created.id, 10);
        assert_eq!(created.status, RequestStatus::Pending);
    }

    #[tokio::test]
    async fn test_receiver_cannot_donate() {
        let result = engine(TestUnitOfWork::empty())
            .donate(RECEIVER, 10, None)
            .await;
        assert!(matches!(result, Err(AppError::Forbidden)));
    }

    #[tokio::test]
    async fn test_donor_cannot_confirm() {
        let result = engine(TestUnitOfWork::empty())
            .confirm_donation(DONOR, 3, 10)
            .await;
        assert!(matches!(result, Err(AppError::Forbidden)));
    }

    #[tokio::test]
    async fn test_receiver_cannot_browse_open_requests() {
        let mut requests = MockRequestRepository::new();
        requests.expect_list_open().never();

        let result = with_requests(requests)
            .list_open_requests(RECEIVER, None)
            .await;
        assert!(matches!(result, Err(AppError::Forbidden)));
    }

    #[tokio::test]
    async fn test_open_requests_pass_location_through() {
        let mut requests = MockRequestRepository::new();
        requests
            .expect_list_open()
            .with(eq(Some("spring".to_string())))
            .times(1)
            .returning(|_| Ok(vec![]));

        let open = with_requests(requests)
            .list_open_requests(DONOR, Some("spring".to_string()))
            .await
            .unwrap();
        assert!(open.is_empty());
    }

    #[tokio::test]
    async fn test_receiver_dashboard_partitions_requests() {
        let mut requests = MockRequestRepository::new();
        requests
            .expect_list_by_receiver()
            .with(eq(RECEIVER.user_id))
            .returning(|_| {
                Ok(vec![
                    ReceiverRequest {
                        request: food_request(2, RequestStatus::Pending),
                        active_donation_id: Some(5),
                    },
                    ReceiverRequest {
                        request: food_request(1, RequestStatus::Fulfilled),
                        active_donation_id: None,
                    },
                ])
            });

        let dashboard = with_requests(requests).dashboard(RECEIVER).await.unwrap();
        match dashboard {
            Dashboard::Receiver { requests } => {
                assert_eq!(requests.open.len(), 1);
                assert_eq!(requests.open[0].active_donation_id, Some(5));
                assert_eq!(requests.fulfilled[0].request.id, 1);
            }
            other => panic!("expected receiver dashboard, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_donor_dashboard_lists_open_requests_and_own_donations() {
        let mut requests = MockRequestRepository::new();
        requests.expect_list_open().with(eq(None)).returning(|_| {
            Ok(vec![OpenRequest {
                request: food_request(4, RequestStatus::Pending),
                receiver_name: "Shelter".to_string(),
            }])
        });
        let mut donations = MockDonationRepository::new();
        donations
            .expect_list_by_donor()
            .with(eq(DONOR.user_id))
            .returning(|_| {
                Ok(vec![DonorDonation {
                    donation: Donation {
                        id: 9,
                        donor_id: DONOR.user_id,
                        request_id: 3,
                        message: None,
                        status: DonationStatus::Pending,
                        created_at: Utc::now(),
                    },
                    food_type: "beans".to_string(),
                    quantity: 2,
                    receiver_name: "Shelter".to_string(),
                }])
            });

        let dashboard = engine(TestUnitOfWork::new(
            MockUserRepository::new(),
            requests,
            donations,
        ))
        .dashboard(DONOR)
        .await
        .unwrap();

        let json = serde_json::to_value(&dashboard).unwrap();
        assert_eq!(json["role"], "donor");
        assert_eq!(json["open_requests"][0]["id"], 4);
        assert_eq!(json["donations"][0]["food_type"], "beans");
    }
}
