//! Unit of work over mocked repositories.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;

use crate::infra::{TransactionContext, UnitOfWork};
use crate::repository::{
    DonationRepository, MockDonationRepository, MockRequestRepository, MockUserRepository,
    RequestRepository, UserRepository,
};
use common::{AppError, AppResult};

/// Transactions need a real database and always fail here, so a test that
/// expects an authorization error also proves no transaction was opened.
pub struct TestUnitOfWork {
    pub users: Arc<MockUserRepository>,
    pub requests: Arc<MockRequestRepository>,
    pub donations: Arc<MockDonationRepository>,
}

impl TestUnitOfWork {
    pub fn new(
        users: MockUserRepository,
        requests: MockRequestRepository,
        donations: MockDonationRepository,
    ) -> Self {
        Self {
            users: Arc::new(users),
            requests: Arc::new(requests),
            donations: Arc::new(donations),
        }
    }

    pub fn with_users(users: MockUserRepository) -> Self {
        Self::new(users, MockRequestRepository::new(), MockDonationRepository::new())
    }

    pub fn empty() -> Self {
        Self::with_users(MockUserRepository::new())
    }
}

#[async_trait]
impl UnitOfWork for TestUnitOfWork {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.users.clone()
    }

    fn requests(&self) -> Arc<dyn RequestRepository> {
        self.requests.clone()
    }

    fn donations(&self) -> Arc<dyn DonationRepository> {
        self.donations.clone()
    }

    async fn transaction<F, T>(&self, _f: F) -> AppResult<T>
    where
        F: for<'a> Fn(
                TransactionContext<'a>,
            ) -> Pin<Box<dyn Future<Output = AppResult<T>> + Send + 'a>>
            + Send
            + Sync,
        T: Send,
    {
        Err(AppError::internal("no database in unit tests"))
    }
}
