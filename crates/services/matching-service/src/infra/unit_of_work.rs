//! Unit of Work pattern implementation.
//!
//! Centralizes repository access and owns the transaction lifecycle:
//! multi-step matching operations (check, then write) run against one
//! transaction and either commit together or not at all.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use sea_orm::{
    AccessMode, DatabaseConnection, DatabaseTransaction, IsolationLevel, TransactionTrait,
};

use crate::repository::{
    DonationLedger, DonationRepository, DonationStore, RequestLedger, RequestRepository,
    RequestStore, UserRepository, UserStore,
};
use common::error::is_transient;
use common::{AppError, AppResult};

/// Attempts before a transaction the store keeps aborting is reported as a
/// conflict.
const MAX_TRANSACTION_ATTEMPTS: u32 = 5;

/// Backoff before attempt `n + 1` is `n` times this.
const RETRY_BACKOFF: Duration = Duration::from_millis(20);

/// Reported when every attempt was aborted by concurrent writers.
const CONCURRENT_UPDATE: &str = "The resource was modified concurrently, please retry";

/// Unit of Work trait for dependency injection.
///
/// Provides centralized access to all repositories and transaction management.
/// Note: This trait is not mockable directly due to generic methods.
/// For testing, implement it over mocked repositories.
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    /// Get user repository
    fn users(&self) -> Arc<dyn UserRepository>;

    /// Get food request repository
    fn requests(&self) -> Arc<dyn RequestRepository>;

    /// Get donation repository
    fn donations(&self) -> Arc<dyn DonationRepository>;

    /// Execute a closure within a transaction.
    ///
    /// The transaction is committed on success or rolled back on error.
    /// Runs at ReadCommitted; operations that must not interleave take
    /// row locks through the context. When the store aborts the transaction
    /// because of concurrent access, the closure is rerun from the start a
    /// bounded number of times, then `Conflict` is returned.
    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> Fn(
                TransactionContext<'a>,
            ) -> Pin<Box<dyn Future<Output = AppResult<T>> + Send + 'a>>
            + Send
            + Sync,
        T: Send;
}

/// Ledger access scoped to one open transaction.
///
/// The context borrows the transaction, so nothing obtained from it can
/// outlive the commit or rollback.
pub struct TransactionContext<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TransactionContext<'a> {
    fn new(txn: &'a DatabaseTransaction) -> Self {
        Self { txn }
    }

    /// Request ledger for this transaction
    pub fn requests(&self) -> RequestLedger<'a, DatabaseTransaction> {
        RequestLedger::new(self.txn)
    }

    /// Donation ledger for this transaction
    pub fn donations(&self) -> DonationLedger<'a, DatabaseTransaction> {
        DonationLedger::new(self.txn)
    }
}

/// Concrete implementation of UnitOfWork
pub struct Persistence {
    db: DatabaseConnection,
    user_repo: Arc<UserStore>,
    request_repo: Arc<RequestStore>,
    donation_repo: Arc<DonationStore>,
}

impl Persistence {
    /// Create new UnitOfWork instance
    pub fn new(db: DatabaseConnection) -> Self {
        let user_repo = Arc::new(UserStore::new(db.clone()));
        let request_repo = Arc::new(RequestStore::new(db.clone()));
        let donation_repo = Arc::new(DonationStore::new(db.clone()));
        Self {
            db,
            user_repo,
            request_repo,
            donation_repo,
        }
    }

    /// One attempt: begin, run, then commit or roll back.
    async fn run_once<F, T>(&self, f: &F) -> AppResult<T>
    where
        F: for<'a> Fn(
                TransactionContext<'a>,
            ) -> Pin<Box<dyn Future<Output = AppResult<T>> + Send + 'a>>
            + Send
            + Sync,
        T: Send,
    {
        let txn = self
            .db
            .begin_with_config(
                Some(IsolationLevel::ReadCommitted),
                Some(AccessMode::ReadWrite),
            )
            .await
            .map_err(AppError::from)?;

        let ctx = TransactionContext::new(&txn);

        match f(ctx).await {
            Ok(result) => {
                txn.commit().await.map_err(AppError::from)?;
                Ok(result)
            }
            Err(e) => {
                if let Err(rollback_err) = txn.rollback().await {
                    tracing::error!("Transaction rollback failed: {}", rollback_err);
                }
                Err(e)
            }
        }
    }
}

#[async_trait]
impl UnitOfWork for Persistence {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.user_repo.clone()
    }

    fn requests(&self) -> Arc<dyn RequestRepository> {
        self.request_repo.clone()
    }

    fn donations(&self) -> Arc<dyn DonationRepository> {
        self.donation_repo.clone()
    }

    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> Fn(
                TransactionContext<'a>,
            ) -> Pin<Box<dyn Future<Output = AppResult<T>> + Send + 'a>>
            + Send
            + Sync,
        T: Send,
    {
        let mut attempt = 1;
        loop {
            match self.run_once(&f).await {
                Err(AppError::Database(e)) if is_transient(&e) => {
                    if attempt >= MAX_TRANSACTION_ATTEMPTS {
                        tracing::warn!(attempt, error = %e, "Transaction kept aborting, giving up");
                        return Err(AppError::conflict(CONCURRENT_UPDATE));
                    }
                    tracing::debug!(attempt, error = %e, "Transaction aborted by the store, retrying");
                    tokio::time::sleep(RETRY_BACKOFF * attempt).await;
                    attempt += 1;
                }
                other => return other,
            }
        }
    }
}

/// Run `$body` inside `$uow`'s transaction with the context bound to `$ctx`.
///
/// The body may run more than once. Owned values it consumes are listed in
/// brackets and cloned afresh for every attempt.
#[macro_export]
macro_rules! with_transaction {
    ($uow:expr, |$ctx:ident| $body:expr) => {
        $uow.transaction(|$ctx| Box::pin(async move { $body })).await
    };
    ($uow:expr, [$($owned:ident),+], |$ctx:ident| $body:expr) => {
        $uow.transaction(|$ctx| {
            $(let $owned = $owned.clone();)+
            Box::pin(async move { $body })
        })
        .await
    };
}
