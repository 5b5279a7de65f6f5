//! Donation matching rules.
//!
//! A request moves `Open -> Claimed -> Fulfilled`; its donation moves
//! `Pending/InProgress -> Fulfilled`. These functions decide whether a
//! transition is allowed. Applying it atomically is the caller's job.

use serde::Serialize;

use crate::donation::Donation;
use crate::error::{DomainError, DomainResult};
use crate::food_request::{FoodRequest, RequestStatus};
use crate::user::{Actor, Role};

/// Message shown to a donor who lost the race for a request.
pub const ALREADY_CLAIMED: &str = "This request already has a donation in progress";

/// Message shown when donating to a closed request.
pub const ALREADY_FULFILLED: &str = "This request has already been fulfilled";

/// Derived lifecycle state of a food request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestState {
    /// Pending with no active donation; visible to donors.
    Open,
    /// Pending with exactly one active donation.
    Claimed,
    /// Terminal.
    Fulfilled,
}

impl RequestState {
    pub fn derive(status: RequestStatus, has_active_donation: bool) -> Self {
        match (status, has_active_donation) {
            (RequestStatus::Fulfilled, _) => RequestState::Fulfilled,
            (RequestStatus::Pending, true) => RequestState::Claimed,
            (RequestStatus::Pending, false) => RequestState::Open,
        }
    }
}

/// Fail with `Forbidden` unless the actor holds `required`.
pub fn require_role(actor: &Actor, required: Role) -> DomainResult<()> {
    if actor.role == required {
        Ok(())
    } else {
        Err(DomainError::Forbidden)
    }
}

/// Guard for Donate: only open requests can be claimed.
pub fn ensure_claimable(state: RequestState) -> DomainResult<()> {
    match state {
        RequestState::Open => Ok(()),
        RequestState::Claimed => Err(DomainError::conflict(ALREADY_CLAIMED)),
        RequestState::Fulfilled => Err(DomainError::conflict(ALREADY_FULFILLED)),
    }
}

/// Only the receiver who posted a request may act on it. A stranger is
/// told `Forbidden`, never `NotFound`.
pub fn ensure_owner(actor: &Actor, request: &FoodRequest) -> DomainResult<()> {
    if request.is_owned_by(actor.user_id) {
        Ok(())
    } else {
        Err(DomainError::Forbidden)
    }
}

/// Guard for Confirm: the acting receiver owns the request and the donation
/// belongs to it.
pub fn ensure_confirmable(
    actor: &Actor,
    request: &FoodRequest,
    donation: &Donation,
) -> DomainResult<()> {
    require_role(actor, Role::Receiver)?;
    ensure_owner(actor, request)?;

    if donation.request_id != request.id {
        return Err(DomainError::validation(
            "Donation does not belong to the given request",
        ));
    }

    Ok(())
}
