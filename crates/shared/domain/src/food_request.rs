//! Food request entity and its read projections.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{MIN_QUANTITY, STATUS_FULFILLED, STATUS_PENDING};
use crate::error::{DomainError, DomainResult};

/// Stored request status. "Claimed" is derived from the donations table,
/// see [`crate::matching::RequestState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    Fulfilled,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => STATUS_PENDING,
            RequestStatus::Fulfilled => STATUS_FULFILLED,
        }
    }
}

impl FromStr for RequestStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            STATUS_PENDING => Ok(RequestStatus::Pending),
            STATUS_FULFILLED => Ok(RequestStatus::Fulfilled),
            other => Err(DomainError::internal(format!(
                "Unknown request status: {}",
                other
            ))),
        }
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A receiver's ask for food.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct FoodRequest {
    pub id: i32,
    pub receiver_id: i32,
    pub food_type: String,
    pub quantity: i32,
    pub location: String,
    pub description: String,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
}

impl FoodRequest {
    pub fn is_owned_by(&self, user_id: i32) -> bool {
        self.receiver_id == user_id
    }

    pub fn is_fulfilled(&self) -> bool {
        self.status == RequestStatus::Fulfilled
    }
}

/// Fields a receiver supplies when posting a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewFoodRequest {
    pub food_type: String,
    pub quantity: i32,
    pub location: String,
    pub description: String,
}

impl NewFoodRequest {
    /// Trim text fields and enforce the posting rules.
    pub fn validated(self) -> DomainResult<Self> {
        let food_type = self.food_type.trim().to_string();
        let location = self.location.trim().to_string();

        if food_type.is_empty() {
            return Err(DomainError::validation("Food type is required"));
        }
        if location.is_empty() {
            return Err(DomainError::validation("Location is required"));
        }
        if self.quantity < MIN_QUANTITY {
            return Err(DomainError::validation(format!(
                "Quantity must be at least {}",
                MIN_QUANTITY
            )));
        }

        Ok(Self {
            food_type,
            quantity: self.quantity,
            location,
            description: self.description.trim().to_string(),
        })
    }
}

/// Request visible to browsing donors, with the receiver's display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct OpenRequest {
    #[serde(flatten)]
    pub request: FoodRequest,
    pub receiver_name: String,
}

/// Request as seen by its owner, with the id of the donation currently
/// claiming it (if any).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ReceiverRequest {
    #[serde(flatten)]
    pub request: FoodRequest,
    pub active_donation_id: Option<i32>,
}

/// A receiver's requests split by status, newest first within each list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ReceiverRequests {
    pub open: Vec<ReceiverRequest>,
    pub fulfilled: Vec<ReceiverRequest>,
}

impl ReceiverRequests {
    /// Partition preserving input order.
    pub fn partition(requests: Vec<ReceiverRequest>) -> Self {
        let (fulfilled, open) = requests
            .into_iter()
            .partition(|r| r.request.is_fulfilled());
        Self { open, fulfilled }
    }
}
