//! Donation entity and the donor-facing projection.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{STATUS_FULFILLED, STATUS_IN_PROGRESS, STATUS_PENDING};
use crate::error::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum DonationStatus {
    Pending,
    InProgress,
    Fulfilled,
}

impl DonationStatus {
    /// Statuses that count against the one-active-donation-per-request rule.
    pub const ACTIVE: [DonationStatus; 2] = [DonationStatus::Pending, DonationStatus::InProgress];

    pub fn as_str(&self) -> &'static str {
        match self {
            DonationStatus::Pending => STATUS_PENDING,
            DonationStatus::InProgress => STATUS_IN_PROGRESS,
            DonationStatus::Fulfilled => STATUS_FULFILLED,
        }
    }

    pub fn is_active(&self) -> bool {
        !matches!(self, DonationStatus::Fulfilled)
    }

    /// Statuses only move forward; staying put is allowed so repeated
    /// confirmations are no-ops.
    pub fn can_transition_to(&self, next: DonationStatus) -> bool {
        match (*self, next) {
            (current, next) if current == next => true,
            (DonationStatus::Pending, DonationStatus::InProgress) => true,
            (DonationStatus::Pending | DonationStatus::InProgress, DonationStatus::Fulfilled) => true,
            _ => false,
        }
    }
}

impl FromStr for DonationStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            STATUS_PENDING => Ok(DonationStatus::Pending),
            STATUS_IN_PROGRESS => Ok(DonationStatus::InProgress),
            STATUS_FULFILLED => Ok(DonationStatus::Fulfilled),
            other => Err(DomainError::internal(format!(
                "Unknown donation status: {}",
                other
            ))),
        }
    }
}

impl std::fmt::Display for DonationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A donor's commitment against exactly one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Donation {
    pub id: i32,
    pub donor_id: i32,
    pub request_id: i32,
    pub message: Option<String>,
    pub status: DonationStatus,
    pub created_at: DateTime<Utc>,
}

/// Donation joined with what was asked for and who asked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct DonorDonation {
    #[serde(flatten)]
    pub donation: Donation,
    pub food_type: String,
    pub quantity: i32,
    pub receiver_name: String,
}
