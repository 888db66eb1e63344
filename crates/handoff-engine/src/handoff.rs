//! The accepted-handoff record written back to both parties when a pairing is
//! accepted.
//!
//! Only the payload is built here. Storing it on the donor and recipient
//! records is up to the caller.

use std::fmt::Display;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{HandoffError, Result};
use crate::reconcile::Reconciliation;
use crate::record;

/// One side of a pairing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
    pub id: String,
    pub name: String,
}

impl Party {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    /// Pull `id` and `name` out of a user record. The name may sit at the top
    /// level or under `details`, `donorDetails` or `recipientDetails`.
    ///
    /// # Errors
    /// Returns [`HandoffError::InvalidRecord`] naming the missing field.
    pub fn from_record(record: &Value) -> Result<Self> {
        let id = record::find_detail_string(record, "id")
            .ok_or_else(|| HandoffError::InvalidRecord("record has no id".to_string()))?;
        let name = record::find_detail_string(record, "name")
            .ok_or_else(|| HandoffError::InvalidRecord(format!("record {id} has no name")))?;
        Ok(Self { id, name })
    }
}

/// Payload stored under each party's accepted tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcceptedHandoff {
    pub donor_id: String,
    pub donor_name: String,
    pub recipient_id: String,
    pub recipient_name: String,
    /// Display form of the donor's closing instant, or `"Unavailable"`.
    pub donor_closing_time: String,
    /// Display form of the recipient's opening instant, or `"Unavailable"`.
    pub recipient_open_time: String,
    /// When the pairing was accepted.
    pub timestamp: DateTime<Utc>,
}

impl AcceptedHandoff {
    pub fn new<Tz>(
        donor: &Party,
        recipient: &Party,
        window: &Reconciliation<Tz>,
        accepted_at: DateTime<Utc>,
    ) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let (donor_closing_time, recipient_open_time) = window.display_pair();
        Self {
            donor_id: donor.id.clone(),
            donor_name: donor.name.clone(),
            recipient_id: recipient.id.clone(),
            recipient_name: recipient.name.clone(),
            donor_closing_time,
            recipient_open_time,
            timestamp: accepted_at,
        }
    }
}
