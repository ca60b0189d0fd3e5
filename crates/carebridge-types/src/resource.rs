use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Kinds of healthcare resource a listing can describe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    BloodBank,
    Oxygen,
    Medicine,
    HospitalBed,
    VaccineCenter,
}

impl ResourceType {
    pub const ALL: [ResourceType; 5] = [
        ResourceType::BloodBank,
        ResourceType::Oxygen,
        ResourceType::Medicine,
        ResourceType::HospitalBed,
        ResourceType::VaccineCenter,
    ];

    /// Wire name, as stored and as sent to the verifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::BloodBank => "blood_bank",
            ResourceType::Oxygen => "oxygen",
            ResourceType::Medicine => "medicine",
            ResourceType::HospitalBed => "hospital_bed",
            ResourceType::VaccineCenter => "vaccine_center",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown resource type '{0}'")]
pub struct UnknownResourceType(pub String);

impl FromStr for ResourceType {
    type Err = UnknownResourceType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResourceType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| UnknownResourceType(s.to_string()))
    }
}

/// Untyped form fields as entered by a user. Optional fields may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawSubmission {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
    #[serde(default, rename = "type", deserialize_with = "null_as_empty")]
    pub resource_type: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub location: String,
    #[serde(default)]
    pub quantity: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// A cleared form field may arrive as `null`; treat it like an empty one.
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl RawSubmission {
    pub fn new(
        name: impl Into<String>,
        resource_type: impl Into<String>,
        location: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            resource_type: resource_type.into(),
            location: location.into(),
            quantity: None,
            description: None,
        }
    }

    pub fn with_quantity(mut self, quantity: impl Into<String>) -> Self {
        self.quantity = Some(quantity.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A trimmed, constraint-checked listing ready for verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceSubmission {
    pub name: String,
    #[serde(rename = "type")]
    pub resource_type: ResourceType,
    pub location: String,
    pub quantity: Option<String>,
    pub description: Option<String>,
}

/// A listing as held by the record store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedResource {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub resource_type: ResourceType,
    pub location: String,
    pub quantity: Option<String>,
    pub description: Option<String>,
    pub verified: bool,
    pub ai_notes: String,
    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

/// Insert payload for a new listing; the store assigns id and timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewResource {
    pub owner_id: Uuid,
    pub submission: ResourceSubmission,
    pub verified: bool,
    pub ai_notes: String,
}

impl NewResource {
    pub fn into_persisted(self, now: DateTime<Utc>) -> PersistedResource {
        let ResourceSubmission {
            name,
            resource_type,
            location,
            quantity,
            description,
        } = self.submission;
        PersistedResource {
            id: Uuid::new_v4(),
            owner_id: self.owner_id,
            name,
            resource_type,
            location,
            quantity,
            description,
            verified: self.verified,
            ai_notes: self.ai_notes,
            created_at: now,
            last_updated: now,
        }
    }
}
