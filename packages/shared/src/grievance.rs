//! Grievances, service requests and the classification the assistant attaches to them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, VariantNames};
use uuid::Uuid;

use crate::error::{parse_closed, ParseEnumError};

/// Subject used when a citizen files a grievance without one.
pub const DEFAULT_GRIEVANCE_SUBJECT: &str = "New Issue";

/// Urgency of a grievance, also used as the risk level of a rejection prediction.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, VariantNames,
)]
#[serde(try_from = "String")]
#[strum(ascii_case_insensitive)]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl TryFrom<String> for Priority {
    type Error = ParseEnumError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        parse_closed("priority", &value)
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    VariantNames,
)]
#[serde(try_from = "String")]
#[strum(ascii_case_insensitive)]
pub enum GrievanceStatus {
    #[default]
    Open,
    Resolved,
    Escalated,
}

impl TryFrom<String> for GrievanceStatus {
    type Error = ParseEnumError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        parse_closed("grievance status", &value)
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    VariantNames,
)]
#[serde(try_from = "String")]
#[strum(ascii_case_insensitive)]
pub enum RequestStatus {
    #[default]
    Pending,
    Processed,
}

impl TryFrom<String> for RequestStatus {
    type Error = ParseEnumError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        parse_closed("request status", &value)
    }
}

/// Routing decision produced by the query classification use case.
///
/// `priority` is optional because the model may omit it; a value outside
/// Low/Medium/High fails deserialisation instead of being widened.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClassificationResult {
    pub category: String,
    pub priority: Option<Priority>,
    pub department: String,
    pub urgency_reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Grievance {
    pub id: String,
    pub subject: String,
    pub description: String,
    pub department: String,
    pub status: GrievanceStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_classification: Option<ClassificationResult>,
}

impl Grievance {
    /// File a new grievance routed to the department the classification chose.
    ///
    /// A blank subject is replaced by [`DEFAULT_GRIEVANCE_SUBJECT`]. New
    /// grievances always start `Open`.
    pub fn from_classification(
        subject: &str,
        description: impl Into<String>,
        classification: ClassificationResult,
    ) -> Self {
        let subject = match subject.trim() {
            "" => DEFAULT_GRIEVANCE_SUBJECT.to_string(),
            s => s.to_string(),
        };

        Self {
            id: grievance_id(),
            subject,
            description: description.into(),
            department: classification.department.clone(),
            status: GrievanceStatus::Open,
            created_at: Utc::now(),
            ai_classification: Some(classification),
        }
    }
}

/// Tracking number in the portal's `GR-NNNN` format.
fn grievance_id() -> String {
    let n = 1000 + (Uuid::new_v4().as_u128() % 9000) as u32;
    format!("GR-{n}")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRequest {
    pub id: String,
    pub subject: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classification: Option<ClassificationResult>,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
}
