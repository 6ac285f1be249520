//! Government schemes and the welfare benefits a citizen is enrolled in.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, VariantNames};

use crate::error::{parse_closed, ParseEnumError};

/// A scheme returned by scheme discovery. The model gives no ordering guarantee.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Scheme {
    pub id: String,
    pub name: String,
    pub description: String,
    pub eligibility: Vec<String>,
    pub benefits: String,
    pub official_link: String,
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
pub enum BenefitStatus {
    Active,
    #[default]
    Pending,
    Paused,
}

impl TryFrom<String> for BenefitStatus {
    type Error = ParseEnumError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        parse_closed("benefit status", &value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WelfareBenefit {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
    pub status: BenefitStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_disbursement: Option<String>,
}
