//! Shapes produced by the form and service-guidance use cases.
//!
//! All fields default to empty so a partially filled model response still
//! deserialises; `Default` doubles as the "no usable result" value.

use serde::{Deserialize, Serialize};

use crate::grievance::Priority;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FormAnalysis {
    pub purpose: String,
    pub requirements: Vec<String>,
    pub deadlines: String,
    pub common_mistakes: Vec<String>,
    pub simplified_explanation: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServiceDetailInfo {
    pub summary: String,
    pub features: Vec<String>,
    pub steps: Vec<String>,
    pub ai_insight: String,
    pub processing_time: String,
    pub checklist: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RejectionPrediction {
    /// Estimated approval chance as reported by the model, usually 0-100.
    pub approval_probability: Option<f64>,
    pub risk_level: Option<Priority>,
    pub red_flags: Vec<String>,
    pub mitigation_steps: Vec<String>,
    pub ai_analyst_note: String,
}

/// Application details drafted from a free-form conversation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GenericFormDraft {
    pub form_subject: String,
    pub application_type: String,
    pub full_name: String,
    pub father_name: String,
    pub date_of_birth: String,
    pub address: String,
    pub ai_verification_note: String,
}
