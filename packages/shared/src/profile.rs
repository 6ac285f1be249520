//! The citizen identity vault record.

use serde::{Deserialize, Serialize};

/// Identity details held in the vault. Every field is optional: a profile is
/// built up incrementally from document extraction and manual edits.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserProfile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,
    /// National ID with all but the last digits masked (e.g. `XXXX-XXXX-1234`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aadhaar_masked: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_document: Option<bool>,
}

impl UserProfile {
    /// Shallow overwrite: every field set in `other` replaces the one in `self`.
    pub fn merge(&mut self, other: UserProfile) {
        let UserProfile {
            full_name,
            date_of_birth,
            gender,
            state,
            district,
            aadhaar_masked,
            has_document,
        } = other;

        overwrite(&mut self.full_name, full_name);
        overwrite(&mut self.date_of_birth, date_of_birth);
        overwrite(&mut self.gender, gender);
        overwrite(&mut self.state, state);
        overwrite(&mut self.district, district);
        overwrite(&mut self.aadhaar_masked, aadhaar_masked);
        overwrite(&mut self.has_document, has_document);
    }

    /// Consuming variant of [`UserProfile::merge`].
    pub fn merged(mut self, other: UserProfile) -> Self {
        self.merge(other);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

fn overwrite<T>(slot: &mut Option<T>, value: Option<T>) {
    if value.is_some() {
        *slot = value;
    }
}
