//! Response schemas in the hosted endpoint's typed-schema dialect.
//!
//! A schema is attached to a request so the model is instructed to emit JSON
//! of that shape. The decoder does not enforce it; see [`crate::decode`].

use std::collections::BTreeMap;

use civicai_shared::{
    ClassificationResult, FormAnalysis, GenericFormDraft, RejectionPrediction, Scheme,
    ServiceDetailInfo, UserProfile,
};
use serde::de::DeserializeOwned;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SchemaType {
    String,
    Number,
    Integer,
    Boolean,
    Array,
    Object,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    #[serde(rename = "type")]
    pub schema_type: SchemaType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, Schema>,
    /// Declaration order of `properties`; the map itself is sorted.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub property_ordering: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
    #[serde(rename = "enum", skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<String>,
}

impl Schema {
    fn of(schema_type: SchemaType) -> Self {
        Self {
            schema_type,
            items: None,
            properties: BTreeMap::new(),
            property_ordering: Vec::new(),
            required: Vec::new(),
            enum_values: Vec::new(),
        }
    }

    pub fn string() -> Self {
        Self::of(SchemaType::String)
    }

    pub fn number() -> Self {
        Self::of(SchemaType::Number)
    }

    pub fn string_enum<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            enum_values: values.into_iter().map(Into::into).collect(),
            ..Self::string()
        }
    }

    pub fn array(items: Schema) -> Self {
        Self {
            items: Some(Box::new(items)),
            ..Self::of(SchemaType::Array)
        }
    }

    pub fn string_list() -> Self {
        Self::array(Self::string())
    }

    /// Object schema; properties keep the order given here.
    pub fn object<I, K>(properties: I) -> Self
    where
        I: IntoIterator<Item = (K, Schema)>,
        K: Into<String>,
    {
        let mut schema = Self::of(SchemaType::Object);
        for (name, property) in properties {
            let name = name.into();
            schema.property_ordering.push(name.clone());
            schema.properties.insert(name, property);
        }
        schema
    }

    #[must_use]
    pub fn with_required<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required = fields.into_iter().map(Into::into).collect();
        self
    }
}

/// A record the model is asked to produce, with its declared schema.
///
/// `Default` is the empty value handed back when the model output cannot be
/// decoded.
pub trait ResponseShape: DeserializeOwned + Default {
    fn schema() -> Schema;

    fn is_empty_value(&self) -> bool
    where
        Self: PartialEq,
    {
        *self == Self::default()
    }
}

const PRIORITY_LEVELS: [&str; 3] = ["Low", "Medium", "High"];

impl ResponseShape for Vec<Scheme> {
    fn schema() -> Schema {
        let scheme = Schema::object([
            ("id", Schema::string()),
            ("name", Schema::string()),
            ("description", Schema::string()),
            ("eligibility", Schema::string_list()),
            ("benefits", Schema::string()),
            ("officialLink", Schema::string()),
        ])
        .with_required([
            "id",
            "name",
            "description",
            "eligibility",
            "benefits",
            "officialLink",
        ]);
        Schema::array(scheme)
    }
}

/// Fields readable from an identity document. `hasDocument` is set by the
/// caller, never by the model.
impl ResponseShape for UserProfile {
    fn schema() -> Schema {
        Schema::object([
            ("fullName", Schema::string()),
            ("dateOfBirth", Schema::string()),
            ("gender", Schema::string()),
            ("state", Schema::string()),
            ("district", Schema::string()),
            ("aadhaarMasked", Schema::string()),
        ])
    }
}

impl ResponseShape for GenericFormDraft {
    fn schema() -> Schema {
        Schema::object([
            ("formSubject", Schema::string()),
            ("applicationType", Schema::string()),
            ("fullName", Schema::string()),
            ("fatherName", Schema::string()),
            ("dateOfBirth", Schema::string()),
            ("address", Schema::string()),
            ("aiVerificationNote", Schema::string()),
        ])
    }
}

impl ResponseShape for ServiceDetailInfo {
    fn schema() -> Schema {
        Schema::object([
            ("summary", Schema::string()),
            ("features", Schema::string_list()),
            ("steps", Schema::string_list()),
            ("aiInsight", Schema::string()),
            ("processingTime", Schema::string()),
            ("checklist", Schema::string_list()),
        ])
    }
}

impl ResponseShape for RejectionPrediction {
    fn schema() -> Schema {
        Schema::object([
            ("approvalProbability", Schema::number()),
            ("riskLevel", Schema::string_enum(PRIORITY_LEVELS)),
            ("redFlags", Schema::string_list()),
            ("mitigationSteps", Schema::string_list()),
            ("aiAnalystNote", Schema::string()),
        ])
    }
}

impl ResponseShape for FormAnalysis {
    fn schema() -> Schema {
        Schema::object([
            ("purpose", Schema::string()),
            ("requirements", Schema::string_list()),
            ("deadlines", Schema::string()),
            ("commonMistakes", Schema::string_list()),
            ("simplifiedExplanation", Schema::string()),
        ])
    }
}

impl ResponseShape for ClassificationResult {
    fn schema() -> Schema {
        Schema::object([
            ("category", Schema::string()),
            ("priority", Schema::string_enum(PRIORITY_LEVELS)),
            ("department", Schema::string()),
            ("urgencyReason", Schema::string()),
        ])
    }
}
