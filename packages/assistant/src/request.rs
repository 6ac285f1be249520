//! Request descriptors: what to send for each use case.
//!
//! Building a request is pure. [`build_request`] turns a [`Query`] and a
//! [`Language`] into a [`RequestDescriptor`]; sending it is the job of a
//! [`crate::client::ModelClient`].

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use civicai_shared::{
    ClassificationResult, FormAnalysis, GenericFormDraft, Message, RejectionPrediction, Role,
    Scheme, ServiceDetailInfo, UserProfile,
};
use strum::{Display, EnumIter};

use crate::error::{AssistantError, Result};
use crate::language::Language;
use crate::prompt;
use crate::schema::{ResponseShape, Schema};

pub const DEFAULT_IMAGE_MIME_TYPE: &str = "image/jpeg";

/// Temperature of the grounded service guide.
pub const SERVICE_GUIDE_TEMPERATURE: f32 = 0.1;
pub const PROFILE_ASSISTANT_TEMPERATURE: f32 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum UseCase {
    SchemeSearch,
    ServiceGuide,
    ProfileAssistant,
    ProfileExtraction,
    FormDrafting,
    FormAnalysis,
    Transcription,
    QueryClassification,
    RejectionRisk,
    ServiceInfo,
}

/// Speaker of a content block on the wire. Assistant turns are sent as `Model`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentRole {
    User,
    Model,
}

impl From<Role> for ContentRole {
    fn from(role: Role) -> Self {
        match role {
            Role::User => Self::User,
            Role::Assistant => Self::Model,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    mime_type: String,
    data: String,
}

impl InlineImage {
    /// Encode raw image bytes.
    pub fn from_bytes(mime_type: impl Into<String>, bytes: &[u8]) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: STANDARD.encode(bytes),
        }
    }

    /// Wrap an already base64-encoded payload, rejecting anything that does not decode.
    pub fn from_base64(mime_type: impl Into<String>, data: impl Into<String>) -> Result<Self> {
        let data = data.into().trim().to_string();
        if data.is_empty() {
            return Err(AssistantError::InvalidInput("image payload is empty".into()));
        }
        STANDARD
            .decode(&data)
            .map_err(|e| AssistantError::InvalidInput(format!("image is not valid base64: {e}")))?;

        Ok(Self {
            mime_type: mime_type.into(),
            data,
        })
    }

    /// Accept either a `data:<mime>;base64,<payload>` URL or a bare base64
    /// payload, which is assumed to be JPEG.
    pub fn from_data_url(input: &str) -> Result<Self> {
        let Some(rest) = input.trim().strip_prefix("data:") else {
            return Self::from_base64(DEFAULT_IMAGE_MIME_TYPE, input);
        };

        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| AssistantError::InvalidInput("data URL has no payload".into()))?;
        let mime_type = header
            .strip_suffix(";base64")
            .ok_or_else(|| AssistantError::InvalidInput("data URL is not base64".into()))?;
        let mime_type = if mime_type.is_empty() {
            DEFAULT_IMAGE_MIME_TYPE
        } else {
            mime_type
        };

        Self::from_base64(mime_type, payload)
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn data(&self) -> &str {
        &self.data
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Part {
    Text(String),
    Image(InlineImage),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Content {
    pub role: ContentRole,
    pub parts: Vec<Part>,
}

impl Content {
    pub fn user_text(text: impl Into<String>) -> Self {
        Self {
            role: ContentRole::User,
            parts: vec![Part::Text(text.into())],
        }
    }
}

/// Tools the model may use while answering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    /// Web search grounding; responses carry citation URLs.
    WebSearch,
}

/// Everything needed to send one request for one use case.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    pub use_case: UseCase,
    pub contents: Vec<Content>,
    pub system_instruction: Option<String>,
    pub response_schema: Option<Schema>,
    pub temperature: Option<f32>,
    pub tools: Vec<Tool>,
    pub language: Language,
}

impl RequestDescriptor {
    pub fn new(use_case: UseCase, language: Language) -> Self {
        Self {
            use_case,
            contents: Vec::new(),
            system_instruction: None,
            response_schema: None,
            temperature: None,
            tools: Vec::new(),
            language,
        }
    }

    /// Append prior turns. Call before [`RequestDescriptor::with_prompt`].
    #[must_use]
    pub fn with_history(mut self, history: &[Message]) -> Self {
        self.contents.extend(history.iter().map(|m| Content {
            role: m.role.into(),
            parts: vec![Part::Text(m.content.clone())],
        }));
        self
    }

    /// Append a user turn.
    #[must_use]
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.contents.push(Content::user_text(prompt));
        self
    }

    /// Append a user turn made of an image followed by an instruction.
    #[must_use]
    pub fn with_image_prompt(mut self, image: &InlineImage, prompt: impl Into<String>) -> Self {
        self.contents.push(Content {
            role: ContentRole::User,
            parts: vec![Part::Image(image.clone()), Part::Text(prompt.into())],
        });
        self
    }

    #[must_use]
    pub fn with_system_instruction(mut self, system: impl Into<String>) -> Self {
        self.system_instruction = Some(system.into());
        self
    }

    #[must_use]
    pub fn with_schema(mut self, schema: Schema) -> Self {
        self.response_schema = Some(schema);
        self
    }

    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    #[must_use]
    pub fn with_tool(mut self, tool: Tool) -> Self {
        if !self.tools.contains(&tool) {
            self.tools.push(tool);
        }
        self
    }

    pub fn expects_json(&self) -> bool {
        self.response_schema.is_some()
    }

    pub fn uses_web_search(&self) -> bool {
        self.tools.contains(&Tool::WebSearch)
    }
}

/// Caller input for one use case.
#[derive(Debug, Clone, Copy)]
pub enum Query<'a> {
    SchemeSearch {
        query: &'a str,
        profile: &'a UserProfile,
    },
    ServiceGuide {
        query: &'a str,
        history: &'a [Message],
    },
    ProfileAssistant {
        query: &'a str,
        history: &'a [Message],
    },
    ProfileExtraction {
        image: &'a InlineImage,
    },
    FormDrafting {
        conversation: &'a str,
    },
    FormAnalysis {
        form_text: &'a str,
    },
    Transcription {
        image: &'a InlineImage,
    },
    QueryClassification {
        query: &'a str,
    },
    RejectionRisk {
        service_name: &'a str,
        service_summary: &'a str,
    },
    ServiceInfo {
        service_name: &'a str,
    },
}

impl Query<'_> {
    pub fn use_case(&self) -> UseCase {
        match self {
            Self::SchemeSearch { .. } => UseCase::SchemeSearch,
            Self::ServiceGuide { .. } => UseCase::ServiceGuide,
            Self::ProfileAssistant { .. } => UseCase::ProfileAssistant,
            Self::ProfileExtraction { .. } => UseCase::ProfileExtraction,
            Self::FormDrafting { .. } => UseCase::FormDrafting,
            Self::FormAnalysis { .. } => UseCase::FormAnalysis,
            Self::Transcription { .. } => UseCase::Transcription,
            Self::QueryClassification { .. } => UseCase::QueryClassification,
            Self::RejectionRisk { .. } => UseCase::RejectionRisk,
            Self::ServiceInfo { .. } => UseCase::ServiceInfo,
        }
    }
}

/// Build the request descriptor for `query`, answering in `language`.
pub fn build_request(query: &Query<'_>, language: Language) -> RequestDescriptor {
    let request = RequestDescriptor::new(query.use_case(), language);

    match *query {
        Query::SchemeSearch { query, profile } => request
            .with_prompt(prompt::scheme_search(query, profile, language))
            .with_schema(<Vec<Scheme>>::schema())
            .with_tool(Tool::WebSearch),
        Query::ServiceGuide { query, history } => request
            .with_history(history)
            .with_prompt(query)
            .with_system_instruction(prompt::service_guide_system(language))
            .with_temperature(SERVICE_GUIDE_TEMPERATURE)
            .with_tool(Tool::WebSearch),
        Query::ProfileAssistant { query, history } => request
            .with_history(history)
            .with_prompt(query)
            .with_system_instruction(prompt::profile_assistant_system(language))
            .with_temperature(PROFILE_ASSISTANT_TEMPERATURE),
        Query::ProfileExtraction { image } => request
            .with_image_prompt(image, prompt::PROFILE_EXTRACTION)
            .with_schema(UserProfile::schema()),
        Query::FormDrafting { conversation } => request
            .with_prompt(prompt::form_drafting(conversation, language))
            .with_schema(GenericFormDraft::schema()),
        Query::FormAnalysis { form_text } => request
            .with_prompt(prompt::form_analysis(form_text, language))
            .with_schema(FormAnalysis::schema()),
        Query::Transcription { image } => {
            request.with_image_prompt(image, prompt::TRANSCRIPTION)
        }
        Query::QueryClassification { query } => request
            .with_prompt(prompt::query_classification(query, language))
            .with_schema(ClassificationResult::schema()),
        Query::RejectionRisk {
            service_name,
            service_summary,
        } => request
            .with_prompt(prompt::rejection_risk(service_name, service_summary, language))
            .with_schema(RejectionPrediction::schema()),
        Query::ServiceInfo { service_name } => request
            .with_prompt(prompt::service_info(service_name, language))
            .with_schema(ServiceDetailInfo::schema()),
    }
}
