use civicai_shared::{
    ClassificationResult, FormAnalysis, GenericFormDraft, Grievance, Message, RejectionPrediction,
    Scheme, ServiceDetailInfo, UserProfile,
};
use tracing::{debug, info};

use crate::client::{ModelClient, ModelResponse};
use crate::decode::{append_sources, decode};
use crate::error::{AssistantError, Result};
use crate::language::Language;
use crate::request::{build_request, InlineImage, Query};
use crate::schema::ResponseShape;

/// Reply recorded in the history when the model answers with nothing.
pub const EMPTY_REPLY_PLACEHOLDER: &str = "...";

/// Which conversational assistant a chat turn goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatMode {
    /// Grounded government-service guide; answers cite official sources.
    ServiceGuide,
    /// Identity vault helper.
    Profile,
}

/// Caller-facing entry point: one method per use case.
///
/// Stateless. Conversation history and the citizen profile are passed in and
/// handed back explicitly; nothing is remembered between calls.
///
/// Errors are returned only for configuration, input and transport/remote
/// failures. Undecodable model output yields an empty value instead.
pub struct CitizenAssistant<'a, C: ModelClient> {
    client: &'a C,
}

impl<'a, C: ModelClient> CitizenAssistant<'a, C> {
    pub fn new(client: &'a C) -> Self {
        Self { client }
    }

    async fn send(&self, query: Query<'_>, language: Language) -> Result<ModelResponse> {
        let request = build_request(&query, language);
        debug!(use_case = %request.use_case, language = %language, "dispatching");
        self.client.generate(&request).await
    }

    async fn send_for<T: ResponseShape>(&self, query: Query<'_>, language: Language) -> Result<T> {
        let response = self.send(query, language).await?;
        Ok(decode(&response.text))
    }

    pub async fn find_eligible_schemes(
        &self,
        query: &str,
        profile: &UserProfile,
        language: Language,
    ) -> Result<Vec<Scheme>> {
        self.send_for(Query::SchemeSearch { query, profile }, language)
            .await
    }

    /// Ask the grounded service guide. Cited sources are appended to the answer.
    pub async fn ask_assistant(
        &self,
        query: &str,
        history: &[Message],
        language: Language,
    ) -> Result<String> {
        let response = self
            .send(Query::ServiceGuide { query, history }, language)
            .await?;
        Ok(append_sources(&response.text, &response.citations))
    }

    pub async fn ask_profile_assistant(
        &self,
        query: &str,
        history: &[Message],
        language: Language,
    ) -> Result<String> {
        let response = self
            .send(Query::ProfileAssistant { query, history }, language)
            .await?;
        Ok(response.text)
    }

    /// Read identity fields off a document image. Fields the model could not
    /// read are `None`.
    pub async fn extract_profile_from_image(
        &self,
        image: &InlineImage,
        language: Language,
    ) -> Result<UserProfile> {
        let mut profile: UserProfile = self
            .send_for(Query::ProfileExtraction { image }, language)
            .await?;
        // Only the caller may assert that a document was digitised.
        profile.has_document = None;
        Ok(profile)
    }

    pub async fn parse_generic_draft(
        &self,
        conversation: &str,
        language: Language,
    ) -> Result<GenericFormDraft> {
        self.send_for(Query::FormDrafting { conversation }, language)
            .await
    }

    pub async fn fetch_service_info(
        &self,
        service_name: &str,
        language: Language,
    ) -> Result<ServiceDetailInfo> {
        self.send_for(Query::ServiceInfo { service_name }, language)
            .await
    }

    pub async fn predict_rejection_risk(
        &self,
        service_name: &str,
        service_summary: &str,
        language: Language,
    ) -> Result<RejectionPrediction> {
        self.send_for(
            Query::RejectionRisk {
                service_name,
                service_summary,
            },
            language,
        )
        .await
    }

    pub async fn analyze_form(&self, form_text: &str, language: Language) -> Result<FormAnalysis> {
        self.send_for(Query::FormAnalysis { form_text }, language)
            .await
    }

    pub async fn extract_text_from_image(
        &self,
        image: &InlineImage,
        language: Language,
    ) -> Result<String> {
        let response = self.send(Query::Transcription { image }, language).await?;
        Ok(response.text)
    }

    pub async fn classify_query(
        &self,
        query: &str,
        language: Language,
    ) -> Result<ClassificationResult> {
        self.send_for(Query::QueryClassification { query }, language)
            .await
    }

    /// Digitise an identity document into `profile`.
    ///
    /// Extracted fields overwrite existing ones, untouched fields survive, and
    /// the profile is marked as backed by a document.
    pub async fn digitize_document(
        &self,
        profile: UserProfile,
        image: &InlineImage,
        language: Language,
    ) -> Result<UserProfile> {
        let extracted = self.extract_profile_from_image(image, language).await?;
        let mut updated = profile.merged(extracted);
        updated.has_document = Some(true);
        info!("identity document digitised");
        Ok(updated)
    }

    /// Run one chat turn and return the history with the user message and the
    /// reply appended.
    pub async fn converse(
        &self,
        mode: ChatMode,
        mut history: Vec<Message>,
        query: &str,
        language: Language,
    ) -> Result<Vec<Message>> {
        let reply = match mode {
            ChatMode::ServiceGuide => self.ask_assistant(query, &history, language).await?,
            ChatMode::Profile => self.ask_profile_assistant(query, &history, language).await?,
        };

        let reply = if reply.trim().is_empty() {
            EMPTY_REPLY_PLACEHOLDER.to_string()
        } else {
            reply
        };

        history.push(Message::user(query));
        history.push(Message::assistant(reply));
        Ok(history)
    }

    /// Classify a grievance description and file it with the chosen department.
    pub async fn file_grievance(
        &self,
        subject: &str,
        description: &str,
        language: Language,
    ) -> Result<Grievance> {
        if description.trim().is_empty() {
            return Err(AssistantError::InvalidInput(
                "grievance description is empty".into(),
            ));
        }

        let classification = self.classify_query(description, language).await?;
        let grievance = Grievance::from_classification(subject, description, classification);
        info!(
            id = %grievance.id,
            department = %grievance.department,
            "grievance filed"
        );
        Ok(grievance)
    }
}
