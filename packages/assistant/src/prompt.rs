//! Prompt text for each use case.

use civicai_shared::UserProfile;

use crate::language::Language;

pub fn scheme_search(query: &str, profile: &UserProfile, language: Language) -> String {
    let profile_json = serde_json::to_string(profile).unwrap_or_else(|_| "{}".into());

    format!(
        "Find eligible government schemes for a citizen based on their query and profile.\n\
         User Profile: {profile_json}\n\
         Query: \"{query}\"\n\n\
         Search for official government schemes (central and state). \
         Return the response in {} as a JSON array.",
        language.display_name()
    )
}

pub fn service_guide_system(language: Language) -> String {
    format!(
        "You are the CivicAI Official Service Guide.\n\
         Respond ONLY to government service requests (e.g., birth certificate, passport, permits).\n\n\
         Your responsibilities:\n\
         1. Identify the official government website for the requested service.\n\
         2. Use verified official sources ONLY (prioritize domains like .gov, .gov.in, .nic.in).\n\n\
         Format your response to provide Application Link, Documents, and Steps.\n\
         Rules: Respond strictly in {}.",
        language.display_name()
    )
}

pub fn profile_assistant_system(language: Language) -> String {
    format!(
        "You are an identity profile assistant for CivicAI. Respond strictly in {}.",
        language.display_name()
    )
}

pub const PROFILE_EXTRACTION: &str =
    "Extract profile details from this identity document. Return JSON.";

pub const TRANSCRIPTION: &str = "Transcribe form image text.";

pub fn form_drafting(conversation: &str, language: Language) -> String {
    format!(
        "Based on the following conversation, extract application details. Language: {}. \n\n\
         Conversation:\n{conversation}",
        language.display_name()
    )
}

pub fn service_info(service_name: &str, language: Language) -> String {
    format!(
        "Detailed info for category: \"{service_name}\". Language: {}.",
        language.display_name()
    )
}

pub fn rejection_risk(service_name: &str, service_summary: &str, language: Language) -> String {
    let mut prompt = format!("Risk for service: \"{service_name}\".");
    if !service_summary.trim().is_empty() {
        prompt.push_str(&format!(" Service summary: {}", service_summary.trim()));
    }
    prompt.push_str(&format!(" Language: {}.", language.display_name()));
    prompt
}

pub fn form_analysis(form_text: &str, language: Language) -> String {
    format!(
        "Analyze government form text. Language: {}: \n\n{form_text}",
        language.display_name()
    )
}

pub fn query_classification(query: &str, language: Language) -> String {
    format!(
        "Classify query: \"{query}\". Language: {}.",
        language.display_name()
    )
}
