//! Best-effort decoding of model output.
//!
//! The hosted model is an unreliable text generator: it may answer with
//! prose, wrap JSON in markdown fences, or return nothing. [`decode`] never
//! fails. Anything it cannot parse becomes the shape's empty value, and the
//! caller renders that as "no usable result".

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::schema::ResponseShape;

/// Heading of the citation block appended to grounded answers.
pub const SOURCES_HEADING: &str = "**Official Sources:**";

/// Decode `text` as `T`, falling back to `T::default()` on any failure.
///
/// Required fields the model left out are accepted and take their empty
/// default. A field of the wrong JSON type, or an enum value outside its
/// closed set, rejects the whole record.
pub fn decode<T: ResponseShape>(text: &str) -> T {
    let json = extract_json_from_response(text);
    if json.is_empty() {
        debug!("model returned no text, using empty value");
        return T::default();
    }

    match serde_json::from_str(&json) {
        Ok(value) => value,
        Err(e) => {
            warn!(
                error = %e,
                response_len = text.len(),
                "model response is not decodable JSON, using empty value"
            );
            T::default()
        }
    }
}

/// Extract the JSON payload from a model response.
///
/// Text that already parses as JSON is returned as-is, backticks inside
/// string values included. Otherwise a single markdown fence wrapping the
/// whole response is peeled off.
pub fn extract_json_from_response(response: &str) -> String {
    let trimmed = response.trim();
    if serde_json::from_str::<serde_json::Value>(trimmed).is_ok() {
        return trimmed.to_string();
    }

    strip_surrounding_fence(trimmed)
        .unwrap_or(trimmed)
        .to_string()
}

/// Inner text of a fence that opens at the start and closes at the end of `text`.
fn strip_surrounding_fence(text: &str) -> Option<&str> {
    let after_open = text.strip_prefix("```")?;
    let body = after_open.strip_suffix("```")?;
    // Language tag ("json") runs to the end of the opening line.
    let (_tag, inner) = body.split_once('\n')?;
    Some(inner.trim())
}

/// Drop empty and repeated URLs, keeping first-seen order.
pub fn dedup_citations<I, S>(urls: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    urls.into_iter()
        .filter_map(|url| {
            let url = url.as_ref().trim();
            (!url.is_empty() && seen.insert(url.to_string())).then(|| url.to_string())
        })
        .collect()
}

/// Render the citation block appended after a grounded answer.
///
/// Returns an empty string when there is nothing to cite.
pub fn format_sources(urls: &[String]) -> String {
    let urls = dedup_citations(urls);
    if urls.is_empty() {
        return String::new();
    }

    let lines: Vec<String> = urls.iter().map(|url| format!("- [{url}]({url})")).collect();
    format!("\n\n{SOURCES_HEADING}\n{}", lines.join("\n"))
}

pub fn append_sources(text: &str, urls: &[String]) -> String {
    format!("{text}{}", format_sources(urls))
}

#[cfg(test)]
mod tests {
    use super::*;
    use civicai_shared::{ClassificationResult, FormAnalysis, Priority, Scheme, UserProfile};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_decode_classification_scenario() {
        let text = r#"{"category":"Infrastructure","priority":"High","department":"Public Works","urgencyReason":"Safety hazard"}"#;
        let result: ClassificationResult = decode(text);
        assert_eq!(
            result,
            ClassificationResult {
                category: "Infrastructure".into(),
                priority: Some(Priority::High),
                department: "Public Works".into(),
                urgency_reason: "Safety hazard".into(),
            }
        );
    }

    #[test]
    fn test_conversational_text_decodes_to_empty_object() {
        let text = "Sure, here's the info you wanted!";
        assert_eq!(decode::<ClassificationResult>(text), ClassificationResult::default());
        assert_eq!(decode::<FormAnalysis>(text), FormAnalysis::default());
        assert_eq!(decode::<UserProfile>(text), UserProfile::default());
    }

    #[test]
    fn test_conversational_text_decodes_to_empty_array() {
        let schemes: Vec<Scheme> = decode("Sure, here's the info you wanted!");
        assert!(schemes.is_empty());
    }

    #[test]
    fn test_empty_text_decodes_to_empty_value() {
        assert!(decode::<Vec<Scheme>>("").is_empty());
        assert!(decode::<UserProfile>("   \n").is_empty());
    }

    #[test]
    fn test_object_where_array_expected_is_empty() {
        let schemes: Vec<Scheme> = decode(r#"{"id":"1","name":"PM-KISAN"}"#);
        assert!(schemes.is_empty());
    }

    #[test]
    fn test_out_of_set_priority_rejects_record() {
        let result: ClassificationResult =
            decode(r#"{"category":"Water","priority":"Critical","department":"Jal Board"}"#);
        assert_eq!(result, ClassificationResult::default());
    }

    #[test]
    fn test_fenced_json_is_decoded() {
        let text = "```json\n{\"purpose\":\"Caste certificate\"}\n```";
        let analysis: FormAnalysis = decode(text);
        assert_eq!(analysis.purpose, "Caste certificate");
    }

    #[test]
    fn test_fence_without_language_tag() {
        assert_eq!(extract_json_from_response("```\n[1, 2]\n```"), "[1, 2]");
    }

    #[test]
    fn test_fence_inside_prose_is_not_extracted() {
        let text = "Here you go:\n```json\n{\"purpose\":\"Caste certificate\"}\n```\nAnything else?";
        assert_eq!(decode::<FormAnalysis>(text), FormAnalysis::default());
    }

    #[test]
    fn test_backticks_inside_string_value_are_kept() {
        let text = r#"{"purpose":"Tax filing","simplifiedExplanation":"Type ```ITR-1``` in the box"}"#;
        let analysis: FormAnalysis = decode(text);
        assert_eq!(analysis.purpose, "Tax filing");
        assert_eq!(analysis.simplified_explanation, "Type ```ITR-1``` in the box");
    }

    #[test]
    fn test_backticks_inside_array_record_are_kept() {
        let text = r#"[{"id":"1","name":"PM-KISAN","description":"Use ```code``` blocks","eligibility":[],"benefits":"","officialLink":""}]"#;
        let schemes: Vec<Scheme> = decode(text);
        assert_eq!(schemes.len(), 1);
        assert_eq!(schemes[0].description, "Use ```code``` blocks");
    }

    #[test]
    fn test_fenced_json_with_backticks_inside() {
        let text = "```json\n{\"purpose\":\"See ```note```\"}\n```";
        let analysis: FormAnalysis = decode(text);
        assert_eq!(analysis.purpose, "See ```note```");
    }

    #[test]
    fn test_extract_without_fences_is_trimmed() {
        assert_eq!(extract_json_from_response("  {\"a\":1}\n"), "{\"a\":1}");
    }

    #[test]
    fn test_dedup_preserves_first_seen_order() {
        let urls = dedup_citations(["a", "b", "a", "c"]);
        assert_eq!(urls, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_dedup_drops_blank_urls() {
        let urls = dedup_citations(["", "https://x.gov.in", "  "]);
        assert_eq!(urls, vec!["https://x.gov.in"]);
    }

    #[test]
    fn test_format_sources_scenario() {
        let urls = vec![
            "https://x.gov.in".to_string(),
            "https://y.nic.in".to_string(),
            "https://x.gov.in".to_string(),
        ];
        assert_eq!(
            format_sources(&urls),
            "\n\n**Official Sources:**\n\
             - [https://x.gov.in](https://x.gov.in)\n\
             - [https://y.nic.in](https://y.nic.in)"
        );
    }

    #[test]
    fn test_format_sources_is_idempotent() {
        let urls: Vec<String> = ["a", "b", "a", "c"].iter().map(|s| s.to_string()).collect();
        let once = dedup_citations(&urls);
        assert_eq!(dedup_citations(&once), once);
        assert_eq!(format_sources(&urls), format_sources(&once));
    }

    #[test]
    fn test_no_sources_appends_nothing() {
        assert_eq!(format_sources(&[]), "");
        assert_eq!(append_sources("Visit the portal.", &[]), "Visit the portal.");
    }

    #[test]
    fn test_append_sources() {
        let text = append_sources("Apply online.", &["https://passportindia.gov.in".to_string()]);
        assert!(text.starts_with("Apply online.\n\n**Official Sources:**\n"));
        assert!(text.ends_with("- [https://passportindia.gov.in](https://passportindia.gov.in)"));
    }
}
