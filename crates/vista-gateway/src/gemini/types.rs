// Wire types for the generateContent endpoint. Only the fields the gateway reads.

use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    /// Some SDK-shaped payloads surface parts at the top level.
    #[serde(default)]
    pub parts: Vec<Part>,
    #[serde(default, alias = "response_id")]
    pub response_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<CandidateContent>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default, alias = "inline_data")]
    pub inline_data: Option<InlineData>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    #[serde(default, alias = "mime_type")]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub data: Option<String>,
}

impl GenerateContentResponse {
    /// Top-level parts when present, otherwise every candidate's parts in order.
    pub fn all_parts(&self) -> Box<dyn Iterator<Item = &Part> + '_> {
        if !self.parts.is_empty() {
            return Box::new(self.parts.iter());
        }
        Box::new(
            self.candidates
                .iter()
                .filter_map(|candidate| candidate.content.as_ref())
                .flat_map(|content| content.parts.iter()),
        )
    }

    /// First part carrying non-empty inline image data.
    pub fn image_data(&self) -> Option<&InlineData> {
        self.all_parts()
            .filter_map(|part| part.inline_data.as_ref())
            .find(|inline| inline.data.as_deref().is_some_and(|data| !data.is_empty()))
    }

    /// First text part, used to explain why no image came back.
    pub fn explanation(&self) -> Option<&str> {
        self.all_parts().find_map(|part| part.text.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_image_found_in_second_candidate() {
        let raw: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [
                { "content": { "parts": [{ "text": "Here you go" }] } },
                { "content": { "parts": [{ "inlineData": { "mimeType": "image/webp", "data": "AAAA" } }] } }
            ],
            "responseId": "resp-1"
        }))
        .unwrap();

        let inline = raw.image_data().unwrap();
        assert_eq!(inline.mime_type.as_deref(), Some("image/webp"));
        assert_eq!(raw.response_id.as_deref(), Some("resp-1"));
        assert_eq!(raw.explanation(), Some("Here you go"));
    }

    #[test]
    fn test_snake_case_inline_data() {
        let raw: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [
                { "content": { "parts": [{ "inline_data": { "mime_type": "image/png", "data": "AAAA" } }] } }
            ]
        }))
        .unwrap();
        assert_eq!(raw.image_data().and_then(|i| i.data.as_deref()), Some("AAAA"));
    }

    #[test]
    fn test_empty_inline_data_is_skipped() {
        let raw: GenerateContentResponse = serde_json::from_value(json!({
            "parts": [{ "inlineData": { "data": "" } }, { "text": "blocked" }]
        }))
        .unwrap();
        assert!(raw.image_data().is_none());
        assert_eq!(raw.explanation(), Some("blocked"));
    }
}
