use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DataUriError {
    #[error("not a base64 data URI")]
    NotADataUri,

    #[error("invalid base64 payload: {0}")]
    InvalidBase64(String),
}

/// Self-describing `data:<mime>;base64,<payload>` image encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUri {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl DataUri {
    pub fn new(mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            mime_type: mime_type.into(),
            bytes,
        }
    }

    pub fn encode(mime_type: &str, bytes: &[u8]) -> String {
        format!("data:{};base64,{}", mime_type, BASE64.encode(bytes))
    }

    pub fn parse(uri: &str) -> Result<Self, DataUriError> {
        let rest = uri
            .get(..5)
            .filter(|scheme| scheme.eq_ignore_ascii_case("data:"))
            .map(|_| &uri[5..])
            .ok_or(DataUriError::NotADataUri)?;
        let (header, payload) = rest.split_once(',').ok_or(DataUriError::NotADataUri)?;
        let mime_type = header
            .strip_suffix(";base64")
            .or_else(|| header.strip_suffix(";BASE64"))
            .ok_or(DataUriError::NotADataUri)?;

        let bytes = BASE64
            .decode(payload.trim())
            .map_err(|e| DataUriError::InvalidBase64(e.to_string()))?;

        Ok(Self::new(mime_type, bytes))
    }

    /// File extension for the mime type, used when saving images.
    pub fn extension(&self) -> &str {
        match self.mime_type.as_str() {
            "image/jpeg" | "image/jpg" => "jpg",
            "image/webp" => "webp",
            "image/gif" => "gif",
            _ => "png",
        }
    }
}

impl std::fmt::Display for DataUri {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&Self::encode(&self.mime_type, &self.bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_prefix() {
        assert_eq!(DataUri::encode("image/png", b"hi"), "data:image/png;base64,aGk=");
    }

    #[test]
    fn test_parse_data_uri() {
        let parsed = DataUri::parse("data:image/jpeg;base64,aGk=").unwrap();
        assert_eq!(parsed.mime_type, "image/jpeg");
        assert_eq!(parsed.bytes, b"hi");
        assert_eq!(parsed.extension(), "jpg");
        assert_eq!(parsed.to_string(), "data:image/jpeg;base64,aGk=");
    }

    #[test]
    fn test_parse_rejects_plain_base64() {
        assert_eq!(DataUri::parse("aGk="), Err(DataUriError::NotADataUri));
        assert_eq!(DataUri::parse("data:image/png,aGk="), Err(DataUriError::NotADataUri));
    }

    #[test]
    fn test_parse_rejects_bad_payload() {
        assert!(matches!(
            DataUri::parse("data:image/png;base64,@@@"),
            Err(DataUriError::InvalidBase64(_))
        ));
    }
}
