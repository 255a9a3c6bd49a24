use super::ValidationError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;
use uuid::Uuid;

/// Identifier of a Notion page, database or block.
///
/// Notion accepts ids with or without hyphens, and users tend to paste page
/// URLs. Anything recognisable as a Notion id is normalised to the hyphenated
/// UUID form the API documents; any other non-empty value is kept verbatim and
/// left for the API to judge.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectId(String);

impl ObjectId {
    /// Parses raw ids, hyphenated UUIDs and Notion URLs.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let cleaned = input.trim().trim_end_matches('/');

        if cleaned.is_empty() {
            return Err(ValidationError::EmptyField("id"));
        }

        if let Ok(uuid) = Uuid::parse_str(cleaned) {
            return Ok(Self(uuid.as_hyphenated().to_string()));
        }

        if cleaned.starts_with("http://") || cleaned.starts_with("https://") {
            return Self::extract_from_url(cleaned);
        }

        Ok(Self(cleaned.to_string()))
    }

    /// Extracts the id from the last path segment of a Notion URL.
    fn extract_from_url(raw: &str) -> Result<Self, ValidationError> {
        lazy_static::lazy_static! {
            static ref ID_REGEX: Regex = Regex::new(
                r"([a-fA-F0-9]{32}|[a-fA-F0-9]{8}-[a-fA-F0-9]{4}-[a-fA-F0-9]{4}-[a-fA-F0-9]{4}-[a-fA-F0-9]{12})$"
            ).expect("Failed to compile Notion ID regex - this is a bug in the code");
        }

        let url = Url::parse(raw)
            .map_err(|e| ValidationError::InvalidId(format!("Invalid URL {}: {}", raw, e)))?;

        let last_segment = url
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .unwrap_or_default();

        ID_REGEX
            .captures(last_segment)
            .and_then(|captures| captures.get(1))
            .and_then(|m| Uuid::parse_str(m.as_str()).ok())
            .map(|uuid| Self(uuid.as_hyphenated().to_string()))
            .ok_or_else(|| ValidationError::InvalidId(format!("No valid ID found in URL: {}", raw)))
    }

    /// Returns the id in the form sent to the API.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for ObjectId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ObjectId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        ObjectId::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_parsing() {
        let id = ObjectId::parse("550e8400e29b41d4a716446655440000").unwrap();
        assert_eq!(id.as_str(), "550e8400-e29b-41d4-a716-446655440000");

        let id = ObjectId::parse("550E8400-E29B-41D4-A716-446655440000").unwrap();
        assert_eq!(id.as_str(), "550e8400-e29b-41d4-a716-446655440000");

        let id =
            ObjectId::parse("https://www.notion.so/acme/Roadmap-550e8400e29b41d4a716446655440000")
                .unwrap();
        assert_eq!(id.as_str(), "550e8400-e29b-41d4-a716-446655440000");

        let id = ObjectId::parse("https://www.notion.so/550e8400e29b41d4a716446655440000?v=1")
            .unwrap();
        assert_eq!(id.as_str(), "550e8400-e29b-41d4-a716-446655440000");
    }

    #[test]
    fn test_opaque_ids_are_kept() {
        assert_eq!(ObjectId::parse(" page-42 ").unwrap().as_str(), "page-42");
    }

    #[test]
    fn test_invalid_ids() {
        assert!(ObjectId::parse("").is_err());
        assert!(ObjectId::parse("   ").is_err());
        assert!(ObjectId::parse("https://www.notion.so/no-id-here").is_err());
    }
}
