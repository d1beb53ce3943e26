//! Book models and wire types
//!
//! The publication year is stored as text but arrives from clients as
//! either a JSON string or a bare number; the request types normalize the
//! numeric form during deserialization so everything past the boundary
//! deals in one representation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Catalog language tag
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub enum Language {
    English,
    Other,
}

impl Language {
    pub fn as_str(&self) -> &str {
        match self {
            Language::English => "English",
            Language::Other => "Other",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "English" => Some(Language::English),
            "Other" => Some(Language::Other),
            _ => None,
        }
    }
}

/// Book record
///
/// Maps to the `books` table. `user_uid` is the owning account and may be
/// null once that account is deleted.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Book {
    pub uid: Uuid,
    pub title: String,
    pub author: String,
    pub year: String,
    pub language: Language,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_uid: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn year_from_string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum YearInput {
        Text(String),
        Numeric(i64),
    }

    Ok(match YearInput::deserialize(deserializer)? {
        YearInput::Text(s) => s,
        YearInput::Numeric(n) => n.to_string(),
    })
}

fn optional_year<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum YearInput {
        Text(String),
        Numeric(i64),
    }

    Ok(Option::<YearInput>::deserialize(deserializer)?.map(|y| match y {
        YearInput::Text(s) => s,
        YearInput::Numeric(n) => n.to_string(),
    }))
}

/// Book creation request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateBookRequest {
    #[validate(length(min = 1))]
    pub title: String,

    #[validate(length(min = 1))]
    pub author: String,

    #[serde(deserialize_with = "year_from_string_or_number")]
    pub year: String,

    pub language: Language,
}

/// Book update request; absent fields keep their stored values
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateBookRequest {
    #[validate(length(min = 1))]
    pub title: Option<String>,

    #[validate(length(min = 1))]
    pub author: Option<String>,

    #[serde(default, deserialize_with = "optional_year")]
    pub year: Option<String>,

    pub language: Option<Language>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_year_accepts_string_and_number() {
        let from_string: CreateBookRequest = serde_json::from_value(json!({
            "title": "Things Fall Apart",
            "author": "Chinua Achebe",
            "year": "1958",
            "language": "English"
        }))
        .unwrap();
        assert_eq!(from_string.year, "1958");

        let from_number: CreateBookRequest = serde_json::from_value(json!({
            "title": "Things Fall Apart",
            "author": "Chinua Achebe",
            "year": 1958,
            "language": "English"
        }))
        .unwrap();
        assert_eq!(from_number.year, "1958");
    }

    #[test]
    fn test_update_year_normalization() {
        let absent: UpdateBookRequest = serde_json::from_value(json!({
            "title": "New Title"
        }))
        .unwrap();
        assert_eq!(absent.year, None);

        let numeric: UpdateBookRequest = serde_json::from_value(json!({
            "year": 2003
        }))
        .unwrap();
        assert_eq!(numeric.year, Some("2003".to_string()));
    }

    #[test]
    fn test_language_wire_values() {
        assert_eq!(
            serde_json::to_string(&Language::English).unwrap(),
            "\"English\""
        );
        assert_eq!(serde_json::to_string(&Language::Other).unwrap(), "\"Other\"");

        let result: Result<Language, _> = serde_json::from_str("\"Klingon\"");
        assert!(result.is_err());

        assert_eq!(Language::from_str("English"), Some(Language::English));
        assert_eq!(Language::from_str("english"), None);
    }

    #[test]
    fn test_create_request_validation() {
        let blank_title = CreateBookRequest {
            title: String::new(),
            author: "Someone".to_string(),
            year: "2001".to_string(),
            language: Language::Other,
        };
        assert!(blank_title.validate().is_err());
    }
}
