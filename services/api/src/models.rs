//! Backend payloads read by the client

use chrono::{DateTime, NaiveDateTime, Utc};
use common::de::{null_as_default, string_or_number};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Content category as listed by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default)]
    pub published: bool,
    #[serde(default)]
    pub rank: i64,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Category {
    /// Title shown to the user, falling back to the internal name
    pub fn display_title(&self) -> &str {
        if self.title.trim().is_empty() {
            &self.name
        } else {
            &self.title
        }
    }
}

/// Accepts RFC 3339 and zone-less ISO timestamps (read as UTC); anything else becomes `None`
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|s| parse_timestamp(&s)))
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|naive| naive.and_utc())
        })
}

/// Body of a successful submission, passed through as the backend sent it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubmissionReceipt(pub Value);

/// Contribution statistics of the signed-in user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserStats(pub Value);

/// Data export job accepted by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportJob {
    #[serde(deserialize_with = "string_or_number")]
    pub task_id: String,
    pub status: String,
    #[serde(default)]
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};
    use serde_json::json;

    #[test]
    fn test_category_tolerates_loose_fields() {
        let category: Category = serde_json::from_value(json!({
            "id": 3,
            "name": "folk_songs",
            "title": "Folk Songs",
            "published": true,
            "rank": 4,
            "created_at": "2024-05-01T10:30:00",
            "updated_at": "not a date"
        }))
        .unwrap();

        assert_eq!(category.id, "3");
        assert_eq!(category.description, "");
        let created = category.created_at.unwrap();
        assert_eq!((created.year(), created.month(), created.hour()), (2024, 5, 10));
        assert_eq!(category.updated_at, None);
    }

    #[test]
    fn test_display_title_falls_back_to_name() {
        let category: Category =
            serde_json::from_value(json!({"id": "c1", "name": "places", "title": " "})).unwrap();
        assert_eq!(category.display_title(), "places");
    }

    #[test]
    fn test_null_title_and_description() {
        let category: Category = serde_json::from_value(json!({
            "id": 7,
            "name": "recipes",
            "title": null,
            "description": null
        }))
        .unwrap();

        assert_eq!(category.description, "");
        assert_eq!(category.display_title(), "recipes");
    }

    #[test]
    fn test_rfc3339_timestamps() {
        let parsed = parse_timestamp("2024-05-01T10:30:00+05:30").unwrap();
        assert_eq!(parsed.hour(), 5);
    }
}
