//! Core milestone types for milestoned.
//!
//! This module defines the persisted milestone record and the defaulting
//! rules applied to inbound metadata when a record is created.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Owner id assigned when a request does not name one.
pub const DEFAULT_OWNER: i64 = 2;

/// Title assigned when a request does not provide one.
pub const DEFAULT_TITLE: &str = "Untitled";

/// A stored milestone record.
///
/// Every field is populated at creation time; records are never updated in
/// place. The JSON field names are the wire and on-disk contract, so
/// `created_at` serializes as `createdAt`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Milestone {
    /// Unique identifier. Client-supplied when present, otherwise generated.
    pub id: String,

    /// Display title.
    pub title: String,

    /// Free-form description.
    pub description: String,

    /// The date the milestone commemorates.
    pub date: String,

    /// Owner id.
    pub owner: i64,

    /// Absolute URLs of attached images, in upload order.
    pub images: Vec<String>,

    /// Server-assigned creation timestamp, never modified afterwards.
    pub created_at: String,
}

/// Inbound milestone metadata before defaulting.
///
/// Deserializes from either the JSON-encoded `event` payload or a map of
/// flattened form fields. Form fields arrive as strings, so `owner` accepts
/// both JSON numbers and numeric strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MilestoneDraft {
    /// Caller-chosen id, kept verbatim so client and server stay in sync.
    pub id: Option<String>,
    /// Title, if provided.
    pub title: Option<String>,
    /// Description, if provided.
    pub description: Option<String>,
    /// Milestone date, if provided.
    pub date: Option<String>,
    /// Owner id as a number or numeric string.
    #[serde(default, deserialize_with = "owner_from_any")]
    pub owner: Option<i64>,
}

/// Accept an owner id as a JSON number or a numeric string.
///
/// Anything uncoercible collapses to `None` and picks up [`DEFAULT_OWNER`]
/// later; type coercion is the only validation applied.
fn owner_from_any<'de, D>(deserializer: D) -> std::result::Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    })
}

impl MilestoneDraft {
    /// Build a draft from flattened form fields.
    ///
    /// Unknown keys are ignored; a map that fails to deserialize entirely
    /// yields an empty draft so creation falls through to the defaults.
    #[must_use]
    pub fn from_fields(fields: serde_json::Map<String, Value>) -> Self {
        serde_json::from_value(Value::Object(fields)).unwrap_or_default()
    }
}

impl Milestone {
    /// Construct a milestone from a draft, applying the defaulting rules.
    ///
    /// Empty strings count as absent. A missing id is generated from the
    /// current Unix time in milliseconds;
    /// two creates within the same millisecond would collide, which is an
    /// accepted weakness of the scheme.
    #[must_use]
    pub fn from_draft(draft: MilestoneDraft, images: Vec<String>) -> Self {
        let now = Utc::now();
        let now_iso = now.to_rfc3339_opts(SecondsFormat::Millis, true);

        Self {
            id: draft
                .id
                .filter(|id| !id.is_empty())
                .unwrap_or_else(|| now.timestamp_millis().to_string()),
            title: draft
                .title
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            description: draft.description.unwrap_or_default(),
            date: draft
                .date
                .filter(|d| !d.is_empty())
                .unwrap_or_else(|| now_iso.clone()),
            owner: draft.owner.unwrap_or(DEFAULT_OWNER),
            images,
            created_at: now_iso,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_draft_applies_defaults() {
        let milestone = Milestone::from_draft(MilestoneDraft::default(), vec![]);

        assert!(!milestone.id.is_empty());
        assert_eq!(milestone.title, DEFAULT_TITLE);
        assert_eq!(milestone.description, "");
        assert_eq!(milestone.owner, DEFAULT_OWNER);
        assert!(milestone.images.is_empty());
        assert_eq!(milestone.date, milestone.created_at);
    }

    #[test]
    fn test_from_draft_keeps_client_values() {
        let draft = MilestoneDraft {
            id: Some("abc-123".to_string()),
            title: Some("Launch".to_string()),
            description: Some("First release".to_string()),
            date: Some("2024-06-01T00:00:00.000Z".to_string()),
            owner: Some(3),
        };
        let milestone = Milestone::from_draft(draft, vec!["http://x/uploads/a.png".to_string()]);

        assert_eq!(milestone.id, "abc-123");
        assert_eq!(milestone.title, "Launch");
        assert_eq!(milestone.description, "First release");
        assert_eq!(milestone.date, "2024-06-01T00:00:00.000Z");
        assert_eq!(milestone.owner, 3);
        assert_eq!(milestone.images.len(), 1);
    }

    #[test]
    fn test_from_draft_treats_empty_strings_as_absent() {
        let draft = MilestoneDraft {
            id: Some(String::new()),
            title: Some(String::new()),
            description: None,
            date: Some(String::new()),
            owner: None,
        };
        let milestone = Milestone::from_draft(draft, vec![]);

        assert!(!milestone.id.is_empty());
        assert_eq!(milestone.title, DEFAULT_TITLE);
        assert_eq!(milestone.date, milestone.created_at);
    }

    #[test]
    fn test_generated_id_is_millisecond_timestamp() {
        let before = Utc::now().timestamp_millis();
        let milestone = Milestone::from_draft(MilestoneDraft::default(), vec![]);
        let after = Utc::now().timestamp_millis();

        let id: i64 = milestone.id.parse().expect("generated id is numeric");
        assert!(id >= before && id <= after);
    }

    #[test]
    fn test_created_at_is_rfc3339() {
        let milestone = Milestone::from_draft(MilestoneDraft::default(), vec![]);
        assert!(chrono::DateTime::parse_from_rfc3339(&milestone.created_at).is_ok());
        assert!(milestone.created_at.ends_with('Z'));
    }

    #[test]
    fn test_owner_coercion_from_string() {
        let draft: MilestoneDraft =
            serde_json::from_str(r#"{"title": "x", "owner": "7"}"#).unwrap();
        assert_eq!(draft.owner, Some(7));
    }

    #[test]
    fn test_owner_coercion_from_number() {
        let draft: MilestoneDraft = serde_json::from_str(r#"{"owner": 5}"#).unwrap();
        assert_eq!(draft.owner, Some(5));
    }

    #[test]
    fn test_owner_coercion_garbage_falls_back() {
        let draft: MilestoneDraft = serde_json::from_str(r#"{"owner": "not a number"}"#).unwrap();
        assert_eq!(draft.owner, None);

        let milestone = Milestone::from_draft(draft, vec![]);
        assert_eq!(milestone.owner, DEFAULT_OWNER);
    }

    #[test]
    fn test_owner_zero_is_kept() {
        let draft: MilestoneDraft = serde_json::from_str(r#"{"owner": 0}"#).unwrap();
        let milestone = Milestone::from_draft(draft, vec![]);
        assert_eq!(milestone.owner, 0);
    }

    #[test]
    fn test_draft_from_fields() {
        let mut fields = serde_json::Map::new();
        fields.insert("title".to_string(), Value::String("Trip".to_string()));
        fields.insert("owner".to_string(), Value::String("4".to_string()));
        fields.insert("ignored".to_string(), Value::String("x".to_string()));

        let draft = MilestoneDraft::from_fields(fields);
        assert_eq!(draft.title.as_deref(), Some("Trip"));
        assert_eq!(draft.owner, Some(4));
    }

    #[test]
    fn test_milestone_wire_names() {
        let milestone = Milestone::from_draft(MilestoneDraft::default(), vec![]);
        let json = serde_json::to_value(&milestone).unwrap();

        assert!(json.get("createdAt").is_some());
        assert!(json.get("created_at").is_none());
        assert!(json.get("images").is_some());
    }

    #[test]
    fn test_milestone_round_trip() {
        let milestone = Milestone::from_draft(
            MilestoneDraft {
                id: Some("42".to_string()),
                title: Some("Launch".to_string()),
                description: Some("d".to_string()),
                date: Some("2024-01-01".to_string()),
                owner: Some(1),
            },
            vec!["http://localhost/uploads/a.png".to_string()],
        );

        let json = serde_json::to_string(&milestone).unwrap();
        let back: Milestone = serde_json::from_str(&json).unwrap();
        assert_eq!(milestone, back);
    }
}
