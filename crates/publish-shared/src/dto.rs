//! Data Transfer Objects - request/response types for the API.
//!
//! Field names follow the content API's wire format: `publishedAt`,
//! `createdAt` and `updatedAt` are camelCase, the rest snake_case.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timestamp;

/// `{ "data": ... }` request envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataRequest<T> {
    pub data: T,
}

/// An entity in `{ id, attributes }` form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity<T> {
    pub id: String,
    pub attributes: T,
}

/// Body of the generic create/update endpoints.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostWrite {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub slug_id: Option<String>,
    #[serde(
        rename = "publishedAt",
        default,
        deserialize_with = "timestamp::patch",
        skip_serializing_if = "Option::is_none"
    )]
    pub published_at: Option<Option<DateTime<Utc>>>,
    #[serde(
        default,
        deserialize_with = "timestamp::patch",
        skip_serializing_if = "Option::is_none"
    )]
    pub scheduled_at: Option<Option<DateTime<Utc>>>,
}

/// Body of `PATCH /posts/{id}/schedule`. `null` clears the schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleRequest {
    #[serde(deserialize_with = "timestamp::optional")]
    pub scheduled_at: Option<DateTime<Utc>>,
}

/// Post attributes as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostAttributes {
    pub title: String,
    pub body: String,
    pub slug: String,
    pub slug_id: String,
    pub unique_id: String,
    pub author: String,
    /// Derived state: `draft`, `scheduled` or `published`.
    pub status: String,
    #[serde(rename = "publishedAt")]
    pub published_at: Option<DateTime<Utc>>,
    pub scheduled_at: Option<DateTime<Utc>>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

/// Query string of `GET /posts`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostListQuery {
    pub status: Option<String>,
    pub author: Option<String>,
}

/// Result of `GET /posts/check-and-publish`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepSummary {
    pub checked_at: DateTime<Utc>,
    pub published: usize,
    /// Selected as due but changed before the write landed.
    pub skipped: usize,
    pub failed: usize,
    pub published_ids: Vec<String>,
    pub failures: Vec<SweepFailureDetail>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepFailureDetail {
    pub id: String,
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_write_tri_state() {
        let absent: DataRequest<PostWrite> =
            serde_json::from_str(r#"{ "data": { "title": "x" } }"#).unwrap();
        assert_eq!(absent.data.title.as_deref(), Some("x"));
        assert_eq!(absent.data.published_at, None);
        assert_eq!(absent.data.scheduled_at, None);

        let cleared: DataRequest<PostWrite> =
            serde_json::from_str(r#"{ "data": { "publishedAt": null, "scheduled_at": null } }"#)
                .unwrap();
        assert_eq!(cleared.data.published_at, Some(None));
        assert_eq!(cleared.data.scheduled_at, Some(None));

        let set: DataRequest<PostWrite> =
            serde_json::from_str(r#"{ "data": { "title": "x", "publishedAt": "2099-01-01" } }"#)
                .unwrap();
        let expected: DateTime<Utc> = "2099-01-01T00:00:00Z".parse().unwrap();
        assert_eq!(set.data.published_at, Some(Some(expected)));
    }

    #[test]
    fn test_post_write_rejects_bad_timestamp() {
        let result: Result<DataRequest<PostWrite>, _> =
            serde_json::from_str(r#"{ "data": { "scheduled_at": "soon" } }"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_schedule_request_requires_field() {
        let null: DataRequest<ScheduleRequest> =
            serde_json::from_str(r#"{ "data": { "scheduled_at": null } }"#).unwrap();
        assert_eq!(null.data.scheduled_at, None);

        let missing: Result<DataRequest<ScheduleRequest>, _> =
            serde_json::from_str(r#"{ "data": {} }"#);
        assert!(missing.is_err());
    }

    #[test]
    fn test_attributes_wire_names() {
        let now: DateTime<Utc> = "2024-06-01T12:00:00Z".parse().unwrap();
        let entity = Entity {
            id: "1".to_string(),
            attributes: PostAttributes {
                title: "t".to_string(),
                body: String::new(),
                slug: "t".to_string(),
                slug_id: "t-0000002a".to_string(),
                unique_id: "0000002a".to_string(),
                author: "a".to_string(),
                status: "published".to_string(),
                published_at: Some(now),
                scheduled_at: None,
                created_at: now,
                updated_at: now,
            },
        };
        let json = serde_json::to_value(&entity).unwrap();
        let attrs = &json["attributes"];
        assert_eq!(attrs["publishedAt"], "2024-06-01T12:00:00Z");
        assert!(attrs["scheduled_at"].is_null());
        assert!(attrs.get("createdAt").is_some());
        assert!(attrs.get("published_at").is_none());
    }
}
