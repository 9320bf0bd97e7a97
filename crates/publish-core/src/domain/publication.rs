//! Publication state machine.
//!
//! A post's state is derived from `published_at` and `scheduled_at` relative
//! to a point in time. Every write to those two fields is computed by
//! [`Transition::patch`], so the publish/schedule rules live in one place.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Effective state of a post at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum PublicationState {
    Draft,
    Scheduled { at: DateTime<Utc> },
    Published { at: DateTime<Utc> },
}

impl PublicationState {
    /// Derive the state from the stored timestamps.
    ///
    /// `published_at` dominates: a stale `scheduled_at` left behind by a manual
    /// publish does not matter. A `scheduled_at` that is not in the future
    /// (due, but not yet swept) reads as Draft.
    pub fn derive(
        published_at: Option<DateTime<Utc>>,
        scheduled_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Self {
        match (published_at, scheduled_at) {
            (Some(at), _) => Self::Published { at },
            (None, Some(at)) if at > now => Self::Scheduled { at },
            (None, _) => Self::Draft,
        }
    }

    pub fn status(&self) -> PublicationStatus {
        match self {
            Self::Draft => PublicationStatus::Draft,
            Self::Scheduled { .. } => PublicationStatus::Scheduled,
            Self::Published { .. } => PublicationStatus::Published,
        }
    }

    pub fn is_published(&self) -> bool {
        matches!(self, Self::Published { .. })
    }
}

/// State name without its timestamp, used for filtering and display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublicationStatus {
    Draft,
    Scheduled,
    Published,
}

impl PublicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Scheduled => "scheduled",
            Self::Published => "published",
        }
    }
}

impl fmt::Display for PublicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PublicationStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "draft" => Ok(Self::Draft),
            "scheduled" => Ok(Self::Scheduled),
            "published" => Ok(Self::Published),
            other => Err(DomainError::Validation(format!(
                "unknown publication status '{other}'"
            ))),
        }
    }
}

/// A requested change to a post's publication fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Overwrite `scheduled_at` (None clears it). Not checked against `now`
    /// or the current `published_at`.
    Schedule(Option<DateTime<Utc>>),
    /// Set `published_at` to `now`.
    Publish,
    /// Clear `published_at`.
    Unpublish,
}

impl Transition {
    /// The field writes this transition performs at `now`.
    pub fn patch(&self, now: DateTime<Utc>) -> PublicationPatch {
        match *self {
            Self::Schedule(at) => PublicationPatch {
                published_at: None,
                scheduled_at: Some(at),
                updated_at: now,
            },
            Self::Publish => PublicationPatch {
                published_at: Some(Some(now)),
                scheduled_at: None,
                updated_at: now,
            },
            Self::Unpublish => PublicationPatch {
                published_at: Some(None),
                scheduled_at: None,
                updated_at: now,
            },
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Schedule(_) => "schedule",
            Self::Publish => "publish",
            Self::Unpublish => "unpublish",
        }
    }
}

/// Single-row update of the publication fields.
///
/// `None` leaves a field untouched; `Some(value)` overwrites it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublicationPatch {
    pub published_at: Option<Option<DateTime<Utc>>>,
    pub scheduled_at: Option<Option<DateTime<Utc>>>,
    pub updated_at: DateTime<Utc>,
}

/// Reject a directly supplied `published_at` that lies in the future.
///
/// Future publication goes through `scheduled_at`.
pub fn validate_published_at(value: DateTime<Utc>, now: DateTime<Utc>) -> Result<(), DomainError> {
    if value > now {
        return Err(DomainError::Validation(
            "publishedAt must be a past date".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    fn now() -> DateTime<Utc> {
        "2024-06-01T12:00:00Z".parse().unwrap()
    }

    #[test]
    fn test_derive_table() {
        let now = now();
        let past = now - TimeDelta::days(1);
        let future = now + TimeDelta::days(1);

        assert_eq!(PublicationState::derive(None, None, now), PublicationState::Draft);
        assert_eq!(
            PublicationState::derive(None, Some(future), now),
            PublicationState::Scheduled { at: future }
        );
        assert_eq!(
            PublicationState::derive(Some(past), None, now),
            PublicationState::Published { at: past }
        );
        assert_eq!(
            PublicationState::derive(Some(past), Some(future), now),
            PublicationState::Published { at: past }
        );
    }

    #[test]
    fn test_due_schedule_reads_as_draft() {
        let now = now();
        assert_eq!(
            PublicationState::derive(None, Some(now), now),
            PublicationState::Draft
        );
        assert_eq!(
            PublicationState::derive(None, Some(now - TimeDelta::seconds(1)), now),
            PublicationState::Draft
        );
    }

    #[test]
    fn test_every_combination_has_one_status() {
        let now = now();
        let points = [
            None,
            Some(now - TimeDelta::days(1)),
            Some(now),
            Some(now + TimeDelta::days(1)),
        ];
        for published_at in points {
            for scheduled_at in points {
                let status = PublicationState::derive(published_at, scheduled_at, now).status();
                let expected = if published_at.is_some() {
                    PublicationStatus::Published
                } else if scheduled_at.is_some_and(|at| at > now) {
                    PublicationStatus::Scheduled
                } else {
                    PublicationStatus::Draft
                };
                assert_eq!(status, expected);
            }
        }
    }

    #[test]
    fn test_publish_then_read_is_published() {
        let now = now();
        let patch = Transition::Publish.patch(now);
        let state = PublicationState::derive(
            patch.published_at.flatten(),
            Some(now + TimeDelta::days(3)),
            now,
        );
        assert_eq!(state, PublicationState::Published { at: now });
    }

    #[test]
    fn test_unpublish_never_published() {
        let now = now();
        let patch = Transition::Unpublish.patch(now);
        assert_eq!(patch.published_at, Some(None));
        assert_eq!(patch.scheduled_at, None);

        for scheduled_at in [None, Some(now - TimeDelta::days(1)), Some(now + TimeDelta::days(1))] {
            let state = PublicationState::derive(None, scheduled_at, now);
            assert!(!state.is_published());
        }
    }

    #[test]
    fn test_schedule_only_touches_scheduled_at() {
        let now = now();
        let at = now + TimeDelta::hours(2);
        let patch = Transition::Schedule(Some(at)).patch(now);
        assert_eq!(patch.published_at, None);
        assert_eq!(patch.scheduled_at, Some(Some(at)));

        let clear = Transition::Schedule(None).patch(now);
        assert_eq!(clear.scheduled_at, Some(None));
    }

    #[test]
    fn test_validate_published_at() {
        let now = now();
        assert!(validate_published_at(now - TimeDelta::days(1), now).is_ok());
        assert!(validate_published_at(now, now).is_ok());

        let err = validate_published_at(now + TimeDelta::seconds(1), now).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn test_status_parse() {
        assert_eq!("Published".parse::<PublicationStatus>().unwrap(), PublicationStatus::Published);
        assert_eq!("draft".parse::<PublicationStatus>().unwrap(), PublicationStatus::Draft);
        assert!("archived".parse::<PublicationStatus>().is_err());
    }
}
