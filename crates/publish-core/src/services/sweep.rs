//! Promotion of due scheduled posts.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use serde::Serialize;
use uuid::Uuid;

use super::PublicationService;
use crate::error::DomainError;
use crate::ports::{Clock, PostRepository};

#[derive(Debug, Clone)]
pub struct SweepConfig {
    /// Maximum number of promotions in flight.
    pub concurrency: usize,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self { concurrency: 8 }
    }
}

impl SweepConfig {
    pub fn from_env() -> Self {
        Self {
            concurrency: std::env::var("SWEEP_CONCURRENCY")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|n: &usize| *n > 0)
                .unwrap_or(8),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SweepFailure {
    pub post_id: Uuid,
    pub error: String,
}

/// Outcome of one sweep.
#[derive(Debug, Clone, Serialize)]
pub struct SweepReport {
    /// Reference time used for every comparison in the sweep.
    pub started_at: DateTime<Utc>,
    pub published: Vec<Uuid>,
    /// Selected as due but no longer due when the write landed.
    pub skipped: Vec<Uuid>,
    pub failed: Vec<SweepFailure>,
}

impl SweepReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Externally triggered sweep. Owns no timer; callers decide when to run it.
pub struct SchedulerSweep {
    posts: Arc<dyn PostRepository>,
    publication: PublicationService,
    clock: Arc<dyn Clock>,
    config: SweepConfig,
}

impl SchedulerSweep {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        publication: PublicationService,
        clock: Arc<dyn Clock>,
        config: SweepConfig,
    ) -> Self {
        Self {
            posts,
            publication,
            clock,
            config,
        }
    }

    /// Publish every unpublished post whose `scheduled_at` has passed.
    ///
    /// "Now" is read once. A failed promotion is recorded and does not stop
    /// the others; only a failure to list due posts fails the sweep.
    pub async fn run(&self) -> Result<SweepReport, DomainError> {
        let now = self.clock.now();
        let due = self.posts.find_due(now).await?;
        tracing::debug!(due = due.len(), at = %now, "Sweeping scheduled posts");

        let publication = &self.publication;
        let outcomes: Vec<(Uuid, Result<Option<_>, DomainError>)> = stream::iter(due)
            .map(move |post| async move { (post.id, publication.publish_due(post.id, now).await) })
            .buffer_unordered(self.config.concurrency.max(1))
            .collect()
            .await;

        let mut report = SweepReport {
            started_at: now,
            published: Vec::new(),
            skipped: Vec::new(),
            failed: Vec::new(),
        };
        for (post_id, outcome) in outcomes {
            match outcome {
                Ok(Some(_)) => report.published.push(post_id),
                Ok(None) => report.skipped.push(post_id),
                Err(e) => {
                    tracing::warn!(post_id = %post_id, error = %e, "Scheduled publish failed");
                    report.failed.push(SweepFailure {
                        post_id,
                        error: e.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            published = report.published.len(),
            skipped = report.skipped.len(),
            failed = report.failed.len(),
            "Sweep finished"
        );
        Ok(report)
    }
}
