//! Publication endpoints and the scheduler sweep trigger.

use actix_web::{HttpResponse, web};

use publish_shared::dto::{DataRequest, ScheduleRequest, SweepFailureDetail, SweepSummary};

use super::posts::{parse_post_id, post_response};
use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// PATCH /api/posts/{id}/schedule
pub async fn schedule(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<String>,
    body: web::Json<DataRequest<ScheduleRequest>>,
) -> AppResult<HttpResponse> {
    let id = parse_post_id(&path)?;
    let scheduled_at = body.into_inner().data.scheduled_at;

    let post = state
        .publication
        .schedule(&identity.0, id, scheduled_at)
        .await?;

    Ok(HttpResponse::Ok().json(post_response(post, state.clock.now())))
}

/// PATCH /api/posts/{id}/publish
pub async fn publish(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = parse_post_id(&path)?;
    let post = state.publication.publish(&identity.0, id).await?;

    Ok(HttpResponse::Ok().json(post_response(post, state.clock.now())))
}

/// PATCH /api/posts/{id}/unpublish
pub async fn unpublish(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = parse_post_id(&path)?;
    let post = state.publication.unpublish(&identity.0, id).await?;

    Ok(HttpResponse::Ok().json(post_response(post, state.clock.now())))
}

/// GET /api/posts/check-and-publish
///
/// Unauthenticated; meant for an external cron. Idempotent, so repeated or
/// overlapping calls are harmless.
pub async fn check_and_publish(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let report = state.sweep.run().await?;

    let summary = SweepSummary {
        checked_at: report.started_at,
        published: report.published.len(),
        skipped: report.skipped.len(),
        failed: report.failed.len(),
        published_ids: report.published.iter().map(ToString::to_string).collect(),
        failures: report
            .failed
            .into_iter()
            .map(|f| SweepFailureDetail {
                id: f.post_id.to_string(),
                error: f.error,
            })
            .collect(),
    };

    Ok(HttpResponse::Ok().json(summary))
}
