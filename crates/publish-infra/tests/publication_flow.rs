//! End-to-end publication flows over the in-memory store.

use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use uuid::Uuid;

use publish_core::domain::{PostInput, Principal, PublicationStatus};
use publish_core::ports::{Clock, PostRepository};
use publish_core::services::{PostService, PublicationService, SchedulerSweep, SweepConfig};
use publish_infra::{FixedClock, InMemoryPostRepository};

struct Harness {
    clock: Arc<FixedClock>,
    repo: Arc<InMemoryPostRepository>,
    posts: PostService,
    publication: PublicationService,
    sweep: SchedulerSweep,
}

fn harness() -> Harness {
    let start: DateTime<Utc> = "2024-06-01T12:00:00Z".parse().unwrap();
    let clock = Arc::new(FixedClock::new(start));
    let repo = Arc::new(InMemoryPostRepository::new());

    let store: Arc<dyn PostRepository> = repo.clone();
    let time: Arc<dyn Clock> = clock.clone();
    let publication = PublicationService::new(store.clone(), time.clone());

    Harness {
        posts: PostService::new(store.clone(), time.clone()),
        sweep: SchedulerSweep::new(store, publication.clone(), time, SweepConfig::default()),
        publication,
        clock,
        repo,
    }
}

fn titled(title: &str) -> PostInput {
    PostInput {
        title: Some(title.to_string()),
        ..Default::default()
    }
}

#[tokio::test]
async fn scheduled_post_goes_live_once_due() {
    let h = harness();
    let editor = Principal::editor(Uuid::new_v4());
    let post = h.posts.create(&editor, titled("Release")).await.unwrap();

    let at = h.clock.now() + TimeDelta::hours(2);
    h.publication.schedule(&editor, post.id, Some(at)).await.unwrap();

    let report = h.sweep.run().await.unwrap();
    assert!(report.published.is_empty());
    assert_eq!(
        h.posts.get(post.id).await.unwrap().state_at(h.clock.now()).status(),
        PublicationStatus::Scheduled
    );

    h.clock.advance(TimeDelta::hours(3));
    let report = h.sweep.run().await.unwrap();
    assert_eq!(report.published, vec![post.id]);

    let live = h.posts.get(post.id).await.unwrap();
    assert_eq!(live.published_at, Some(h.clock.now()));
    assert_eq!(live.scheduled_at, Some(at));
}

#[tokio::test]
async fn author_cannot_publish_through_create() {
    let h = harness();
    let author = Principal::author(Uuid::new_v4());
    let input = PostInput {
        published_at: Some(Some("2099-01-01T00:00:00Z".parse().unwrap())),
        ..titled("x")
    };

    let post = h.posts.create(&author, input).await.unwrap();
    let stored = h.posts.get(post.id).await.unwrap();
    assert_eq!(stored.published_at, None);
    assert_eq!(h.repo.len().await, 1);
}

#[tokio::test]
async fn manual_publish_before_schedule_keeps_stale_schedule() {
    let h = harness();
    let editor = Principal::editor(Uuid::new_v4());
    let post = h.posts.create(&editor, titled("Early")).await.unwrap();
    let at = h.clock.now() + TimeDelta::days(1);

    h.publication.schedule(&editor, post.id, Some(at)).await.unwrap();
    let published = h.publication.publish(&editor, post.id).await.unwrap();

    assert_eq!(published.scheduled_at, Some(at));
    assert_eq!(
        published.state_at(h.clock.now()).status(),
        PublicationStatus::Published
    );

    // Already published: the sweep leaves it alone once the schedule passes.
    h.clock.advance(TimeDelta::days(2));
    let report = h.sweep.run().await.unwrap();
    assert!(report.published.is_empty());
}

// Unpublish leaves scheduled_at in place, so a post whose schedule has
// already passed is picked up again by the next sweep.
#[tokio::test]
async fn unpublished_post_with_past_schedule_is_swept_again() {
    let h = harness();
    let editor = Principal::editor(Uuid::new_v4());
    let post = h.posts.create(&editor, titled("Sticky")).await.unwrap();

    h.publication
        .schedule(&editor, post.id, Some(h.clock.now() - TimeDelta::minutes(1)))
        .await
        .unwrap();
    h.sweep.run().await.unwrap();

    let draft = h.publication.unpublish(&editor, post.id).await.unwrap();
    assert!(!draft.state_at(h.clock.now()).is_published());

    let report = h.sweep.run().await.unwrap();
    assert_eq!(report.published, vec![post.id]);

    // Clearing the schedule first makes the unpublish stick.
    h.publication.schedule(&editor, post.id, None).await.unwrap();
    h.publication.unpublish(&editor, post.id).await.unwrap();
    assert!(h.sweep.run().await.unwrap().published.is_empty());
}

// Concurrent publish/unpublish on one post has no compare-and-swap: whichever
// write lands last wins, and the post is left in one of the two end states.
#[tokio::test]
async fn concurrent_publish_and_unpublish_is_last_write_wins() {
    let h = harness();
    let editor = Principal::editor(Uuid::new_v4());
    let post = h.posts.create(&editor, titled("Race")).await.unwrap();

    let (published, unpublished) = tokio::join!(
        h.publication.publish(&editor, post.id),
        h.publication.unpublish(&editor, post.id),
    );
    published.unwrap();
    unpublished.unwrap();

    let end = h.posts.get(post.id).await.unwrap();
    assert!(end.published_at.is_none() || end.published_at == Some(h.clock.now()));
}

#[tokio::test]
async fn author_edit_racing_the_sweep_keeps_the_publish() {
    let h = harness();
    let editor = Principal::editor(Uuid::new_v4());
    let author = Principal::author(Uuid::new_v4());
    let post = h.posts.create(&author, titled("Draft title")).await.unwrap();
    h.publication
        .schedule(&editor, post.id, Some(h.clock.now() - TimeDelta::minutes(1)))
        .await
        .unwrap();

    let (edited, report) = tokio::join!(
        h.posts.update(&author, post.id, titled("typo fix")),
        h.sweep.run(),
    );
    edited.unwrap();
    assert_eq!(report.unwrap().published, vec![post.id]);

    let end = h.posts.get(post.id).await.unwrap();
    assert_eq!(end.title, "typo fix");
    assert_eq!(end.published_at, Some(h.clock.now()));
}
