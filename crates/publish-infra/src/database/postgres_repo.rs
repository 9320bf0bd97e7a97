//! PostgreSQL post repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DbConn, DbErr, EntityTrait, QueryFilter, QueryOrder,
    UpdateMany,
};
use uuid::Uuid;

use publish_core::domain::{Post, PostPatch, PublicationPatch, PublicationStatus, Transition};
use publish_core::error::RepoError;
use publish_core::ports::{BaseRepository, PostQuery, PostRepository};

use super::entity::post::{self, Entity as PostEntity};

/// PostgreSQL post repository.
pub struct PostgresPostRepository {
    db: DbConn,
}

impl PostgresPostRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }
}

fn query_err(e: DbErr) -> RepoError {
    RepoError::Query(e.to_string())
}

fn write_err(e: DbErr) -> RepoError {
    let err_str = e.to_string();
    if err_str.contains("duplicate") || err_str.contains("unique") {
        RepoError::Constraint(err_str)
    } else {
        RepoError::Query(err_str)
    }
}

fn tz(at: DateTime<Utc>) -> sea_orm::prelude::DateTimeWithTimeZone {
    at.into()
}

/// SQL form of the derived publication state at `now`.
fn status_condition(status: PublicationStatus, now: DateTime<Utc>) -> Condition {
    match status {
        PublicationStatus::Published => Condition::all().add(post::Column::PublishedAt.is_not_null()),
        PublicationStatus::Scheduled => Condition::all()
            .add(post::Column::PublishedAt.is_null())
            .add(post::Column::ScheduledAt.gt(tz(now))),
        PublicationStatus::Draft => Condition::all()
            .add(post::Column::PublishedAt.is_null())
            .add(
                Condition::any()
                    .add(post::Column::ScheduledAt.is_null())
                    .add(post::Column::ScheduledAt.lte(tz(now))),
            ),
    }
}

/// Add the columns carried by a publication patch to `update`.
fn set_publication(
    mut update: UpdateMany<PostEntity>,
    patch: &PublicationPatch,
) -> UpdateMany<PostEntity> {
    update = update.col_expr(post::Column::UpdatedAt, Expr::value(tz(patch.updated_at)));
    if let Some(published_at) = patch.published_at {
        update = update.col_expr(
            post::Column::PublishedAt,
            Expr::value(published_at.map(tz)),
        );
    }
    if let Some(scheduled_at) = patch.scheduled_at {
        update = update.col_expr(
            post::Column::ScheduledAt,
            Expr::value(scheduled_at.map(tz)),
        );
    }
    update
}

#[async_trait]
impl BaseRepository<Post, Uuid> for PostgresPostRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        let result = PostEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(query_err)?;

        Ok(result.map(Into::into))
    }

    async fn save(&self, entity: Post) -> Result<Post, RepoError> {
        let exists = PostEntity::find_by_id(entity.id)
            .one(&self.db)
            .await
            .map_err(query_err)?
            .is_some();

        let active_model: post::ActiveModel = entity.into();
        let model = if exists {
            active_model.update(&self.db).await
        } else {
            active_model.insert(&self.db).await
        }
        .map_err(write_err)?;

        Ok(model.into())
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn find_by_slug_id(&self, slug_id: &str) -> Result<Option<Post>, RepoError> {
        let result = PostEntity::find()
            .filter(post::Column::SlugId.eq(slug_id))
            .one(&self.db)
            .await
            .map_err(query_err)?;

        Ok(result.map(Into::into))
    }

    async fn find_by_unique_id(&self, unique_id: &str) -> Result<Option<Post>, RepoError> {
        let result = PostEntity::find()
            .filter(post::Column::UniqueId.eq(unique_id))
            .one(&self.db)
            .await
            .map_err(query_err)?;

        Ok(result.map(Into::into))
    }

    async fn list(&self, query: &PostQuery, now: DateTime<Utc>) -> Result<Vec<Post>, RepoError> {
        let mut select = PostEntity::find();
        if let Some(status) = query.status {
            select = select.filter(status_condition(status, now));
        }
        if let Some(author_id) = query.author_id {
            select = select.filter(post::Column::AuthorId.eq(author_id));
        }

        let result = select
            .order_by_desc(post::Column::CreatedAt)
            .order_by_asc(post::Column::Id)
            .all(&self.db)
            .await
            .map_err(query_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn find_due(&self, now: DateTime<Utc>) -> Result<Vec<Post>, RepoError> {
        let result = PostEntity::find()
            .filter(post::Column::PublishedAt.is_null())
            .filter(post::Column::ScheduledAt.lte(tz(now)))
            .order_by_asc(post::Column::ScheduledAt)
            .all(&self.db)
            .await
            .map_err(query_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn update_publication(
        &self,
        id: Uuid,
        patch: PublicationPatch,
    ) -> Result<Post, RepoError> {
        let update = set_publication(
            PostEntity::update_many().filter(post::Column::Id.eq(id)),
            &patch,
        );

        let updated = update
            .exec_with_returning(&self.db)
            .await
            .map_err(write_err)?;

        updated
            .into_iter()
            .next()
            .map(Into::into)
            .ok_or(RepoError::NotFound)
    }

    async fn update_post(&self, id: Uuid, patch: PostPatch) -> Result<Post, RepoError> {
        let mut update = PostEntity::update_many().filter(post::Column::Id.eq(id));
        if let Some(title) = patch.title {
            update = update.col_expr(post::Column::Title, Expr::value(title));
        }
        if let Some(body) = patch.body {
            update = update.col_expr(post::Column::Body, Expr::value(body));
        }
        if let Some(slug) = patch.slug {
            update = update.col_expr(post::Column::Slug, Expr::value(slug));
        }

        let updated = set_publication(update, &patch.publication)
            .exec_with_returning(&self.db)
            .await
            .map_err(write_err)?;

        updated
            .into_iter()
            .next()
            .map(Into::into)
            .ok_or(RepoError::NotFound)
    }

    async fn publish_if_due(
        &self,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<Post>, RepoError> {
        let update = PostEntity::update_many()
            .filter(post::Column::Id.eq(id))
            .filter(post::Column::PublishedAt.is_null())
            .filter(post::Column::ScheduledAt.lte(tz(now)));

        let updated = set_publication(update, &Transition::Publish.patch(now))
            .exec_with_returning(&self.db)
            .await
            .map_err(write_err)?;

        Ok(updated.into_iter().next().map(Into::into))
    }
}
