//! Generic post endpoints: create, update, fetch, list.

use actix_web::{HttpResponse, web};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use publish_core::domain::{
    Post, PostInput, Principal, PublicationStatus, is_valid_slug_id, is_valid_unique_id,
};
use publish_core::ports::PostQuery;
use publish_shared::DataResponse;
use publish_shared::dto::{DataRequest, Entity, PostAttributes, PostListQuery, PostWrite};

use crate::middleware::auth::{Identity, OptionalIdentity};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// Parse a post id from the path. Malformed ids are a 400, not a 404.
pub(crate) fn parse_post_id(raw: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| AppError::BadRequest(format!("malformed post id '{raw}'")))
}

/// `{ id, attributes }` view of a post, with its status at `now`.
pub(crate) fn post_entity(post: Post, now: DateTime<Utc>) -> Entity<PostAttributes> {
    let status = post.state_at(now).status();
    Entity {
        id: post.id.to_string(),
        attributes: PostAttributes {
            title: post.title,
            body: post.body,
            slug: post.slug,
            slug_id: post.slug_id,
            unique_id: post.unique_id,
            author: post.author_id.to_string(),
            status: status.to_string(),
            published_at: post.published_at,
            scheduled_at: post.scheduled_at,
            created_at: post.created_at,
            updated_at: post.updated_at,
        },
    }
}

pub(crate) fn post_response(post: Post, now: DateTime<Utc>) -> DataResponse<Entity<PostAttributes>> {
    DataResponse::new(post_entity(post, now))
}

fn into_input(write: PostWrite) -> PostInput {
    PostInput {
        title: write.title,
        body: write.body,
        slug: write.slug,
        slug_id: write.slug_id,
        published_at: write.published_at,
        scheduled_at: write.scheduled_at,
    }
}

/// Anonymous readers only see published posts; anything else is hidden as 404.
fn visible_to(post: &Post, viewer: Option<&Principal>, now: DateTime<Utc>) -> bool {
    viewer.is_some() || post.state_at(now).is_published()
}

async fn respond_with_post(
    state: &AppState,
    id: Option<Uuid>,
    viewer: Option<&Principal>,
    lookup: &str,
) -> AppResult<HttpResponse> {
    let not_found = || AppError::NotFound(format!("no post matches '{lookup}'"));

    let id = id.ok_or_else(not_found)?;
    let post = state.posts.get(id).await?;
    let now = state.clock.now();
    if !visible_to(&post, viewer, now) {
        return Err(not_found());
    }

    Ok(HttpResponse::Ok().json(post_response(post, now)))
}

/// POST /api/posts
pub async fn create(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<DataRequest<PostWrite>>,
) -> AppResult<HttpResponse> {
    let input = into_input(body.into_inner().data);
    let post = state.posts.create(&identity.0, input).await?;

    Ok(HttpResponse::Created().json(post_response(post, state.clock.now())))
}

/// PUT /api/posts/{id}
pub async fn update(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<String>,
    body: web::Json<DataRequest<PostWrite>>,
) -> AppResult<HttpResponse> {
    let id = parse_post_id(&path)?;
    let input = into_input(body.into_inner().data);
    let post = state.posts.update(&identity.0, id, input).await?;

    Ok(HttpResponse::Ok().json(post_response(post, state.clock.now())))
}

/// GET /api/posts/{id}
pub async fn find_one(
    state: web::Data<AppState>,
    viewer: OptionalIdentity,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = parse_post_id(&path)?;
    respond_with_post(&state, Some(id), viewer.0.as_ref(), &path).await
}

/// GET /api/posts/slug/{slug_id}
pub async fn find_one_by_slug_id(
    state: web::Data<AppState>,
    viewer: OptionalIdentity,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let slug_id = path.into_inner();
    if !is_valid_slug_id(&slug_id) {
        return Err(AppError::BadRequest(format!("malformed slug id '{slug_id}'")));
    }

    let id = state.posts.find_id_by_slug_id(&slug_id).await?;
    respond_with_post(&state, id, viewer.0.as_ref(), &slug_id).await
}

/// GET /api/posts/uid/{unique_id}
pub async fn find_one_by_unique_id(
    state: web::Data<AppState>,
    viewer: OptionalIdentity,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let unique_id = path.into_inner();
    if !is_valid_unique_id(&unique_id) {
        return Err(AppError::BadRequest(format!(
            "malformed unique id '{unique_id}'"
        )));
    }

    let id = state.posts.find_id_by_unique_id(&unique_id).await?;
    respond_with_post(&state, id, viewer.0.as_ref(), &unique_id).await
}

/// GET /api/posts?status=draft|scheduled|published&author={uuid}
pub async fn list(
    state: web::Data<AppState>,
    viewer: OptionalIdentity,
    query: web::Query<PostListQuery>,
) -> AppResult<HttpResponse> {
    let query = query.into_inner();

    let status = query
        .status
        .as_deref()
        .map(str::parse::<PublicationStatus>)
        .transpose()?;
    let author_id = query
        .author
        .as_deref()
        .map(|raw| {
            Uuid::parse_str(raw)
                .map_err(|_| AppError::BadRequest(format!("malformed author id '{raw}'")))
        })
        .transpose()?;

    let status = match viewer.0 {
        Some(_) => status,
        None if status.is_none_or(|s| s == PublicationStatus::Published) => {
            Some(PublicationStatus::Published)
        }
        None => return Err(AppError::Unauthorized("sign in to list unpublished posts".to_string())),
    };

    let posts = state.posts.list(&PostQuery { status, author_id }).await?;
    let now = state.clock.now();
    let data: Vec<_> = posts.into_iter().map(|p| post_entity(p, now)).collect();

    Ok(HttpResponse::Ok().json(DataResponse::new(data)))
}
