//! Decision Room endpoints: bulletins and Q&A threads

use axum::extract::multipart::MultipartError;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::Response;
use chrono::Utc;
use serde::Deserialize;
use tracing::info;

use crate::api::envelope::{ApiError, ApiResponse};
use crate::api::extract::{AuthUser, JsonBody};
use crate::api::ApiState;
use crate::auth::validate_post;
use crate::types::{Attachment, NewPost, Post, PostCategory, PostPatch, PostStatus};
use crate::view::{self, ListQuery, SortMode, StatusFilter};

fn parse_category(raw: &str) -> Result<PostCategory, ApiError> {
    raw.parse::<PostCategory>().map_err(ApiError::BadRequest)
}

fn multipart_error(e: MultipartError) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge(e.body_text())
    } else {
        ApiError::BadRequest(e.body_text())
    }
}

fn not_found(id: &str) -> ApiError {
    ApiError::NotFound(format!("Post '{id}' not found"))
}

/// Authors edit their own posts; admins edit anything. Authorship is by
/// user id: display names are not unique.
fn require_owner(auth: &AuthUser, post: &Post) -> Result<(), ApiError> {
    if auth.is_admin() || post.is_authored_by(&auth.user) {
        Ok(())
    } else {
        Err(ApiError::Forbidden("Only the author or an admin can change this post".to_string()))
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct PostListQuery {
    pub q: Option<String>,
    pub status: Option<PostStatus>,
    pub author: Option<String>,
    pub sort: Option<SortMode>,
}

/// GET /api/posts/:category?q=&status=&author=&sort=
pub async fn list_posts(
    State(state): State<ApiState>,
    Path(category): Path<String>,
    query: Result<Query<PostListQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let category = parse_category(&category)?;
    let Query(query) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let all = state.posts.list(category)?;
    let list_query = ListQuery {
        search_text: query.q.unwrap_or_default(),
        status_filter: query.status.map(StatusFilter::Post),
        author_filter: query.author.filter(|a| !a.is_empty()),
        category_filter: None,
        sort_mode: query.sort.unwrap_or(SortMode::RecentFirst),
    };
    let visible: Vec<Post> = view::apply(&all, &list_query).into_iter().cloned().collect();
    Ok(ApiResponse::ok(visible))
}

/// POST /api/posts/:category
pub async fn create_post(
    State(state): State<ApiState>,
    Path(category): Path<String>,
    auth: AuthUser,
    JsonBody(req): JsonBody<NewPost>,
) -> Result<Response, ApiError> {
    let category = parse_category(&category)?;
    auth.require_writer()?;
    validate_post(&req, state.config.auth.max_post_title_len)?;

    let now = Utc::now();
    let post = Post {
        id: uuid::Uuid::new_v4().to_string(),
        category,
        title: req.title.trim().to_string(),
        body: req.body,
        author: auth.user.name.clone(),
        author_id: auth.user.id.clone(),
        tags: req.tags,
        status: PostStatus::Open,
        created_at: now,
        updated_at: now,
        answers: Vec::new(),
        attachments: Vec::new(),
    };
    state.posts.insert(&post)?;
    info!(id = %post.id, category = category.as_str(), author = %post.author, "Post created");
    Ok(ApiResponse::created(post))
}

/// GET /api/posts/:category/:id
pub async fn get_post(
    State(state): State<ApiState>,
    Path((category, id)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    let category = parse_category(&category)?;
    state
        .posts
        .get(category, &id)?
        .map(ApiResponse::ok)
        .ok_or_else(|| not_found(&id))
}

/// PATCH /api/posts/:category/:id
///
/// Any writer may answer; other fields need the author or an admin.
pub async fn update_post(
    State(state): State<ApiState>,
    Path((category, id)): Path<(String, String)>,
    auth: AuthUser,
    JsonBody(patch): JsonBody<PostPatch>,
) -> Result<Response, ApiError> {
    let category = parse_category(&category)?;
    auth.require_writer()?;
    let mut post = state.posts.get(category, &id)?.ok_or_else(|| not_found(&id))?;

    let edits_content =
        patch.title.is_some() || patch.body.is_some() || patch.tags.is_some() || patch.status.is_some();
    if edits_content {
        require_owner(&auth, &post)?;
    }

    post.apply(patch, &auth.user, Utc::now());
    validate_post(
        &NewPost {
            title: post.title.clone(),
            body: post.body.clone(),
            tags: post.tags.clone(),
        },
        state.config.auth.max_post_title_len,
    )?;
    state.posts.replace(&post)?;
    Ok(ApiResponse::ok(post))
}

/// DELETE /api/posts/:category/:id
pub async fn delete_post(
    State(state): State<ApiState>,
    Path((category, id)): Path<(String, String)>,
    auth: AuthUser,
) -> Result<Response, ApiError> {
    let category = parse_category(&category)?;
    auth.require_writer()?;
    let post = state.posts.get(category, &id)?.ok_or_else(|| not_found(&id))?;
    require_owner(&auth, &post)?;

    state.posts.delete(category, &id)?;
    info!(%id, by = %auth.user.name, "Post deleted");
    Ok(ApiResponse::ok(serde_json::json!({ "id": id, "deleted": true })))
}

/// POST /api/posts/:post_id/files - multipart field `file`
pub async fn upload_file(
    State(state): State<ApiState>,
    Path(post_id): Path<String>,
    auth: AuthUser,
    mut multipart: Multipart,
) -> Result<Response, ApiError> {
    auth.require_writer()?;
    let mut post = state.posts.find(&post_id)?.ok_or_else(|| not_found(&post_id))?;
    let upload = &state.config.upload;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(multipart_error)?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or("upload.bin").to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        if !upload.allowed_content_types.is_empty()
            && !upload.allowed_content_types.iter().any(|t| t == &content_type)
        {
            return Err(ApiError::BadRequest(format!("Content type '{content_type}' is not allowed")));
        }

        let bytes = field
            .bytes()
            .await
            .map_err(multipart_error)?;
        if bytes.len() > upload.max_file_bytes {
            return Err(ApiError::PayloadTooLarge(format!(
                "File exceeds {} bytes",
                upload.max_file_bytes
            )));
        }

        let attachment = Attachment {
            id: uuid::Uuid::new_v4().to_string(),
            file_name,
            content_type,
            size_bytes: bytes.len() as u64,
            uploaded_at: Utc::now(),
        };
        state.posts.put_attachment(&attachment.id, &bytes)?;
        post.attachments.push(attachment.clone());
        post.updated_at = attachment.uploaded_at;
        state.posts.replace(&post)?;
        info!(post = %post.id, file = %attachment.file_name, size = attachment.size_bytes, "Attachment stored");
        return Ok(ApiResponse::created(attachment));
    }

    Err(ApiError::BadRequest("Missing multipart field 'file'".to_string()))
}
