use std::sync::Arc;

use axum::{
    extract::Path,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Extension, Json, Router,
};

use crate::{
    extractors::JsonBody,
    middleware::{auth, AuthenticatedUser},
    models::{
        posts::{CreateCommentDto, CreatePostDto},
        response::MessageResponse,
    },
    AppState, Error, Result,
};

pub fn posts_handler() -> Router {
    Router::new()
        .route("/", post(create_post).get(get_posts))
        .route("/{post_id}", get(get_post).delete(delete_post))
        .route("/likes/{post_id}", put(like_post).delete(unlike_post))
        .route("/comments/{post_id}", post(add_comment))
        .route("/comments/{post_id}/{comment_id}", delete(delete_comment))
        .layer(middleware::from_fn(auth))
}

async fn create_post(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(caller): Extension<AuthenticatedUser>,
    JsonBody(new_post): JsonBody<CreatePostDto>,
) -> Result<impl IntoResponse> {
    let post = app_state
        .posts_service
        .create_post(caller.user_id, new_post)
        .await?;

    Ok((StatusCode::OK, Json(post)))
}

async fn get_posts(Extension(app_state): Extension<Arc<AppState>>) -> Result<impl IntoResponse> {
    let posts = app_state.posts_service.get_posts().await?;
    Ok((StatusCode::OK, Json(posts)))
}

async fn get_post(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(post_id): Path<String>,
) -> Result<Response> {
    match app_state.posts_service.get_post(&post_id).await {
        Ok(post) => Ok(Json(post).into_response()),
        // The web client expects a 200 with a marker body for unknown posts.
        Err(Error::NotFound(msg)) => {
            Ok((StatusCode::OK, Json(MessageResponse::new(msg))).into_response())
        }
        Err(err) => Err(err),
    }
}

async fn delete_post(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(caller): Extension<AuthenticatedUser>,
    Path(post_id): Path<String>,
) -> Result<impl IntoResponse> {
    app_state
        .posts_service
        .delete_post(caller.user_id, &post_id)
        .await?;

    Ok(Json(MessageResponse::new("post deleted")))
}

async fn like_post(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(caller): Extension<AuthenticatedUser>,
    Path(post_id): Path<String>,
) -> Result<impl IntoResponse> {
    app_state
        .posts_service
        .like_post(caller.user_id, &post_id)
        .await?;

    Ok(Json(MessageResponse::new("Post Liked!")))
}

async fn unlike_post(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(caller): Extension<AuthenticatedUser>,
    Path(post_id): Path<String>,
) -> Result<impl IntoResponse> {
    app_state
        .posts_service
        .unlike_post(caller.user_id, &post_id)
        .await?;

    Ok(Json(MessageResponse::new("like removed")))
}

async fn add_comment(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(caller): Extension<AuthenticatedUser>,
    Path(post_id): Path<String>,
    JsonBody(new_comment): JsonBody<CreateCommentDto>,
) -> Result<impl IntoResponse> {
    app_state
        .posts_service
        .add_comment(caller.user_id, &post_id, new_comment)
        .await?;

    Ok(Json(MessageResponse::new("Comment Saved")))
}

async fn delete_comment(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(caller): Extension<AuthenticatedUser>,
    Path((post_id, comment_id)): Path<(String, String)>,
) -> Result<impl IntoResponse> {
    app_state
        .posts_service
        .delete_comment(caller.user_id, &post_id, &comment_id)
        .await
        .map_err(|err| match err {
            // This route has always answered ownership failures with 404.
            Error::Forbidden(msg) => Error::NotFound(msg),
            err => err,
        })?;

    Ok(Json(MessageResponse::new("Comment Deleted!")))
}
