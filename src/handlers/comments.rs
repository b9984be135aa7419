use axum::{
    Form,
    extract::{Query, State},
    response::Json,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::{
    AppState,
    auth::AuthUser,
    error::Result,
    models::{CommentResponse, CommentSummary, CommentVoteForm, CreateCommentForm},
    services::{comment_service, vote_service},
};

#[derive(Debug, Deserialize)]
pub struct ListCommentsQuery {
    pub image_id: Uuid,
}

pub async fn create_comment(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Form(payload): Form<CreateCommentForm>,
) -> Result<Json<CommentResponse>> {
    payload.validate()?;

    let comment = comment_service::create_comment(
        &state.db,
        &payload.text,
        auth_user.user_id,
        payload.image_id,
    )
    .await?;

    Ok(Json(comment))
}

pub async fn list_comments(
    State(state): State<AppState>,
    Query(params): Query<ListCommentsQuery>,
) -> Result<Json<Vec<CommentResponse>>> {
    let comments = comment_service::list_comments(&state.db, params.image_id).await?;

    Ok(Json(comments))
}

pub async fn vote_comment(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Form(payload): Form<CommentVoteForm>,
) -> Result<Json<CommentSummary>> {
    let comment = vote_service::cast_comment_vote(
        &state.db,
        auth_user.user_id,
        payload.comment_id,
        payload.is_upvote.into(),
    )
    .await?;

    Ok(Json(CommentSummary::from(comment)))
}
