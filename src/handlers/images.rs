use axum::{
    Form,
    extract::{Multipart, Query, State},
    response::Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    AppState,
    auth::AuthUser,
    error::{AppError, Result},
    models::{ImageListItem, ImageResponse, ImageVoteForm},
    services::{image_service, upload_service, vote_service},
};

#[derive(Debug, Deserialize)]
pub struct GetImageQuery {
    pub image_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct ListImagesQuery {
    pub is_featured: Option<bool>,
}

pub async fn create_image(
    State(state): State<AppState>,
    auth_user: AuthUser,
    mut multipart: Multipart,
) -> Result<Json<ImageResponse>> {
    let upload = extract_upload(&mut multipart).await?;

    if upload.data.len() > state.config.max_file_size {
        return Err(AppError::BadUpload("file too large".to_string()));
    }

    if !upload_service::is_allowed_extension(&upload.filename) {
        return Err(AppError::BadUpload("file type not allowed".to_string()));
    }

    let storage_filename = upload_service::generate_storage_filename(&upload.filename)?;

    let stored_path =
        upload_service::store(&upload.data, &storage_filename, &state.config.upload_dir)
            .await
            .map_err(|e| {
                tracing::error!("upload store failed: {}", e);
                AppError::BadUpload("failed to store file".to_string())
            })?;

    // The record and the file stand or fall together: a failed insert
    // removes the file so no orphan remains published.
    let image = match image_service::create_image(
        &state.db,
        &storage_filename,
        upload.title.as_deref(),
        upload.description.as_deref(),
    )
    .await
    {
        Ok(image) => image,
        Err(e) => {
            if let Err(cleanup) = tokio::fs::remove_file(&stored_path).await {
                tracing::warn!("failed to remove {}: {}", stored_path.display(), cleanup);
            }
            return Err(e);
        }
    };

    tracing::info!(
        "image {} uploaded by {} as {}",
        image.id,
        auth_user.username,
        storage_filename
    );

    Ok(Json(ImageResponse::from(image)))
}

pub async fn get_image(
    State(state): State<AppState>,
    Query(params): Query<GetImageQuery>,
) -> Result<Json<ImageResponse>> {
    let image_id = params
        .image_id
        .ok_or_else(|| AppError::MissingParam("image_id".to_string()))?;

    let image = image_service::get_image(&state.db, image_id)
        .await?
        .ok_or_else(|| AppError::NotFound("image not found".to_string()))?;

    Ok(Json(ImageResponse::from(image)))
}

pub async fn list_images(
    State(state): State<AppState>,
    Query(params): Query<ListImagesQuery>,
) -> Result<Json<Vec<ImageListItem>>> {
    let featured_only = params.is_featured.unwrap_or(false);
    let images = image_service::list_images(&state.db, featured_only).await?;

    Ok(Json(images))
}

pub async fn vote_image(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Form(payload): Form<ImageVoteForm>,
) -> Result<Json<ImageResponse>> {
    let image = vote_service::cast_image_vote(
        &state.db,
        auth_user.user_id,
        payload.image_id,
        payload.is_upvote.into(),
    )
    .await?;

    Ok(Json(ImageResponse::from(image)))
}

struct NewImageUpload {
    filename: String,
    data: Vec<u8>,
    title: Option<String>,
    description: Option<String>,
}

async fn extract_upload(multipart: &mut Multipart) -> Result<NewImageUpload> {
    let mut filename = String::new();
    let mut data = Vec::new();
    let mut title = None;
    let mut description = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadUpload(format!("malformed multipart body: {}", e)))?
    {
        match field.name() {
            Some("file") => {
                filename = field.file_name().unwrap_or("unknown").to_string();
                data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadUpload(format!("failed to read file: {}", e)))?
                    .to_vec();
            }
            Some("title") => {
                title = Some(field.text().await.map_err(|e| {
                    AppError::BadUpload(format!("failed to read title: {}", e))
                })?);
            }
            Some("description") => {
                description = Some(field.text().await.map_err(|e| {
                    AppError::BadUpload(format!("failed to read description: {}", e))
                })?);
            }
            _ => continue,
        }
    }

    if filename.is_empty() || data.is_empty() {
        return Err(AppError::BadUpload("no file provided".to_string()));
    }

    Ok(NewImageUpload {
        filename,
        data,
        title,
        description,
    })
}
