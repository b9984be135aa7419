use axum::{Form, extract::State, response::Json};
use serde_json::{Value, json};
use validator::Validate;

use crate::{
    AppState,
    auth::AuthUser,
    error::Result,
    models::{AuthResponse, CredentialsForm},
    services::auth_service,
};

pub async fn signup(
    State(state): State<AppState>,
    Form(payload): Form<CredentialsForm>,
) -> Result<Json<AuthResponse>> {
    payload.validate()?;

    let (token, user) = auth_service::register(
        &state.db,
        &state.sessions,
        &state.config,
        &payload.username,
        &payload.password,
    )
    .await?;

    tracing::info!("new user registered: {}", user.username);

    Ok(Json(AuthResponse {
        token,
        user: user.into(),
    }))
}

pub async fn login(
    State(state): State<AppState>,
    Form(payload): Form<CredentialsForm>,
) -> Result<Json<AuthResponse>> {
    payload.validate()?;

    let (token, user) = auth_service::authenticate(
        &state.db,
        &state.sessions,
        &state.config,
        &payload.username,
        &payload.password,
    )
    .await?;

    Ok(Json(AuthResponse {
        token,
        user: user.into(),
    }))
}

pub async fn logout(State(state): State<AppState>, auth_user: AuthUser) -> Result<Json<Value>> {
    auth_service::logout(&state.sessions, &auth_user.jti).await?;

    Ok(Json(json!({
        "message": "Logged out successfully"
    })))
}
