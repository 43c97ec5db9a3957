use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use chrono::Duration;
use serde_json::json;
use tower_sessions::Session;
use crate::errors::AppResult;
use crate::middleware::SESSION_USER;
use crate::models::{Credentials, ForgotPasswordForm, ResetPasswordForm, UserView};
use crate::services::accounts;
use crate::state::AppState;
use super::extract::Json;

pub async fn api_status() -> &'static str {
    "API is running..."
}

pub async fn handle_signup(
    State(state): State<AppState>,
    Json(credentials): Json<Credentials>,
) -> AppResult<Response> {
    let user = accounts::signup(state.store(), credentials).await?;
    Ok((StatusCode::CREATED, Json(UserView::from(&user))).into_response())
}

#[axum::debug_handler]
pub async fn handle_login(
    State(state): State<AppState>,
    session: Session,
    Json(credentials): Json<Credentials>,
) -> AppResult<Response> {
    tracing::info!("Login attempt for user: {}", credentials.username);

    let user = accounts::verify_login(state.store(), &credentials).await?;
    session.insert(SESSION_USER, user.username.clone()).await?;

    tracing::info!("Password verified for user: {}", user.username);
    Ok(Redirect::to(&state.config.auth.login_redirect).into_response())
}

pub async fn handle_logout(session: Session) -> AppResult<StatusCode> {
    session.remove::<String>(SESSION_USER).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn handle_forgot_password(
    State(state): State<AppState>,
    Json(form): Json<ForgotPasswordForm>,
) -> AppResult<Response> {
    let ttl = Duration::seconds(state.config.auth.reset_token_ttl_secs);
    let (token, expiry) = accounts::issue_reset_token(state.store(), &form.username, ttl).await?;

    Ok(Json(json!({
        "message": "Password reset token issued",
        "resetToken": token,
        "resetTokenExpiry": expiry,
    }))
    .into_response())
}

pub async fn handle_reset_password(
    State(state): State<AppState>,
    Json(form): Json<ResetPasswordForm>,
) -> AppResult<Response> {
    accounts::reset_password(state.store(), &form.token, &form.new_password).await?;
    Ok(Json(json!({ "message": "Password has been reset successfully" })).into_response())
}
