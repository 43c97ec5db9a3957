use axum::{
    middleware::Next,
    response::{IntoResponse, Response},
    extract::Request,
    body::Body,
};
use tower_sessions::Session;
use crate::errors::AppError;

pub const SESSION_USER: &str = "user_session";

const PUBLIC_PATHS: &[&str] = &[
    "/",
    "/api/signup",
    "/api/login",
    "/api/logout",
    "/api/forgotpassword",
    "/api/resetpassword",
];

pub async fn require_auth(
    session: Session,
    req: Request<Body>,
    next: Next,
) -> Response {
    let path = req.uri().path();

    if PUBLIC_PATHS.contains(&path) {
        return next.run(req).await;
    }

    match session.get::<String>(SESSION_USER).await {
        Ok(Some(_)) => next.run(req).await,
        Ok(None) => AppError::Auth("Not authenticated".into()).into_response(),
        Err(e) => AppError::from(e).into_response(),
    }
}
