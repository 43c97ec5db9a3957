use axum::{
    routing::{delete, get, post, put},
    Router,
    extract::DefaultBodyLimit,
    middleware::from_fn,
};
use tower_http::{
    cors::CorsLayer,
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};
use tower_sessions::{MemoryStore as SessionStore, SessionManagerLayer};
use tower_sessions::cookie::SameSite;
use crate::{handlers, middleware, state::AppState};

pub fn build_router(state: AppState) -> Router {
    // Session store setup
    let session_store = SessionStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(false)
        .with_same_site(SameSite::Lax)
        .with_name("session");

    let max_body_size = state.config.request.max_body_size;

    Router::new()
        .route("/", get(handlers::api_status))

        // Auth routes
        .route("/api/signup", post(handlers::handle_signup))
        .route("/api/login", post(handlers::handle_login))
        .route("/api/logout", post(handlers::handle_logout))
        .route("/api/forgotpassword", post(handlers::handle_forgot_password))
        .route("/api/resetpassword", post(handlers::handle_reset_password))

        // Workspace routes
        .route(
            "/api/workspaces",
            get(handlers::list_workspaces).post(handlers::create_workspace),
        )
        .route("/api/workspaces/:id", delete(handlers::delete_workspace))
        .route("/api/workspaces/:id/members", get(handlers::list_workspace_members))
        .route(
            "/api/workspaces/:id/total-expenses/recompute",
            post(handlers::recompute_workspace_total),
        )

        // Member routes
        .route("/api/members", post(handlers::create_member))
        .route(
            "/api/members/:member_id/expenses",
            get(handlers::list_expenses).post(handlers::create_expense),
        )
        .route("/api/members/:member_id/total-expense", put(handlers::set_member_total))
        .route(
            "/api/members/:member_id/total-expense/recompute",
            post(handlers::recompute_member_total),
        )

        // Expense routes
        .route("/api/expenses/:id", delete(handlers::delete_expense))

        // Add middleware
        .layer(from_fn(middleware::require_auth))
        .layer(session_layer)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())

        // Body limit from config
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_body_size))

        // Add state
        .with_state(state)
}
