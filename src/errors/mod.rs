// Error types for each layer of the service, built on thiserror.
use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
};
use thiserror::Error;

// Make the response module public
pub mod response;
pub mod store;
pub mod ledger;

// Re-export commonly used types
pub use store::{StoreError, StoreResult};
pub use ledger::{LedgerError, LedgerResult};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Auth(String),

    #[error("Session error: {0}")]
    Session(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    PayloadTooLarge(String),

    // Clients only see the route's static context; the source is logged.
    #[error("{context}")]
    Store {
        context: &'static str,
        #[source]
        source: StoreError,
    },
}

impl AppError {
    /// Wraps a store failure with the route's client-facing message.
    pub fn store(context: &'static str) -> impl FnOnce(StoreError) -> AppError {
        move |source: StoreError| AppError::Store { context, source }
    }

    /// Maps a ledger failure onto a response class, keeping the route's message
    /// for anything that is not the caller's fault.
    pub fn ledger(context: &'static str) -> impl FnOnce(LedgerError) -> AppError {
        move |err: LedgerError| match err {
            LedgerError::Store(source) => AppError::Store { context, source },
            unresolved @ LedgerError::UnresolvedOwner { .. } => {
                AppError::Conflict(unresolved.to_string())
            }
            LedgerError::WorkspaceNotFound(_) => AppError::NotFound("Workspace not found".into()),
            LedgerError::MemberNotFound(_) => AppError::NotFound("Member not found".into()),
            LedgerError::ExpenseNotFound(_) => AppError::NotFound("Expense not found".into()),
        }
    }
}

impl From<tower_sessions::session::Error> for AppError {
    fn from(err: tower_sessions::session::Error) -> Self {
        AppError::Session(err.to_string())
    }
}

// Extractor rejections keep the JSON error shape
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge(rejection.body_text())
        } else {
            AppError::Validation(rejection.body_text())
        }
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

// Custom result type
pub type AppResult<T> = Result<T, AppError>;
