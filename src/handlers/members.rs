use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use uuid::Uuid;
use crate::errors::{AppError, AppResult};
use crate::models::{DateInput, NewMember, TotalExpenseUpdate};
use crate::services::ledger;
use crate::state::AppState;
use super::extract::{Json, Path};

pub async fn create_member(
    State(state): State<AppState>,
    Json(form): Json<NewMember>,
) -> AppResult<Response> {
    form.validate()?;

    let member = ledger::add_member(
        state.store(),
        form.name,
        form.contact_number,
        form.workspace_id,
        DateInput::resolve(form.date),
    )
    .await
    .map_err(AppError::ledger("Error adding member"))?;

    Ok((StatusCode::CREATED, Json(member)).into_response())
}

// Accepts any value; the stored total is not checked against the member's expenses.
pub async fn set_member_total(
    State(state): State<AppState>,
    Path(member_id): Path<Uuid>,
    Json(update): Json<TotalExpenseUpdate>,
) -> AppResult<Response> {
    let member = ledger::override_member_total(state.store(), member_id, update.total_expense)
        .await
        .map_err(AppError::ledger("Error updating total expense"))?;

    Ok(Json(member).into_response())
}

pub async fn recompute_member_total(
    State(state): State<AppState>,
    Path(member_id): Path<Uuid>,
) -> AppResult<Response> {
    let member = ledger::recompute_member_total(state.store(), member_id)
        .await
        .map_err(AppError::ledger("Error updating total expense"))?;

    Ok(Json(member).into_response())
}
