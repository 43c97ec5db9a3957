use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use uuid::Uuid;
use crate::errors::{AppError, AppResult};
use crate::models::{DateInput, NewExpense};
use crate::services::ledger;
use crate::state::AppState;
use super::extract::{Json, Path};

pub async fn create_expense(
    State(state): State<AppState>,
    Path(member_id): Path<Uuid>,
    Json(form): Json<NewExpense>,
) -> AppResult<Response> {
    form.validate()?;

    let (expense, _) = ledger::add_expense(
        state.store(),
        member_id,
        form.description,
        form.amount,
        DateInput::resolve(form.date),
    )
    .await
    .map_err(AppError::ledger("Error adding expense"))?;

    Ok((StatusCode::CREATED, Json(expense)).into_response())
}

pub async fn list_expenses(
    State(state): State<AppState>,
    Path(member_id): Path<Uuid>,
) -> AppResult<Response> {
    let expenses = state
        .store()
        .list_expenses(member_id)
        .await
        .map_err(AppError::store("Error fetching expenses"))?;

    Ok(Json(expenses).into_response())
}

pub async fn delete_expense(
    State(state): State<AppState>,
    Path(expense_id): Path<Uuid>,
) -> AppResult<Response> {
    let removal = ledger::remove_expense(state.store(), expense_id)
        .await
        .map_err(AppError::ledger("Error deleting expense"))?;

    Ok(Json(json!({
        "message": "Expense deleted successfully",
        "expense": removal.expense,
        "totalAdjusted": removal.workspace_total.is_some(),
        "workspaceTotal": removal.workspace_total,
    }))
    .into_response())
}
