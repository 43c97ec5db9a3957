use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use uuid::Uuid;
use crate::errors::{AppError, AppResult};
use crate::models::{DateInput, NewWorkspace, Workspace};
use crate::services::ledger;
use crate::state::AppState;
use super::extract::{Json, Path};

pub async fn create_workspace(
    State(state): State<AppState>,
    Json(form): Json<NewWorkspace>,
) -> AppResult<Response> {
    form.validate()?;

    let workspace = Workspace::new(form.name, form.amount, DateInput::resolve(form.date));
    state
        .store()
        .insert_workspace(&workspace)
        .await
        .map_err(AppError::store("Error adding workspace"))?;

    tracing::info!("Created workspace {} ({})", workspace.id, workspace.name);
    Ok((StatusCode::CREATED, Json(workspace)).into_response())
}

pub async fn list_workspaces(State(state): State<AppState>) -> AppResult<Response> {
    let workspaces = ledger::list_workspaces(state.store())
        .await
        .map_err(AppError::ledger("Error fetching workspaces"))?;

    tracing::debug!("Listing {} workspaces", workspaces.len());
    Ok(Json(workspaces).into_response())
}

pub async fn delete_workspace(
    State(state): State<AppState>,
    Path(workspace_id): Path<Uuid>,
) -> AppResult<Response> {
    let deleted = ledger::delete_workspace(state.store(), workspace_id)
        .await
        .map_err(AppError::ledger("Error deleting workspace"))?;

    Ok(Json(json!({
        "message": "Workspace deleted successfully",
        "deletedMembers": deleted.members,
        "deletedExpenses": deleted.expenses,
    }))
    .into_response())
}

pub async fn list_workspace_members(
    State(state): State<AppState>,
    Path(workspace_id): Path<Uuid>,
) -> AppResult<Response> {
    let members = state
        .store()
        .list_members(workspace_id)
        .await
        .map_err(AppError::store("Error fetching members"))?;

    Ok(Json(members).into_response())
}

pub async fn recompute_workspace_total(
    State(state): State<AppState>,
    Path(workspace_id): Path<Uuid>,
) -> AppResult<Response> {
    let total = ledger::recompute_workspace_total(state.store(), workspace_id)
        .await
        .map_err(AppError::ledger("Error recomputing total expenses"))?;

    Ok(Json(json!({ "id": workspace_id, "totalExpenses": total })).into_response())
}
