//! Derived totals and cascading deletes.
//!
//! `Workspace::total_expenses` caches the sum of every expense owned by a
//! member of that workspace. It is only ever moved by atomic store increments:
//! up by the amount when an expense is added, down by the stored amount
//! (read before the record goes) when one is removed. The recompute functions
//! exist to repair drift, not as part of the normal write path.

use chrono::{DateTime, Utc};
use uuid::Uuid;
use crate::errors::{LedgerError, LedgerResult};
use crate::models::{Expense, Member, Workspace, WorkspaceView};
use super::store::{DeletedTree, Store};

/// Outcome of removing an expense.
#[derive(Debug, Clone)]
pub struct ExpenseRemoval {
    pub expense: Expense,
    /// New workspace total, or `None` when the owner chain could not be
    /// resolved and no adjustment was made.
    pub workspace_total: Option<f64>,
}

// Member -> Workspace, as an explicit error rather than a silent skip.
async fn resolve_owner(store: &dyn Store, member_id: Uuid) -> LedgerResult<(Member, Workspace)> {
    let member = store
        .get_member(member_id)
        .await?
        .ok_or(LedgerError::MemberNotFound(member_id))?;

    let workspace = store
        .get_workspace(member.workspace_id)
        .await?
        .ok_or(LedgerError::UnresolvedOwner {
            member_id,
            workspace_id: member.workspace_id,
        })?;

    Ok((member, workspace))
}

pub async fn list_workspaces(store: &dyn Store) -> LedgerResult<Vec<WorkspaceView>> {
    let workspaces = store.list_workspaces().await?;
    let mut views = Vec::with_capacity(workspaces.len());
    for workspace in workspaces {
        let members = store.list_members(workspace.id).await?;
        views.push(WorkspaceView::populate(workspace, members));
    }
    Ok(views)
}

pub async fn add_member(
    store: &dyn Store,
    name: String,
    contact_number: String,
    workspace_id: Uuid,
    date: DateTime<Utc>,
) -> LedgerResult<Member> {
    if store.get_workspace(workspace_id).await?.is_none() {
        return Err(LedgerError::WorkspaceNotFound(workspace_id));
    }

    let member = Member::new(name, contact_number, workspace_id, date);
    store.insert_member(&member).await?;
    tracing::info!("Added member {} to workspace {}", member.id, workspace_id);
    Ok(member)
}

/// Stores a new expense and raises the owning workspace's total by its amount.
pub async fn add_expense(
    store: &dyn Store,
    member_id: Uuid,
    description: String,
    amount: f64,
    date: DateTime<Utc>,
) -> LedgerResult<(Expense, f64)> {
    let (member, workspace) = resolve_owner(store, member_id).await.map_err(|e| {
        if let LedgerError::UnresolvedOwner { .. } = e {
            tracing::error!("Refusing expense for member {}: {}", member_id, e);
        }
        e
    })?;

    let expense = Expense::new(description, amount, member.id, date);
    store.insert_expense(&expense).await?;

    match store.increment_workspace_total(workspace.id, amount).await? {
        Some(total) => {
            tracing::info!(
                "Expense {} ({}) added; workspace {} total is now {}",
                expense.id, amount, workspace.id, total
            );
            Ok((expense, total))
        }
        None => {
            // Workspace deleted between resolution and increment: undo the insert.
            tracing::error!(
                "Workspace {} vanished while adding expense {}; rolling back",
                workspace.id, expense.id
            );
            store.delete_expense(expense.id).await?;
            Err(LedgerError::UnresolvedOwner {
                member_id,
                workspace_id: workspace.id,
            })
        }
    }
}

/// Lowers the owning workspace's total by the expense amount, then deletes it.
///
/// An expense whose member or workspace is already gone is still deleted; the
/// skipped adjustment is logged and reported through `workspace_total: None`.
pub async fn remove_expense(store: &dyn Store, expense_id: Uuid) -> LedgerResult<ExpenseRemoval> {
    let expense = store
        .get_expense(expense_id)
        .await?
        .ok_or(LedgerError::ExpenseNotFound(expense_id))?;

    let owner = match resolve_owner(store, expense.member_id).await {
        Ok((_, workspace)) => Some(workspace.id),
        Err(LedgerError::Store(e)) => return Err(e.into()),
        Err(e) => {
            tracing::warn!("Deleting expense {} without adjusting a total: {}", expense_id, e);
            None
        }
    };

    let workspace_total = match owner {
        Some(workspace_id) => store
            .increment_workspace_total(workspace_id, -expense.amount)
            .await?,
        None => None,
    };

    if !store.delete_expense(expense_id).await? {
        // Another request deleted it first and made its own adjustment; undo ours.
        if let (Some(workspace_id), Some(_)) = (owner, workspace_total) {
            store.increment_workspace_total(workspace_id, expense.amount).await?;
        }
        return Err(LedgerError::ExpenseNotFound(expense_id));
    }

    tracing::info!("Deleted expense {} ({})", expense_id, expense.amount);
    Ok(ExpenseRemoval {
        expense,
        workspace_total,
    })
}

pub async fn delete_workspace(store: &dyn Store, workspace_id: Uuid) -> LedgerResult<DeletedTree> {
    let deleted = store
        .delete_workspace_tree(workspace_id)
        .await?
        .ok_or(LedgerError::WorkspaceNotFound(workspace_id))?;

    tracing::info!(
        "Deleted workspace {} with {} members and {} expenses",
        workspace_id, deleted.members, deleted.expenses
    );
    Ok(deleted)
}

/// Overwrites a member's total with whatever the client sends. No check
/// against the member's expenses is made, so the value can diverge.
pub async fn override_member_total(
    store: &dyn Store,
    member_id: Uuid,
    total: f64,
) -> LedgerResult<Member> {
    store
        .set_member_total(member_id, total)
        .await?
        .ok_or(LedgerError::MemberNotFound(member_id))
}

pub async fn recompute_member_total(store: &dyn Store, member_id: Uuid) -> LedgerResult<Member> {
    if store.get_member(member_id).await?.is_none() {
        return Err(LedgerError::MemberNotFound(member_id));
    }
    let total: f64 = store.list_expenses(member_id).await?.iter().map(|e| e.amount).sum();
    override_member_total(store, member_id, total).await
}

pub async fn recompute_workspace_total(store: &dyn Store, workspace_id: Uuid) -> LedgerResult<f64> {
    let workspace = store
        .get_workspace(workspace_id)
        .await?
        .ok_or(LedgerError::WorkspaceNotFound(workspace_id))?;

    let mut total = 0.0;
    for member in store.list_members(workspace_id).await? {
        total += store
            .list_expenses(member.id)
            .await?
            .iter()
            .map(|e| e.amount)
            .sum::<f64>();
    }

    if total != workspace.total_expenses {
        tracing::warn!(
            "Workspace {} total drifted: cached {}, actual {}",
            workspace_id, workspace.total_expenses, total
        );
    }

    if !store.set_workspace_total(workspace_id, total).await? {
        return Err(LedgerError::WorkspaceNotFound(workspace_id));
    }
    Ok(total)
}
