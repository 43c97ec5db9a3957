use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;
use crate::errors::StoreResult;
use crate::models::{Expense, Member, User, Workspace};
use super::store::{DeletedTree, Store};

// Vectors keep creation order, which is what listings return.
#[derive(Default)]
struct Collections {
    workspaces: Vec<Workspace>,
    members: Vec<Member>,
    expenses: Vec<Expense>,
    users: HashMap<String, User>,
}

/// In-process store for development and tests. Every operation holds one
/// lock for its whole duration, so each is atomic.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Collections>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert_workspace(&self, workspace: &Workspace) -> StoreResult<()> {
        self.inner.write().await.workspaces.push(workspace.clone());
        Ok(())
    }

    async fn get_workspace(&self, id: Uuid) -> StoreResult<Option<Workspace>> {
        let inner = self.inner.read().await;
        Ok(inner.workspaces.iter().find(|w| w.id == id).cloned())
    }

    async fn list_workspaces(&self) -> StoreResult<Vec<Workspace>> {
        Ok(self.inner.read().await.workspaces.clone())
    }

    async fn increment_workspace_total(&self, id: Uuid, delta: f64) -> StoreResult<Option<f64>> {
        let mut inner = self.inner.write().await;
        Ok(inner.workspaces.iter_mut().find(|w| w.id == id).map(|workspace| {
            workspace.total_expenses += delta;
            workspace.total_expenses
        }))
    }

    async fn set_workspace_total(&self, id: Uuid, total: f64) -> StoreResult<bool> {
        let mut inner = self.inner.write().await;
        match inner.workspaces.iter_mut().find(|w| w.id == id) {
            Some(workspace) => {
                workspace.total_expenses = total;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_workspace_tree(&self, id: Uuid) -> StoreResult<Option<DeletedTree>> {
        let mut inner = self.inner.write().await;
        let Some(position) = inner.workspaces.iter().position(|w| w.id == id) else {
            return Ok(None);
        };
        let workspace = inner.workspaces.remove(position);

        // Members are matched by back-reference as well as by the workspace's
        // own list, so neither side can leave orphans behind.
        let member_ids: Vec<Uuid> = inner
            .members
            .iter()
            .filter(|m| m.workspace_id == id || workspace.members.contains(&m.id))
            .map(|m| m.id)
            .collect();
        inner.members.retain(|m| !member_ids.contains(&m.id));

        let before = inner.expenses.len();
        inner.expenses.retain(|e| !member_ids.contains(&e.member_id));

        Ok(Some(DeletedTree {
            members: member_ids.len(),
            expenses: before - inner.expenses.len(),
        }))
    }

    async fn insert_member(&self, member: &Member) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        if let Some(workspace) = inner.workspaces.iter_mut().find(|w| w.id == member.workspace_id) {
            workspace.members.push(member.id);
        }
        inner.members.push(member.clone());
        Ok(())
    }

    async fn get_member(&self, id: Uuid) -> StoreResult<Option<Member>> {
        let inner = self.inner.read().await;
        Ok(inner.members.iter().find(|m| m.id == id).cloned())
    }

    async fn list_members(&self, workspace_id: Uuid) -> StoreResult<Vec<Member>> {
        let inner = self.inner.read().await;
        Ok(inner
            .members
            .iter()
            .filter(|m| m.workspace_id == workspace_id)
            .cloned()
            .collect())
    }

    async fn set_member_total(&self, id: Uuid, total: f64) -> StoreResult<Option<Member>> {
        let mut inner = self.inner.write().await;
        Ok(inner.members.iter_mut().find(|m| m.id == id).map(|member| {
            member.total_expenses = total;
            member.clone()
        }))
    }

    async fn insert_expense(&self, expense: &Expense) -> StoreResult<()> {
        self.inner.write().await.expenses.push(expense.clone());
        Ok(())
    }

    async fn get_expense(&self, id: Uuid) -> StoreResult<Option<Expense>> {
        let inner = self.inner.read().await;
        Ok(inner.expenses.iter().find(|e| e.id == id).cloned())
    }

    async fn list_expenses(&self, member_id: Uuid) -> StoreResult<Vec<Expense>> {
        let inner = self.inner.read().await;
        Ok(inner
            .expenses
            .iter()
            .filter(|e| e.member_id == member_id)
            .cloned()
            .collect())
    }

    async fn delete_expense(&self, id: Uuid) -> StoreResult<bool> {
        let mut inner = self.inner.write().await;
        let before = inner.expenses.len();
        inner.expenses.retain(|e| e.id != id);
        Ok(inner.expenses.len() != before)
    }

    async fn get_user(&self, username: &str) -> StoreResult<Option<User>> {
        Ok(self.inner.read().await.users.get(username).cloned())
    }

    async fn create_user(&self, user: &User) -> StoreResult<bool> {
        let mut inner = self.inner.write().await;
        if inner.users.contains_key(&user.username) {
            return Ok(false);
        }
        inner.users.insert(user.username.clone(), user.clone());
        Ok(true)
    }

    async fn save_user(&self, user: &User) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        inner.users.insert(user.username.clone(), user.clone());
        Ok(())
    }

    async fn find_user_by_reset_token(&self, token: &str) -> StoreResult<Option<User>> {
        let inner = self.inner.read().await;
        Ok(inner
            .users
            .values()
            .find(|user| user.reset_token.as_deref() == Some(token))
            .cloned())
    }
}
