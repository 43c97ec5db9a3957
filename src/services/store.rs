use async_trait::async_trait;
use uuid::Uuid;
use crate::errors::StoreResult;
use crate::models::{Expense, Member, User, Workspace};

/// What a cascading workspace delete removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeletedTree {
    pub members: usize,
    pub expenses: usize,
}

/// Document storage for every record the service keeps.
///
/// Each method is a single logical operation: backends apply multi-key
/// writes (member insertion, cascading deletes) as one unit and
/// `increment_workspace_total` is atomic with respect to concurrent callers.
#[async_trait]
pub trait Store: Send + Sync {
    async fn insert_workspace(&self, workspace: &Workspace) -> StoreResult<()>;

    async fn get_workspace(&self, id: Uuid) -> StoreResult<Option<Workspace>>;

    /// All workspaces in creation order.
    async fn list_workspaces(&self) -> StoreResult<Vec<Workspace>>;

    /// Adds `delta` to the cached total and returns the new value, or `None`
    /// when the workspace does not exist (nothing is written in that case).
    async fn increment_workspace_total(&self, id: Uuid, delta: f64) -> StoreResult<Option<f64>>;

    /// Overwrites the cached total. Returns false when the workspace is missing.
    async fn set_workspace_total(&self, id: Uuid, total: f64) -> StoreResult<bool>;

    /// Removes the workspace, its members, and their expenses.
    /// `None` means there was no such workspace.
    async fn delete_workspace_tree(&self, id: Uuid) -> StoreResult<Option<DeletedTree>>;

    /// Stores the member and appends it to its workspace's member list.
    async fn insert_member(&self, member: &Member) -> StoreResult<()>;

    async fn get_member(&self, id: Uuid) -> StoreResult<Option<Member>>;

    async fn list_members(&self, workspace_id: Uuid) -> StoreResult<Vec<Member>>;

    async fn set_member_total(&self, id: Uuid, total: f64) -> StoreResult<Option<Member>>;

    async fn insert_expense(&self, expense: &Expense) -> StoreResult<()>;

    async fn get_expense(&self, id: Uuid) -> StoreResult<Option<Expense>>;

    async fn list_expenses(&self, member_id: Uuid) -> StoreResult<Vec<Expense>>;

    async fn delete_expense(&self, id: Uuid) -> StoreResult<bool>;

    async fn get_user(&self, username: &str) -> StoreResult<Option<User>>;

    /// Inserts a new user unless the username is taken; returns whether it was stored.
    async fn create_user(&self, user: &User) -> StoreResult<bool>;

    async fn save_user(&self, user: &User) -> StoreResult<()>;

    async fn find_user_by_reset_token(&self, token: &str) -> StoreResult<Option<User>>;
}
