use thiserror::Error;
use uuid::Uuid;
use super::StoreError;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Workspace {0} not found")]
    WorkspaceNotFound(Uuid),

    #[error("Member {0} not found")]
    MemberNotFound(Uuid),

    #[error("Expense {0} not found")]
    ExpenseNotFound(Uuid),

    // The member exists but the workspace it points at does not.
    #[error("Member {member_id} belongs to missing workspace {workspace_id}")]
    UnresolvedOwner { member_id: Uuid, workspace_id: Uuid },

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type LedgerResult<T> = Result<T, LedgerError>;
