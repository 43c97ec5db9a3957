mod user;
mod forms;
mod workspace;
mod member;
mod expense;

pub use user::{User, UserView};
pub use forms::{
    require, DateInput, Credentials, ForgotPasswordForm, ResetPasswordForm,
    NewWorkspace, NewMember, NewExpense, TotalExpenseUpdate,
};
pub use workspace::{Workspace, WorkspaceView};
pub use member::Member;
pub use expense::Expense;
