use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use uuid::Uuid;
use super::member::Member;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Workspace {
    pub id: Uuid,
    pub name: String,
    pub amount: f64,                // Budget
    #[serde(default)]
    pub total_expenses: f64,        // Cached sum of every member's expenses
    #[serde(default)]
    pub members: Vec<Uuid>,
    pub date: DateTime<Utc>,
}

impl Workspace {
    pub fn new(name: String, amount: f64, date: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            amount,
            total_expenses: 0.0,
            members: Vec::new(),
            date,
        }
    }
}

/// A workspace as listed to clients, with its member documents inlined.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceView {
    pub id: Uuid,
    pub name: String,
    pub amount: f64,
    pub total_expenses: f64,
    pub members: Vec<Member>,
    pub date: DateTime<Utc>,
}

impl WorkspaceView {
    pub fn populate(workspace: Workspace, members: Vec<Member>) -> Self {
        Self {
            id: workspace.id,
            name: workspace.name,
            amount: workspace.amount,
            total_expenses: workspace.total_expenses,
            members,
            date: workspace.date,
        }
    }
}
