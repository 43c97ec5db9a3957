use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: Uuid,
    pub name: String,
    pub contact_number: String,
    pub workspace_id: Uuid,
    // Written by clients through the total-expense endpoint, never by the ledger
    #[serde(default)]
    pub total_expenses: f64,
    pub date: DateTime<Utc>,
}

impl Member {
    pub fn new(
        name: String,
        contact_number: String,
        workspace_id: Uuid,
        date: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            contact_number,
            workspace_id,
            total_expenses: 0.0,
            date,
        }
    }
}
