use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: Uuid,
    pub description: String,
    pub amount: f64,
    pub member_id: Uuid,
    pub date: DateTime<Utc>,
}

impl Expense {
    pub fn new(description: String, amount: f64, member_id: Uuid, date: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            description,
            amount,
            member_id,
            date,
        }
    }
}
