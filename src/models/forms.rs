use serde::Deserialize;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;
use crate::errors::{AppError, AppResult};

#[derive(Debug, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordForm {
    pub username: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordForm {
    pub token: String,
    pub new_password: String,
}

// Browsers submit `<input type="date">` values as plain calendar dates
#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(untagged)]
pub enum DateInput {
    Timestamp(DateTime<Utc>),
    Day(NaiveDate),
}

impl DateInput {
    pub fn resolve(input: Option<DateInput>) -> DateTime<Utc> {
        match input {
            Some(DateInput::Timestamp(ts)) => ts,
            Some(DateInput::Day(day)) => day
                .and_hms_opt(0, 0, 0)
                .map(|dt| dt.and_utc())
                .unwrap_or_else(Utc::now),
            None => Utc::now(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct NewWorkspace {
    pub name: String,
    pub amount: f64,
    pub date: Option<DateInput>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMember {
    pub name: String,
    pub contact_number: String,
    pub workspace_id: Uuid,
    pub date: Option<DateInput>,
}

#[derive(Debug, Deserialize)]
pub struct NewExpense {
    pub description: String,
    pub amount: f64,
    pub date: Option<DateInput>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalExpenseUpdate {
    pub total_expense: f64,
}

pub fn require(field: &str, value: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{} is required", field)));
    }
    Ok(())
}

impl Credentials {
    pub fn validate(&self) -> AppResult<()> {
        require("username", &self.username)?;
        require("password", &self.password)
    }
}

impl NewWorkspace {
    pub fn validate(&self) -> AppResult<()> {
        require("name", &self.name)
    }
}

impl NewMember {
    pub fn validate(&self) -> AppResult<()> {
        require("name", &self.name)?;
        require("contactNumber", &self.contact_number)
    }
}

impl NewExpense {
    pub fn validate(&self) -> AppResult<()> {
        require("description", &self.description)
    }
}
