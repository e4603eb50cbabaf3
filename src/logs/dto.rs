use serde::{Deserialize, Serialize};
use time::Date;

use super::repo_types::{CalorieDelta, CalorieLog, LogStatus};
use crate::error::{AppError, AppResult};

#[derive(Debug, Default, Deserialize)]
pub struct CreateLogRequest {
    #[serde(default, with = "crate::dates::iso_date::option")]
    pub log_date: Option<Date>,
}

/// Signed calorie deltas for one day; absent fields mean no change.
#[derive(Debug, Deserialize)]
pub struct UpdateLogRequest {
    pub calories_consumed: Option<f64>,
    pub calories_burnt: Option<f64>,
}

impl UpdateLogRequest {
    pub fn delta(&self) -> AppResult<CalorieDelta> {
        if self.calories_consumed.is_none() && self.calories_burnt.is_none() {
            return Err(AppError::validation(
                "calories_consumed or calories_burnt is required",
            ));
        }
        Ok(CalorieDelta {
            consumed: self.calories_consumed.unwrap_or(0.0),
            burnt: self.calories_burnt.unwrap_or(0.0),
        })
    }
}

/// One signed delta for a single running total.
#[derive(Debug, Deserialize)]
pub struct AccumulateRequest {
    pub delta: f64,
}

#[derive(Debug, Deserialize)]
pub struct MarkStatusRequest {
    pub status: String,
}

impl MarkStatusRequest {
    pub fn status(&self) -> AppResult<LogStatus> {
        LogStatus::from_code(self.status.trim()).ok_or_else(|| {
            AppError::validation(format!(
                "Unknown status '{}', expected P or D",
                self.status
            ))
        })
    }
}

#[derive(Debug, Serialize)]
pub struct LogsResponse {
    pub logs: Vec<CalorieLog>,
}

#[derive(Debug, Serialize)]
pub struct LogDetailsResponse {
    #[serde(flatten)]
    pub log: CalorieLog,
    pub caloric_balance: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    30
}

impl Pagination {
    pub const MAX_LIMIT: i64 = 366;

    pub fn clamped(&self) -> (i64, i64) {
        (self.limit.clamp(1, Self::MAX_LIMIT), self.offset.max(0))
    }
}
