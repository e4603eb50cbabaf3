//! Daily log lifecycle: create, accumulate, mark done/pending, delete.
//!
//! A log starts pending with `tdee` seeded from the user's BMR. While pending
//! it accumulates consumed and burnt calories. Marking it done records
//! `tdee - calories_consumed` as the day's caloric balance; reverting to
//! pending zeroes that balance in place. Deleting removes the balance row
//! before the log row. Each status change or delete commits as a whole or
//! not at all.

use time::Date;
use tracing::{info, warn};
use uuid::Uuid;

use super::repo_types::{CalorieDelta, CalorieKind, CalorieLog, LogStatus};
use crate::error::{AppError, AppResult};
use crate::profile::services as profile;
use crate::state::AppState;

/// A log snapshot together with its recorded balance, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct LogDetails {
    pub log: CalorieLog,
    pub caloric_balance: Option<f64>,
}

pub async fn create_log(
    st: &AppState,
    user_id: Uuid,
    log_date: Option<Date>,
    today: Date,
) -> AppResult<CalorieLog> {
    let log_date = log_date.unwrap_or(today);
    if log_date > today {
        warn!(%user_id, %log_date, "future log date rejected");
        return Err(AppError::validation("Log date cannot be a future date"));
    }

    if st.logs.find(user_id, log_date).await?.is_some() {
        return Err(AppError::conflict("Log already exists for this day"));
    }

    let bmr = profile::current_bmr(st, user_id).await?;

    // The unique (user, date) key decides races past the check above.
    let log = st
        .logs
        .insert(user_id, log_date, bmr)
        .await?
        .ok_or_else(|| AppError::conflict("Log already exists for this day"))?;

    info!(%user_id, %log_date, tdee = log.tdee, "calorie log created");
    Ok(log)
}

pub async fn accumulate(
    st: &AppState,
    user_id: Uuid,
    log_date: Date,
    kind: CalorieKind,
    delta: f64,
) -> AppResult<CalorieLog> {
    update_log(st, user_id, log_date, CalorieDelta::of(kind, delta)).await
}

/// Apply consumed and burnt deltas together; either both land or neither.
pub async fn update_log(
    st: &AppState,
    user_id: Uuid,
    log_date: Date,
    delta: CalorieDelta,
) -> AppResult<CalorieLog> {
    if !delta.is_finite() {
        return Err(AppError::validation("Calorie values must be finite numbers"));
    }

    if let Some(log) = st.logs.apply_delta(user_id, log_date, delta).await? {
        info!(
            %user_id,
            %log_date,
            consumed = delta.consumed,
            burnt = delta.burnt,
            "calorie log updated"
        );
        return Ok(log);
    }

    // Nothing was written; work out which precondition failed.
    let Some(log) = st.logs.find(user_id, log_date).await? else {
        return Err(AppError::not_found("No log exists for this day"));
    };
    if log.status == LogStatus::Done {
        return Err(AppError::conflict("Log is already completed"));
    }
    warn!(%user_id, %log_date, "negative calorie total rejected");
    if log.calories_burnt + delta.burnt < 0.0 {
        return Err(AppError::validation(
            "Resulting calories burnt can't be negative",
        ));
    }
    Err(AppError::validation(
        "Resulting calories consumed can't be negative",
    ))
}

pub async fn mark_status(
    st: &AppState,
    user_id: Uuid,
    log_date: Date,
    status: LogStatus,
) -> AppResult<CalorieLog> {
    let stored = match status {
        LogStatus::Done => st.logs.complete(user_id, log_date).await?,
        LogStatus::Pending => st.logs.reopen(user_id, log_date).await?,
    };
    let log = stored.ok_or_else(|| AppError::not_found("No log exists for this day"))?;

    match status {
        LogStatus::Done => {
            info!(%user_id, %log_date, balance = log.caloric_balance(), "calorie log completed")
        }
        LogStatus::Pending => info!(%user_id, %log_date, "calorie log reopened"),
    }
    Ok(log)
}

pub async fn delete_log(st: &AppState, user_id: Uuid, log_date: Date) -> AppResult<()> {
    let log = st
        .logs
        .find(user_id, log_date)
        .await?
        .ok_or_else(|| AppError::not_found("No log exists for this day"))?;

    st.logs.delete_with_balance(log.id).await?;

    info!(%user_id, %log_date, "calorie log deleted");
    Ok(())
}

pub async fn list_logs(
    st: &AppState,
    user_id: Uuid,
    limit: i64,
    offset: i64,
) -> AppResult<Vec<CalorieLog>> {
    Ok(st.logs.list(user_id, limit, offset).await?)
}

pub async fn get_log(st: &AppState, user_id: Uuid, log_date: Date) -> AppResult<LogDetails> {
    let log = st
        .logs
        .find(user_id, log_date)
        .await?
        .ok_or_else(|| AppError::not_found("No log exists for this day"))?;
    let caloric_balance = st.balances.find(log.id).await?;
    Ok(LogDetails {
        log,
        caloric_balance,
    })
}
