use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

/// Lifecycle status of a day's log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogStatus {
    /// Day still being recorded.
    #[serde(rename = "P")]
    Pending,
    /// Day finalized, balance recorded.
    #[serde(rename = "D")]
    Done,
}

impl LogStatus {
    pub fn code(self) -> &'static str {
        match self {
            LogStatus::Pending => "P",
            LogStatus::Done => "D",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "P" => Some(LogStatus::Pending),
            "D" => Some(LogStatus::Done),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalorieKind {
    Consumed,
    Burnt,
}

/// Signed change applied to a log's running totals in one step.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CalorieDelta {
    pub consumed: f64,
    pub burnt: f64,
}

impl CalorieDelta {
    pub fn of(kind: CalorieKind, delta: f64) -> Self {
        match kind {
            CalorieKind::Consumed => Self {
                consumed: delta,
                burnt: 0.0,
            },
            CalorieKind::Burnt => Self {
                consumed: 0.0,
                burnt: delta,
            },
        }
    }

    pub fn is_finite(&self) -> bool {
        self.consumed.is_finite() && self.burnt.is_finite()
    }
}

#[derive(Debug, FromRow)]
pub struct CalorieLogRow {
    pub id: Uuid,
    pub u_id: Uuid,
    pub log_date: Date,
    pub tdee: f64,
    pub calories_consumed: f64,
    pub calories_burnt: f64,
    pub log_status: String,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalorieLog {
    pub id: Uuid,
    #[serde(skip_serializing)]
    pub user_id: Uuid,
    #[serde(with = "crate::dates::iso_date")]
    pub log_date: Date,
    pub tdee: f64,
    pub calories_consumed: f64,
    pub calories_burnt: f64,
    #[serde(rename = "log_status")]
    pub status: LogStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl CalorieLog {
    /// Positive is a deficit, negative a surplus.
    pub fn caloric_balance(&self) -> f64 {
        self.tdee - self.calories_consumed
    }
}

impl TryFrom<CalorieLogRow> for CalorieLog {
    type Error = anyhow::Error;

    fn try_from(r: CalorieLogRow) -> Result<Self, Self::Error> {
        let status = LogStatus::from_code(&r.log_status).ok_or_else(|| {
            anyhow::anyhow!("unknown log status '{}' on log {}", r.log_status, r.id)
        })?;
        Ok(Self {
            id: r.id,
            user_id: r.u_id,
            log_date: r.log_date,
            tdee: r.tdee,
            calories_consumed: r.calories_consumed,
            calories_burnt: r.calories_burnt,
            status,
            updated_at: r.updated_at,
        })
    }
}
