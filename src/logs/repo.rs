use anyhow::Context;
use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};
use time::Date;
use uuid::Uuid;

use crate::balance::repo as balance_repo;

use super::repo_types::{CalorieDelta, CalorieLog, CalorieLogRow, LogStatus};

/// Persistence for daily calorie logs, at most one per (user, date).
#[async_trait]
pub trait CalorieLogStore: Send + Sync {
    async fn find(&self, user_id: Uuid, log_date: Date) -> anyhow::Result<Option<CalorieLog>>;

    /// Newest date first.
    async fn list(&self, user_id: Uuid, limit: i64, offset: i64)
        -> anyhow::Result<Vec<CalorieLog>>;

    /// Insert a pending log seeded with `tdee`. `None` if one already exists.
    async fn insert(
        &self,
        user_id: Uuid,
        log_date: Date,
        tdee: f64,
    ) -> anyhow::Result<Option<CalorieLog>>;

    /// Atomically add `delta` to a pending log. Burnt calories also raise TDEE.
    ///
    /// Returns `None` without writing when the log is missing, done, or either
    /// running total would go negative.
    async fn apply_delta(
        &self,
        user_id: Uuid,
        log_date: Date,
        delta: CalorieDelta,
    ) -> anyhow::Result<Option<CalorieLog>>;

    /// In one transaction: store status `D`, then upsert the balance computed
    /// from the stored row. `None` if there is no such log.
    async fn complete(&self, user_id: Uuid, log_date: Date)
        -> anyhow::Result<Option<CalorieLog>>;

    /// In one transaction: store status `P`, then zero any balance row.
    async fn reopen(&self, user_id: Uuid, log_date: Date) -> anyhow::Result<Option<CalorieLog>>;

    /// In one transaction: delete the log's balance row, then the log.
    async fn delete_with_balance(&self, log_id: Uuid) -> anyhow::Result<bool>;
}

const LOG_COLUMNS: &str =
    "id, u_id, log_date, tdee, calories_consumed, calories_burnt, log_status, updated_at";

#[derive(Clone)]
pub struct PgCalorieLogStore {
    db: PgPool,
}

impl PgCalorieLogStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

fn into_log(row: Option<CalorieLogRow>) -> anyhow::Result<Option<CalorieLog>> {
    row.map(CalorieLog::try_from).transpose()
}

#[async_trait]
impl CalorieLogStore for PgCalorieLogStore {
    async fn find(&self, user_id: Uuid, log_date: Date) -> anyhow::Result<Option<CalorieLog>> {
        let row = sqlx::query_as::<_, CalorieLogRow>(&format!(
            "SELECT {LOG_COLUMNS} FROM user_calorie_logs WHERE u_id = $1 AND log_date = $2"
        ))
        .bind(user_id)
        .bind(log_date)
        .fetch_optional(&self.db)
        .await
        .context("select calorie log")?;
        into_log(row)
    }

    async fn list(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> anyhow::Result<Vec<CalorieLog>> {
        let rows = sqlx::query_as::<_, CalorieLogRow>(&format!(
            r#"
            SELECT {LOG_COLUMNS}
              FROM user_calorie_logs
             WHERE u_id = $1
             ORDER BY log_date DESC
             LIMIT $2 OFFSET $3
            "#
        ))
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.db)
        .await
        .context("list calorie logs")?;
        rows.into_iter().map(CalorieLog::try_from).collect()
    }

    async fn insert(
        &self,
        user_id: Uuid,
        log_date: Date,
        tdee: f64,
    ) -> anyhow::Result<Option<CalorieLog>> {
        let row = sqlx::query_as::<_, CalorieLogRow>(&format!(
            r#"
            INSERT INTO user_calorie_logs (u_id, log_date, tdee)
            VALUES ($1, $2, $3)
            ON CONFLICT (u_id, log_date) DO NOTHING
            RETURNING {LOG_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(log_date)
        .bind(tdee)
        .fetch_optional(&self.db)
        .await
        .context("insert calorie log")?;
        into_log(row)
    }

    async fn apply_delta(
        &self,
        user_id: Uuid,
        log_date: Date,
        delta: CalorieDelta,
    ) -> anyhow::Result<Option<CalorieLog>> {
        let row = sqlx::query_as::<_, CalorieLogRow>(&format!(
            r#"
            UPDATE user_calorie_logs
               SET calories_consumed = calories_consumed + $3,
                   calories_burnt = calories_burnt + $4,
                   tdee = tdee + $4,
                   updated_at = now()
             WHERE u_id = $1
               AND log_date = $2
               AND log_status = 'P'
               AND calories_consumed + $3 >= 0
               AND calories_burnt + $4 >= 0
            RETURNING {LOG_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(log_date)
        .bind(delta.consumed)
        .bind(delta.burnt)
        .fetch_optional(&self.db)
        .await
        .context("apply calorie delta")?;
        into_log(row)
    }

    async fn complete(
        &self,
        user_id: Uuid,
        log_date: Date,
    ) -> anyhow::Result<Option<CalorieLog>> {
        let mut tx = self.db.begin().await.context("begin complete log")?;
        let Some(log) = set_status_in(&mut tx, user_id, log_date, LogStatus::Done).await? else {
            return Ok(None);
        };
        balance_repo::upsert_in(&mut tx, log.id, log.caloric_balance()).await?;
        tx.commit().await.context("commit complete log")?;
        Ok(Some(log))
    }

    async fn reopen(&self, user_id: Uuid, log_date: Date) -> anyhow::Result<Option<CalorieLog>> {
        let mut tx = self.db.begin().await.context("begin reopen log")?;
        let Some(log) = set_status_in(&mut tx, user_id, log_date, LogStatus::Pending).await?
        else {
            return Ok(None);
        };
        balance_repo::reset_in(&mut tx, log.id).await?;
        tx.commit().await.context("commit reopen log")?;
        Ok(Some(log))
    }

    async fn delete_with_balance(&self, log_id: Uuid) -> anyhow::Result<bool> {
        let mut tx = self.db.begin().await.context("begin delete log")?;
        balance_repo::delete_in(&mut tx, log_id).await?;
        let res = sqlx::query(r#"DELETE FROM user_calorie_logs WHERE id = $1"#)
            .bind(log_id)
            .execute(&mut *tx)
            .await
            .context("delete calorie log")?;
        tx.commit().await.context("commit delete log")?;
        Ok(res.rows_affected() > 0)
    }
}

async fn set_status_in(
    conn: &mut PgConnection,
    user_id: Uuid,
    log_date: Date,
    status: LogStatus,
) -> anyhow::Result<Option<CalorieLog>> {
    let row = sqlx::query_as::<_, CalorieLogRow>(&format!(
        r#"
        UPDATE user_calorie_logs
           SET log_status = $3,
               updated_at = now()
         WHERE u_id = $1 AND log_date = $2
        RETURNING {LOG_COLUMNS}
        "#
    ))
    .bind(user_id)
    .bind(log_date)
    .bind(status.code())
    .fetch_optional(conn)
    .await
    .context("set log status")?;
    into_log(row)
}
