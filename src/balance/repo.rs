use anyhow::Context;
use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

/// Read side of the per-log caloric balance rows, at most one per log.
///
/// Rows are written only alongside their log's status change or deletion,
/// inside that transaction; see the `*_in` functions below.
#[async_trait]
pub trait CaloricBalanceStore: Send + Sync {
    async fn find(&self, log_id: Uuid) -> anyhow::Result<Option<f64>>;

    /// Sum over every balance row whose log belongs to `user_id`; 0.0 if none.
    async fn net_sum(&self, user_id: Uuid) -> anyhow::Result<f64>;
}

#[derive(Clone)]
pub struct PgCaloricBalanceStore {
    db: PgPool,
}

impl PgCaloricBalanceStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CaloricBalanceStore for PgCaloricBalanceStore {
    async fn find(&self, log_id: Uuid) -> anyhow::Result<Option<f64>> {
        let v: Option<f64> = sqlx::query_scalar(
            r#"SELECT caloric_balance FROM user_caloric_balance WHERE calorie_log_id = $1"#,
        )
        .bind(log_id)
        .fetch_optional(&self.db)
        .await
        .context("select caloric balance")?;
        Ok(v)
    }

    async fn net_sum(&self, user_id: Uuid) -> anyhow::Result<f64> {
        let sum: Option<f64> = sqlx::query_scalar(
            r#"
            SELECT SUM(b.caloric_balance)
              FROM user_caloric_balance b
              JOIN user_calorie_logs l ON l.id = b.calorie_log_id
             WHERE l.u_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.db)
        .await
        .context("sum caloric balance")?;
        Ok(sum.unwrap_or(0.0))
    }
}

/// Insert the balance for a completed log, replacing any earlier value.
pub(crate) async fn upsert_in(
    conn: &mut PgConnection,
    log_id: Uuid,
    balance: f64,
) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO user_caloric_balance (calorie_log_id, caloric_balance)
        VALUES ($1, $2)
        ON CONFLICT (calorie_log_id) DO UPDATE
           SET caloric_balance = EXCLUDED.caloric_balance
        "#,
    )
    .bind(log_id)
    .bind(balance)
    .execute(conn)
    .await
    .context("upsert caloric balance")?;
    Ok(())
}

/// Zero the balance in place; the row is kept.
pub(crate) async fn reset_in(conn: &mut PgConnection, log_id: Uuid) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        UPDATE user_caloric_balance
           SET caloric_balance = 0.00
         WHERE calorie_log_id = $1
        "#,
    )
    .bind(log_id)
    .execute(conn)
    .await
    .context("reset caloric balance")?;
    Ok(())
}

pub(crate) async fn delete_in(conn: &mut PgConnection, log_id: Uuid) -> anyhow::Result<()> {
    sqlx::query(r#"DELETE FROM user_caloric_balance WHERE calorie_log_id = $1"#)
        .bind(log_id)
        .execute(conn)
        .await
        .context("delete caloric balance")?;
    Ok(())
}
