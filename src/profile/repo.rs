use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::repo_types::{BodyDetails, BodyDetailsRow, WeightGoal};

/// Persistence for the one-per-user body profile and weight goal.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn body_details(&self, user_id: Uuid) -> anyhow::Result<Option<BodyDetails>>;

    /// Insert or fully replace the user's body details.
    async fn save_body_details(&self, details: &BodyDetails) -> anyhow::Result<()>;

    async fn weight_goal(&self, user_id: Uuid) -> anyhow::Result<Option<WeightGoal>>;

    async fn save_weight_goal(&self, user_id: Uuid, goal: WeightGoal) -> anyhow::Result<()>;
}

#[derive(Clone)]
pub struct PgProfileStore {
    db: PgPool,
}

impl PgProfileStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProfileStore for PgProfileStore {
    async fn body_details(&self, user_id: Uuid) -> anyhow::Result<Option<BodyDetails>> {
        let row = sqlx::query_as::<_, BodyDetailsRow>(
            r#"
            SELECT u_id, age, height_cm, weight_kg, gender, bmr
              FROM user_body_details
             WHERE u_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.db)
        .await
        .context("select body details")?;

        row.map(BodyDetails::try_from).transpose()
    }

    async fn save_body_details(&self, d: &BodyDetails) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO user_body_details (u_id, age, height_cm, weight_kg, gender, bmr)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (u_id) DO UPDATE
               SET age = EXCLUDED.age,
                   height_cm = EXCLUDED.height_cm,
                   weight_kg = EXCLUDED.weight_kg,
                   gender = EXCLUDED.gender,
                   bmr = EXCLUDED.bmr
            "#,
        )
        .bind(d.user_id)
        .bind(d.age)
        .bind(d.height_cm)
        .bind(d.weight_kg)
        .bind(d.gender.code())
        .bind(d.bmr)
        .execute(&self.db)
        .await
        .context("upsert body details")?;
        Ok(())
    }

    async fn weight_goal(&self, user_id: Uuid) -> anyhow::Result<Option<WeightGoal>> {
        let code: Option<String> =
            sqlx::query_scalar(r#"SELECT goal FROM user_weight_goal WHERE u_id = $1"#)
                .bind(user_id)
                .fetch_optional(&self.db)
                .await
                .context("select weight goal")?;

        code.map(|c| {
            WeightGoal::from_code(&c)
                .ok_or_else(|| anyhow::anyhow!("unknown goal code '{c}' for user {user_id}"))
        })
        .transpose()
    }

    async fn save_weight_goal(&self, user_id: Uuid, goal: WeightGoal) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO user_weight_goal (u_id, goal)
            VALUES ($1, $2)
            ON CONFLICT (u_id) DO UPDATE SET goal = EXCLUDED.goal
            "#,
        )
        .bind(user_id)
        .bind(goal.code())
        .execute(&self.db)
        .await
        .context("upsert weight goal")?;
        Ok(())
    }
}
