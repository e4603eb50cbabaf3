use tracing::debug;
use uuid::Uuid;

use crate::error::AppResult;
use crate::profile::{repo_types::WeightGoal, services as profile};
use crate::state::AppState;

/// Report the raw balance sum relative to the weight goal.
///
/// For a gain goal a deficit is reported as a positive magnitude and a
/// surplus as negative. Every other goal, or none, gets the raw sum.
pub fn apply_goal_direction(raw: f64, goal: Option<WeightGoal>) -> f64 {
    match goal {
        Some(WeightGoal::Gain) if raw < 0.0 => raw.abs(),
        Some(WeightGoal::Gain) if raw > 0.0 => -raw,
        _ => raw,
    }
}

pub async fn net_caloric_balance(st: &AppState, user_id: Uuid) -> AppResult<f64> {
    let raw = st.balances.net_sum(user_id).await?;
    let goal = profile::weight_goal(st, user_id).await?;
    let net = apply_goal_direction(raw, goal);
    debug!(%user_id, raw, net, goal = ?goal, "net caloric balance");
    Ok(net)
}
