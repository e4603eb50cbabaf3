use tracing::{debug, info};
use uuid::Uuid;

use super::bmr::compute_bmr;
use super::repo_types::{BodyDetails, BodyDetailsPatch, WeightGoal};
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Apply `patch` over `existing`. BMR is recomputed only if a field changed.
pub fn merge_body_details(
    user_id: Uuid,
    existing: Option<&BodyDetails>,
    patch: &BodyDetailsPatch,
) -> AppResult<BodyDetails> {
    let Some(prev) = existing else {
        let (Some(age), Some(height_cm), Some(weight_kg), Some(gender)) =
            (patch.age, patch.height_cm, patch.weight_kg, patch.gender)
        else {
            return Err(AppError::validation(
                "age, height, weight and gender are required the first time",
            ));
        };
        return Ok(BodyDetails {
            user_id,
            age,
            height_cm,
            weight_kg,
            gender,
            bmr: compute_bmr(gender, age, weight_kg, height_cm),
        });
    };

    let mut next = BodyDetails {
        user_id,
        age: patch.age.unwrap_or(prev.age),
        height_cm: patch.height_cm.unwrap_or(prev.height_cm),
        weight_kg: patch.weight_kg.unwrap_or(prev.weight_kg),
        gender: patch.gender.unwrap_or(prev.gender),
        bmr: prev.bmr,
    };

    let changed = next.age != prev.age
        || next.height_cm != prev.height_cm
        || next.weight_kg != prev.weight_kg
        || next.gender != prev.gender;
    if changed {
        next.bmr = compute_bmr(next.gender, next.age, next.weight_kg, next.height_cm);
    }
    Ok(next)
}

pub async fn upsert_body_details(
    st: &AppState,
    user_id: Uuid,
    patch: &BodyDetailsPatch,
) -> AppResult<BodyDetails> {
    let existing = st.profiles.body_details(user_id).await?;
    let merged = merge_body_details(user_id, existing.as_ref(), patch)?;

    if existing.as_ref() == Some(&merged) {
        debug!(%user_id, "body details unchanged");
        return Ok(merged);
    }

    st.profiles.save_body_details(&merged).await?;
    info!(%user_id, bmr = merged.bmr, "body details saved");
    Ok(merged)
}

pub async fn body_details(st: &AppState, user_id: Uuid) -> AppResult<BodyDetails> {
    st.profiles
        .body_details(user_id)
        .await?
        .ok_or_else(|| AppError::not_found("Body details not found"))
}

pub async fn body_details_exist(st: &AppState, user_id: Uuid) -> AppResult<bool> {
    Ok(st.profiles.body_details(user_id).await?.is_some())
}

/// Current BMR, the seed for a new day's TDEE.
pub async fn current_bmr(st: &AppState, user_id: Uuid) -> AppResult<f64> {
    Ok(body_details(st, user_id).await?.bmr)
}

/// Upsert the weight goal; `None` keeps the stored goal.
pub async fn set_weight_goal(
    st: &AppState,
    user_id: Uuid,
    goal: Option<WeightGoal>,
) -> AppResult<WeightGoal> {
    let current = st.profiles.weight_goal(user_id).await?;
    match (goal, current) {
        (Some(g), _) => {
            st.profiles.save_weight_goal(user_id, g).await?;
            info!(%user_id, goal = g.code(), "weight goal saved");
            Ok(g)
        }
        (None, Some(existing)) => Ok(existing),
        (None, None) => Err(AppError::validation("goal is required")),
    }
}

pub async fn weight_goal(st: &AppState, user_id: Uuid) -> AppResult<Option<WeightGoal>> {
    Ok(st.profiles.weight_goal(user_id).await?)
}
