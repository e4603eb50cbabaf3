use serde::{Deserialize, Serialize};

use super::repo_types::{BodyDetailsPatch, Gender, WeightGoal};
use crate::error::{AppError, AppResult};

/// Body-details upsert. A zero number or empty string means "leave unchanged".
#[derive(Debug, Default, Deserialize)]
pub struct UpsertBodyDetailsRequest {
    #[serde(default)]
    pub age: i32,
    #[serde(default, alias = "height")]
    pub height_cm: i32,
    #[serde(default, alias = "weight")]
    pub weight_kg: f64,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub goal: String,
}

#[derive(Debug, Deserialize)]
pub struct SetWeightGoalRequest {
    #[serde(default)]
    pub goal: String,
}

#[derive(Debug, Serialize)]
pub struct BodyDetailsExistResponse {
    pub exists: bool,
}

#[derive(Debug, Serialize)]
pub struct WeightGoalResponse {
    pub goal: WeightGoal,
}

fn positive_i32(field: &str, v: i32) -> AppResult<Option<i32>> {
    match v {
        0 => Ok(None),
        v if v > 0 => Ok(Some(v)),
        _ => Err(AppError::validation(format!("{field} must be positive"))),
    }
}

pub(crate) fn parse_gender(raw: &str) -> AppResult<Option<Gender>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    Gender::from_code(&raw.to_uppercase())
        .map(Some)
        .ok_or_else(|| AppError::validation(format!("Unknown gender '{raw}', expected M or F")))
}

pub(crate) fn parse_goal(raw: &str) -> AppResult<Option<WeightGoal>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    WeightGoal::from_code(&raw.to_uppercase())
        .map(Some)
        .ok_or_else(|| AppError::validation(format!("Unknown goal '{raw}', expected L, G or M")))
}

impl UpsertBodyDetailsRequest {
    pub fn patch(&self) -> AppResult<BodyDetailsPatch> {
        let weight_kg = if self.weight_kg == 0.0 {
            None
        } else if self.weight_kg > 0.0 && self.weight_kg.is_finite() {
            Some(self.weight_kg)
        } else {
            return Err(AppError::validation("weight must be positive"));
        };
        Ok(BodyDetailsPatch {
            age: positive_i32("age", self.age)?,
            height_cm: positive_i32("height", self.height_cm)?,
            weight_kg,
            gender: parse_gender(&self.gender)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_and_empty_fields_become_absent() {
        let req: UpsertBodyDetailsRequest =
            serde_json::from_str(r#"{"age":0,"height":0,"weight":0,"gender":""}"#).unwrap();
        assert_eq!(req.patch().unwrap(), BodyDetailsPatch::default());
    }

    #[test]
    fn accepts_short_and_long_field_names() {
        let req: UpsertBodyDetailsRequest =
            serde_json::from_str(r#"{"age":30,"height":180,"weight_kg":80.5,"gender":"m"}"#)
                .unwrap();
        let patch = req.patch().unwrap();
        assert_eq!(patch.age, Some(30));
        assert_eq!(patch.height_cm, Some(180));
        assert_eq!(patch.weight_kg, Some(80.5));
        assert_eq!(patch.gender, Some(Gender::Male));
    }

    #[test]
    fn rejects_negative_values_and_unknown_codes() {
        let neg = UpsertBodyDetailsRequest {
            age: -1,
            ..Default::default()
        };
        assert!(matches!(neg.patch(), Err(AppError::Validation(_))));

        let bad_gender = UpsertBodyDetailsRequest {
            gender: "X".into(),
            ..Default::default()
        };
        assert!(matches!(bad_gender.patch(), Err(AppError::Validation(_))));

        assert!(matches!(parse_goal("Z"), Err(AppError::Validation(_))));
        assert_eq!(parse_goal("g").unwrap(), Some(WeightGoal::Gain));
        assert_eq!(parse_goal("").unwrap(), None);
    }
}
