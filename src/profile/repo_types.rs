use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
}

impl Gender {
    pub fn code(self) -> &'static str {
        match self {
            Gender::Male => "M",
            Gender::Female => "F",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "M" => Some(Gender::Male),
            "F" => Some(Gender::Female),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeightGoal {
    #[serde(rename = "L")]
    Lose,
    #[serde(rename = "G")]
    Gain,
    #[serde(rename = "M")]
    Maintain,
}

impl WeightGoal {
    pub fn code(self) -> &'static str {
        match self {
            WeightGoal::Lose => "L",
            WeightGoal::Gain => "G",
            WeightGoal::Maintain => "M",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "L" => Some(WeightGoal::Lose),
            "G" => Some(WeightGoal::Gain),
            "M" => Some(WeightGoal::Maintain),
            _ => None,
        }
    }
}

#[derive(Debug, FromRow)]
pub struct BodyDetailsRow {
    pub u_id: Uuid,
    pub age: i32,
    pub height_cm: i32,
    pub weight_kg: f64,
    pub gender: String,
    pub bmr: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BodyDetails {
    #[serde(skip_serializing)]
    pub user_id: Uuid,
    pub age: i32,
    pub height_cm: i32,
    pub weight_kg: f64,
    pub gender: Gender,
    pub bmr: f64,
}

impl TryFrom<BodyDetailsRow> for BodyDetails {
    type Error = anyhow::Error;

    fn try_from(r: BodyDetailsRow) -> Result<Self, Self::Error> {
        let gender = Gender::from_code(&r.gender).ok_or_else(|| {
            anyhow::anyhow!("unknown gender code '{}' for user {}", r.gender, r.u_id)
        })?;
        Ok(Self {
            user_id: r.u_id,
            age: r.age,
            height_cm: r.height_cm,
            weight_kg: r.weight_kg,
            gender,
            bmr: r.bmr,
        })
    }
}

/// Partial body-details update. `None` leaves the stored value unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BodyDetailsPatch {
    pub age: Option<i32>,
    pub height_cm: Option<i32>,
    pub weight_kg: Option<f64>,
    pub gender: Option<Gender>,
}
