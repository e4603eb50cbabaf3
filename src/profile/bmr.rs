use super::repo_types::Gender;

/// Basal metabolic rate in kcal/day, Mifflin-St Jeor equation.
///
/// Inputs are expected to be validated (all strictly positive) by the caller.
pub fn compute_bmr(gender: Gender, age_years: i32, weight_kg: f64, height_cm: i32) -> f64 {
    let base = 10.0 * weight_kg + 6.25 * f64::from(height_cm) - 5.0 * f64::from(age_years);
    match gender {
        Gender::Male => base + 5.0,
        Gender::Female => base - 161.0,
    }
}
