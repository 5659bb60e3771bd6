use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

use super::health_profile::ActivityLevel;
use super::risk::RiskAssessment;

/// BMI category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum BmiCategory {
    Underweight,
    Normal,
    Overweight,
    Obese,
}

/// Blood pressure category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum BloodPressureCategory {
    Normal,
    Elevated,
    Stage1,
    Stage2,
}

/// Outcome of comparing a lifestyle value with its recommendation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    Good,
    NeedsImprovement,
    ConsiderChange,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct ActivityComparison {
    pub user_level: ActivityLevel,
    pub recommended: ActivityLevel,
    pub comparison: Comparison,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct DietComparison {
    pub user_type: String,
    pub recommended: String,
    pub comparison: Comparison,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct SleepComparison {
    pub user_hours: f64,
    /// Recommended range, "7-9"
    pub recommended: String,
    pub comparison: Comparison,
}

/// Categorized summary of a health profile
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct ProfileInsights {
    pub bmi: Option<f64>,
    pub bmi_category: Option<BmiCategory>,
    pub blood_pressure_category: Option<BloodPressureCategory>,
    pub physical_activity: Option<ActivityComparison>,
    pub diet: Option<DietComparison>,
    pub sleep: Option<SleepComparison>,
}

/// Risk assessment together with the profile insights it was computed from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct AssessmentReport {
    pub assessment: RiskAssessment,
    pub insights: ProfileInsights,
    /// When the assessed profile was submitted, for stored profiles
    pub submitted_at: Option<DateTime<Utc>>,
}
