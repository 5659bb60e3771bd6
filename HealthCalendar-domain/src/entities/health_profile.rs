use serde::{Deserialize, Serialize};

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

/// Self-reported health profile collected by the health assessment form.
///
/// Every section is optional and read independently. A missing section
/// contributes nothing to a risk assessment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct HealthProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lifestyle: Option<Lifestyle>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family_history: Option<FamilyHistory>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_health: Option<CurrentHealth>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mental_health: Option<MentalHealth>,
}

/// Smoking status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum SmokingStatus {
    Never,
    Former,
    Current,
    /// Any value outside the form's vocabulary
    #[serde(other)]
    Unknown,
}

/// Physical activity level, ordered from least to most active
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    Sedentary,
    Light,
    Moderate,
    Active,
    VeryActive,
    /// Any value outside the form's vocabulary
    #[serde(other)]
    Unknown,
}

/// Lifestyle section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct Lifestyle {
    #[serde(default)]
    pub smoking_status: Option<SmokingStatus>,

    #[serde(default)]
    pub physical_activity: Option<ActivityLevel>,

    /// Average hours of sleep per night
    #[serde(default)]
    pub sleep_hours: Option<f64>,

    /// Diet type, e.g. "mediterranean" or "vegetarian"
    #[serde(default)]
    pub diet_type: Option<String>,

    /// Alcohol consumption, e.g. "none", "occasional"
    #[serde(default)]
    pub alcohol_consumption: Option<String>,
}

impl Lifestyle {
    /// Sleep hours, treating non-positive values as not reported
    pub fn sleep_hours(&self) -> Option<f64> {
        positive(self.sleep_hours)
    }
}

/// Family history flags
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct FamilyHistory {
    #[serde(default)]
    pub diabetes: bool,

    #[serde(default)]
    pub heart_disease: bool,

    #[serde(default)]
    pub cancer: bool,

    #[serde(default, alias = "hypertension")]
    pub high_blood_pressure: bool,

    #[serde(default)]
    pub stroke: bool,

    #[serde(default)]
    pub kidney_disease: bool,

    #[serde(default)]
    pub thyroid_disorders: bool,

    #[serde(default)]
    pub autoimmune_diseases: bool,
}

/// Blood pressure reading in mmHg
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct BloodPressure {
    #[serde(default)]
    pub systolic: Option<f64>,

    #[serde(default)]
    pub diastolic: Option<f64>,
}

impl BloodPressure {
    pub fn systolic(&self) -> Option<f64> {
        positive(self.systolic)
    }

    pub fn diastolic(&self) -> Option<f64> {
        positive(self.diastolic)
    }
}

/// Cholesterol panel in mg/dL
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct Cholesterol {
    #[serde(default)]
    pub total: Option<f64>,

    #[serde(default)]
    pub hdl: Option<f64>,

    #[serde(default)]
    pub ldl: Option<f64>,
}

impl Cholesterol {
    pub fn total(&self) -> Option<f64> {
        positive(self.total)
    }

    pub fn ldl(&self) -> Option<f64> {
        positive(self.ldl)
    }
}

/// Blood sugar readings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct BloodSugar {
    /// Fasting glucose in mg/dL
    #[serde(default)]
    pub fasting: Option<f64>,

    /// HbA1c in percent
    #[serde(default)]
    pub hba1c: Option<f64>,
}

impl BloodSugar {
    pub fn fasting(&self) -> Option<f64> {
        positive(self.fasting)
    }
}

/// Current measurements
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct CurrentHealth {
    /// Height in centimetres
    #[serde(default)]
    pub height: Option<f64>,

    /// Weight in kilograms
    #[serde(default)]
    pub weight: Option<f64>,

    #[serde(default)]
    pub blood_pressure: Option<BloodPressure>,

    #[serde(default)]
    pub cholesterol: Option<Cholesterol>,

    #[serde(default)]
    pub blood_sugar: Option<BloodSugar>,
}

impl CurrentHealth {
    /// Body-mass index, when both height and weight are reported
    pub fn bmi(&self) -> Option<f64> {
        let height_m = positive(self.height)? / 100.0;
        let weight = positive(self.weight)?;
        Some(weight / (height_m * height_m))
    }
}

/// Mental health section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct MentalHealth {
    /// Self-rated stress, 1 to 5
    #[serde(default)]
    pub stress_level: Option<u8>,

    /// Self-rated anxiety, 1 to 5
    #[serde(default)]
    pub anxiety_level: Option<u8>,

    #[serde(default)]
    pub depression_symptoms: bool,
}

impl MentalHealth {
    pub fn stress_level(&self) -> Option<u8> {
        self.stress_level.filter(|level| (1..=5).contains(level))
    }

    pub fn anxiety_level(&self) -> Option<u8> {
        self.anxiety_level.filter(|level| (1..=5).contains(level))
    }
}

fn positive(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v > 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bmi_needs_height_and_weight() {
        let health = CurrentHealth {
            height: Some(160.0),
            weight: Some(70.0),
            ..Default::default()
        };
        let bmi = health.bmi().unwrap();
        assert!((bmi - 27.34).abs() < 0.01);

        let missing = CurrentHealth {
            height: Some(0.0),
            weight: Some(70.0),
            ..Default::default()
        };
        assert_eq!(missing.bmi(), None);
    }

    #[test]
    fn unknown_vocabulary_deserializes() {
        let lifestyle: Lifestyle =
            serde_json::from_str(r#"{"smoking_status": "sometimes", "physical_activity": "very_active"}"#).unwrap();
        assert_eq!(lifestyle.smoking_status, Some(SmokingStatus::Unknown));
        assert_eq!(lifestyle.physical_activity, Some(ActivityLevel::VeryActive));
    }

    #[test]
    fn hypertension_alias_is_accepted() {
        let history: FamilyHistory = serde_json::from_str(r#"{"hypertension": true}"#).unwrap();
        assert!(history.high_blood_pressure);
        assert!(!history.diabetes);
    }

    #[test]
    fn out_of_range_levels_are_ignored() {
        let mental = MentalHealth {
            stress_level: Some(9),
            anxiety_level: Some(0),
            depression_symptoms: false,
        };
        assert_eq!(mental.stress_level(), None);
        assert_eq!(mental.anxiety_level(), None);
    }
}
