use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

/// Risk level, ordered `Low < Medium < High`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "low"),
            RiskLevel::Medium => write!(f, "medium"),
            RiskLevel::High => write!(f, "high"),
        }
    }
}

/// Health dimension that can carry a risk level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum RiskCategory {
    Bmi,
    BloodPressure,
    Cholesterol,
    BloodSugar,
    Smoking,
    PhysicalActivity,
    Sleep,
    MentalHealth,
    Depression,
    Diabetes,
    HeartDisease,
    Cancer,
    Hypertension,
}

impl RiskCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskCategory::Bmi => "bmi",
            RiskCategory::BloodPressure => "blood_pressure",
            RiskCategory::Cholesterol => "cholesterol",
            RiskCategory::BloodSugar => "blood_sugar",
            RiskCategory::Smoking => "smoking",
            RiskCategory::PhysicalActivity => "physical_activity",
            RiskCategory::Sleep => "sleep",
            RiskCategory::MentalHealth => "mental_health",
            RiskCategory::Depression => "depression",
            RiskCategory::Diabetes => "diabetes",
            RiskCategory::HeartDisease => "heart_disease",
            RiskCategory::Cancer => "cancer",
            RiskCategory::Hypertension => "hypertension",
        }
    }
}

impl fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Area a recommendation tag is filed under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum RecommendationArea {
    Nutrition,
    Lifestyle,
    Screening,
    MentalHealth,
}

/// Concrete next step generated alongside a risk entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct PreventiveCareAction {
    /// Action identifier, e.g. `lipid_panel`
    #[serde(rename = "type")]
    pub care_type: String,

    pub priority: RiskLevel,

    pub description: String,
}

/// Result of evaluating a health profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct RiskAssessment {
    /// Risk level per category, in the order the categories were first assessed
    #[cfg_attr(feature = "with-api", schema(value_type = Object))]
    pub risks: IndexMap<RiskCategory, RiskLevel>,

    /// Highest level present in `risks`, `low` when empty
    pub overall_risk: RiskLevel,

    /// Recommendation tags per area
    #[cfg_attr(feature = "with-api", schema(value_type = Object))]
    pub recommendations: IndexMap<RecommendationArea, Vec<String>>,

    /// Preventive-care actions in evaluation order
    pub preventive_care: Vec<PreventiveCareAction>,
}

impl Default for RiskAssessment {
    fn default() -> Self {
        Self {
            risks: IndexMap::new(),
            overall_risk: RiskLevel::Low,
            recommendations: IndexMap::new(),
            preventive_care: Vec::new(),
        }
    }
}

impl RiskAssessment {
    /// Level recorded for a category
    pub fn risk(&self, category: RiskCategory) -> Option<RiskLevel> {
        self.risks.get(&category).copied()
    }

    /// Recommendation tags for an area, empty when none were filed
    pub fn recommendations_for(&self, area: RecommendationArea) -> &[String] {
        self.recommendations
            .get(&area)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Whether an action of the given type was generated
    pub fn has_action(&self, care_type: &str) -> bool {
        self.preventive_care.iter().any(|a| a.care_type == care_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn risk_levels_are_ordered() {
        assert!(RiskLevel::Low < RiskLevel::Medium);
        assert!(RiskLevel::Medium < RiskLevel::High);
    }

    #[test]
    fn assessment_serializes_with_snake_case_keys() {
        let mut assessment = RiskAssessment::default();
        assessment.risks.insert(RiskCategory::BloodPressure, RiskLevel::High);
        assessment.overall_risk = RiskLevel::High;
        assessment
            .recommendations
            .insert(RecommendationArea::MentalHealth, vec!["mental_wellness".to_string()]);
        assessment.preventive_care.push(PreventiveCareAction {
            care_type: "blood_pressure_monitoring".to_string(),
            priority: RiskLevel::High,
            description: "Daily blood pressure monitoring".to_string(),
        });

        let json = serde_json::to_value(&assessment).unwrap();
        assert_eq!(json["risks"]["blood_pressure"], "high");
        assert_eq!(json["overall_risk"], "high");
        assert_eq!(json["recommendations"]["mental_health"][0], "mental_wellness");
        assert_eq!(json["preventive_care"][0]["type"], "blood_pressure_monitoring");
    }
}
