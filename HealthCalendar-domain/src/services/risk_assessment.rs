//! Rule-based risk assessment of a health profile.
//!
//! Rules run in a fixed order and each one reads only its own section of
//! the profile. A category assigned twice keeps its first position in
//! `risks` and takes the later value.

use tracing::debug;

use crate::entities::health_profile::{
    ActivityLevel, CurrentHealth, FamilyHistory, HealthProfile, Lifestyle, MentalHealth, SmokingStatus,
};
use crate::entities::risk::{
    PreventiveCareAction, RecommendationArea, RiskAssessment, RiskCategory, RiskLevel,
};

/// Evaluate a health profile. Never fails; missing sections add nothing.
pub fn assess(profile: &HealthProfile) -> RiskAssessment {
    let mut builder = AssessmentBuilder::default();

    if let Some(current) = &profile.current_health {
        assess_bmi(&mut builder, current);
        assess_blood_pressure(&mut builder, current);
        assess_cholesterol(&mut builder, current);
        assess_blood_sugar(&mut builder, current);
    }

    if let Some(lifestyle) = &profile.lifestyle {
        assess_lifestyle(&mut builder, lifestyle);
    }

    if let Some(mental) = &profile.mental_health {
        assess_mental_health(&mut builder, mental);
    }

    if let Some(family) = &profile.family_history {
        assess_family_history(&mut builder, family);
    }

    let assessment = builder.finish();
    debug!(
        "Assessed profile: {} categories, overall {}",
        assessment.risks.len(),
        assessment.overall_risk
    );
    assessment
}

#[derive(Default)]
struct AssessmentBuilder {
    assessment: RiskAssessment,
}

impl AssessmentBuilder {
    fn set(&mut self, category: RiskCategory, level: RiskLevel) -> &mut Self {
        self.assessment.risks.insert(category, level);
        self
    }

    fn recommend(&mut self, area: RecommendationArea, tag: &str) -> &mut Self {
        self.assessment
            .recommendations
            .entry(area)
            .or_default()
            .push(tag.to_string());
        self
    }

    fn action(&mut self, care_type: &str, priority: RiskLevel, description: &str) -> &mut Self {
        self.assessment.preventive_care.push(PreventiveCareAction {
            care_type: care_type.to_string(),
            priority,
            description: description.to_string(),
        });
        self
    }

    fn finish(mut self) -> RiskAssessment {
        self.assessment.overall_risk = self
            .assessment
            .risks
            .values()
            .copied()
            .max()
            .unwrap_or(RiskLevel::Low);
        self.assessment
    }
}

fn assess_bmi(builder: &mut AssessmentBuilder, current: &CurrentHealth) {
    let Some(bmi) = current.bmi() else {
        return;
    };

    if bmi < 18.5 {
        builder
            .set(RiskCategory::Bmi, RiskLevel::High)
            .recommend(RecommendationArea::Nutrition, "underweight")
            .action(
                "nutrition_consultation",
                RiskLevel::High,
                "Consult with a nutritionist to develop a healthy weight gain plan",
            );
    } else if bmi >= 30.0 {
        builder
            .set(RiskCategory::Bmi, RiskLevel::High)
            .recommend(RecommendationArea::Nutrition, "obese")
            .action(
                "obesity_screening",
                RiskLevel::High,
                "Comprehensive health screening for obesity-related conditions",
            );
    } else if bmi >= 25.0 {
        builder
            .set(RiskCategory::Bmi, RiskLevel::Medium)
            .recommend(RecommendationArea::Nutrition, "overweight")
            .action(
                "weight_management",
                RiskLevel::Medium,
                "Regular weight monitoring and lifestyle modification",
            );
    }
}

fn assess_blood_pressure(builder: &mut AssessmentBuilder, current: &CurrentHealth) {
    let Some(bp) = &current.blood_pressure else {
        return;
    };
    let (systolic, diastolic) = (bp.systolic(), bp.diastolic());
    if systolic.is_none() && diastolic.is_none() {
        return;
    }

    let at_least = |value: Option<f64>, threshold: f64| value.map_or(false, |v| v >= threshold);

    if at_least(systolic, 140.0) || at_least(diastolic, 90.0) {
        builder
            .set(RiskCategory::BloodPressure, RiskLevel::High)
            .recommend(RecommendationArea::Screening, "hypertension")
            .action(
                "blood_pressure_monitoring",
                RiskLevel::High,
                "Daily blood pressure monitoring and medical consultation",
            );
    } else if at_least(systolic, 120.0) || at_least(diastolic, 80.0) {
        builder
            .set(RiskCategory::BloodPressure, RiskLevel::Medium)
            .recommend(RecommendationArea::Lifestyle, "blood_pressure")
            .action(
                "blood_pressure_check",
                RiskLevel::Medium,
                "Regular blood pressure monitoring",
            );
    } else {
        builder.set(RiskCategory::BloodPressure, RiskLevel::Low);
    }
}

fn assess_cholesterol(builder: &mut AssessmentBuilder, current: &CurrentHealth) {
    let Some(chol) = &current.cholesterol else {
        return;
    };
    let (total, ldl) = (chol.total(), chol.ldl());
    if total.is_none() && ldl.is_none() {
        return;
    }

    let at_least = |value: Option<f64>, threshold: f64| value.map_or(false, |v| v >= threshold);

    if at_least(total, 240.0) || at_least(ldl, 160.0) {
        builder
            .set(RiskCategory::Cholesterol, RiskLevel::High)
            .recommend(RecommendationArea::Screening, "cholesterol")
            .action(
                "lipid_panel",
                RiskLevel::High,
                "Comprehensive lipid panel and medical consultation",
            );
    } else if at_least(total, 200.0) || at_least(ldl, 130.0) {
        builder
            .set(RiskCategory::Cholesterol, RiskLevel::Medium)
            .recommend(RecommendationArea::Lifestyle, "cholesterol")
            .action(
                "cholesterol_screening",
                RiskLevel::Medium,
                "Regular cholesterol monitoring",
            );
    } else {
        builder.set(RiskCategory::Cholesterol, RiskLevel::Low);
    }
}

fn assess_blood_sugar(builder: &mut AssessmentBuilder, current: &CurrentHealth) {
    let Some(fasting) = current.blood_sugar.as_ref().and_then(|bs| bs.fasting()) else {
        return;
    };

    if fasting >= 126.0 {
        builder
            .set(RiskCategory::BloodSugar, RiskLevel::High)
            .recommend(RecommendationArea::Screening, "diabetes")
            .action(
                "diabetes_screening",
                RiskLevel::High,
                "Comprehensive diabetes screening and medical consultation",
            );
    } else if fasting >= 100.0 {
        builder
            .set(RiskCategory::BloodSugar, RiskLevel::Medium)
            .recommend(RecommendationArea::Lifestyle, "blood_sugar")
            .action(
                "glucose_monitoring",
                RiskLevel::Medium,
                "Regular blood glucose monitoring",
            );
    } else {
        builder.set(RiskCategory::BloodSugar, RiskLevel::Low);
    }
}

fn assess_lifestyle(builder: &mut AssessmentBuilder, lifestyle: &Lifestyle) {
    if lifestyle.smoking_status == Some(SmokingStatus::Current) {
        builder
            .set(RiskCategory::Smoking, RiskLevel::High)
            .recommend(RecommendationArea::Lifestyle, "quit_smoking")
            .action(
                "smoking_cessation",
                RiskLevel::High,
                "Smoking cessation program and lung health screening",
            );
    }

    match lifestyle.physical_activity {
        Some(ActivityLevel::Sedentary) => {
            builder
                .set(RiskCategory::PhysicalActivity, RiskLevel::High)
                .recommend(RecommendationArea::Lifestyle, "increase_activity")
                .action(
                    "physical_activity_assessment",
                    RiskLevel::High,
                    "Physical activity assessment and personalized exercise plan",
                );
        }
        Some(ActivityLevel::Light) => {
            builder
                .set(RiskCategory::PhysicalActivity, RiskLevel::Medium)
                .recommend(RecommendationArea::Lifestyle, "moderate_activity")
                .action(
                    "exercise_consultation",
                    RiskLevel::Medium,
                    "Exercise consultation for improved activity levels",
                );
        }
        _ => {}
    }

    match lifestyle.sleep_hours() {
        Some(hours) if hours < 6.0 => {
            builder
                .set(RiskCategory::Sleep, RiskLevel::High)
                .recommend(RecommendationArea::Lifestyle, "improve_sleep")
                .action(
                    "sleep_study",
                    RiskLevel::High,
                    "Sleep study and consultation for sleep improvement",
                );
        }
        Some(hours) if hours < 7.0 => {
            builder
                .set(RiskCategory::Sleep, RiskLevel::Medium)
                .recommend(RecommendationArea::Lifestyle, "adequate_sleep")
                .action(
                    "sleep_consultation",
                    RiskLevel::Medium,
                    "Sleep consultation for better sleep habits",
                );
        }
        _ => {}
    }
}

fn assess_mental_health(builder: &mut AssessmentBuilder, mental: &MentalHealth) {
    let highest = mental.stress_level().max(mental.anxiety_level());

    match highest {
        Some(level) if level >= 4 => {
            builder
                .set(RiskCategory::MentalHealth, RiskLevel::High)
                .recommend(RecommendationArea::MentalHealth, "stress_management")
                .action(
                    "mental_health_screening",
                    RiskLevel::High,
                    "Comprehensive mental health screening and consultation",
                );
        }
        Some(3) => {
            builder
                .set(RiskCategory::MentalHealth, RiskLevel::Medium)
                .recommend(RecommendationArea::MentalHealth, "mental_wellness")
                .action(
                    "stress_management",
                    RiskLevel::Medium,
                    "Stress management consultation",
                );
        }
        _ => {}
    }

    if mental.depression_symptoms {
        builder
            .set(RiskCategory::Depression, RiskLevel::High)
            .recommend(RecommendationArea::MentalHealth, "depression_screening")
            .action(
                "depression_screening",
                RiskLevel::High,
                "Depression screening and mental health consultation",
            );
    }
}

fn assess_family_history(builder: &mut AssessmentBuilder, family: &FamilyHistory) {
    let flags = [
        (
            family.diabetes,
            RiskCategory::Diabetes,
            "diabetes_screening",
            "Regular diabetes screening due to family history",
        ),
        (
            family.heart_disease,
            RiskCategory::HeartDisease,
            "cardiac_screening",
            "Regular cardiac screening due to family history",
        ),
        (
            family.cancer,
            RiskCategory::Cancer,
            "cancer_screening",
            "Regular cancer screening due to family history",
        ),
        (
            family.high_blood_pressure,
            RiskCategory::Hypertension,
            "blood_pressure_monitoring",
            "Regular blood pressure monitoring due to family history",
        ),
    ];

    for (present, category, care_type, description) in flags {
        if present {
            builder
                .set(category, RiskLevel::Medium)
                .recommend(RecommendationArea::Screening, category.as_str())
                .action(care_type, RiskLevel::Medium, description);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::health_profile::{BloodPressure, BloodSugar, Cholesterol};

    fn with_current(current: CurrentHealth) -> HealthProfile {
        HealthProfile {
            current_health: Some(current),
            ..Default::default()
        }
    }

    fn with_blood_pressure(systolic: f64, diastolic: f64) -> HealthProfile {
        with_current(CurrentHealth {
            blood_pressure: Some(BloodPressure {
                systolic: Some(systolic),
                diastolic: Some(diastolic),
            }),
            ..Default::default()
        })
    }

    #[test]
    fn test_empty_profile_is_low_risk() {
        let assessment = assess(&HealthProfile::default());
        assert_eq!(assessment.overall_risk, RiskLevel::Low);
        assert!(assessment.risks.is_empty());
        assert!(assessment.recommendations.is_empty());
        assert!(assessment.preventive_care.is_empty());
    }

    #[test]
    fn test_empty_sections_add_nothing() {
        let profile = HealthProfile {
            lifestyle: Some(Lifestyle::default()),
            family_history: Some(FamilyHistory::default()),
            current_health: Some(CurrentHealth::default()),
            mental_health: Some(MentalHealth::default()),
        };
        let assessment = assess(&profile);
        assert!(assessment.risks.is_empty());
        assert_eq!(assessment.overall_risk, RiskLevel::Low);
    }

    #[test]
    fn test_overweight_bmi_is_medium() {
        let assessment = assess(&with_current(CurrentHealth {
            height: Some(160.0),
            weight: Some(70.0),
            ..Default::default()
        }));
        assert_eq!(assessment.risk(RiskCategory::Bmi), Some(RiskLevel::Medium));
        assert_eq!(
            assessment.recommendations_for(RecommendationArea::Nutrition),
            ["overweight".to_string()]
        );
        assert!(assessment.has_action("weight_management"));
        assert_eq!(assessment.overall_risk, RiskLevel::Medium);
    }

    #[test]
    fn test_bmi_tiers() {
        let bmi_for = |weight: f64| {
            assess(&with_current(CurrentHealth {
                height: Some(180.0),
                weight: Some(weight),
                ..Default::default()
            }))
        };

        let underweight = bmi_for(55.0);
        assert_eq!(underweight.risk(RiskCategory::Bmi), Some(RiskLevel::High));
        assert!(underweight.has_action("nutrition_consultation"));

        let normal = bmi_for(70.0);
        assert_eq!(normal.risk(RiskCategory::Bmi), None);
        assert!(normal.preventive_care.is_empty());

        let obese = bmi_for(100.0);
        assert_eq!(obese.risk(RiskCategory::Bmi), Some(RiskLevel::High));
        assert!(obese.has_action("obesity_screening"));
    }

    #[test]
    fn test_systolic_alone_triggers_high_blood_pressure() {
        let assessment = assess(&with_blood_pressure(140.0, 85.0));
        assert_eq!(assessment.risk(RiskCategory::BloodPressure), Some(RiskLevel::High));
        assert!(assessment.has_action("blood_pressure_monitoring"));
    }

    #[test]
    fn test_blood_pressure_tiers() {
        let medium = assess(&with_blood_pressure(118.0, 80.0));
        assert_eq!(medium.risk(RiskCategory::BloodPressure), Some(RiskLevel::Medium));
        assert!(medium.has_action("blood_pressure_check"));

        let low = assess(&with_blood_pressure(110.0, 70.0));
        assert_eq!(low.risk(RiskCategory::BloodPressure), Some(RiskLevel::Low));
        assert!(low.preventive_care.is_empty());
        assert_eq!(low.overall_risk, RiskLevel::Low);
    }

    #[test]
    fn test_zero_readings_are_absent() {
        let assessment = assess(&with_blood_pressure(0.0, 0.0));
        assert_eq!(assessment.risk(RiskCategory::BloodPressure), None);
    }

    #[test]
    fn test_cholesterol_and_blood_sugar() {
        let assessment = assess(&with_current(CurrentHealth {
            cholesterol: Some(Cholesterol {
                total: Some(210.0),
                hdl: Some(50.0),
                ldl: Some(120.0),
            }),
            blood_sugar: Some(BloodSugar {
                fasting: Some(130.0),
                hba1c: None,
            }),
            ..Default::default()
        }));
        assert_eq!(assessment.risk(RiskCategory::Cholesterol), Some(RiskLevel::Medium));
        assert_eq!(assessment.risk(RiskCategory::BloodSugar), Some(RiskLevel::High));
        assert_eq!(
            assessment.recommendations_for(RecommendationArea::Screening),
            ["diabetes".to_string()]
        );
        assert_eq!(
            assessment.recommendations_for(RecommendationArea::Lifestyle),
            ["cholesterol".to_string()]
        );
    }

    #[test]
    fn test_lifestyle_rules() {
        let assessment = assess(&HealthProfile {
            lifestyle: Some(Lifestyle {
                smoking_status: Some(SmokingStatus::Current),
                physical_activity: Some(ActivityLevel::Light),
                sleep_hours: Some(5.5),
                ..Default::default()
            }),
            ..Default::default()
        });
        assert_eq!(assessment.risk(RiskCategory::Smoking), Some(RiskLevel::High));
        assert_eq!(assessment.risk(RiskCategory::PhysicalActivity), Some(RiskLevel::Medium));
        assert_eq!(assessment.risk(RiskCategory::Sleep), Some(RiskLevel::High));

        let types: Vec<&str> = assessment
            .preventive_care
            .iter()
            .map(|a| a.care_type.as_str())
            .collect();
        assert_eq!(types, vec!["smoking_cessation", "exercise_consultation", "sleep_study"]);
    }

    #[test]
    fn test_former_smoker_and_active_sleeper_add_nothing() {
        let assessment = assess(&HealthProfile {
            lifestyle: Some(Lifestyle {
                smoking_status: Some(SmokingStatus::Former),
                physical_activity: Some(ActivityLevel::VeryActive),
                sleep_hours: Some(8.0),
                ..Default::default()
            }),
            ..Default::default()
        });
        assert!(assessment.risks.is_empty());
    }

    #[test]
    fn test_mental_health_and_depression_are_independent() {
        let assessment = assess(&HealthProfile {
            mental_health: Some(MentalHealth {
                stress_level: Some(2),
                anxiety_level: Some(3),
                depression_symptoms: true,
            }),
            ..Default::default()
        });
        assert_eq!(assessment.risk(RiskCategory::MentalHealth), Some(RiskLevel::Medium));
        assert_eq!(assessment.risk(RiskCategory::Depression), Some(RiskLevel::High));
        assert_eq!(
            assessment.recommendations_for(RecommendationArea::MentalHealth),
            ["mental_wellness".to_string(), "depression_screening".to_string()]
        );
        assert_eq!(assessment.overall_risk, RiskLevel::High);
    }

    #[test]
    fn test_family_history_entries() {
        let assessment = assess(&HealthProfile {
            family_history: Some(FamilyHistory {
                heart_disease: true,
                high_blood_pressure: true,
                stroke: true,
                ..Default::default()
            }),
            ..Default::default()
        });
        assert_eq!(assessment.risk(RiskCategory::HeartDisease), Some(RiskLevel::Medium));
        assert_eq!(assessment.risk(RiskCategory::Hypertension), Some(RiskLevel::Medium));
        assert_eq!(assessment.risks.len(), 2);
        assert!(assessment.has_action("cardiac_screening"));
        assert_eq!(
            assessment.recommendations_for(RecommendationArea::Screening),
            ["heart_disease".to_string(), "hypertension".to_string()]
        );
    }

    #[test]
    fn test_measured_and_family_risks_coexist() {
        let mut profile = with_current(CurrentHealth {
            blood_sugar: Some(BloodSugar {
                fasting: Some(140.0),
                hba1c: None,
            }),
            ..Default::default()
        });
        profile.family_history = Some(FamilyHistory {
            diabetes: true,
            ..Default::default()
        });

        let assessment = assess(&profile);
        assert_eq!(assessment.risk(RiskCategory::BloodSugar), Some(RiskLevel::High));
        assert_eq!(assessment.risk(RiskCategory::Diabetes), Some(RiskLevel::Medium));
        let diabetes_actions = assessment
            .preventive_care
            .iter()
            .filter(|a| a.care_type == "diabetes_screening")
            .count();
        assert_eq!(diabetes_actions, 2);
    }

    #[test]
    fn test_assess_is_idempotent() {
        let mut profile = with_blood_pressure(150.0, 95.0);
        profile.mental_health = Some(MentalHealth {
            stress_level: Some(4),
            anxiety_level: None,
            depression_symptoms: false,
        });
        assert_eq!(assess(&profile), assess(&profile));
    }

    #[test]
    fn test_adding_high_entry_flips_overall_to_high() {
        let mut profile = with_blood_pressure(125.0, 82.0);
        assert_eq!(assess(&profile).overall_risk, RiskLevel::Medium);

        profile.lifestyle = Some(Lifestyle {
            smoking_status: Some(SmokingStatus::Current),
            ..Default::default()
        });
        assert_eq!(assess(&profile).overall_risk, RiskLevel::High);
    }

    #[test]
    fn test_category_order_follows_evaluation() {
        let mut profile = with_blood_pressure(125.0, 70.0);
        profile.lifestyle = Some(Lifestyle {
            physical_activity: Some(ActivityLevel::Sedentary),
            ..Default::default()
        });
        profile.family_history = Some(FamilyHistory {
            cancer: true,
            ..Default::default()
        });

        let categories: Vec<RiskCategory> = assess(&profile).risks.keys().copied().collect();
        assert_eq!(
            categories,
            vec![RiskCategory::BloodPressure, RiskCategory::PhysicalActivity, RiskCategory::Cancer]
        );
    }
}
