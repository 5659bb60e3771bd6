use crate::entities::health_profile::{ActivityLevel, HealthProfile, Lifestyle};
use crate::entities::insights::{
    ActivityComparison, BloodPressureCategory, BmiCategory, Comparison, DietComparison, ProfileInsights,
    SleepComparison,
};

/// Categorize a body-mass index
pub fn bmi_category(bmi: f64) -> BmiCategory {
    if bmi < 18.5 {
        BmiCategory::Underweight
    } else if bmi < 25.0 {
        BmiCategory::Normal
    } else if bmi < 30.0 {
        BmiCategory::Overweight
    } else {
        BmiCategory::Obese
    }
}

/// Categorize blood pressure based on measurements
pub fn blood_pressure_category(systolic: f64, diastolic: f64) -> BloodPressureCategory {
    if systolic < 120.0 && diastolic < 80.0 {
        BloodPressureCategory::Normal
    } else if systolic < 130.0 && diastolic < 80.0 {
        BloodPressureCategory::Elevated
    } else if systolic < 140.0 && diastolic < 90.0 {
        BloodPressureCategory::Stage1
    } else {
        BloodPressureCategory::Stage2
    }
}

/// Compare reported activity with the moderate-activity recommendation
pub fn compare_physical_activity(level: ActivityLevel) -> ActivityComparison {
    let comparison = match level {
        ActivityLevel::Unknown => Comparison::NeedsImprovement,
        level if level >= ActivityLevel::Moderate => Comparison::Good,
        _ => Comparison::NeedsImprovement,
    };

    ActivityComparison {
        user_level: level,
        recommended: ActivityLevel::Moderate,
        comparison,
    }
}

/// Compare the reported diet with a Mediterranean diet
pub fn compare_diet(diet_type: &str) -> DietComparison {
    let comparison = if diet_type.trim().eq_ignore_ascii_case("mediterranean") {
        Comparison::Good
    } else {
        Comparison::ConsiderChange
    };

    DietComparison {
        user_type: diet_type.to_string(),
        recommended: "mediterranean".to_string(),
        comparison,
    }
}

/// Compare nightly sleep with the 7-9 hour range
pub fn compare_sleep(hours: f64) -> SleepComparison {
    let comparison = if (7.0..=9.0).contains(&hours) {
        Comparison::Good
    } else {
        Comparison::NeedsImprovement
    };

    SleepComparison {
        user_hours: hours,
        recommended: "7-9".to_string(),
        comparison,
    }
}

/// Summarize the measurable parts of a health profile.
///
/// Sections or values that are missing leave the matching field unset.
pub fn profile_insights(profile: &HealthProfile) -> ProfileInsights {
    let mut insights = ProfileInsights::default();

    if let Some(current) = &profile.current_health {
        if let Some(bmi) = current.bmi() {
            insights.bmi = Some((bmi * 10.0).round() / 10.0);
            insights.bmi_category = Some(bmi_category(bmi));
        }

        if let Some(bp) = &current.blood_pressure {
            if let (Some(systolic), Some(diastolic)) = (bp.systolic(), bp.diastolic()) {
                insights.blood_pressure_category = Some(blood_pressure_category(systolic, diastolic));
            }
        }
    }

    if let Some(lifestyle) = &profile.lifestyle {
        apply_lifestyle(&mut insights, lifestyle);
    }

    insights
}

fn apply_lifestyle(insights: &mut ProfileInsights, lifestyle: &Lifestyle) {
    insights.physical_activity = lifestyle.physical_activity.map(compare_physical_activity);
    insights.diet = lifestyle
        .diet_type
        .as_deref()
        .filter(|d| !d.trim().is_empty())
        .map(compare_diet);
    insights.sleep = lifestyle.sleep_hours().map(compare_sleep);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::health_profile::{BloodPressure, CurrentHealth};

    #[test]
    fn test_bmi_categories() {
        assert_eq!(bmi_category(17.0), BmiCategory::Underweight);
        assert_eq!(bmi_category(18.5), BmiCategory::Normal);
        assert_eq!(bmi_category(27.3), BmiCategory::Overweight);
        assert_eq!(bmi_category(30.0), BmiCategory::Obese);
    }

    #[test]
    fn test_bp_category_normal() {
        assert_eq!(blood_pressure_category(110.0, 75.0), BloodPressureCategory::Normal);
    }

    #[test]
    fn test_bp_category_elevated() {
        assert_eq!(blood_pressure_category(125.0, 75.0), BloodPressureCategory::Elevated);
    }

    #[test]
    fn test_bp_category_stage1() {
        assert_eq!(blood_pressure_category(135.0, 75.0), BloodPressureCategory::Stage1);
        // Diastolic alone moves the reading up
        assert_eq!(blood_pressure_category(115.0, 85.0), BloodPressureCategory::Stage1);
    }

    #[test]
    fn test_bp_category_stage2() {
        assert_eq!(blood_pressure_category(145.0, 75.0), BloodPressureCategory::Stage2);
        assert_eq!(blood_pressure_category(120.0, 95.0), BloodPressureCategory::Stage2);
    }

    #[test]
    fn test_activity_comparison() {
        assert_eq!(compare_physical_activity(ActivityLevel::Active).comparison, Comparison::Good);
        assert_eq!(compare_physical_activity(ActivityLevel::Moderate).comparison, Comparison::Good);
        assert_eq!(
            compare_physical_activity(ActivityLevel::Light).comparison,
            Comparison::NeedsImprovement
        );
        assert_eq!(
            compare_physical_activity(ActivityLevel::Unknown).comparison,
            Comparison::NeedsImprovement
        );
    }

    #[test]
    fn test_diet_and_sleep_comparison() {
        assert_eq!(compare_diet("Mediterranean").comparison, Comparison::Good);
        assert_eq!(compare_diet("keto").comparison, Comparison::ConsiderChange);
        assert_eq!(compare_sleep(8.0).comparison, Comparison::Good);
        assert_eq!(compare_sleep(5.5).comparison, Comparison::NeedsImprovement);
    }

    #[test]
    fn test_profile_insights_from_sections() {
        let profile = HealthProfile {
            current_health: Some(CurrentHealth {
                height: Some(160.0),
                weight: Some(70.0),
                blood_pressure: Some(BloodPressure {
                    systolic: Some(140.0),
                    diastolic: Some(85.0),
                }),
                ..CurrentHealth::default()
            }),
            lifestyle: Some(Lifestyle {
                physical_activity: Some(ActivityLevel::Sedentary),
                sleep_hours: Some(6.0),
                ..Lifestyle::default()
            }),
            ..HealthProfile::default()
        };

        let insights = profile_insights(&profile);
        assert_eq!(insights.bmi, Some(27.3));
        assert_eq!(insights.bmi_category, Some(BmiCategory::Overweight));
        assert_eq!(insights.blood_pressure_category, Some(BloodPressureCategory::Stage2));
        assert_eq!(
            insights.physical_activity.map(|a| a.comparison),
            Some(Comparison::NeedsImprovement)
        );
        assert!(insights.diet.is_none());
        assert_eq!(insights.sleep.map(|s| s.comparison), Some(Comparison::NeedsImprovement));
    }

    #[test]
    fn test_empty_profile_has_no_insights() {
        assert_eq!(profile_insights(&HealthProfile::default()), ProfileInsights::default());
    }
}
