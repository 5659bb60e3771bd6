use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use health_calendar_data::repository::{RepositoryError, UserRepositoryTrait};

use crate::entities::conversions;
use crate::entities::guideline::Guideline;
use crate::entities::health_profile::HealthProfile;
use crate::entities::insights::AssessmentReport;
use crate::entities::user::{UpdateProfileRequest, User};
use crate::services::guidelines::GuidelineCatalog;
use crate::services::insights::profile_insights;
use crate::services::risk_assessment::assess;
use crate::services::validation_message;

/// Profile service errors
#[derive(Debug, Error)]
pub enum ProfileServiceError {
    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Not found error
    #[error("Not found: {0}")]
    NotFound(String),

    /// Age and sex are needed before guidelines can be personalized
    #[error("Profile incomplete: {0}")]
    ProfileIncomplete(String),

    /// Repository error
    #[error("Repository error: {0}")]
    RepositoryError(String),

    /// Stored data could not be read or written
    #[error("Data error: {0}")]
    DataError(String),
}

/// Trait for profile and assessment operations
#[async_trait]
pub trait ProfileServiceTrait {
    /// Current profile of a user
    async fn get_profile(&self, user_id: Uuid) -> Result<User, ProfileServiceError>;

    /// Replace the demographic fields of a profile
    async fn update_profile(&self, user_id: Uuid, request: UpdateProfileRequest) -> Result<User, ProfileServiceError>;

    /// Store a submitted health assessment
    async fn submit_health_profile(&self, user_id: Uuid, profile: HealthProfile) -> Result<User, ProfileServiceError>;

    /// Assess the stored health profile
    async fn assess_stored(&self, user_id: Uuid) -> Result<AssessmentReport, ProfileServiceError>;

    /// Guidelines that apply to the user's age and sex
    async fn recommended_guidelines(&self, user_id: Uuid) -> Result<Vec<Guideline>, ProfileServiceError>;
}

/// Assess a profile that is not stored anywhere
pub fn evaluate_profile(profile: &HealthProfile) -> AssessmentReport {
    AssessmentReport {
        assessment: assess(profile),
        insights: profile_insights(profile),
        submitted_at: None,
    }
}

/// Profile service for domain logic
pub struct ProfileService<R: UserRepositoryTrait> {
    repository: R,
    catalog: Arc<GuidelineCatalog>,
}

impl<R: UserRepositoryTrait> ProfileService<R> {
    /// Create a new profile service
    pub fn new(repository: R, catalog: Arc<GuidelineCatalog>) -> Self {
        Self { repository, catalog }
    }

    /// Map repository errors to service errors
    fn map_repo_error(&self, err: RepositoryError) -> ProfileServiceError {
        match err {
            RepositoryError::NotFound(msg) => ProfileServiceError::NotFound(msg),
            RepositoryError::Validation(msg) => ProfileServiceError::ValidationError(msg),
            _ => ProfileServiceError::RepositoryError(err.to_string()),
        }
    }
}

#[async_trait]
impl<R: UserRepositoryTrait + Send + Sync> ProfileServiceTrait for ProfileService<R> {
    async fn get_profile(&self, user_id: Uuid) -> Result<User, ProfileServiceError> {
        let record = self
            .repository
            .get_by_id(user_id)
            .await
            .map_err(|e| self.map_repo_error(e))?
            .ok_or_else(|| ProfileServiceError::NotFound(format!("User with ID {} not found", user_id)))?;

        conversions::convert_to_domain_user(record).map_err(ProfileServiceError::DataError)
    }

    async fn update_profile(&self, user_id: Uuid, request: UpdateProfileRequest) -> Result<User, ProfileServiceError> {
        request
            .validate()
            .map_err(|e| ProfileServiceError::ValidationError(validation_message(&e)))?;

        let updated = self
            .repository
            .update_profile(user_id, conversions::convert_to_data_profile_update(&request))
            .await
            .map_err(|e| self.map_repo_error(e))?;

        info!("Updated profile for user {}", user_id);
        conversions::convert_to_domain_user(updated).map_err(ProfileServiceError::DataError)
    }

    async fn submit_health_profile(&self, user_id: Uuid, profile: HealthProfile) -> Result<User, ProfileServiceError> {
        let value = serde_json::to_value(&profile).map_err(|e| ProfileServiceError::DataError(e.to_string()))?;

        let updated = self
            .repository
            .update_health_data(user_id, value)
            .await
            .map_err(|e| self.map_repo_error(e))?;

        info!("Stored health assessment for user {}", user_id);
        conversions::convert_to_domain_user(updated).map_err(ProfileServiceError::DataError)
    }

    async fn assess_stored(&self, user_id: Uuid) -> Result<AssessmentReport, ProfileServiceError> {
        let user = self.get_profile(user_id).await?;
        let profile = user.health_profile.ok_or_else(|| {
            ProfileServiceError::NotFound(format!("No health assessment submitted for user {}", user_id))
        })?;

        Ok(AssessmentReport {
            submitted_at: user.last_health_update,
            ..evaluate_profile(&profile)
        })
    }

    async fn recommended_guidelines(&self, user_id: Uuid) -> Result<Vec<Guideline>, ProfileServiceError> {
        let user = self.get_profile(user_id).await?;
        let demographics = user.demographics().ok_or_else(|| {
            warn!("Recommendations requested for user {} without age and sex", user_id);
            ProfileServiceError::ProfileIncomplete("Please complete your profile with age and sex".to_string())
        })?;

        Ok(self.catalog.applicable(&demographics))
    }
}

/// Factory function to create a profile service over the application repository
pub fn create_profile_service(
    repository: health_calendar_data::repository::UserRepository,
    catalog: Arc<GuidelineCatalog>,
) -> ProfileService<health_calendar_data::repository::UserRepository> {
    ProfileService::new(repository, catalog)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use health_calendar_data::models::UserRecord;
    use health_calendar_data::repository::tests::{sample_user, MockUserRepository};

    use crate::entities::guideline::{GuidelineSet, GuidelineSex, Sex};
    use crate::entities::health_profile::{CurrentHealth, Lifestyle, SmokingStatus};
    use crate::entities::risk::{RiskCategory, RiskLevel};

    fn catalog() -> Arc<GuidelineCatalog> {
        let guideline = |sex, age_min, age_max, test: &str| Guideline {
            sex,
            age_min,
            age_max,
            test: test.to_string(),
            frequency: "every 2 years".to_string(),
            info_link: "https://example.org".to_string(),
        };
        Arc::new(GuidelineCatalog::new(GuidelineSet {
            last_updated: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            source: "test".to_string(),
            guidelines: vec![
                guideline(GuidelineSex::Female, 40, 65, "Mammogram"),
                guideline(GuidelineSex::Male, 50, 75, "Prostate screening"),
                guideline(GuidelineSex::Any, 18, 120, "Blood pressure check"),
            ],
        }))
    }

    fn setup(user: UserRecord) -> (ProfileService<MockUserRepository>, Uuid) {
        let id = Uuid::parse_str(&user.id).unwrap();
        (ProfileService::new(MockUserRepository::with_users(vec![user]), catalog()), id)
    }

    #[tokio::test]
    async fn test_update_profile() {
        let (service, id) = setup(sample_user("dana", "dana@example.com"));
        let user = service
            .update_profile(
                id,
                UpdateProfileRequest {
                    age: Some(44),
                    sex: Some(Sex::Female),
                    location: Some("Porto".to_string()),
                    conditions: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(user.age, Some(44));
        assert_eq!(user.sex, Some(Sex::Female));
        assert_eq!(user.location.as_deref(), Some("Porto"));
    }

    #[tokio::test]
    async fn test_update_profile_rejects_age_over_130() {
        let (service, id) = setup(sample_user("dana", "dana@example.com"));
        let err = service
            .update_profile(
                id,
                UpdateProfileRequest {
                    age: Some(131),
                    ..UpdateProfileRequest::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ProfileServiceError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_recommendations_require_age_and_sex() {
        let mut record = sample_user("ed", "ed@example.com");
        record.age = Some(55);
        let (service, id) = setup(record);

        let err = service.recommended_guidelines(id).await.unwrap_err();
        assert!(matches!(err, ProfileServiceError::ProfileIncomplete(_)));
    }

    #[tokio::test]
    async fn test_recommendations_filtered_by_demographics() {
        let mut record = sample_user("fay", "fay@example.com");
        record.age = Some(40);
        record.sex = Some("female".to_string());
        let (service, id) = setup(record);

        let tests: Vec<String> = service
            .recommended_guidelines(id)
            .await
            .unwrap()
            .into_iter()
            .map(|g| g.test)
            .collect();
        assert_eq!(tests, vec!["Mammogram".to_string(), "Blood pressure check".to_string()]);
    }

    #[tokio::test]
    async fn test_submit_and_assess_stored_profile() {
        let (service, id) = setup(sample_user("gus", "gus@example.com"));

        let err = service.assess_stored(id).await.unwrap_err();
        assert!(matches!(err, ProfileServiceError::NotFound(_)));

        let profile = HealthProfile {
            lifestyle: Some(Lifestyle {
                smoking_status: Some(SmokingStatus::Current),
                ..Lifestyle::default()
            }),
            current_health: Some(CurrentHealth {
                height: Some(160.0),
                weight: Some(70.0),
                ..CurrentHealth::default()
            }),
            ..HealthProfile::default()
        };
        let user = service.submit_health_profile(id, profile.clone()).await.unwrap();
        assert_eq!(user.health_profile, Some(profile));
        assert!(user.last_health_update.is_some());

        let report = service.assess_stored(id).await.unwrap();
        assert_eq!(report.assessment.risk(RiskCategory::Smoking), Some(RiskLevel::High));
        assert_eq!(report.assessment.risk(RiskCategory::Bmi), Some(RiskLevel::Medium));
        assert_eq!(report.assessment.overall_risk, RiskLevel::High);
        assert_eq!(report.insights.bmi, Some(27.3));
        assert_eq!(report.submitted_at, user.last_health_update);
    }

    #[tokio::test]
    async fn test_unknown_user_is_not_found() {
        let service = ProfileService::new(MockUserRepository::new(), catalog());
        let err = service.get_profile(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, ProfileServiceError::NotFound(_)));
    }

    #[test]
    fn test_evaluate_empty_profile() {
        let report = evaluate_profile(&HealthProfile::default());
        assert_eq!(report.assessment.overall_risk, RiskLevel::Low);
        assert!(report.assessment.preventive_care.is_empty());
        assert!(report.submitted_at.is_none());
    }
}
