use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

/// Configure Swagger UI endpoints
pub fn configure_swagger_routes() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi())
}

/// Registers the bearer JWT scheme referenced by protected paths
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

// API Documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        // Health endpoints
        crate::api::handlers::health::health_check,

        // Auth endpoints
        crate::api::handlers::auth::register,
        crate::api::handlers::auth::login,
        crate::api::handlers::auth::refresh,
        crate::api::handlers::auth::auth_info,

        // Profile endpoints
        crate::api::handlers::profile::get_profile,
        crate::api::handlers::profile::update_profile,
        crate::api::handlers::profile::submit_health_profile,

        // Assessment endpoints
        crate::api::handlers::assessment::get_assessment,
        crate::api::handlers::assessment::evaluate,

        // Guideline endpoints
        crate::api::handlers::guidelines::list_guidelines,
        crate::api::handlers::guidelines::recommended_guidelines,

        // Reminder endpoints
        crate::api::handlers::reminders::list_reminders,
        crate::api::handlers::reminders::create_reminder,
        crate::api::handlers::reminders::complete_reminder,

        // Calendar and schedule endpoints
        crate::api::handlers::calendar::get_calendar,
        crate::api::handlers::schedule::next_due
    ),
    components(
        schemas(
            crate::entities::common::ErrorResponse,

            // Health handlers
            crate::api::handlers::health::HealthResponse,
            crate::api::handlers::health::ComponentHealthStatus,
            crate::api::handlers::schedule::NextDueResponse,

            // Users
            health_calendar_domain::entities::user::User,
            health_calendar_domain::entities::user::RegisterRequest,
            health_calendar_domain::entities::user::LoginRequest,
            health_calendar_domain::entities::user::RefreshRequest,
            health_calendar_domain::entities::user::TokenPair,
            health_calendar_domain::entities::user::UpdateProfileRequest,

            // Health profile
            health_calendar_domain::entities::health_profile::HealthProfile,
            health_calendar_domain::entities::health_profile::SmokingStatus,
            health_calendar_domain::entities::health_profile::ActivityLevel,
            health_calendar_domain::entities::health_profile::Lifestyle,
            health_calendar_domain::entities::health_profile::FamilyHistory,
            health_calendar_domain::entities::health_profile::BloodPressure,
            health_calendar_domain::entities::health_profile::Cholesterol,
            health_calendar_domain::entities::health_profile::BloodSugar,
            health_calendar_domain::entities::health_profile::CurrentHealth,
            health_calendar_domain::entities::health_profile::MentalHealth,

            // Assessment
            health_calendar_domain::entities::risk::RiskLevel,
            health_calendar_domain::entities::risk::RiskCategory,
            health_calendar_domain::entities::risk::RecommendationArea,
            health_calendar_domain::entities::risk::PreventiveCareAction,
            health_calendar_domain::entities::risk::RiskAssessment,
            health_calendar_domain::entities::insights::BmiCategory,
            health_calendar_domain::entities::insights::BloodPressureCategory,
            health_calendar_domain::entities::insights::Comparison,
            health_calendar_domain::entities::insights::ActivityComparison,
            health_calendar_domain::entities::insights::DietComparison,
            health_calendar_domain::entities::insights::SleepComparison,
            health_calendar_domain::entities::insights::ProfileInsights,
            health_calendar_domain::entities::insights::AssessmentReport,

            // Guidelines
            health_calendar_domain::entities::guideline::Sex,
            health_calendar_domain::entities::guideline::GuidelineSex,
            health_calendar_domain::entities::guideline::Guideline,
            health_calendar_domain::entities::guideline::GuidelineSet,
            health_calendar_domain::entities::guideline::Demographics,

            // Reminders and calendar
            health_calendar_domain::entities::reminder::Reminder,
            health_calendar_domain::entities::reminder::CreateReminderRequest,
            health_calendar_domain::entities::frequency::CompletionInterval,
            health_calendar_domain::entities::calendar::MonthRef,
            health_calendar_domain::entities::calendar::CalendarDay,
            health_calendar_domain::entities::calendar::CalendarMonth
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Health check endpoint"),
        (name = "Authentication", description = "Registration, login and token refresh"),
        (name = "profile", description = "Account profile and health questionnaire"),
        (name = "assessment", description = "Risk assessment of a health profile"),
        (name = "guidelines", description = "Preventive screening guidelines"),
        (name = "reminders", description = "Recurring checkup reminders"),
        (name = "calendar", description = "Monthly reminder calendar"),
        (name = "schedule", description = "Due-date computation")
    ),
    info(
        title = "Health Calendar API",
        version = "0.1.0",
        description = "API for preventive-health risk assessment, screening guidelines and checkup reminders",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        ),
    ),
    servers(
        (url = "/", description = "Local development server")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_doc_generation() {
        let openapi = ApiDoc::openapi();

        assert_eq!(openapi.info.title, "Health Calendar API");
        assert_eq!(openapi.info.version, "0.1.0");

        let tags = openapi.tags.as_ref().expect("tags are defined");
        for name in ["health", "Authentication", "reminders", "schedule"] {
            assert!(tags.iter().any(|tag| tag.name == name), "missing tag {}", name);
        }

        for path in [
            "/health",
            "/auth/register",
            "/auth/login",
            "/auth/refresh",
            "/api/v1/profile",
            "/api/v1/profile/health",
            "/api/v1/assessment",
            "/api/v1/assessment/evaluate",
            "/api/v1/guidelines/recommended",
            "/api/v1/reminders",
            "/api/v1/reminders/{id}/complete",
            "/api/v1/calendar",
            "/api/v1/schedule/next-due",
        ] {
            assert!(openapi.paths.paths.contains_key(path), "missing path {}", path);
        }
    }

    #[test]
    fn test_bearer_scheme_registered() {
        let openapi = ApiDoc::openapi();
        let components = openapi.components.expect("components are defined");
        assert!(components.security_schemes.contains_key("bearer"));
        assert!(components.schemas.contains_key("AssessmentReport"));
    }
}
