pub mod calendar;
pub mod conversions;
pub mod frequency;
pub mod guideline;
pub mod health_profile;
pub mod insights;
pub mod reminder;
pub mod risk;
pub mod user;

// Re-export common types for easier imports
pub use calendar::{CalendarDay, CalendarMonth, MonthRef};
pub use frequency::{CompletionInterval, Frequency};
pub use guideline::{Demographics, Guideline, GuidelineSet, GuidelineSex, Sex};
pub use health_profile::{
    ActivityLevel, BloodPressure, BloodSugar, Cholesterol, CurrentHealth, FamilyHistory,
    HealthProfile, Lifestyle, MentalHealth, SmokingStatus,
};
pub use insights::{AssessmentReport, ProfileInsights};
pub use reminder::{CreateReminderRequest, Reminder};
pub use risk::{PreventiveCareAction, RecommendationArea, RiskAssessment, RiskCategory, RiskLevel};
pub use user::{LoginRequest, RefreshRequest, RegisterRequest, TokenPair, UpdateProfileRequest, User};
