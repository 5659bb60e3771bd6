use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

/// Sex recorded on a user profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
    Other,
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sex::Male => write!(f, "male"),
            Sex::Female => write!(f, "female"),
            Sex::Other => write!(f, "other"),
        }
    }
}

impl FromStr for Sex {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "male" => Ok(Sex::Male),
            "female" => Ok(Sex::Female),
            "other" => Ok(Sex::Other),
            other => Err(format!("Invalid sex: {}", other)),
        }
    }
}

/// Sex a guideline applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum GuidelineSex {
    Any,
    Male,
    Female,
    Other,
}

impl GuidelineSex {
    /// Whether a guideline scoped to this sex applies to someone of `sex`
    pub fn applies_to(&self, sex: Sex) -> bool {
        match self {
            GuidelineSex::Any => true,
            GuidelineSex::Male => sex == Sex::Male,
            GuidelineSex::Female => sex == Sex::Female,
            GuidelineSex::Other => sex == Sex::Other,
        }
    }
}

/// Age and sex scoped screening recommendation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct Guideline {
    pub sex: GuidelineSex,
    pub age_min: u32,
    pub age_max: u32,
    /// Name of the test or check
    pub test: String,
    /// Recurrence label, e.g. "every 3 years"
    pub frequency: String,
    pub info_link: String,
}

/// Versioned guideline reference file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct GuidelineSet {
    #[cfg_attr(feature = "with-api", schema(value_type = String, format = Date))]
    pub last_updated: NaiveDate,
    pub source: String,
    pub guidelines: Vec<Guideline>,
}

/// The profile fields guideline filtering looks at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct Demographics {
    pub age: u32,
    pub sex: Sex,
}
