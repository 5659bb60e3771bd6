use std::fmt;

use serde::{Deserialize, Serialize};

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

/// Trim, collapse runs of whitespace and lowercase a frequency label
pub fn normalize_label(label: &str) -> String {
    label
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Calendar recurrence vocabulary
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
    EveryTwoYears,
    EveryThreeYears,
    EveryFiveYears,
    /// Label outside the vocabulary, kept normalized
    Unrecognized(String),
}

impl Frequency {
    /// Parse a free-text label
    pub fn parse(label: &str) -> Self {
        match normalize_label(label).as_str() {
            "daily" => Frequency::Daily,
            "weekly" => Frequency::Weekly,
            "monthly" => Frequency::Monthly,
            "yearly" | "every year" => Frequency::Yearly,
            "every 2 years" => Frequency::EveryTwoYears,
            "every 3 years" => Frequency::EveryThreeYears,
            "every 5 years" => Frequency::EveryFiveYears,
            other => Frequency::Unrecognized(other.to_string()),
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, Frequency::Unrecognized(_))
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Frequency::Daily => write!(f, "daily"),
            Frequency::Weekly => write!(f, "weekly"),
            Frequency::Monthly => write!(f, "monthly"),
            Frequency::Yearly => write!(f, "yearly"),
            Frequency::EveryTwoYears => write!(f, "every 2 years"),
            Frequency::EveryThreeYears => write!(f, "every 3 years"),
            Frequency::EveryFiveYears => write!(f, "every 5 years"),
            Frequency::Unrecognized(label) => write!(f, "{}", label),
        }
    }
}

/// Fixed-day interval used when a completion cannot be scheduled on the calendar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum CompletionInterval {
    SixMonths,
    Monthly,
    TwoYears,
    ThreeYears,
    FiveYears,
    Default,
}

impl CompletionInterval {
    /// Classify a label by substring. "6 month" wins over "month".
    pub fn classify(label: &str) -> Self {
        let label = normalize_label(label);
        if label.contains("6 month") {
            CompletionInterval::SixMonths
        } else if label.contains("month") {
            CompletionInterval::Monthly
        } else if label.contains("2 year") {
            CompletionInterval::TwoYears
        } else if label.contains("3 year") {
            CompletionInterval::ThreeYears
        } else if label.contains("5 year") {
            CompletionInterval::FiveYears
        } else {
            CompletionInterval::Default
        }
    }

    pub fn days(&self) -> i64 {
        match self {
            CompletionInterval::SixMonths => 182,
            CompletionInterval::Monthly => 30,
            CompletionInterval::TwoYears => 730,
            CompletionInterval::ThreeYears => 1095,
            CompletionInterval::FiveYears => 1825,
            CompletionInterval::Default => 365,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_normalized_before_parsing() {
        assert_eq!(Frequency::parse("  Every   2 YEARS "), Frequency::EveryTwoYears);
        assert_eq!(Frequency::parse("Every Year"), Frequency::Yearly);
        assert_eq!(
            Frequency::parse("Biannual"),
            Frequency::Unrecognized("biannual".to_string())
        );
    }

    #[test]
    fn six_months_is_checked_before_month() {
        assert_eq!(CompletionInterval::classify("every 6 months"), CompletionInterval::SixMonths);
        assert_eq!(CompletionInterval::classify("Monthly"), CompletionInterval::Monthly);
        assert_eq!(CompletionInterval::classify("every 10 years"), CompletionInterval::Default);
    }

    #[test]
    fn display_round_trips_recognized_labels() {
        for label in ["daily", "weekly", "monthly", "yearly", "every 2 years", "every 3 years", "every 5 years"] {
            assert_eq!(Frequency::parse(label).to_string(), label);
        }
    }
}
