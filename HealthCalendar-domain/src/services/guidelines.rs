//! Guideline reference data: filtering, loading, validation and refresh.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::NaiveDate;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::entities::guideline::{Demographics, Guideline, GuidelineSet, GuidelineSex};

/// User agent sent when fetching remote guidelines
pub const UPDATER_USER_AGENT: &str = "Health Calendar Guidelines Updater";

/// Timeout for fetching remote guidelines
pub const UPDATER_TIMEOUT: Duration = Duration::from_secs(30);

/// Guideline errors
#[derive(Debug, Error)]
pub enum GuidelineError {
    /// The guideline file could not be read or written
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The guideline document is not valid JSON for a guideline set
    #[error("Invalid guideline JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// The guideline document parsed but breaks a structural rule
    #[error("Invalid guideline set: {0}")]
    Invalid(String),

    /// Fetching remote guidelines failed
    #[error("Failed to fetch remote guidelines: {0}")]
    Fetch(#[from] reqwest::Error),
}

/// Guidelines that apply to a person, in source order.
///
/// A guideline applies when its sex is `any` or matches, and the age lies
/// within `[age_min, age_max]` inclusive.
pub fn applicable_guidelines<'a>(demographics: &Demographics, guidelines: &'a [Guideline]) -> Vec<&'a Guideline> {
    guidelines
        .iter()
        .filter(|g| g.sex.applies_to(demographics.sex))
        .filter(|g| g.age_min <= demographics.age && demographics.age <= g.age_max)
        .collect()
}

/// Built-in set used when no guideline file is available
pub fn default_guideline_set(today: NaiveDate) -> GuidelineSet {
    GuidelineSet {
        last_updated: today,
        source: "Default guidelines (update failed)".to_string(),
        guidelines: vec![Guideline {
            sex: GuidelineSex::Any,
            age_min: 18,
            age_max: 120,
            test: "General Health Checkup".to_string(),
            frequency: "yearly".to_string(),
            info_link: "https://www.who.int/health-topics/".to_string(),
        }],
    }
}

/// Check the structural rules of a guideline set
pub fn validate_guideline_set(set: &GuidelineSet) -> Result<(), GuidelineError> {
    if set.source.trim().is_empty() {
        return Err(GuidelineError::Invalid("source is required".to_string()));
    }

    for (index, guideline) in set.guidelines.iter().enumerate() {
        let missing = [
            ("test", &guideline.test),
            ("frequency", &guideline.frequency),
            ("info_link", &guideline.info_link),
        ]
        .into_iter()
        .find(|(_, value)| value.trim().is_empty());

        if let Some((field, _)) = missing {
            return Err(GuidelineError::Invalid(format!(
                "guideline {} is missing {}",
                index, field
            )));
        }

        if guideline.age_min > guideline.age_max {
            return Err(GuidelineError::Invalid(format!(
                "guideline {} ({}) has age_min {} above age_max {}",
                index, guideline.test, guideline.age_min, guideline.age_max
            )));
        }
    }

    Ok(())
}

/// Write a guideline set as pretty JSON, replacing the file atomically
pub fn write_guideline_set(path: &Path, set: &GuidelineSet) -> Result<(), GuidelineError> {
    let io_error = |source| GuidelineError::Io {
        path: path.display().to_string(),
        source,
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(io_error)?;
        }
    }

    let json = serde_json::to_string_pretty(set)?;
    let tmp_path = path.with_extension("json.tmp");
    {
        let mut file = fs::File::create(&tmp_path).map_err(io_error)?;
        file.write_all(json.as_bytes()).map_err(io_error)?;
        file.sync_all().map_err(io_error)?;
    }
    fs::rename(&tmp_path, path).map_err(io_error)?;

    debug!("Wrote {} guidelines to {}", set.guidelines.len(), path.display());
    Ok(())
}

/// Loaded guideline reference data
#[derive(Debug, Clone)]
pub struct GuidelineCatalog {
    set: GuidelineSet,
}

impl GuidelineCatalog {
    /// Wrap an already loaded set
    pub fn new(set: GuidelineSet) -> Self {
        Self { set }
    }

    /// Load guidelines from a file, using the built-in set when it is missing
    pub fn load(path: &Path, today: NaiveDate) -> Result<Self, GuidelineError> {
        if !path.exists() {
            warn!(
                "Guideline file {} not found, using built-in default guidelines",
                path.display()
            );
            return Ok(Self::new(default_guideline_set(today)));
        }

        let raw = fs::read_to_string(path).map_err(|source| GuidelineError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let set: GuidelineSet = serde_json::from_str(&raw)?;
        validate_guideline_set(&set)?;

        info!(
            "Loaded {} guidelines from {} (source: {}, updated {})",
            set.guidelines.len(),
            path.display(),
            set.source,
            set.last_updated
        );
        Ok(Self::new(set))
    }

    pub fn set(&self) -> &GuidelineSet {
        &self.set
    }

    pub fn guidelines(&self) -> &[Guideline] {
        &self.set.guidelines
    }

    /// Guidelines applicable to the given demographics
    pub fn applicable(&self, demographics: &Demographics) -> Vec<Guideline> {
        applicable_guidelines(demographics, &self.set.guidelines)
            .into_iter()
            .cloned()
            .collect()
    }
}

/// Remote document shape. `last_updated` is replaced on import, so any
/// string is accepted.
#[derive(Debug, Deserialize)]
struct RemoteGuidelineSet {
    #[allow(dead_code)]
    last_updated: String,
    source: String,
    guidelines: Vec<Guideline>,
}

/// Refreshes the local guideline file from a remote JSON document
pub struct GuidelineUpdater {
    client: reqwest::Client,
    remote_url: String,
    local_path: PathBuf,
}

impl GuidelineUpdater {
    pub fn new(remote_url: impl Into<String>, local_path: impl Into<PathBuf>) -> Result<Self, GuidelineError> {
        let client = reqwest::Client::builder()
            .timeout(UPDATER_TIMEOUT)
            .user_agent(UPDATER_USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            remote_url: remote_url.into(),
            local_path: local_path.into(),
        })
    }

    pub fn local_path(&self) -> &Path {
        &self.local_path
    }

    /// Fetch, validate and write the remote set stamped with `today`
    pub async fn update(&self, today: NaiveDate) -> Result<GuidelineSet, GuidelineError> {
        info!("Fetching guidelines from {}", self.remote_url);

        let body = self
            .client
            .get(&self.remote_url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let set = import_remote_set(&body, today)?;
        write_guideline_set(&self.local_path, &set)?;

        info!(
            "Guidelines updated successfully: {} guidelines from {}",
            set.guidelines.len(),
            set.source
        );
        Ok(set)
    }

    /// Write the built-in set when no local file exists yet.
    ///
    /// Returns whether a file was written.
    pub fn ensure_local_file(&self, today: NaiveDate) -> Result<bool, GuidelineError> {
        if self.local_path.exists() {
            return Ok(false);
        }
        warn!(
            "No local guideline file at {}, writing default guidelines",
            self.local_path.display()
        );
        write_guideline_set(&self.local_path, &default_guideline_set(today))?;
        Ok(true)
    }
}

/// Parse and validate a remote guideline document, stamping `last_updated`
pub fn import_remote_set(body: &str, today: NaiveDate) -> Result<GuidelineSet, GuidelineError> {
    let remote: RemoteGuidelineSet = serde_json::from_str(body)?;
    let set = GuidelineSet {
        last_updated: today,
        source: remote.source,
        guidelines: remote.guidelines,
    };
    validate_guideline_set(&set)?;
    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::guideline::Sex;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    fn guideline(sex: GuidelineSex, age_min: u32, age_max: u32, test: &str) -> Guideline {
        Guideline {
            sex,
            age_min,
            age_max,
            test: test.to_string(),
            frequency: "every 2 years".to_string(),
            info_link: "https://example.org/info".to_string(),
        }
    }

    #[test]
    fn test_filter_by_sex_and_inclusive_age() {
        let guidelines = vec![guideline(GuidelineSex::Female, 40, 65, "Mammogram")];

        let male = Demographics { age: 50, sex: Sex::Male };
        assert!(applicable_guidelines(&male, &guidelines).is_empty());

        let female_40 = Demographics { age: 40, sex: Sex::Female };
        assert_eq!(applicable_guidelines(&female_40, &guidelines).len(), 1);

        let female_65 = Demographics { age: 65, sex: Sex::Female };
        assert_eq!(applicable_guidelines(&female_65, &guidelines).len(), 1);

        let female_66 = Demographics { age: 66, sex: Sex::Female };
        assert!(applicable_guidelines(&female_66, &guidelines).is_empty());
    }

    #[test]
    fn test_filter_preserves_order_and_any_matches_other() {
        let guidelines = vec![
            guideline(GuidelineSex::Any, 18, 120, "Blood pressure"),
            guideline(GuidelineSex::Male, 50, 75, "Prostate"),
            guideline(GuidelineSex::Any, 45, 75, "Colonoscopy"),
        ];

        let tests: Vec<&str> = applicable_guidelines(&Demographics { age: 55, sex: Sex::Male }, &guidelines)
            .into_iter()
            .map(|g| g.test.as_str())
            .collect();
        assert_eq!(tests, vec!["Blood pressure", "Prostate", "Colonoscopy"]);

        let other = applicable_guidelines(&Demographics { age: 55, sex: Sex::Other }, &guidelines);
        assert_eq!(other.len(), 2);
    }

    #[test]
    fn test_validation_rules() {
        assert!(validate_guideline_set(&default_guideline_set(today())).is_ok());

        let mut set = default_guideline_set(today());
        set.guidelines[0].info_link = " ".to_string();
        assert!(matches!(validate_guideline_set(&set), Err(GuidelineError::Invalid(_))));

        let mut set = default_guideline_set(today());
        set.guidelines.push(guideline(GuidelineSex::Any, 70, 60, "Backwards"));
        assert!(validate_guideline_set(&set).is_err());

        let mut set = default_guideline_set(today());
        set.source.clear();
        assert!(validate_guideline_set(&set).is_err());
    }

    #[test]
    fn test_catalog_falls_back_to_default_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = GuidelineCatalog::load(&dir.path().join("guidelines.json"), today()).unwrap();
        assert_eq!(catalog.guidelines().len(), 1);
        assert_eq!(catalog.guidelines()[0].test, "General Health Checkup");
    }

    #[test]
    fn test_catalog_round_trips_written_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("guidelines.json");

        let mut set = default_guideline_set(today());
        set.source = "Test source".to_string();
        set.guidelines.push(guideline(GuidelineSex::Female, 21, 65, "Pap smear"));
        write_guideline_set(&path, &set).unwrap();

        let catalog = GuidelineCatalog::load(&path, today()).unwrap();
        assert_eq!(catalog.set(), &set);

        let applicable = catalog.applicable(&Demographics { age: 30, sex: Sex::Female });
        assert_eq!(applicable.len(), 2);
    }

    #[test]
    fn test_catalog_rejects_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("guidelines.json");
        fs::write(&path, "{\"source\": \"x\"}").unwrap();
        assert!(matches!(
            GuidelineCatalog::load(&path, today()),
            Err(GuidelineError::Parse(_))
        ));
    }

    #[test]
    fn test_other_scoped_guideline_matches_only_other() {
        let guidelines = vec![
            guideline(GuidelineSex::Other, 18, 120, "Inclusive health check"),
            guideline(GuidelineSex::Any, 18, 120, "Blood pressure"),
        ];

        let other = applicable_guidelines(&Demographics { age: 30, sex: Sex::Other }, &guidelines);
        assert_eq!(other.len(), 2);

        let female = applicable_guidelines(&Demographics { age: 30, sex: Sex::Female }, &guidelines);
        let tests: Vec<&str> = female.into_iter().map(|g| g.test.as_str()).collect();
        assert_eq!(tests, vec!["Blood pressure"]);
    }

    #[test]
    fn test_import_remote_set_accepts_other_sex() {
        let body = r#"{
            "last_updated": "2023-01-01",
            "source": "Community clinic",
            "guidelines": [
                {"sex": "other", "age_min": 18, "age_max": 120, "test": "Inclusive health check",
                 "frequency": "yearly", "info_link": "https://example.org/i"},
                {"sex": "any", "age_min": 18, "age_max": 120, "test": "Blood pressure",
                 "frequency": "every 2 years", "info_link": "https://example.org/bp"}
            ]
        }"#;
        let set = import_remote_set(body, today()).unwrap();
        assert_eq!(set.guidelines.len(), 2);
        assert_eq!(set.guidelines[0].sex, GuidelineSex::Other);
    }

    #[test]
    fn test_import_remote_set_stamps_date() {
        let body = r#"{
            "last_updated": "2023-01-01T00:00:00Z",
            "source": "USPSTF",
            "guidelines": [
                {"sex": "male", "age_min": 50, "age_max": 75, "test": "Colonoscopy",
                 "frequency": "every 10 years", "info_link": "https://example.org/c"}
            ]
        }"#;
        let set = import_remote_set(body, today()).unwrap();
        assert_eq!(set.last_updated, today());
        assert_eq!(set.guidelines[0].sex, GuidelineSex::Male);

        let missing_field = r#"{"last_updated": "x", "source": "s", "guidelines": [{"sex": "any"}]}"#;
        assert!(import_remote_set(missing_field, today()).is_err());
    }

    #[test]
    fn test_ensure_local_file_writes_default_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("guidelines.json");
        let updater = GuidelineUpdater::new("http://127.0.0.1:9/guidelines.json", &path).unwrap();

        assert!(updater.ensure_local_file(today()).unwrap());
        assert!(!updater.ensure_local_file(today()).unwrap());
        let catalog = GuidelineCatalog::load(&path, today()).unwrap();
        assert_eq!(catalog.set().source, "Default guidelines (update failed)");
    }
}
