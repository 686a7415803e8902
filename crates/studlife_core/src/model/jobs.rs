//! Jobs partition model.
//!
//! The job catalog is seeded from a bundled dataset and is read-mostly: the
//! only in-place change is the favorite flag.

use crate::model::{require_date, require_non_negative, require_text, ValidationError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EmploymentType {
    Intern,
    PartTime,
    FullTime,
    Remote,
}

impl EmploymentType {
    pub const ALL: [EmploymentType; 4] = [
        EmploymentType::Intern,
        EmploymentType::PartTime,
        EmploymentType::FullTime,
        EmploymentType::Remote,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Intern => "intern",
            Self::PartTime => "part-time",
            Self::FullTime => "full-time",
            Self::Remote => "remote",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == value.trim())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: String,
    pub title: String,
    pub company: String,
    pub city: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salary_min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salary_max: Option<f64>,
    pub posted_at: String,
    #[serde(default)]
    pub description: String,
    pub employment_type: EmploymentType,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub is_favorite: bool,
}

impl Job {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("id", &self.id)?;
        require_text("title", &self.title)?;
        require_text("company", &self.company)?;
        require_date("posted_at", &self.posted_at)?;
        if let Some(min) = self.salary_min {
            require_non_negative("salary_min", min)?;
        }
        if let Some(max) = self.salary_max {
            require_non_negative("salary_max", max)?;
        }
        if let (Some(min), Some(max)) = (self.salary_min, self.salary_max) {
            if min > max {
                return Err(ValidationError::InvalidRange {
                    field: "salary",
                    min,
                    max,
                });
            }
        }
        Ok(())
    }

    /// Upper salary bound, falling back to the lower one, then 0.
    pub fn best_known_max_salary(&self) -> f64 {
        self.salary_max.or(self.salary_min).unwrap_or(0.0)
    }

    /// Lower salary bound, falling back to the upper one, then 0.
    pub fn best_known_min_salary(&self) -> f64 {
        self.salary_min.or(self.salary_max).unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobsState {
    #[serde(default)]
    pub jobs: Vec<Job>,
}

impl JobsState {
    pub fn favorite_count(&self) -> usize {
        self.jobs.iter().filter(|job| job.is_favorite).count()
    }
}

#[cfg(test)]
mod tests {
    use super::{EmploymentType, Job};

    #[test]
    fn employment_type_uses_kebab_case() {
        assert_eq!(
            serde_json::to_string(&EmploymentType::PartTime).unwrap(),
            "\"part-time\""
        );
        assert_eq!(EmploymentType::parse("full-time"), Some(EmploymentType::FullTime));
        assert_eq!(EmploymentType::parse("contract"), None);
    }

    #[test]
    fn missing_salaries_and_flags_default() {
        let job: Job = serde_json::from_str(
            r#"{
                "id": "j1",
                "title": "Barista",
                "company": "Cafe",
                "city": "Kazan",
                "postedAt": "2025-11-20",
                "employmentType": "part-time"
            }"#,
        )
        .unwrap();
        assert_eq!(job.salary_min, None);
        assert!(!job.is_favorite);
        assert_eq!(job.best_known_max_salary(), 0.0);
        job.validate().unwrap();
    }

    #[test]
    fn best_known_salary_falls_back_across_bounds() {
        let mut job: Job = serde_json::from_str(
            r#"{"id":"j","title":"t","company":"c","city":"x","postedAt":"2025-11-20",
                "employmentType":"remote","salaryMin":40000}"#,
        )
        .unwrap();
        assert_eq!(job.best_known_max_salary(), 40000.0);
        job.salary_max = Some(30000.0);
        assert!(job.validate().is_err());
    }
}
