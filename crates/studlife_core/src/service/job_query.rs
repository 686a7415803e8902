//! Job catalog filtering, ordering, and posting recency.
//!
//! # Invariants
//! - Salary floor matches on the best-known max salary; ceiling matches on
//!   the best-known min salary. Bounds `<= 0` are ignored.
//! - Recency counts whole UTC calendar days, never wall-clock hours.
//! - Sorting is stable, so equal keys keep catalog order.

use crate::date::{calendar_days_between, parse_date, sort_key};
use crate::model::jobs::{EmploymentType, Job};
use chrono::{DateTime, Utc};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum JobSort {
    #[default]
    Newest,
    Oldest,
    SalaryHigh,
    SalaryLow,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobQuery {
    pub favorites_only: bool,
    /// Empty means every employment type.
    pub employment_types: Vec<EmploymentType>,
    /// Case-insensitive substring of title, company, or city.
    pub text: Option<String>,
    /// Case-insensitive substring of city.
    pub city: Option<String>,
    pub salary_floor: Option<f64>,
    pub salary_ceiling: Option<f64>,
    pub sort: JobSort,
}

impl JobQuery {
    pub fn matches(&self, job: &Job) -> bool {
        if self.favorites_only && !job.is_favorite {
            return false;
        }
        if !self.employment_types.is_empty() && !self.employment_types.contains(&job.employment_type) {
            return false;
        }
        if let Some(needle) = normalized_needle(self.text.as_deref()) {
            let hit = [&job.title, &job.company, &job.city]
                .iter()
                .any(|field| field.to_lowercase().contains(&needle));
            if !hit {
                return false;
            }
        }
        if let Some(needle) = normalized_needle(self.city.as_deref()) {
            if !job.city.to_lowercase().contains(&needle) {
                return false;
            }
        }
        if let Some(floor) = self.salary_floor.filter(|value| *value > 0.0) {
            if job.best_known_max_salary() < floor {
                return false;
            }
        }
        if let Some(ceiling) = self.salary_ceiling.filter(|value| *value > 0.0) {
            if job.best_known_min_salary() > ceiling {
                return false;
            }
        }
        true
    }
}

/// Filters and orders `jobs` according to `query`.
pub fn filter_jobs<'a>(jobs: &'a [Job], query: &JobQuery) -> Vec<&'a Job> {
    let mut matched: Vec<&Job> = jobs.iter().filter(|job| query.matches(job)).collect();
    matched.sort_by(|a, b| compare_jobs(a, b, query.sort));
    matched
}

fn compare_jobs(a: &Job, b: &Job, sort: JobSort) -> Ordering {
    match sort {
        JobSort::Newest => sort_key(&b.posted_at).cmp(&sort_key(&a.posted_at)),
        JobSort::Oldest => sort_key(&a.posted_at).cmp(&sort_key(&b.posted_at)),
        JobSort::SalaryHigh => b
            .best_known_min_salary()
            .total_cmp(&a.best_known_min_salary()),
        JobSort::SalaryLow => a
            .best_known_min_salary()
            .total_cmp(&b.best_known_min_salary()),
    }
}

fn normalized_needle(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|needle| !needle.is_empty())
        .map(str::to_lowercase)
}

/// How long ago a job was posted, in whole UTC calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostedRecency {
    Today,
    DaysAgo(u32),
    Unknown,
}

/// Buckets `posted_at` against the UTC calendar date of `now`.
///
/// Dates in the future also count as today.
pub fn posted_recency(posted_at: &str, now: DateTime<Utc>) -> PostedRecency {
    let Some(posted) = parse_date(posted_at) else {
        return PostedRecency::Unknown;
    };
    let elapsed = calendar_days_between(posted, now.date_naive());
    if elapsed <= 0 {
        PostedRecency::Today
    } else {
        PostedRecency::DaysAgo(u32::try_from(elapsed).unwrap_or(u32::MAX))
    }
}
