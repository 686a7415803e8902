//! Sleep partition model.
//!
//! # Responsibility
//! - Define `SleepState` (settings + bounded history) and its patch types.
//! - Reconcile history on insert: canonical dates, one entry per day,
//!   ascending real-date order, bounded window.
//!
//! # Invariants
//! - `history.len() <= HISTORY_WINDOW` after any reconciliation.
//! - History dates are canonical `DD.MM.YYYY` after any reconciliation.
//! - History is sorted ascending by calendar date, not by string.

use crate::date::{normalize_to_canonical, sort_key};
use crate::model::{require_non_negative, require_text, ValidationError};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Number of most recent distinct days kept in sleep history.
pub const HISTORY_WINDOW: usize = 7;
/// Target used by statistics when settings carry none.
pub const DEFAULT_TARGET_HOURS: f64 = 8.0;

static CLOCK_TIME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([01]?\d|2[0-3]):([0-5]\d)$").expect("valid clock time regex"));

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SleepSettings {
    pub target_hours: f64,
    pub bed_time: String,
    pub wake_time: String,
}

impl Default for SleepSettings {
    fn default() -> Self {
        Self {
            target_hours: DEFAULT_TARGET_HOURS,
            bed_time: "23:00".to_string(),
            wake_time: "07:00".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SleepEntry {
    /// Calendar date; canonical once written through a manager.
    pub date: String,
    pub sleep_start: String,
    pub sleep_end: String,
    pub hours: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SleepState {
    #[serde(default)]
    pub settings: SleepSettings,
    #[serde(default)]
    pub history: Vec<SleepEntry>,
}

impl SleepState {
    /// Inserts one entry with replace-by-date semantics and re-applies the
    /// history window.
    pub fn insert_entry(&mut self, mut entry: SleepEntry) {
        entry.date = normalize_to_canonical(&entry.date);
        for existing in &mut self.history {
            existing.date = normalize_to_canonical(&existing.date);
        }
        self.history.retain(|existing| existing.date != entry.date);
        self.history.push(entry);
        sort_and_trim(&mut self.history);
    }

    /// Brings legacy history into canonical shape.
    ///
    /// Duplicate dates keep the entry that appears last.
    pub fn canonicalize_history(&mut self) {
        let legacy = std::mem::take(&mut self.history);
        for mut entry in legacy {
            entry.date = normalize_to_canonical(&entry.date);
            self.history.retain(|existing| existing.date != entry.date);
            self.history.push(entry);
        }
        sort_and_trim(&mut self.history);
    }

    /// Target hours used by statistics (`8` when unset or zero).
    pub fn effective_target_hours(&self) -> f64 {
        let target = self.settings.target_hours;
        if target.is_finite() && target > 0.0 {
            target
        } else {
            DEFAULT_TARGET_HOURS
        }
    }
}

fn sort_and_trim(history: &mut Vec<SleepEntry>) {
    // Stable sort keeps insertion order among equal (e.g. unparsable) dates.
    history.sort_by_key(|entry| sort_key(&entry.date));
    if history.len() > HISTORY_WINDOW {
        history.drain(..history.len() - HISTORY_WINDOW);
    }
}

/// Shallow patch for [`SleepSettings`]; `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SleepSettingsPatch {
    pub target_hours: Option<f64>,
    pub bed_time: Option<String>,
    pub wake_time: Option<String>,
}

impl SleepSettingsPatch {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(target) = self.target_hours {
            require_non_negative("target_hours", target)?;
        }
        if let Some(bed_time) = &self.bed_time {
            require_clock_time("bed_time", bed_time)?;
        }
        if let Some(wake_time) = &self.wake_time {
            require_clock_time("wake_time", wake_time)?;
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.target_hours.is_none() && self.bed_time.is_none() && self.wake_time.is_none()
    }

    pub fn apply_to(&self, settings: &mut SleepSettings) {
        if let Some(target) = self.target_hours {
            settings.target_hours = target;
        }
        if let Some(bed_time) = &self.bed_time {
            settings.bed_time = bed_time.trim().to_string();
        }
        if let Some(wake_time) = &self.wake_time {
            settings.wake_time = wake_time.trim().to_string();
        }
    }
}

/// User input for one night of sleep.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSleepEntry {
    /// Either accepted date encoding.
    pub date: String,
    pub sleep_start: String,
    pub sleep_end: String,
    pub hours: f64,
}

impl NewSleepEntry {
    /// Builds an entry whose `hours` is derived from the two clock times.
    pub fn from_times(
        date: impl Into<String>,
        sleep_start: impl Into<String>,
        sleep_end: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let sleep_start = sleep_start.into();
        let sleep_end = sleep_end.into();
        let hours = sleep_duration_hours(&sleep_start, &sleep_end).ok_or_else(|| {
            ValidationError::InvalidTime {
                field: "sleep_start/sleep_end",
                value: format!("{sleep_start}-{sleep_end}"),
            }
        })?;
        Ok(Self {
            date: date.into(),
            sleep_start,
            sleep_end,
            hours,
        })
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        crate::model::require_date("date", &self.date)?;
        require_clock_time("sleep_start", &self.sleep_start)?;
        require_clock_time("sleep_end", &self.sleep_end)?;
        require_non_negative("hours", self.hours)
    }

    pub(crate) fn into_entry(self) -> SleepEntry {
        SleepEntry {
            date: self.date,
            sleep_start: self.sleep_start.trim().to_string(),
            sleep_end: self.sleep_end.trim().to_string(),
            hours: self.hours,
        }
    }
}

/// Parses `HH:MM` into minutes after midnight.
pub fn parse_clock_time(value: &str) -> Option<u32> {
    let caps = CLOCK_TIME_RE.captures(value.trim())?;
    let hours = caps[1].parse::<u32>().ok()?;
    let minutes = caps[2].parse::<u32>().ok()?;
    Some(hours * 60 + minutes)
}

/// Hours slept between two clock times, rounded to one decimal.
///
/// An end time at or before the start time is read as the next morning.
pub fn sleep_duration_hours(sleep_start: &str, sleep_end: &str) -> Option<f64> {
    let start = parse_clock_time(sleep_start)?;
    let mut end = parse_clock_time(sleep_end)?;
    if end <= start {
        end += 24 * 60;
    }
    let hours = f64::from(end - start) / 60.0;
    Some((hours * 10.0).round() / 10.0)
}

fn require_clock_time(field: &'static str, value: &str) -> Result<(), ValidationError> {
    require_text(field, value)?;
    if parse_clock_time(value).is_none() {
        return Err(ValidationError::InvalidTime {
            field,
            value: value.to_string(),
        });
    }
    Ok(())
}
