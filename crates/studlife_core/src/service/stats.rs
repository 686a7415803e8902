//! Derived statistics over partition snapshots.
//!
//! # Responsibility
//! - Weekly sleep average and percent of target.
//! - Savings totals, overall percent, and best-progress goal.
//! - Active reminder count and amount.
//! - Cross-partition dashboard summary, assembled at read time.
//!
//! # Invariants
//! - Pure functions; no statistic mutates or persists anything.
//! - Percentages are rounded to whole numbers and clamped where noted.

use crate::date::sort_key;
use crate::model::jobs::JobsState;
use crate::model::payments::{PaymentReminder, PaymentsState};
use crate::model::savings::{SavingsGoal, SavingsState};
use crate::model::sleep::{SleepEntry, SleepState, HISTORY_WINDOW};

#[derive(Debug, Clone, PartialEq)]
pub struct WeeklySleepStats {
    pub average_hours: f64,
    /// `round(min(100, 100 * average / target))`.
    pub percent_of_target: u32,
    pub nights: usize,
    pub target_hours: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BestGoal {
    pub id: String,
    pub title: String,
    pub percent: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SavingsSummary {
    pub total_saved: f64,
    pub total_target: f64,
    /// Clamped to `0..=100`.
    pub overall_percent: u32,
    pub goal_count: usize,
    pub best_goal: Option<BestGoal>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReminderSummary {
    pub active_count: usize,
    pub active_amount: f64,
    pub total_count: usize,
}

/// Read-time aggregate across all four partitions.
///
/// Each section is `None` while its partition is still loading.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardSummary {
    pub sleep: Option<WeeklySleepStats>,
    pub savings: Option<SavingsSummary>,
    pub reminders: Option<ReminderSummary>,
    pub job_count: Option<usize>,
    pub favorite_job_count: Option<usize>,
}

/// Averages the most recent nights (by real date) of the history window.
///
/// Returns `None` when the history is empty.
pub fn weekly_sleep(state: &SleepState) -> Option<WeeklySleepStats> {
    let mut recent: Vec<&SleepEntry> = state.history.iter().collect();
    if recent.is_empty() {
        return None;
    }
    recent.sort_by_key(|entry| sort_key(&entry.date));
    let recent = &recent[recent.len().saturating_sub(HISTORY_WINDOW)..];

    let sum: f64 = recent
        .iter()
        .map(|entry| if entry.hours.is_finite() { entry.hours } else { 0.0 })
        .sum();
    let average_hours = sum / recent.len() as f64;
    let target_hours = state.effective_target_hours();
    let percent = (100.0 * average_hours / target_hours).min(100.0).round().max(0.0);

    Some(WeeklySleepStats {
        average_hours,
        percent_of_target: percent as u32,
        nights: recent.len(),
        target_hours,
    })
}

pub fn savings_summary(goals: &[SavingsGoal]) -> SavingsSummary {
    let total_saved: f64 = goals.iter().map(|goal| finite_or_zero(goal.saved)).sum();
    let total_target: f64 = goals.iter().map(|goal| finite_or_zero(goal.target)).sum();
    let overall_percent = if total_target > 0.0 {
        (100.0 * total_saved / total_target).round().clamp(0.0, 100.0) as u32
    } else {
        0
    };

    SavingsSummary {
        total_saved,
        total_target,
        overall_percent,
        goal_count: goals.len(),
        best_goal: best_progress_goal(goals).map(|goal| BestGoal {
            id: goal.id.clone(),
            title: goal.title.clone(),
            percent: goal.progress_percent(),
        }),
    }
}

/// Goal with the highest `saved / target`.
///
/// Goals without a positive target count as progress 0; among equal
/// progress the earlier goal wins. `None` only for an empty slice.
pub fn best_progress_goal(goals: &[SavingsGoal]) -> Option<&SavingsGoal> {
    goals
        .iter()
        .fold(None, |best: Option<&SavingsGoal>, goal| match best {
            Some(current) if goal.progress_ratio() <= current.progress_ratio() => Some(current),
            _ => Some(goal),
        })
}

pub fn reminder_summary(reminders: &[PaymentReminder]) -> ReminderSummary {
    let (active_count, active_amount) = reminders
        .iter()
        .filter(|reminder| reminder.is_active())
        .fold((0usize, 0.0f64), |(count, amount), reminder| {
            (count + 1, amount + finite_or_zero(reminder.amount))
        });
    ReminderSummary {
        active_count,
        active_amount,
        total_count: reminders.len(),
    }
}

pub fn dashboard_summary(
    sleep: Option<&SleepState>,
    savings: Option<&SavingsState>,
    payments: Option<&PaymentsState>,
    jobs: Option<&JobsState>,
) -> DashboardSummary {
    DashboardSummary {
        sleep: sleep.and_then(weekly_sleep),
        savings: savings.map(|state| savings_summary(&state.goals)),
        reminders: payments.map(|state| reminder_summary(&state.reminders)),
        job_count: jobs.map(|state| state.jobs.len()),
        favorite_job_count: jobs.map(JobsState::favorite_count),
    }
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::{best_progress_goal, reminder_summary, savings_summary, weekly_sleep};
    use crate::model::payments::{PaymentReminder, RepeatRule};
    use crate::model::savings::SavingsGoal;
    use crate::model::sleep::{SleepEntry, SleepState};

    fn goal(id: &str, saved: f64, target: f64) -> SavingsGoal {
        SavingsGoal {
            id: id.to_string(),
            title: id.to_string(),
            saved,
            target,
        }
    }

    fn night(date: &str, hours: f64) -> SleepEntry {
        SleepEntry {
            date: date.to_string(),
            sleep_start: "23:00".to_string(),
            sleep_end: "07:00".to_string(),
            hours,
        }
    }

    #[test]
    fn weekly_average_and_percent() {
        let mut state = SleepState::default();
        state.settings.target_hours = 8.0;
        state.history = vec![
            night("01.11.2025", 6.0),
            night("02.11.2025", 8.0),
            night("03.11.2025", 7.0),
        ];
        let stats = weekly_sleep(&state).unwrap();
        assert_eq!(stats.average_hours, 7.0);
        assert_eq!(stats.percent_of_target, 88);
        assert_eq!(stats.nights, 3);
    }

    #[test]
    fn weekly_average_uses_latest_dates_not_insertion_order() {
        let mut state = SleepState::default();
        state.history = vec![night("2025-11-10", 10.0)];
        for day in 1..=7 {
            state.history.push(night(&format!("0{day}.11.2025"), 2.0));
        }
        let stats = weekly_sleep(&state).unwrap();
        assert_eq!(stats.nights, 7);
        // 02..07 (six nights of 2h) plus 10.11 (10h).
        assert!((stats.average_hours - 22.0 / 7.0).abs() < 1e-9);
    }

    #[test]
    fn percent_is_capped_and_target_defaults() {
        let mut state = SleepState::default();
        state.settings.target_hours = 0.0;
        state.history = vec![night("01.11.2025", 12.0)];
        let stats = weekly_sleep(&state).unwrap();
        assert_eq!(stats.target_hours, 8.0);
        assert_eq!(stats.percent_of_target, 100);
        assert!(weekly_sleep(&SleepState::default()).is_none());
    }

    #[test]
    fn best_goal_prefers_higher_ratio() {
        let goals = vec![goal("a", 50.0, 100.0), goal("b", 10.0, 10.0)];
        assert_eq!(best_progress_goal(&goals).unwrap().id, "b");
    }

    #[test]
    fn zero_target_goal_counts_as_no_progress() {
        let goals = vec![goal("broken", 500.0, 0.0), goal("slow", 1.0, 100.0)];
        assert_eq!(best_progress_goal(&goals).unwrap().id, "slow");

        assert_eq!(best_progress_goal(&[goal("broken", 5.0, 0.0)]).unwrap().id, "broken");

        let tied = vec![goal("first", 0.0, 0.0), goal("second", 0.0, 100.0)];
        assert_eq!(best_progress_goal(&tied).unwrap().id, "first");
        assert!(best_progress_goal(&[]).is_none());
    }

    #[test]
    fn savings_totals_and_clamped_percent() {
        let summary = savings_summary(&[goal("a", 150.0, 100.0), goal("b", 60.0, 100.0)]);
        assert_eq!(summary.total_saved, 210.0);
        assert_eq!(summary.total_target, 200.0);
        assert_eq!(summary.overall_percent, 100);

        let empty = savings_summary(&[]);
        assert_eq!(empty.overall_percent, 0);
        assert!(empty.best_goal.is_none());
    }

    #[test]
    fn reminder_summary_counts_only_unpaid() {
        let mut reminders = Vec::new();
        for _ in 0..3 {
            reminders.push(PaymentReminder::new("Rent", 100.0, "2025-12-01", RepeatRule::Never).unwrap());
        }
        reminders[0].is_paid = true;
        let summary = reminder_summary(&reminders);
        assert_eq!(summary.active_count, 2);
        assert_eq!(summary.active_amount, 200.0);
        assert_eq!(summary.total_count, 3);
    }
}
