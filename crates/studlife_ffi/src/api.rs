//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose stable, use-case-level functions to Dart via FRB.
//! - Own the single process-wide `AppCore` opened by the host app.
//! - Flatten core results into plain snapshot and response structs.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Mutations return an envelope; `limit_reached` is set only for
//!   free-tier cap failures.
//! - Snapshots report `is_loading = true` until the partition is loaded.

use log::{info, warn};
use studlife_core::model::new_record_id;
use studlife_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    AppCore, CoreConfig, DashboardSummary, EmploymentType, Job, JobQuery, JobSort, NewSleepEntry,
    PaymentReminder, PaymentReminderPatch, RepeatRule, SavingsGoal, SavingsGoalPatch,
    ServiceError, SleepSettingsPatch,
};
use std::sync::{Mutex, OnceLock};

static APP: OnceLock<Mutex<Option<AppCore>>> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Result envelope shared by every mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResponse {
    /// Whether the change was applied.
    pub ok: bool,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
    /// Set when the free-tier cap rejected the change.
    pub limit_reached: bool,
}

impl ActionResponse {
    fn success(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            message: message.into(),
            limit_reached: false,
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
            limit_reached: false,
        }
    }

    fn from_service(operation: &str, result: Result<bool, ServiceError>, done: &str) -> Self {
        match result {
            Ok(true) => Self::success(done),
            Ok(false) => Self::failure(format!("{operation} failed: record not found")),
            Err(err) => Self {
                ok: false,
                limit_reached: err.is_limit_exceeded(),
                message: format!("{operation} failed: {err}"),
            },
        }
    }
}

/// Opens the store under `data_dir` and loads every partition.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Reopening while open keeps the current core and reports success.
#[flutter_rust_bridge::frb(sync)]
pub fn app_open(data_dir: String) -> ActionResponse {
    let trimmed = data_dir.trim();
    if trimmed.is_empty() {
        return ActionResponse::failure("app_open failed: data_dir cannot be empty");
    }
    let Ok(mut slot) = app_slot().lock() else {
        return ActionResponse::failure("app_open failed: core lock poisoned");
    };
    if slot.is_some() {
        return ActionResponse::success("Already open.");
    }
    if let Err(err) = std::fs::create_dir_all(trimmed) {
        return ActionResponse::failure(format!("app_open failed: {err}"));
    }
    match AppCore::open(&CoreConfig::for_data_dir(trimmed)) {
        Ok(mut app) => {
            app.load_all();
            *slot = Some(app);
            info!("event=ffi_app_open module=ffi status=ok");
            ActionResponse::success("Opened.")
        }
        Err(err) => ActionResponse::failure(format!("app_open failed: {err}")),
    }
}

/// Flushes pending writes and closes the store.
///
/// # FFI contract
/// - Idempotent; closing an already closed core reports success.
#[flutter_rust_bridge::frb(sync)]
pub fn app_close() -> ActionResponse {
    let Ok(mut slot) = app_slot().lock() else {
        return ActionResponse::failure("app_close failed: core lock poisoned");
    };
    match slot.take() {
        Some(app) => match app.close() {
            Ok(()) => ActionResponse::success("Closed."),
            Err(err) => ActionResponse::failure(format!("app_close failed: {err}")),
        },
        None => ActionResponse::success("Already closed."),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SleepEntryItem {
    pub date: String,
    pub sleep_start: String,
    pub sleep_end: String,
    pub hours: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SleepSnapshot {
    pub is_loading: bool,
    pub target_hours: f64,
    pub bed_time: String,
    pub wake_time: String,
    /// Ascending by date.
    pub history: Vec<SleepEntryItem>,
    pub average_hours: Option<f64>,
    pub percent_of_target: Option<u32>,
}

#[flutter_rust_bridge::frb(sync)]
pub fn sleep_snapshot() -> SleepSnapshot {
    let loading = SleepSnapshot {
        is_loading: true,
        target_hours: 0.0,
        bed_time: String::new(),
        wake_time: String::new(),
        history: Vec::new(),
        average_hours: None,
        percent_of_target: None,
    };
    read_app(loading.clone(), |app| {
        let Some(state) = app.sleep.state() else {
            return loading;
        };
        let stats = app.sleep.weekly_stats();
        SleepSnapshot {
            is_loading: false,
            target_hours: state.settings.target_hours,
            bed_time: state.settings.bed_time.clone(),
            wake_time: state.settings.wake_time.clone(),
            history: state
                .history
                .iter()
                .map(|entry| SleepEntryItem {
                    date: entry.date.clone(),
                    sleep_start: entry.sleep_start.clone(),
                    sleep_end: entry.sleep_end.clone(),
                    hours: entry.hours,
                })
                .collect(),
            average_hours: stats.as_ref().map(|stats| stats.average_hours),
            percent_of_target: stats.map(|stats| stats.percent_of_target),
        }
    })
}

/// Records one night. `hours = None` derives it from the clock times.
#[flutter_rust_bridge::frb(sync)]
pub fn sleep_add_entry(
    date: String,
    sleep_start: String,
    sleep_end: String,
    hours: Option<f64>,
) -> ActionResponse {
    let entry = match hours {
        Some(hours) => NewSleepEntry {
            date,
            sleep_start,
            sleep_end,
            hours,
        },
        None => match NewSleepEntry::from_times(date, sleep_start, sleep_end) {
            Ok(entry) => entry,
            Err(err) => return ActionResponse::failure(format!("sleep_add_entry failed: {err}")),
        },
    };
    with_app("sleep_add_entry", "Sleep recorded.", |app| {
        app.sleep.add_entry(entry).map(|()| true)
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn sleep_update_settings(
    target_hours: Option<f64>,
    bed_time: Option<String>,
    wake_time: Option<String>,
) -> ActionResponse {
    let patch = SleepSettingsPatch {
        target_hours,
        bed_time,
        wake_time,
    };
    with_app("sleep_update_settings", "Settings saved.", |app| {
        app.sleep.update_settings(&patch).map(|()| true)
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct SavingsGoalItem {
    pub id: String,
    pub title: String,
    pub saved: f64,
    pub target: f64,
    pub percent: u32,
    pub remaining: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SavingsSnapshot {
    pub is_loading: bool,
    pub goals: Vec<SavingsGoalItem>,
    pub total_saved: f64,
    pub total_target: f64,
    pub overall_percent: u32,
    pub best_goal_id: Option<String>,
    pub can_add_goal: bool,
}

#[flutter_rust_bridge::frb(sync)]
pub fn savings_snapshot() -> SavingsSnapshot {
    let loading = SavingsSnapshot {
        is_loading: true,
        goals: Vec::new(),
        total_saved: 0.0,
        total_target: 0.0,
        overall_percent: 0,
        best_goal_id: None,
        can_add_goal: false,
    };
    read_app(loading.clone(), |app| {
        let (Some(state), Some(summary)) = (app.savings.state(), app.savings.summary()) else {
            return loading;
        };
        SavingsSnapshot {
            is_loading: false,
            goals: state
                .goals
                .iter()
                .map(|goal| SavingsGoalItem {
                    id: goal.id.clone(),
                    title: goal.title.clone(),
                    saved: goal.saved,
                    target: goal.target,
                    percent: goal.progress_percent(),
                    remaining: goal.remaining(),
                })
                .collect(),
            total_saved: summary.total_saved,
            total_target: summary.total_target,
            overall_percent: summary.overall_percent,
            best_goal_id: summary.best_goal.map(|goal| goal.id),
            can_add_goal: app.savings.can_add_goal(),
        }
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn savings_add_goal(title: String, saved: f64, target: f64) -> ActionResponse {
    let goal = match SavingsGoal::new(title, saved, target) {
        Ok(goal) => goal,
        Err(err) => return ActionResponse::failure(format!("savings_add_goal failed: {err}")),
    };
    with_app("savings_add_goal", "Goal added.", |app| {
        app.savings.add_goal(goal).map(|()| true)
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn savings_update_goal(
    id: String,
    title: Option<String>,
    saved: Option<f64>,
    target: Option<f64>,
) -> ActionResponse {
    let patch = SavingsGoalPatch {
        title,
        saved,
        target,
    };
    with_app("savings_update_goal", "Goal updated.", |app| {
        app.savings.update_goal(&id, &patch)
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn savings_remove_goal(id: String) -> ActionResponse {
    with_app("savings_remove_goal", "Goal removed.", |app| {
        app.savings.remove_goal(&id)
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct PaymentItem {
    pub id: String,
    pub title: String,
    pub amount: f64,
    pub due_date: String,
    /// `none|weekly|monthly`.
    pub repeat_rule: String,
    pub is_paid: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PaymentsSnapshot {
    pub is_loading: bool,
    pub reminders: Vec<PaymentItem>,
    pub active_count: u32,
    pub active_amount: f64,
}

#[flutter_rust_bridge::frb(sync)]
pub fn payments_snapshot() -> PaymentsSnapshot {
    let loading = PaymentsSnapshot {
        is_loading: true,
        reminders: Vec::new(),
        active_count: 0,
        active_amount: 0.0,
    };
    read_app(loading.clone(), |app| {
        let (Some(state), Some(summary)) = (app.payments.state(), app.payments.summary()) else {
            return loading;
        };
        PaymentsSnapshot {
            is_loading: false,
            reminders: state
                .reminders
                .iter()
                .map(|reminder| PaymentItem {
                    id: reminder.id.clone(),
                    title: reminder.title.clone(),
                    amount: reminder.amount,
                    due_date: reminder.due_date.clone(),
                    repeat_rule: repeat_rule_label(reminder.repeat_rule).to_string(),
                    is_paid: reminder.is_paid,
                })
                .collect(),
            active_count: u32::try_from(summary.active_count).unwrap_or(u32::MAX),
            active_amount: summary.active_amount,
        }
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn payments_add_reminder(
    title: String,
    amount: f64,
    due_date: String,
    repeat_rule: String,
) -> ActionResponse {
    let Some(rule) = parse_repeat_rule(&repeat_rule) else {
        return ActionResponse::failure(format!(
            "payments_add_reminder failed: unknown repeat rule `{repeat_rule}`"
        ));
    };
    let reminder = match PaymentReminder::new(title, amount, due_date, rule) {
        Ok(reminder) => reminder,
        Err(err) => return ActionResponse::failure(format!("payments_add_reminder failed: {err}")),
    };
    with_app("payments_add_reminder", "Reminder added.", |app| {
        app.payments.add_reminder(reminder).map(|()| true)
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn payments_update_reminder(
    id: String,
    title: Option<String>,
    amount: Option<f64>,
    due_date: Option<String>,
    repeat_rule: Option<String>,
) -> ActionResponse {
    let repeat_rule = match repeat_rule.as_deref().map(parse_repeat_rule) {
        Some(None) => {
            return ActionResponse::failure("payments_update_reminder failed: unknown repeat rule")
        }
        Some(rule) => rule,
        None => None,
    };
    let patch = PaymentReminderPatch {
        title,
        amount,
        due_date,
        is_repeating: repeat_rule.map(RepeatRule::is_repeating),
        repeat_rule,
        is_paid: None,
    };
    with_app("payments_update_reminder", "Reminder updated.", |app| {
        app.payments.update_reminder(&id, &patch)
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn payments_mark_paid(id: String) -> ActionResponse {
    with_app("payments_mark_paid", "Marked as paid.", |app| {
        app.payments.mark_paid(&id)
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn payments_remove_reminder(id: String) -> ActionResponse {
    with_app("payments_remove_reminder", "Reminder removed.", |app| {
        app.payments.remove_reminder(&id)
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct JobItem {
    pub id: String,
    pub title: String,
    pub company: String,
    pub city: String,
    pub salary_min: Option<f64>,
    pub salary_max: Option<f64>,
    pub posted_at: String,
    pub description: String,
    /// `intern|part-time|full-time|remote`.
    pub employment_type: String,
    pub link: String,
    pub is_favorite: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct JobsSnapshot {
    pub is_loading: bool,
    pub jobs: Vec<JobItem>,
}

/// Filtered job list.
///
/// Input semantics:
/// - `employment_types`: kebab-case names; unknown names are ignored.
/// - `sort`: `newest|oldest|salary-high|salary-low`; anything else is newest.
#[flutter_rust_bridge::frb(sync)]
pub fn jobs_query(
    favorites_only: bool,
    employment_types: Vec<String>,
    text: Option<String>,
    city: Option<String>,
    salary_floor: Option<f64>,
    salary_ceiling: Option<f64>,
    sort: String,
) -> JobsSnapshot {
    let query = JobQuery {
        favorites_only,
        employment_types: employment_types
            .iter()
            .filter_map(|value| EmploymentType::parse(value))
            .collect(),
        text,
        city,
        salary_floor,
        salary_ceiling,
        sort: parse_job_sort(&sort),
    };
    let loading = JobsSnapshot {
        is_loading: true,
        jobs: Vec::new(),
    };
    read_app(loading.clone(), |app| {
        if app.jobs.is_loading() {
            return loading;
        }
        JobsSnapshot {
            is_loading: false,
            jobs: app
                .jobs
                .query(&query)
                .into_iter()
                .map(|job| JobItem {
                    id: job.id.clone(),
                    title: job.title.clone(),
                    company: job.company.clone(),
                    city: job.city.clone(),
                    salary_min: job.salary_min,
                    salary_max: job.salary_max,
                    posted_at: job.posted_at.clone(),
                    description: job.description.clone(),
                    employment_type: job.employment_type.as_str().to_string(),
                    link: job.link.clone(),
                    is_favorite: job.is_favorite,
                })
                .collect(),
        }
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn jobs_toggle_favorite(id: String) -> ActionResponse {
    with_app("jobs_toggle_favorite", "Favorite toggled.", |app| {
        app.jobs.toggle_favorite(&id).map(|flag| flag.is_some())
    })
}

/// Appends a job to the catalog under a freshly generated id.
///
/// Input semantics:
/// - `employment_type`: `intern|part-time|full-time|remote`.
/// - `posted_at`: either accepted date encoding.
#[flutter_rust_bridge::frb(sync)]
#[allow(clippy::too_many_arguments)]
pub fn jobs_add_job(
    title: String,
    company: String,
    city: String,
    salary_min: Option<f64>,
    salary_max: Option<f64>,
    posted_at: String,
    description: String,
    employment_type: String,
    link: String,
) -> ActionResponse {
    let Some(employment_type) = EmploymentType::parse(&employment_type) else {
        return ActionResponse::failure(format!(
            "jobs_add_job failed: unknown employment type `{}`",
            employment_type.trim()
        ));
    };
    let job = Job {
        id: new_record_id(),
        title: title.trim().to_string(),
        company: company.trim().to_string(),
        city: city.trim().to_string(),
        salary_min,
        salary_max,
        posted_at: posted_at.trim().to_string(),
        description,
        employment_type,
        link: link.trim().to_string(),
        is_favorite: false,
    };
    with_app("jobs_add_job", "Job added.", |app| {
        app.jobs.add_job(job).map(|()| true)
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardSnapshot {
    pub is_loading: bool,
    pub sleep_average_hours: Option<f64>,
    pub sleep_percent_of_target: Option<u32>,
    pub savings_total: Option<f64>,
    pub savings_overall_percent: Option<u32>,
    pub best_goal_title: Option<String>,
    pub active_reminders: Option<u32>,
    pub active_reminder_amount: Option<f64>,
    pub job_count: Option<u32>,
    pub favorite_job_count: Option<u32>,
}

#[flutter_rust_bridge::frb(sync)]
pub fn dashboard() -> DashboardSnapshot {
    let closed = to_dashboard_snapshot(
        true,
        DashboardSummary {
            sleep: None,
            savings: None,
            reminders: None,
            job_count: None,
            favorite_job_count: None,
        },
    );
    read_app(closed, |app| {
        let is_loading = app.sleep.is_loading()
            || app.savings.is_loading()
            || app.payments.is_loading()
            || app.jobs.is_loading();
        to_dashboard_snapshot(is_loading, app.dashboard())
    })
}

fn to_dashboard_snapshot(is_loading: bool, summary: DashboardSummary) -> DashboardSnapshot {
    let to_u32 = |value: usize| u32::try_from(value).unwrap_or(u32::MAX);
    DashboardSnapshot {
        is_loading,
        sleep_average_hours: summary.sleep.as_ref().map(|sleep| sleep.average_hours),
        sleep_percent_of_target: summary.sleep.as_ref().map(|sleep| sleep.percent_of_target),
        savings_total: summary.savings.as_ref().map(|savings| savings.total_saved),
        savings_overall_percent: summary.savings.as_ref().map(|savings| savings.overall_percent),
        best_goal_title: summary
            .savings
            .and_then(|savings| savings.best_goal)
            .map(|goal| goal.title),
        active_reminders: summary.reminders.as_ref().map(|r| to_u32(r.active_count)),
        active_reminder_amount: summary.reminders.as_ref().map(|r| r.active_amount),
        job_count: summary.job_count.map(to_u32),
        favorite_job_count: summary.favorite_job_count.map(to_u32),
    }
}

fn app_slot() -> &'static Mutex<Option<AppCore>> {
    APP.get_or_init(|| Mutex::new(None))
}

fn read_app<T>(fallback: T, f: impl FnOnce(&AppCore) -> T) -> T {
    match app_slot().lock() {
        Ok(slot) => slot.as_ref().map_or(fallback, f),
        Err(_) => fallback,
    }
}

fn with_app(
    operation: &str,
    done: &str,
    f: impl FnOnce(&mut AppCore) -> Result<bool, ServiceError>,
) -> ActionResponse {
    let Ok(mut slot) = app_slot().lock() else {
        return ActionResponse::failure(format!("{operation} failed: core lock poisoned"));
    };
    let Some(app) = slot.as_mut() else {
        warn!(
            "event=ffi_call module=ffi status=skipped operation={} reason=not_open",
            operation
        );
        return ActionResponse::failure(format!("{operation} failed: core is not open"));
    };
    ActionResponse::from_service(operation, f(app), done)
}

fn parse_repeat_rule(value: &str) -> Option<RepeatRule> {
    match value.trim().to_ascii_lowercase().as_str() {
        "" | "none" => Some(RepeatRule::Never),
        "weekly" => Some(RepeatRule::Weekly),
        "monthly" => Some(RepeatRule::Monthly),
        _ => None,
    }
}

fn repeat_rule_label(rule: RepeatRule) -> &'static str {
    match rule {
        RepeatRule::Never => "none",
        RepeatRule::Weekly => "weekly",
        RepeatRule::Monthly => "monthly",
    }
}

fn parse_job_sort(value: &str) -> JobSort {
    match value.trim() {
        "oldest" => JobSort::Oldest,
        "salary-high" => JobSort::SalaryHigh,
        "salary-low" => JobSort::SalaryLow,
        _ => JobSort::Newest,
    }
}
