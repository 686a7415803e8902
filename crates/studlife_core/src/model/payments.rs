//! Payments partition model.
//!
//! # Responsibility
//! - Define payment reminders, their recurrence metadata and patch type.
//! - Classify reminders by due-date urgency.
//!
//! # Invariants
//! - A reminder is active iff `is_paid == false`.
//! - `repeat_rule` is descriptive only; nothing schedules the next occurrence.
//! - Marking a reminder paid never touches `repeat_rule`.

use crate::date::{calendar_days_between, parse_date, CalendarDate};
use crate::model::{new_record_id, require_date, require_positive, require_text, ValidationError};
use serde::{Deserialize, Serialize};

/// Reminders due within this many days are urgent.
pub const URGENT_WITHIN_DAYS: i64 = 3;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepeatRule {
    #[default]
    #[serde(rename = "none")]
    Never,
    Weekly,
    Monthly,
}

impl RepeatRule {
    pub fn is_repeating(self) -> bool {
        self != Self::Never
    }
}

/// Display classification of one reminder relative to today.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderUrgency {
    Paid,
    Overdue,
    /// Due today or within [`URGENT_WITHIN_DAYS`].
    Urgent,
    Upcoming,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentReminder {
    pub id: String,
    pub title: String,
    pub amount: f64,
    pub due_date: String,
    #[serde(default)]
    pub is_repeating: bool,
    #[serde(default)]
    pub repeat_rule: RepeatRule,
    #[serde(default)]
    pub is_paid: bool,
}

impl PaymentReminder {
    /// Creates a validated, unpaid reminder with a generated id.
    pub fn new(
        title: impl Into<String>,
        amount: f64,
        due_date: impl Into<String>,
        repeat_rule: RepeatRule,
    ) -> Result<Self, ValidationError> {
        let reminder = Self {
            id: new_record_id(),
            title: title.into().trim().to_string(),
            amount,
            due_date: due_date.into().trim().to_string(),
            is_repeating: repeat_rule.is_repeating(),
            repeat_rule,
            is_paid: false,
        };
        reminder.validate()?;
        Ok(reminder)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("id", &self.id)?;
        require_text("title", &self.title)?;
        require_positive("amount", self.amount)?;
        require_date("due_date", &self.due_date)
    }

    pub fn is_active(&self) -> bool {
        !self.is_paid
    }

    /// Whole calendar days until the due date; negative when overdue and 0
    /// when the due date cannot be parsed.
    pub fn days_until_due(&self, today: CalendarDate) -> i64 {
        parse_date(&self.due_date).map_or(0, |due| calendar_days_between(today, due))
    }

    pub fn urgency(&self, today: CalendarDate) -> ReminderUrgency {
        if self.is_paid {
            return ReminderUrgency::Paid;
        }
        match self.days_until_due(today) {
            days if days < 0 => ReminderUrgency::Overdue,
            days if days <= URGENT_WITHIN_DAYS => ReminderUrgency::Urgent,
            _ => ReminderUrgency::Upcoming,
        }
    }
}

/// Shallow patch for [`PaymentReminder`]. The id is never patched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaymentReminderPatch {
    pub title: Option<String>,
    pub amount: Option<f64>,
    pub due_date: Option<String>,
    pub is_repeating: Option<bool>,
    pub repeat_rule: Option<RepeatRule>,
    pub is_paid: Option<bool>,
}

impl PaymentReminderPatch {
    /// Patch used by "mark as paid".
    pub fn paid() -> Self {
        Self {
            is_paid: Some(true),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(title) = &self.title {
            require_text("title", title)?;
        }
        if let Some(amount) = self.amount {
            require_positive("amount", amount)?;
        }
        if let Some(due_date) = &self.due_date {
            require_date("due_date", due_date)?;
        }
        Ok(())
    }

    pub fn apply_to(&self, reminder: &mut PaymentReminder) {
        if let Some(title) = &self.title {
            reminder.title = title.trim().to_string();
        }
        if let Some(amount) = self.amount {
            reminder.amount = amount;
        }
        if let Some(due_date) = &self.due_date {
            reminder.due_date = due_date.trim().to_string();
        }
        if let Some(is_repeating) = self.is_repeating {
            reminder.is_repeating = is_repeating;
        }
        if let Some(repeat_rule) = self.repeat_rule {
            reminder.repeat_rule = repeat_rule;
        }
        if let Some(is_paid) = self.is_paid {
            reminder.is_paid = is_paid;
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaymentsState {
    #[serde(default)]
    pub reminders: Vec<PaymentReminder>,
}

impl PaymentsState {
    pub fn active_count(&self) -> usize {
        self.reminders.iter().filter(|reminder| reminder.is_active()).count()
    }

    pub fn reminder(&self, id: &str) -> Option<&PaymentReminder> {
        self.reminders.iter().find(|reminder| reminder.id == id)
    }
}
