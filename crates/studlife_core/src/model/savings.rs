//! Savings partition model.
//!
//! # Invariants
//! - `saved >= 0` and `target > 0` for every goal created or patched through
//!   core. Legacy rows may still carry `target == 0`; progress treats them as 0.
//! - `goals` keeps insertion order; order carries no meaning.

use crate::model::{new_record_id, require_non_negative, require_positive, require_text, ValidationError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavingsGoal {
    pub id: String,
    pub title: String,
    pub saved: f64,
    pub target: f64,
}

impl SavingsGoal {
    /// Creates a validated goal with a generated id.
    pub fn new(title: impl Into<String>, saved: f64, target: f64) -> Result<Self, ValidationError> {
        let goal = Self {
            id: new_record_id(),
            title: title.into().trim().to_string(),
            saved,
            target,
        };
        goal.validate()?;
        Ok(goal)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("id", &self.id)?;
        require_text("title", &self.title)?;
        require_non_negative("saved", self.saved)?;
        require_positive("target", self.target)
    }

    /// `saved / target`, or 0 when the goal has no positive target.
    pub fn progress_ratio(&self) -> f64 {
        if self.target > 0.0 && self.saved.is_finite() {
            self.saved / self.target
        } else {
            0.0
        }
    }

    /// Rounded progress percent; may exceed 100 for over-funded goals.
    pub fn progress_percent(&self) -> u32 {
        (self.progress_ratio() * 100.0).round().max(0.0) as u32
    }

    pub fn remaining(&self) -> f64 {
        (self.target - self.saved).max(0.0)
    }
}

/// Shallow patch for [`SavingsGoal`]. The id is never patched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SavingsGoalPatch {
    pub title: Option<String>,
    pub saved: Option<f64>,
    pub target: Option<f64>,
}

impl SavingsGoalPatch {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(title) = &self.title {
            require_text("title", title)?;
        }
        if let Some(saved) = self.saved {
            require_non_negative("saved", saved)?;
        }
        if let Some(target) = self.target {
            require_positive("target", target)?;
        }
        Ok(())
    }

    pub fn apply_to(&self, goal: &mut SavingsGoal) {
        if let Some(title) = &self.title {
            goal.title = title.trim().to_string();
        }
        if let Some(saved) = self.saved {
            goal.saved = saved;
        }
        if let Some(target) = self.target {
            goal.target = target;
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SavingsState {
    #[serde(default)]
    pub goals: Vec<SavingsGoal>,
}

impl SavingsState {
    pub fn goal(&self, id: &str) -> Option<&SavingsGoal> {
        self.goals.iter().find(|goal| goal.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::{SavingsGoal, SavingsGoalPatch};
    use crate::model::ValidationError;

    #[test]
    fn new_goal_rejects_blank_title_and_zero_target() {
        assert!(matches!(
            SavingsGoal::new("  ", 0.0, 100.0),
            Err(ValidationError::EmptyField("title"))
        ));
        assert!(matches!(
            SavingsGoal::new("Laptop", 0.0, 0.0),
            Err(ValidationError::NotPositive { field: "target", .. })
        ));
    }

    #[test]
    fn progress_handles_zero_target() {
        let goal = SavingsGoal {
            id: "g".to_string(),
            title: "Broken".to_string(),
            saved: 10.0,
            target: 0.0,
        };
        assert_eq!(goal.progress_ratio(), 0.0);
        assert_eq!(goal.progress_percent(), 0);
        assert_eq!(goal.remaining(), 0.0);
    }

    #[test]
    fn patch_merges_only_present_fields() {
        let mut goal = SavingsGoal::new("Bike", 10.0, 200.0).unwrap();
        let patch = SavingsGoalPatch {
            saved: Some(50.0),
            ..SavingsGoalPatch::default()
        };
        patch.validate().unwrap();
        patch.apply_to(&mut goal);
        assert_eq!(goal.title, "Bike");
        assert_eq!(goal.saved, 50.0);
        assert_eq!(goal.progress_percent(), 25);
        assert_eq!(goal.remaining(), 150.0);
    }
}
