use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::entity::EntityId;
use crate::error::CoreError;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum GoalStatus {
    #[default]
    Active,
    Completed,
    Abandoned,
}

impl std::fmt::Display for GoalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            GoalStatus::Active => "active",
            GoalStatus::Completed => "completed",
            GoalStatus::Abandoned => "abandoned",
        })
    }
}

impl FromStr for GoalStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(GoalStatus::Active),
            "completed" | "done" => Ok(GoalStatus::Completed),
            "abandoned" => Ok(GoalStatus::Abandoned),
            _ => Err(CoreError::Parse(format!("unknown goal status '{s}'"))),
        }
    }
}

/// A measurable target, e.g. 40 mugs or 12 kiln loads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalMetric {
    pub unit: String,
    pub target: f64,
    #[serde(default)]
    pub progress: f64,
}

impl GoalMetric {
    /// Progress as a fraction of the target, capped at 1.0.
    pub fn fraction(&self) -> f64 {
        if self.target <= 0.0 {
            return 0.0;
        }
        (self.progress / self.target).clamp(0.0, 1.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub title: String,
    /// Why this goal matters.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub purpose: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric: Option<GoalMetric>,
    #[serde(default)]
    pub status: GoalStatus,
    /// Journal entries documenting progress.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub journal_entries: Vec<EntityId>,
}

impl Goal {
    pub fn new(title: impl Into<String>, purpose: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            purpose: purpose.into(),
            category: String::new(),
            metric: None,
            status: GoalStatus::Active,
            journal_entries: Vec::new(),
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_metric(mut self, unit: impl Into<String>, target: f64, progress: f64) -> Self {
        self.metric = Some(GoalMetric {
            unit: unit.into(),
            target,
            progress,
        });
        self
    }

    pub(crate) fn validate(&self, violations: &mut Vec<String>) {
        if self.title.trim().is_empty() {
            violations.push("title is required".into());
        }
        if let Some(metric) = &self.metric {
            if metric.unit.trim().is_empty() {
                violations.push("metric unit is required".into());
            }
            if !(metric.target.is_finite() && metric.target > 0.0) {
                violations.push("metric target must be a positive number".into());
            }
            if !(metric.progress.is_finite() && metric.progress >= 0.0) {
                violations.push("metric progress must not be negative".into());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_goal_defaults_to_active() {
        let goal: Goal =
            serde_json::from_str(r#"{"title":"Sell at the spring fair"}"#)
                .unwrap();
        assert_eq!(goal.status, GoalStatus::Active);
        assert!(goal.journal_entries.is_empty());
    }

    #[test]
    fn test_metric_fraction_is_capped() {
        let goal = Goal::new("Mugs", "Build stock").with_metric("mugs", 40.0, 50.0);
        assert_eq!(goal.metric.unwrap().fraction(), 1.0);
    }

    #[test]
    fn test_metric_validation() {
        let goal = Goal::new("Mugs", "").with_metric("", -1.0, -2.0);
        let mut violations = Vec::new();
        goal.validate(&mut violations);
        assert_eq!(violations.len(), 3);
    }
}
