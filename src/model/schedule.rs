// Day-by-day study plan returned by the model

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::lenient;

loose_enum! {
    Priority {
        High => "high",
        Medium => "medium",
        Low => "low",
    } else Unknown => "unknown"
}

impl Default for Priority {
    fn default() -> Self {
        Self::Unknown
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StudyTask {
    #[serde(default, deserialize_with = "lenient::string_or_empty")]
    pub assignment: String,

    #[serde(default, deserialize_with = "lenient::string_or_empty")]
    pub task: String,

    #[serde(default, deserialize_with = "lenient::f64_or_zero")]
    pub hours: f64,

    #[serde(default)]
    pub priority: Priority,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StudySchedule {
    /// Date ("YYYY-MM-DD") -> tasks for that day, ordered by date
    #[serde(default, deserialize_with = "daily_tasks")]
    pub daily_schedule: BTreeMap<String, Vec<StudyTask>>,

    #[serde(default, deserialize_with = "lenient::string_list")]
    pub warnings: Vec<String>,

    #[serde(default, deserialize_with = "lenient::f64_or_zero")]
    pub total_scheduled_hours: f64,
}

impl StudySchedule {
    pub fn day_total(&self, date: &str) -> f64 {
        self.daily_schedule
            .get(date)
            .map(|tasks| tasks.iter().map(|t| t.hours).sum())
            .unwrap_or(0.0)
    }

    /// First `n` days that have work, in date order
    pub fn upcoming_days(&self, n: usize) -> Vec<(&str, &[StudyTask])> {
        self.daily_schedule
            .iter()
            .filter(|(_, tasks)| !tasks.is_empty())
            .take(n)
            .map(|(date, tasks)| (date.as_str(), tasks.as_slice()))
            .collect()
    }

    /// Days whose planned hours exceed the daily budget.
    ///
    /// The model is asked to respect the limit but does not always do so.
    pub fn over_budget_days(&self, hours_per_day: f64) -> Vec<&str> {
        self.daily_schedule
            .keys()
            .filter(|date| self.day_total(date) > hours_per_day)
            .map(String::as_str)
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.daily_schedule.values().all(Vec::is_empty)
    }
}

/// Days whose value is not a task list are dropped, as are malformed tasks
fn daily_tasks<'de, D>(deserializer: D) -> Result<BTreeMap<String, Vec<StudyTask>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde_json::Value;

    let Value::Object(days) = Value::deserialize(deserializer)? else {
        return Ok(BTreeMap::new());
    };

    Ok(days
        .into_iter()
        .filter_map(|(date, tasks)| match tasks {
            Value::Array(items) => Some((date, lenient::decode_objects(items))),
            other => {
                tracing::debug!(%date, "Skipping schedule day without a task list: {}", other);
                None
            }
        })
        .collect())
}
