// Application state: courses, the flat assignment list, settings and
// the ids of notifications already delivered.

mod settings;
mod store;

pub use settings::{Settings, SettingsUpdate, MIN_POLL_SECONDS};
pub use store::{export_snapshot, StateStore};

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::model::{Assignment, Course};

/// State shared between the web handlers and the notification poller
pub type SharedState = Arc<RwLock<AppState>>;

#[derive(Debug, Error)]
pub enum StateError {
    #[error("Invalid assignment index {index} (there are {len} assignments)")]
    AssignmentIndex { index: usize, len: usize },

    #[error("Invalid course index {index} (there are {len} courses)")]
    CourseIndex { index: usize, len: usize },

    #[error("Invalid value for {key}: {reason}")]
    InvalidSetting { key: String, reason: String },

    #[error("Unknown setting '{0}'")]
    UnknownSetting(String),
}

impl StateError {
    pub(crate) fn invalid(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidSetting {
            key: key.into(),
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub total_courses: usize,
    pub total_assignments: usize,
    pub completed_assignments: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppState {
    #[serde(default)]
    pub courses: Vec<Course>,

    /// Every course's assignments, flattened; progress lives here
    #[serde(default)]
    pub assignments: Vec<Assignment>,

    #[serde(default)]
    pub settings: Settings,

    #[serde(default)]
    pub sent_notifications: Vec<String>,
}

impl AppState {
    /// Append a parsed course; returns the number of assignments added
    pub fn add_course(&mut self, mut course: Course) -> usize {
        course.stamp_assignments();
        let added = course.assignments.len();
        self.assignments.extend(course.assignments.iter().cloned());
        self.courses.push(course);
        added
    }

    pub fn update_progress(&mut self, index: usize, progress: i64) -> Result<u8, StateError> {
        let len = self.assignments.len();
        let assignment = self
            .assignments
            .get_mut(index)
            .ok_or(StateError::AssignmentIndex { index, len })?;
        assignment.set_progress(progress);
        Ok(assignment.progress)
    }

    /// Remove a course and every assignment carrying its name.
    ///
    /// Assignments are matched by course name, so two courses sharing a
    /// name lose each other's assignments.
    pub fn delete_course(&mut self, index: usize) -> Result<Course, StateError> {
        if index >= self.courses.len() {
            return Err(StateError::CourseIndex {
                index,
                len: self.courses.len(),
            });
        }
        let course = self.courses.remove(index);
        let name = course.display_name().to_string();
        let before = self.assignments.len();
        self.assignments.retain(|a| a.course != name);
        tracing::info!(
            course = %name,
            removed = before - self.assignments.len(),
            "Deleted course"
        );
        Ok(course)
    }

    pub fn stats(&self) -> Stats {
        Stats {
            total_courses: self.courses.len(),
            total_assignments: self.assignments.len(),
            completed_assignments: self.assignments.iter().filter(|a| a.is_complete()).count(),
        }
    }

    /// Assignments with their list index, earliest due first.
    ///
    /// Undated assignments sort last, in insertion order.
    pub fn sorted_assignments(&self) -> Vec<(usize, &Assignment)> {
        let mut sorted: Vec<_> = self.assignments.iter().enumerate().collect();
        sorted.sort_by_key(|(_, a)| (a.due_date_parsed().is_none(), a.due_date_parsed()));
        sorted
    }

    /// Assignments still worth planning for
    pub fn open_assignments(&self) -> Vec<Assignment> {
        self.assignments
            .iter()
            .filter(|a| !a.is_complete())
            .cloned()
            .collect()
    }

    pub fn was_sent(&self, id: &str) -> bool {
        self.sent_notifications.iter().any(|s| s == id)
    }

    /// Record a delivered notification; false if it was already recorded
    pub fn mark_sent(&mut self, id: impl Into<String>) -> bool {
        let id = id.into();
        if self.was_sent(&id) {
            return false;
        }
        self.sent_notifications.push(id);
        true
    }
}
