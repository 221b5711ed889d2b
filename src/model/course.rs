// Courses and their assignments

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::lenient;

loose_enum! {
    /// Assignment category as reported by the syllabus parser
    AssignmentKind {
        Quiz => "quiz",
        Exam => "exam",
        Project => "project",
        Homework => "homework",
        Presentation => "presentation",
    } else Other => "other"
}

impl Default for AssignmentKind {
    fn default() -> Self {
        Self::Other
    }
}

impl AssignmentKind {
    /// Study hours assumed when the model gives none.
    ///
    /// Matches the estimates the syllabus prompt asks the model to use.
    pub fn default_hours(&self) -> f64 {
        match self {
            Self::Quiz => 2.0,
            Self::Homework => 5.0,
            Self::Project => 20.0,
            Self::Exam => 8.0,
            Self::Presentation => 10.0,
            Self::Other => 5.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    #[serde(default, deserialize_with = "lenient::string_or_empty")]
    pub name: String,

    #[serde(rename = "type", default)]
    pub kind: AssignmentKind,

    /// "YYYY-MM-DD" as produced by the model; kept verbatim
    #[serde(default, deserialize_with = "lenient::string_or_empty")]
    pub due_date: String,

    /// Share of the final grade, in percent
    #[serde(default, deserialize_with = "lenient::f64_or_zero")]
    pub weight: f64,

    #[serde(default, deserialize_with = "lenient::f64_or_zero")]
    pub estimated_hours: f64,

    #[serde(default, deserialize_with = "lenient::string_or_empty")]
    pub description: String,

    /// Owning course name, stamped when the course is added
    #[serde(default, deserialize_with = "lenient::string_or_empty")]
    pub course: String,

    #[serde(default, deserialize_with = "lenient::string_or_empty")]
    pub course_code: String,

    /// Completion percentage, 0..=100
    #[serde(default, deserialize_with = "lenient::percent")]
    pub progress: u8,
}

impl Assignment {
    pub fn due_date_parsed(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.due_date.trim(), "%Y-%m-%d").ok()
    }

    pub fn is_complete(&self) -> bool {
        self.progress >= 100
    }

    /// Set progress, clamped into 0..=100
    pub fn set_progress(&mut self, progress: i64) {
        self.progress = progress.clamp(0, 100) as u8;
    }

    /// Hours to plan for: the model's estimate, or the per-kind default
    pub fn planned_hours(&self) -> f64 {
        if self.estimated_hours > 0.0 {
            self.estimated_hours
        } else {
            self.kind.default_hours()
        }
    }
}

/// Where a course's syllabus came from
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "kind", content = "location")]
pub enum CourseSource {
    #[default]
    Text,
    Url(String),
    /// Uploaded or local PDF, by file name
    Pdf(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,

    #[serde(default, deserialize_with = "lenient::string_or_empty")]
    pub course_name: String,

    #[serde(default, deserialize_with = "lenient::string_or_empty")]
    pub course_code: String,

    #[serde(default, deserialize_with = "lenient::string_or_empty")]
    pub instructor: String,

    #[serde(default, deserialize_with = "lenient::object_list")]
    pub assignments: Vec<Assignment>,

    #[serde(default)]
    pub source: CourseSource,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub added_at: Option<DateTime<Utc>>,
}

impl Course {
    /// Course name, or "N/A" when the parser found none
    pub fn display_name(&self) -> &str {
        if self.course_name.trim().is_empty() {
            "N/A"
        } else {
            &self.course_name
        }
    }

    /// Copy course identity into every assignment and fill in missing hours.
    ///
    /// Progress is preserved when already present (e.g. reloaded state).
    pub fn stamp_assignments(&mut self) {
        let name = self.display_name().to_string();
        for a in &mut self.assignments {
            a.course = name.clone();
            a.course_code = self.course_code.clone();
            a.estimated_hours = a.planned_hours();
        }
    }
}
