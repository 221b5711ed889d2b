// ICS calendar export of assignment deadlines

use anyhow::{Context, Result};
use icalendar::{Calendar, Component, Event, EventLike};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

use crate::model::Assignment;

pub const CALENDAR_FILE: &str = "coursesync_calendar.ics";

/// Rendered calendar plus what went into it
#[derive(Debug, Clone)]
pub struct CalendarExport {
    pub ics: String,
    pub events: usize,
    /// Assignments left out because their due date did not parse
    pub skipped: usize,
}

/// One all-day event per assignment, on its due date.
pub fn assignments_calendar(assignments: &[Assignment]) -> CalendarExport {
    let mut calendar = Calendar::new();
    calendar.name("CourseSync deadlines");

    let mut events = 0;
    let mut skipped = 0;
    for assignment in assignments {
        let Some(due) = assignment.due_date_parsed() else {
            skipped += 1;
            continue;
        };
        calendar.push(
            Event::new()
                .uid(&event_uid(assignment))
                .summary(&summary(assignment))
                .description(&description(assignment))
                .all_day(due)
                .done(),
        );
        events += 1;
    }

    if skipped > 0 {
        tracing::warn!(skipped, "Assignments without a valid due date left out of calendar");
    }

    CalendarExport {
        ics: calendar.done().to_string(),
        events,
        skipped,
    }
}

/// Write the calendar to `path`. Fails when no assignment has a usable date.
pub fn write_calendar(assignments: &[Assignment], path: &Path) -> Result<CalendarExport> {
    let export = assignments_calendar(assignments);
    if export.events == 0 {
        anyhow::bail!("No assignments with a due date to export");
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    fs::write(path, &export.ics).with_context(|| format!("Failed to write {}", path.display()))?;

    tracing::info!(path = %path.display(), events = export.events, "Exported calendar");
    Ok(export)
}

/// Default location inside the data directory
pub fn default_calendar_path(data_dir: &Path) -> PathBuf {
    data_dir.join(CALENDAR_FILE)
}

fn summary(a: &Assignment) -> String {
    let course = if a.course_code.trim().is_empty() {
        a.course.trim()
    } else {
        a.course_code.trim()
    };
    if course.is_empty() {
        a.name.clone()
    } else {
        format!("{}: {}", course, a.name)
    }
}

fn description(a: &Assignment) -> String {
    let mut lines = vec![format!("Type: {}", a.kind)];
    if a.weight > 0.0 {
        lines.push(format!("Weight: {}%", a.weight));
    }
    lines.push(format!("Estimated hours: {}", a.planned_hours()));
    lines.push(format!("Progress: {}%", a.progress));
    if !a.description.trim().is_empty() {
        lines.push(String::new());
        lines.push(a.description.trim().to_string());
    }
    lines.join("\n")
}

/// Same assignment, same UID, so re-imports update instead of duplicating
fn event_uid(a: &Assignment) -> String {
    let mut hasher = Sha256::new();
    hasher.update(a.course.trim().as_bytes());
    hasher.update(b"|");
    hasher.update(a.name.trim().as_bytes());
    hasher.update(b"|");
    hasher.update(a.due_date.trim().as_bytes());
    let digest = format!("{:x}", hasher.finalize());
    format!("{}@coursesync", &digest[..16])
}
