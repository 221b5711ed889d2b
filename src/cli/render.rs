// Terminal rendering for courses, workload, schedule and notifications.
//
// Every function returns a String so output can be tested without a
// terminal; callers print it.

use crossterm::style::{StyledContent, Stylize};
use std::fmt::Write;

use crate::model::{
    Course, Notification, Priority, RiskLevel, StudySchedule, Urgency, WorkloadAnalysis,
};
use crate::state::{AppState, Settings, Stats};

/// Days of the schedule shown at once
pub const SCHEDULE_DAYS_SHOWN: usize = 14;

/// Notifications shown at once
pub const FEED_LIMIT: usize = 10;

const PANEL_WIDTH: usize = 56;

pub fn banner() -> String {
    let lines = [
        "╔══════════════════════════════════════════════════════╗",
        "║                      CourseSync                      ║",
        "║          Smart Deadline & Workload Balancer          ║",
        "╚══════════════════════════════════════════════════════╝",
    ];
    let mut out = String::new();
    for line in lines {
        let _ = writeln!(out, "{}", line.cyan().bold());
    }
    let _ = writeln!(
        out,
        "{}",
        "Making campus life smarter, one deadline at a time.".dark_grey()
    );
    out
}

pub fn heading(title: &str) -> String {
    format!("\n{}\n", title.cyan().bold())
}

pub fn success(message: &str) -> String {
    format!("{} {}", "✓".green().bold(), message)
}

pub fn warning(message: &str) -> String {
    format!("{} {}", "⚠".yellow().bold(), message.yellow())
}

pub fn failure(message: &str) -> String {
    format!("{} {}", "✗".red().bold(), message.red())
}

/// Boxed panel with a title; body lines are padded to a fixed width
fn panel(title: &str, body: &[String]) -> String {
    let mut out = String::new();
    let rule = "─".repeat(PANEL_WIDTH.saturating_sub(title.chars().count() + 3));
    let _ = writeln!(out, "┌─ {} {}┐", title.bold(), rule);
    for line in body {
        let _ = writeln!(out, "│ {:<width$} │", fit(line, PANEL_WIDTH - 2), width = PANEL_WIDTH - 2);
    }
    let _ = writeln!(out, "└{}┘", "─".repeat(PANEL_WIDTH));
    out
}

/// Truncate to `width` characters, marking the cut with an ellipsis
fn fit(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else {
        let cut: String = text.chars().take(width.saturating_sub(1)).collect();
        format!("{}…", cut)
    }
}

fn or_na(text: &str) -> &str {
    if text.trim().is_empty() {
        "N/A"
    } else {
        text
    }
}

fn hours(h: f64) -> String {
    if h.fract() == 0.0 {
        format!("{}h", h as i64)
    } else {
        format!("{:.1}h", h)
    }
}

pub fn course_summary(course: &Course) -> String {
    panel(
        "Course Summary",
        &[
            course.display_name().to_string(),
            format!("Code: {}", or_na(&course.course_code)),
            format!("Instructor: {}", or_na(&course.instructor)),
            format!("Assignments: {}", course.assignments.len()),
        ],
    )
}

pub fn course_list(state: &AppState) -> String {
    if state.courses.is_empty() {
        return warning("No courses yet. Add a syllabus first!");
    }
    let mut out = String::new();
    for (i, course) in state.courses.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>3}  {}  {}  {}",
            i,
            fit(course.display_name(), 30).bold(),
            or_na(&course.course_code).dark_grey(),
            format!("({} assignments)", course.assignments.len()).dark_grey()
        );
    }
    out
}

pub fn stats_line(stats: &Stats) -> String {
    format!(
        "{} courses · {} assignments · {} completed",
        stats.total_courses, stats.total_assignments, stats.completed_assignments
    )
}

/// All assignments, earliest due first, with the index used by `progress`
pub fn assignment_table(state: &AppState) -> String {
    if state.assignments.is_empty() {
        return warning("No assignments yet. Add a course first!");
    }

    let mut out = heading(&format!("All Assignments ({})", state.assignments.len()));
    let _ = writeln!(
        out,
        "{}",
        format!(
            "{:>3}  {:<18} {:<28} {:<12} {:<10} {:>6} {:>6} {:>5}",
            "#", "Course", "Assignment", "Type", "Due", "Weight", "Hours", "Done"
        )
        .bold()
    );

    for (index, a) in state.sorted_assignments() {
        let row = format!(
            "{:>3}  {:<18} {:<28} {:<12} {:<10} {:>6} {:>6} {:>4}%",
            index,
            fit(&a.course, 18),
            fit(&a.name, 28),
            a.kind.as_str(),
            fit(&a.due_date, 10),
            format!("{}%", a.weight),
            hours(a.estimated_hours),
            a.progress
        );
        let _ = writeln!(out, "{}", if a.is_complete() { row.dark_grey() } else { row.stylize() });
    }
    out
}

fn risk_marker(level: RiskLevel) -> StyledContent<&'static str> {
    match level {
        RiskLevel::High => level.label().red().bold(),
        RiskLevel::Moderate => level.label().yellow(),
        RiskLevel::Normal => level.label().green(),
    }
}

pub fn workload_report(analysis: &WorkloadAnalysis, risk_threshold: f64) -> String {
    let mut out = panel(
        "Summary",
        &[
            format!("Total Study Hours: {}", hours(analysis.total_hours)),
            format!("Risk Weeks: {}", analysis.risk_weeks.len()),
            format!(
                "Priority Assignments: {}",
                analysis.priority_assignments.len()
            ),
        ],
    );

    let weeks = analysis.classified_weeks(risk_threshold);
    if !weeks.is_empty() {
        let _ = writeln!(out, "\n{}", "Weekly Hour Distribution:".bold());
        for (week, h, level) in weeks {
            let _ = writeln!(out, "  {:<12} {:>7}  {}", week, hours(h), risk_marker(level));
        }
    }

    if let Some((week, h)) = analysis.peak_week() {
        let _ = writeln!(out, "\n{} {} ({})", "Peak week:".bold(), week, hours(h));
    }

    if !analysis.priority_assignments.is_empty() {
        let _ = writeln!(out, "\n{}", "Priorities:".bold());
        for name in &analysis.priority_assignments {
            let _ = writeln!(out, "  • {}", name);
        }
    }

    if !analysis.recommendations.is_empty() {
        let _ = writeln!(out, "\n{}", "Recommendations:".yellow().bold());
        for (i, rec) in analysis.recommendations.iter().enumerate() {
            let _ = writeln!(out, "  {}. {}", i + 1, rec);
        }
    }
    out
}

fn priority_marker(priority: Priority) -> StyledContent<&'static str> {
    match priority {
        Priority::High => "●".red(),
        Priority::Medium => "●".yellow(),
        Priority::Low => "●".green(),
        Priority::Unknown => "○".white(),
    }
}

/// First [`SCHEDULE_DAYS_SHOWN`] days that have work, with per-day totals
pub fn schedule_report(schedule: &StudySchedule) -> String {
    let mut out = String::new();
    let days = schedule.upcoming_days(SCHEDULE_DAYS_SHOWN);
    if days.is_empty() {
        return warning("The schedule has no study days.");
    }

    for (date, tasks) in days {
        let _ = writeln!(
            out,
            "\n{} {}",
            date.cyan().bold(),
            format!("({} total)", hours(schedule.day_total(date))).dark_grey()
        );
        for task in tasks {
            let _ = writeln!(
                out,
                "  {} {} {}",
                priority_marker(task.priority),
                task.task,
                format!("({})", hours(task.hours)).dark_grey()
            );
            let _ = writeln!(out, "     {}", format!("→ {}", task.assignment).dark_grey());
        }
    }

    if !schedule.warnings.is_empty() {
        let _ = writeln!(out, "\n{}", "Warnings:".red().bold());
        for w in &schedule.warnings {
            let _ = writeln!(out, "  • {}", w);
        }
    }
    out
}

fn urgency_style(urgency: Urgency, text: String) -> StyledContent<String> {
    match urgency {
        Urgency::High => text.red().bold(),
        Urgency::Medium => text.yellow().bold(),
        Urgency::Low => text.dark_grey(),
        Urgency::Unknown => text.white(),
    }
}

/// Top [`FEED_LIMIT`] notifications, most urgent first
pub fn notification_feed(feed: &[Notification]) -> String {
    if feed.is_empty() {
        return warning("No notifications generated.");
    }

    let mut out = String::new();
    for n in feed.iter().take(FEED_LIMIT) {
        let title = format!("[{}] {}", n.urgency.as_str().to_uppercase(), n.kind.as_str().to_uppercase());
        let _ = writeln!(out, "{}", urgency_style(n.urgency, title));
        let _ = writeln!(out, "  {}", n.message);
        if !n.action.is_empty() {
            let _ = writeln!(out, "  {} {}", "Action:".bold(), n.action);
        }
        let _ = writeln!(out, "  {}\n", format!("Send at: {}", n.send_at).dark_grey());
    }
    if feed.len() > FEED_LIMIT {
        let _ = writeln!(
            out,
            "{}",
            format!("… and {} more", feed.len() - FEED_LIMIT).dark_grey()
        );
    }
    out
}

pub fn settings_report(settings: &Settings) -> String {
    panel(
        "Settings",
        &[
            format!("hours_per_day = {}", settings.hours_per_day),
            format!("risk_threshold = {}", settings.risk_threshold),
            format!("notification_lead_days = {}", settings.notification_lead_days),
            format!(
                "notification_poll_seconds = {}",
                settings.notification_poll_seconds
            ),
            format!("notifications_enabled = {}", settings.notifications_enabled),
        ],
    )
}
