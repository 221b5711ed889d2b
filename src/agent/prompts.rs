// Prompt templates
//
// System prompts describe the JSON shape the model must return; user prompts
// carry the student's data. Shapes here must stay in sync with the types in
// `crate::model`.

use chrono::{NaiveDate, NaiveDateTime};

/// Syllabus text beyond this many characters is cut before sending.
pub const MAX_SYLLABUS_CHARS: usize = 30_000;

pub const SYLLABUS_PARSER_PROMPT: &str = r#"You are an expert academic syllabus parser. Extract structured information from course syllabi.

Extract and return ONLY a valid JSON object with this exact structure:
{
  "course_name": "string",
  "course_code": "string",
  "instructor": "string",
  "assignments": [
    {
      "name": "string",
      "type": "quiz|exam|project|homework|presentation",
      "due_date": "YYYY-MM-DD",
      "weight": number,
      "estimated_hours": number,
      "description": "string"
    }
  ]
}

Rules:
- Extract ALL assignments with precise dates
- Estimate hours: quiz=2h, homework=5h, project=20h, exam=8h, presentation=10h
- Convert relative dates using the semester start date provided
- Weight should be percentage (0-100)"#;

const WORKLOAD_ANALYZER_TEMPLATE: &str = r#"You are an intelligent workload analyzer. Analyze assignment distribution and identify risk periods.

Return ONLY a valid JSON object:
{
  "total_hours": number,
  "weekly_breakdown": {
    "2025-09-01": number,
    "2025-09-08": number
  },
  "risk_weeks": ["YYYY-MM-DD"],
  "recommendations": ["string"],
  "priority_assignments": ["string"]
}

Risk week = any week with >{threshold} hours of work
Recommendations should be actionable and specific"#;

pub const SCHEDULE_OPTIMIZER_PROMPT: &str = r#"You are a smart study schedule creator. Create realistic, day-by-day study plans.

Return ONLY a valid JSON object:
{
  "daily_schedule": {
    "YYYY-MM-DD": [
      {
        "assignment": "string",
        "task": "string",
        "hours": number,
        "priority": "high|medium|low"
      }
    ]
  },
  "warnings": ["string"],
  "total_scheduled_hours": number
}

Rules:
- Start work 3+ days before deadlines
- Add 20% buffer time
- Respect daily hour limits
- Break large tasks into smaller chunks"#;

const NOTIFICATION_TEMPLATE: &str = r#"You are a proactive student assistant. Generate timely notifications.

Return ONLY a valid JSON array:
[
  {
    "message": "string",
    "urgency": "high|medium|low",
    "action": "string",
    "send_at": "YYYY-MM-DD HH:MM",
    "type": "deadline|reminder|warning|celebration"
  }
]

Create 5-10 strategic notifications for the next {days} days"#;

pub const ASSISTANT_PROMPT: &str = r#"You are a helpful academic AI assistant for CourseSync. Your goal is to help students manage their courses and assignments.

You have access to the student's courses and assignments. Use this context to provide helpful, encouraging, and accurate answers.

Rules:
- Be concise but helpful
- Use a friendly, encouraging tone
- Focus on helping the student stay organized
- If they ask about their workload or schedule, refer to the data you have
- If you don't know something, be honest"#;

pub fn workload_analyzer_prompt(risk_threshold: f64) -> String {
    WORKLOAD_ANALYZER_TEMPLATE.replace("{threshold}", &format_hours(risk_threshold))
}

pub fn notification_prompt(days: u32) -> String {
    NOTIFICATION_TEMPLATE.replace("{days}", &days.max(1).to_string())
}

/// Syllabus text past `MAX_SYLLABUS_CHARS` is dropped with a warning
pub fn syllabus_user_prompt(syllabus: &str, semester_start: NaiveDate) -> String {
    let text = syllabus.trim();
    let kept = truncate_chars(text, MAX_SYLLABUS_CHARS);
    if kept.len() < text.len() {
        tracing::warn!(
            original_chars = text.chars().count(),
            kept_chars = MAX_SYLLABUS_CHARS,
            "Syllabus is too long; assignments near the end may be missed"
        );
    }
    format!(
        "Semester start date: {}\n\nSyllabus:\n{}",
        semester_start.format("%Y-%m-%d"),
        kept
    )
}

pub fn workload_user_prompt(assignments_json: &str, today: NaiveDate) -> String {
    format!(
        "Today is {}.\n\nAnalyze the workload for these assignments:\n{}",
        today.format("%Y-%m-%d"),
        assignments_json
    )
}

pub fn schedule_user_prompt(assignments_json: &str, hours_per_day: u32, today: NaiveDate) -> String {
    format!(
        "Today is {}. The student can study at most {} hours per day.\n\n\
         Create a study schedule starting today for these assignments:\n{}",
        today.format("%Y-%m-%d"),
        hours_per_day,
        assignments_json
    )
}

pub fn notification_user_prompt(
    schedule_json: &str,
    assignments_json: &str,
    now: NaiveDateTime,
) -> String {
    format!(
        "Current time: {}\n\nStudy schedule:\n{}\n\nAssignments:\n{}",
        now.format("%Y-%m-%d %H:%M"),
        schedule_json,
        assignments_json
    )
}

pub fn assistant_user_prompt(question: &str, context_json: &str, today: NaiveDate) -> String {
    format!(
        "Today is {}.\n\nStudent data:\n{}\n\nQuestion: {}",
        today.format("%Y-%m-%d"),
        context_json,
        question.trim()
    )
}

/// "20" rather than "20.0" for whole numbers
fn format_hours(hours: f64) -> String {
    if hours.fract() == 0.0 {
        format!("{}", hours as i64)
    } else {
        format!("{:.1}", hours)
    }
}

fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
