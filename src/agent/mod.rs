// CourseSync agent - prompt orchestration
//
// Each operation templates a prompt, sends it to the model, and pulls JSON
// back out of the reply. Transport failures are errors; a reply that does
// not contain usable JSON is `None` (or an empty feed), never a crash.

pub mod prompts;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate, NaiveDateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;

use crate::extract::{extract_json, ExtractError};
use crate::model::{lenient, sort_feed, Assignment, Course, Notification, StudySchedule, WorkloadAnalysis};
use crate::providers::{LlmProvider, ProviderRequest};
use crate::scrape::PageScraper;

/// Temperature for free-form assistant answers
const ASSISTANT_TEMPERATURE: f32 = 0.7;

type Clock = Arc<dyn Fn() -> NaiveDateTime + Send + Sync>;

pub struct CourseSyncAgent {
    provider: Arc<dyn LlmProvider>,
    scraper: Arc<dyn PageScraper>,
    clock: Clock,
}

impl CourseSyncAgent {
    pub fn new(provider: Arc<dyn LlmProvider>, scraper: Arc<dyn PageScraper>) -> Self {
        Self {
            provider,
            scraper,
            clock: Arc::new(|| Local::now().naive_local()),
        }
    }

    /// Replace the wall clock (tests)
    pub fn with_clock<F>(mut self, clock: F) -> Self
    where
        F: Fn() -> NaiveDateTime + Send + Sync + 'static,
    {
        self.clock = Arc::new(clock);
        self
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    fn now(&self) -> NaiveDateTime {
        (self.clock)()
    }

    fn today(&self) -> NaiveDate {
        self.now().date()
    }

    /// Extract a course and its assignments from syllabus text.
    ///
    /// `semester_start` ("YYYY-MM-DD") anchors relative dates like "week 3".
    /// Returns `None` when the reply has no `assignments` array.
    pub async fn parse_syllabus(&self, text: &str, semester_start: &str) -> Result<Option<Course>> {
        if text.trim().is_empty() {
            anyhow::bail!("Syllabus text is empty");
        }
        let start = parse_date(semester_start)?;

        let reply = self
            .complete(
                "parse_syllabus",
                ProviderRequest::prompt(
                    prompts::SYLLABUS_PARSER_PROMPT,
                    prompts::syllabus_user_prompt(text, start),
                ),
            )
            .await?;

        let Some(value) = self.json_or_none("parse_syllabus", &reply) else {
            return Ok(None);
        };

        if !value.get("assignments").is_some_and(Value::is_array) {
            tracing::warn!("Syllabus reply has no assignments array");
            return Ok(None);
        }

        let mut course: Course = match serde_json::from_value(value) {
            Ok(course) => course,
            Err(e) => {
                tracing::warn!("Syllabus reply did not match the course shape: {}", e);
                return Ok(None);
            }
        };

        course.id = uuid::Uuid::new_v4();
        course.added_at = Some(Utc::now());
        course.stamp_assignments();
        for a in &mut course.assignments {
            a.progress = 0;
        }

        tracing::info!(
            course = %course.display_name(),
            assignments = course.assignments.len(),
            "Parsed syllabus"
        );
        Ok(Some(course))
    }

    /// Fetch a course page; `None` when nothing readable came back
    pub async fn scrape_course_page(&self, url: &str) -> Result<Option<String>> {
        let content = self.scraper.scrape(url).await?;
        if content.trim().is_empty() {
            tracing::warn!(%url, "Scrape returned no content");
            Ok(None)
        } else {
            tracing::info!(%url, chars = content.len(), "Scraped course page");
            Ok(Some(content))
        }
    }

    /// Weekly hours, risk weeks and recommendations for the given assignments
    pub async fn analyze_workload(
        &self,
        assignments: &[Assignment],
        risk_threshold: f64,
    ) -> Result<Option<WorkloadAnalysis>> {
        if assignments.is_empty() {
            return Ok(None);
        }

        let reply = self
            .complete(
                "analyze_workload",
                ProviderRequest::prompt(
                    prompts::workload_analyzer_prompt(risk_threshold),
                    prompts::workload_user_prompt(&to_json(assignments)?, self.today()),
                ),
            )
            .await?;

        Ok(self
            .json_or_none("analyze_workload", &reply)
            .filter(Value::is_object)
            .and_then(|v| decode("analyze_workload", v)))
    }

    /// Day-by-day study plan within `hours_per_day`
    pub async fn create_schedule(
        &self,
        assignments: &[Assignment],
        hours_per_day: u32,
    ) -> Result<Option<StudySchedule>> {
        if !(1..=24).contains(&hours_per_day) {
            anyhow::bail!("hours_per_day must be between 1 and 24, got {}", hours_per_day);
        }
        if assignments.is_empty() {
            return Ok(None);
        }

        let reply = self
            .complete(
                "create_schedule",
                ProviderRequest::prompt(
                    prompts::SCHEDULE_OPTIMIZER_PROMPT,
                    prompts::schedule_user_prompt(&to_json(assignments)?, hours_per_day, self.today()),
                ),
            )
            .await?;

        let Some(value) = self.json_or_none("create_schedule", &reply) else {
            return Ok(None);
        };
        if value.get("daily_schedule").is_none() {
            tracing::warn!("Schedule reply has no daily_schedule");
            return Ok(None);
        }

        let schedule: Option<StudySchedule> = decode("create_schedule", value);
        if let Some(s) = &schedule {
            let over = s.over_budget_days(f64::from(hours_per_day));
            if !over.is_empty() {
                tracing::warn!(days = ?over, "Model scheduled more than the daily budget");
            }
        }
        Ok(schedule)
    }

    /// Reminder feed for the next `days` days, most urgent first
    pub async fn generate_notifications(
        &self,
        schedule: Option<&StudySchedule>,
        assignments: &[Assignment],
        days: u32,
    ) -> Result<Vec<Notification>> {
        if assignments.is_empty() {
            return Ok(Vec::new());
        }

        let schedule_json = match schedule {
            Some(s) => to_json(s)?,
            None => "{}".to_string(),
        };

        let reply = self
            .complete(
                "generate_notifications",
                ProviderRequest::prompt(
                    prompts::notification_prompt(days),
                    prompts::notification_user_prompt(
                        &schedule_json,
                        &to_json(assignments)?,
                        self.now(),
                    ),
                ),
            )
            .await?;

        let items = match self.json_or_none("generate_notifications", &reply) {
            Some(Value::Array(items)) => items,
            Some(Value::Object(mut map)) => match map.remove("notifications") {
                Some(Value::Array(items)) => items,
                _ => Vec::new(),
            },
            _ => Vec::new(),
        };

        let mut feed: Vec<Notification> = lenient::decode_objects(items);
        feed.retain(|n| !n.message.trim().is_empty());

        sort_feed(&mut feed);
        Ok(feed)
    }

    /// Free-form question answered with the student's data as context
    pub async fn ask(
        &self,
        question: &str,
        courses: &[Course],
        assignments: &[Assignment],
    ) -> Result<String> {
        if question.trim().is_empty() {
            anyhow::bail!("Question is empty");
        }

        #[derive(Serialize)]
        struct CourseSummary<'a> {
            course_name: &'a str,
            course_code: &'a str,
            instructor: &'a str,
            assignment_count: usize,
        }

        let context = serde_json::json!({
            "courses": courses
                .iter()
                .map(|c| CourseSummary {
                    course_name: c.display_name(),
                    course_code: &c.course_code,
                    instructor: &c.instructor,
                    assignment_count: c.assignments.len(),
                })
                .collect::<Vec<_>>(),
            "assignments": assignments,
        });

        let reply = self
            .complete(
                "ask",
                ProviderRequest::prompt(
                    prompts::ASSISTANT_PROMPT,
                    prompts::assistant_user_prompt(question, &to_json(&context)?, self.today()),
                )
                .with_temperature(ASSISTANT_TEMPERATURE),
            )
            .await?;

        Ok(reply.trim().to_string())
    }

    async fn complete(&self, operation: &str, request: ProviderRequest) -> Result<String> {
        let started = Instant::now();
        let response = self
            .provider
            .send_message(&request)
            .await
            .with_context(|| format!("{} failed", operation))?;

        tracing::debug!(
            operation,
            provider = %response.provider,
            model = %response.model,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Model replied"
        );
        Ok(response.text)
    }

    fn json_or_none(&self, operation: &str, reply: &str) -> Option<Value> {
        match extract_json(reply) {
            Ok(value) => Some(value),
            Err(ExtractError::Empty) => {
                tracing::warn!(operation, "Model returned an empty reply");
                None
            }
            Err(e) => {
                tracing::warn!(operation, "{}", e);
                if let Some(raw) = e.raw() {
                    tracing::debug!(operation, "Raw reply: {}", raw);
                }
                None
            }
        }
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid semester start '{}' (expected YYYY-MM-DD)", raw))
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("Failed to serialize prompt data")
}

fn decode<T: serde::de::DeserializeOwned>(operation: &str, value: Value) -> Option<T> {
    match serde_json::from_value(value) {
        Ok(v) => Some(v),
        Err(e) => {
            tracing::warn!(operation, "Reply did not match the expected shape: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AssignmentKind, Urgency};
    use crate::providers::testing::ScriptedProvider;
    use async_trait::async_trait;

    struct StaticScraper(&'static str);

    #[async_trait]
    impl PageScraper for StaticScraper {
        async fn scrape(&self, _url: &str) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    fn agent(provider: Arc<ScriptedProvider>) -> CourseSyncAgent {
        CourseSyncAgent::new(provider, Arc::new(StaticScraper(""))).with_clock(|| {
            NaiveDate::from_ymd_opt(2025, 9, 3)
                .unwrap()
                .and_hms_opt(8, 30, 0)
                .unwrap()
        })
    }

    fn assignment(name: &str) -> Assignment {
        Assignment {
            name: name.into(),
            kind: AssignmentKind::Homework,
            due_date: "2025-09-12".into(),
            estimated_hours: 5.0,
            course: "CS 101".into(),
            ..Default::default()
        }
    }

    const SYLLABUS_REPLY: &str = r#"Here is the data:
```json
{
  "course_name": "Intro to Programming",
  "course_code": "CS 101",
  "instructor": "Dr. Ada",
  "assignments": [
    {"name": "HW1", "type": "homework", "due_date": "2025-09-12", "weight": 10, "estimated_hours": 5, "description": "Loops"},
    {"name": "Final Project", "type": "project", "due_date": "2025-12-01", "weight": 40, "description": "Build something"}
  ]
}
```"#;

    #[tokio::test]
    async fn test_parse_syllabus_stamps_assignments() {
        let provider = ScriptedProvider::new(&[SYLLABUS_REPLY]);
        let course = agent(provider.clone())
            .parse_syllabus("CS 101 syllabus ...", "2025-09-01")
            .await
            .unwrap()
            .expect("course parsed");

        assert_eq!(course.course_name, "Intro to Programming");
        assert_eq!(course.assignments.len(), 2);
        assert!(course.assignments.iter().all(|a| a.course == "Intro to Programming"));
        assert!(course.assignments.iter().all(|a| a.course_code == "CS 101"));
        assert_eq!(course.assignments[1].estimated_hours, 20.0);
        assert!(course.added_at.is_some());
        assert!(provider.last_user_prompt().contains("Semester start date: 2025-09-01"));
    }

    #[tokio::test]
    async fn test_parse_syllabus_without_assignments_is_none() {
        let provider = ScriptedProvider::new(&[r#"{"course_name": "Mystery"}"#]);
        let result = agent(provider).parse_syllabus("text", "2025-09-01").await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_parse_syllabus_garbage_reply_is_none() {
        let provider = ScriptedProvider::new(&["Sorry, I can't read that."]);
        let result = agent(provider).parse_syllabus("text", "2025-09-01").await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_parse_syllabus_rejects_empty_text_without_calling_model() {
        let provider = ScriptedProvider::new(&[]);
        let err = agent(provider.clone()).parse_syllabus("  \n", "2025-09-01").await.unwrap_err();
        assert!(err.to_string().contains("empty"));
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn test_parse_syllabus_rejects_bad_semester_start() {
        let provider = ScriptedProvider::new(&[]);
        let err = agent(provider.clone()).parse_syllabus("text", "Sept 1st").await.unwrap_err();
        assert!(err.to_string().contains("YYYY-MM-DD"));
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn test_analyze_workload() {
        let provider = ScriptedProvider::new(&[
            r#"{"total_hours": 25, "weekly_breakdown": {"2025-09-08": 25}, "risk_weeks": ["2025-09-08"], "recommendations": ["Start HW1 early"], "priority_assignments": ["HW1"]}"#,
        ]);
        let analysis = agent(provider.clone())
            .analyze_workload(&[assignment("HW1")], 20.0)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(analysis.total_hours, 25.0);
        assert_eq!(analysis.risk_weeks, vec!["2025-09-08"]);
        let seen = provider.requests();
        assert!(seen[0].system.as_deref().unwrap().contains(">20 hours"));
        assert!(seen[0].messages[0].content.contains("Today is 2025-09-03"));
    }

    #[tokio::test]
    async fn test_analyze_workload_empty_skips_model() {
        let provider = ScriptedProvider::new(&[]);
        assert!(agent(provider.clone()).analyze_workload(&[], 20.0).await.unwrap().is_none());
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn test_analyze_workload_array_reply_is_none() {
        let provider = ScriptedProvider::new(&["[1, 2, 3]"]);
        let result = agent(provider).analyze_workload(&[assignment("HW1")], 20.0).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_create_schedule_requires_daily_schedule() {
        let provider = ScriptedProvider::new(&[r#"{"warnings": []}"#]);
        let result = agent(provider).create_schedule(&[assignment("HW1")], 4).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_create_schedule_parses_days() {
        let provider = ScriptedProvider::new(&[
            r#"{"daily_schedule": {"2025-09-04": [{"assignment": "HW1", "task": "Start", "hours": 2, "priority": "high"}]}, "warnings": [], "total_scheduled_hours": 2}"#,
        ]);
        let schedule = agent(provider.clone())
            .create_schedule(&[assignment("HW1")], 3)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(schedule.day_total("2025-09-04"), 2.0);
        assert!(provider.last_user_prompt().contains("at most 3 hours per day"));
    }

    #[tokio::test]
    async fn test_create_schedule_rejects_bad_budget() {
        let provider = ScriptedProvider::new(&[]);
        assert!(agent(provider.clone()).create_schedule(&[assignment("HW1")], 0).await.is_err());
        assert!(agent(provider.clone()).create_schedule(&[assignment("HW1")], 25).await.is_err());
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn test_generate_notifications_sorted_and_filtered() {
        let provider = ScriptedProvider::new(&[r#"```json
[
  {"message": "Nice work on HW1!", "urgency": "low", "action": "Rest", "send_at": "2025-09-05 18:00", "type": "celebration"},
  {"message": "HW1 due in 2 days", "urgency": "high", "action": "Finish loops", "send_at": "2025-09-10 09:00", "type": "deadline"},
  "not an object",
  {"message": "", "urgency": "medium"}
]
```"#]);
        let feed = agent(provider.clone())
            .generate_notifications(None, &[assignment("HW1")], 7)
            .await
            .unwrap();

        assert_eq!(feed.len(), 2);
        assert_eq!(feed[0].urgency, Urgency::High);
        assert_eq!(feed[1].message, "Nice work on HW1!");
        assert!(provider.requests()[0]
            .system
            .as_deref()
            .unwrap()
            .contains("next 7 days"));
    }

    #[tokio::test]
    async fn test_generate_notifications_accepts_wrapped_object() {
        let provider = ScriptedProvider::new(&[
            r#"{"notifications": [{"message": "Start the project", "urgency": "medium", "send_at": "2025-09-04 10:00", "type": "reminder"}]}"#,
        ]);
        let feed = agent(provider)
            .generate_notifications(None, &[assignment("HW1")], 3)
            .await
            .unwrap();
        assert_eq!(feed.len(), 1);
    }

    #[tokio::test]
    async fn test_generate_notifications_garbage_is_empty() {
        let provider = ScriptedProvider::new(&["no idea"]);
        let feed = agent(provider)
            .generate_notifications(None, &[assignment("HW1")], 3)
            .await
            .unwrap();
        assert!(feed.is_empty());
    }

    #[tokio::test]
    async fn test_parse_syllabus_tolerates_null_type() {
        let provider = ScriptedProvider::new(&[r#"{"course_name": "Biology", "assignments": [
            {"name": "Lab 1", "type": null, "due_date": "2025-09-10"},
            {"name": "Quiz 1", "type": "quiz", "due_date": "2025-09-15", "progress": "n/a"}
        ]}"#]);
        let course = agent(provider)
            .parse_syllabus("BIO 110", "2025-09-01")
            .await
            .unwrap()
            .expect("course parsed");

        assert_eq!(course.assignments.len(), 2);
        assert_eq!(course.assignments[0].kind, AssignmentKind::Other);
        assert_eq!(course.assignments[0].estimated_hours, 5.0);
    }

    #[tokio::test]
    async fn test_create_schedule_keeps_good_days() {
        let provider = ScriptedProvider::new(&[r#"{"daily_schedule": {
            "2025-09-04": [{"assignment": "HW1", "task": "Start", "hours": 2, "priority": null}],
            "2025-09-05": "Rest day"
        }}"#]);
        let schedule = agent(provider)
            .create_schedule(&[assignment("HW1")], 4)
            .await
            .unwrap()
            .expect("schedule parsed");

        assert_eq!(schedule.daily_schedule.len(), 1);
        assert_eq!(schedule.day_total("2025-09-04"), 2.0);
    }

    #[tokio::test]
    async fn test_generate_notifications_keeps_null_urgency() {
        let provider = ScriptedProvider::new(&[
            r#"[{"message": "Start HW1", "urgency": null, "send_at": "2025-09-04 10:00", "type": 7}]"#,
        ]);
        let feed = agent(provider)
            .generate_notifications(None, &[assignment("HW1")], 3)
            .await
            .unwrap();

        assert_eq!(feed.len(), 1);
        assert_eq!(feed[0].urgency, Urgency::Unknown);
    }

    #[tokio::test]
    async fn test_provider_error_propagates() {
        let provider = ScriptedProvider::new(&[]);
        let err = agent(provider)
            .analyze_workload(&[assignment("HW1")], 20.0)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("analyze_workload failed"));
    }

    #[tokio::test]
    async fn test_ask_includes_context() {
        let provider = ScriptedProvider::new(&["  You have one homework due on the 12th.  "]);
        let answer = agent(provider.clone())
            .ask("What is due next?", &[], &[assignment("HW1")])
            .await
            .unwrap();

        assert_eq!(answer, "You have one homework due on the 12th.");
        let prompt = provider.last_user_prompt();
        assert!(prompt.contains("\"HW1\""));
        assert!(prompt.ends_with("Question: What is due next?"));
        assert_eq!(provider.requests()[0].temperature, Some(0.7));
    }

    #[tokio::test]
    async fn test_scrape_empty_is_none() {
        let provider = ScriptedProvider::new(&[]);
        let agent = CourseSyncAgent::new(provider, Arc::new(StaticScraper("   ")));
        assert!(agent.scrape_course_page("https://x.edu").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_scrape_returns_content() {
        let provider = ScriptedProvider::new(&[]);
        let agent = CourseSyncAgent::new(provider, Arc::new(StaticScraper("# CS 101")));
        assert_eq!(
            agent.scrape_course_page("https://x.edu").await.unwrap().as_deref(),
            Some("# CS 101")
        );
    }
}
