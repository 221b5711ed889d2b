// CLI application: the agent plus on-disk state, one command at a time

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::agent::CourseSyncAgent;
use crate::calendar::{default_calendar_path, write_calendar, CalendarExport};
use crate::model::{Course, CourseSource, Notification, StudySchedule, WorkloadAnalysis};
use crate::pdf::read_pdf_text;
use crate::scrape::validate_url;
use crate::state::{export_snapshot, AppState, Settings, SettingsUpdate, StateStore};

/// Spinner on stderr while `fut` runs
pub async fn with_spinner<T, F>(message: &str, fut: F) -> T
where
    F: Future<Output = T>,
{
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    let result = fut.await;
    pb.finish_and_clear();
    result
}

pub struct CliApp {
    agent: CourseSyncAgent,
    store: StateStore,
    state: AppState,
}

impl CliApp {
    pub fn new(agent: CourseSyncAgent, store: StateStore) -> Result<Self> {
        let state = store.load().context("Failed to load saved state")?;
        Ok(Self {
            agent,
            store,
            state,
        })
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn settings(&self) -> &Settings {
        &self.state.settings
    }

    fn save(&self) -> Result<()> {
        self.store.save(&self.state)
    }

    /// Parse syllabus text and store the course. `None` when the model
    /// reply had no usable assignments.
    pub async fn add_syllabus(&mut self, text: &str, semester_start: &str) -> Result<Option<&Course>> {
        let parsed = with_spinner(
            "Parsing syllabus...",
            self.agent.parse_syllabus(text, semester_start),
        )
        .await?;
        self.store_course(parsed)
    }

    /// Scrape a course page and parse it like a pasted syllabus
    pub async fn add_from_url(&mut self, url: &str, semester_start: &str) -> Result<Option<&Course>> {
        let url = validate_url(url)?;
        let content = with_spinner("Scraping course page...", self.agent.scrape_course_page(url.as_str()))
            .await?
            .with_context(|| format!("No readable content at {}", url))?;

        let parsed = with_spinner(
            "Parsing scraped content...",
            self.agent.parse_syllabus(&content, semester_start),
        )
        .await?
        .map(|mut course| {
            course.source = CourseSource::Url(url.to_string());
            course
        });
        self.store_course(parsed)
    }

    /// Extract a PDF's text layer and parse it like a pasted syllabus
    pub async fn add_from_pdf(&mut self, path: &Path, semester_start: &str) -> Result<Option<&Course>> {
        let text = with_spinner("Reading PDF...", read_pdf_text(path)).await?;
        if text.is_empty() {
            anyhow::bail!("No text found in {} (scanned PDFs are not supported)", path.display());
        }

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let parsed = with_spinner(
            "Parsing syllabus...",
            self.agent.parse_syllabus(&text, semester_start),
        )
        .await?
        .map(|mut course| {
            course.source = CourseSource::Pdf(file_name);
            course
        });
        self.store_course(parsed)
    }

    fn store_course(&mut self, parsed: Option<Course>) -> Result<Option<&Course>> {
        let Some(course) = parsed else {
            return Ok(None);
        };
        self.state.add_course(course);
        self.save()?;
        Ok(self.state.courses.last())
    }

    pub async fn workload(&self) -> Result<Option<WorkloadAnalysis>> {
        with_spinner(
            "Analyzing workload...",
            self.agent
                .analyze_workload(&self.state.assignments, self.state.settings.risk_threshold),
        )
        .await
    }

    /// Study plan; `hours_per_day` falls back to the saved setting
    pub async fn schedule(&self, hours_per_day: Option<u32>) -> Result<Option<StudySchedule>> {
        let hours = hours_per_day.unwrap_or(self.state.settings.hours_per_day);
        with_spinner(
            "Generating study schedule...",
            self.agent
                .create_schedule(&self.state.open_assignments(), hours),
        )
        .await
    }

    pub async fn notifications(&self) -> Result<Vec<Notification>> {
        let assignments = self.state.open_assignments();
        if assignments.is_empty() {
            return Ok(Vec::new());
        }
        let schedule = self.schedule(None).await?;
        with_spinner(
            "Generating notifications...",
            self.agent.generate_notifications(
                schedule.as_ref(),
                &assignments,
                self.state.settings.notification_lead_days,
            ),
        )
        .await
    }

    pub async fn ask(&self, question: &str) -> Result<String> {
        with_spinner(
            "Thinking...",
            self.agent
                .ask(question, &self.state.courses, &self.state.assignments),
        )
        .await
    }

    pub fn set_progress(&mut self, index: usize, progress: i64) -> Result<u8> {
        let progress = self.state.update_progress(index, progress)?;
        self.save()?;
        Ok(progress)
    }

    pub fn remove_course(&mut self, index: usize) -> Result<Course> {
        let course = self.state.delete_course(index)?;
        self.save()?;
        Ok(course)
    }

    pub fn update_settings(&mut self, update: &SettingsUpdate) -> Result<&Settings> {
        update.apply(&mut self.state.settings)?;
        self.save()?;
        Ok(&self.state.settings)
    }

    pub fn export(&self, dir: &Path) -> Result<PathBuf> {
        export_snapshot(&self.state, dir)
    }

    /// Write assignment deadlines as ICS; `out` defaults to the data directory
    pub fn calendar(&self, out: Option<&Path>) -> Result<(PathBuf, CalendarExport)> {
        let path = out
            .map(Path::to_path_buf)
            .unwrap_or_else(|| default_calendar_path(self.store.data_dir()));
        let export = write_calendar(&self.state.assignments, &path)?;
        Ok((path, export))
    }
}
