// Route handlers
//
// Model calls run without holding the state lock; the lock is taken only to
// snapshot assignments before the call and to record results after it.

use axum::{
    extract::{Multipart, Path, Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use super::error::{ApiError, ApiResult};
use super::AppContext;
use crate::calendar::{assignments_calendar, CALENDAR_FILE};
use crate::config::constants::DEFAULT_SEMESTER_START;
use crate::model::{Course, CourseSource};
use crate::pdf::extract_pdf_text;
use crate::scrape::validate_url;
use crate::state::SettingsUpdate;

type Ctx = State<Arc<AppContext>>;

fn default_semester_start() -> String {
    DEFAULT_SEMESTER_START.to_string()
}

#[derive(Debug, Deserialize)]
pub struct SyllabusRequest {
    pub syllabus_text: String,
    #[serde(default = "default_semester_start")]
    pub semester_start: String,
}

#[derive(Debug, Deserialize)]
pub struct UrlRequest {
    pub url: String,
    #[serde(default = "default_semester_start")]
    pub semester_start: String,
}

#[derive(Debug, Deserialize)]
pub struct PdfQuery {
    #[serde(default = "default_semester_start")]
    pub semester_start: String,
}

#[derive(Debug, Deserialize)]
pub struct ScheduleQuery {
    pub hours_per_day: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct ProgressUpdate {
    pub assignment_index: usize,
    pub progress: i64,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

fn failure(error: impl Into<String>) -> Json<Value> {
    Json(json!({ "success": false, "error": error.into() }))
}

fn check_semester_start(raw: &str) -> ApiResult<()> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map(|_| ())
        .map_err(|_| {
            ApiError::bad_request(format!(
                "Invalid semester_start '{}' (expected YYYY-MM-DD)",
                raw
            ))
        })
}

pub async fn health_check(State(ctx): Ctx) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "provider": ctx.agent.provider_name(),
    }))
}

pub async fn get_state(State(ctx): Ctx) -> Json<Value> {
    let state = ctx.state.read().await;
    Json(json!({
        "courses": state.courses,
        "assignments": state.assignments,
        "settings": state.settings,
        "stats": state.stats(),
    }))
}

pub async fn add_syllabus_text(
    State(ctx): Ctx,
    Json(req): Json<SyllabusRequest>,
) -> ApiResult<Json<Value>> {
    if req.syllabus_text.trim().is_empty() {
        return Err(ApiError::bad_request("syllabus_text is empty"));
    }
    check_semester_start(&req.semester_start)?;

    let course = ctx
        .agent
        .parse_syllabus(&req.syllabus_text, &req.semester_start)
        .await?;
    match course {
        Some(course) => Ok(Json(ctx.add_course(course).await?)),
        None => Ok(failure("Failed to parse syllabus")),
    }
}

pub async fn add_syllabus_url(
    State(ctx): Ctx,
    Json(req): Json<UrlRequest>,
) -> ApiResult<Json<Value>> {
    let url = validate_url(&req.url).map_err(|e| ApiError::bad_request(e.to_string()))?;
    check_semester_start(&req.semester_start)?;

    let content = match ctx.agent.scrape_course_page(url.as_str()).await {
        Ok(Some(content)) => content,
        Ok(None) => return Ok(failure("Failed to scrape URL")),
        Err(e) => {
            tracing::warn!(url = %url, "Scrape failed: {:#}", e);
            return Ok(failure(format!("Failed to scrape URL: {}", e)));
        }
    };

    match ctx.agent.parse_syllabus(&content, &req.semester_start).await? {
        Some(mut course) => {
            course.source = CourseSource::Url(url.to_string());
            Ok(Json(ctx.add_course(course).await?))
        }
        None => Ok(failure("Failed to parse syllabus from URL")),
    }
}

/// Multipart upload: a `file` part with the PDF, and an optional
/// `semester_start` part overriding the query parameter
pub async fn add_syllabus_pdf(
    State(ctx): Ctx,
    Query(query): Query<PdfQuery>,
    mut multipart: Multipart,
) -> ApiResult<Json<Value>> {
    let invalid = |e: axum::extract::multipart::MultipartError| {
        ApiError::bad_request(format!("Invalid upload: {}", e))
    };

    let mut semester_start = query.semester_start;
    let mut upload = None;
    while let Some(field) = multipart.next_field().await.map_err(invalid)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let file_name = field.file_name().unwrap_or("syllabus.pdf").to_string();
                let bytes = field.bytes().await.map_err(invalid)?;
                upload = Some((file_name, bytes.to_vec()));
            }
            "semester_start" => semester_start = field.text().await.map_err(invalid)?,
            _ => {}
        }
    }

    let (file_name, bytes) = upload.ok_or_else(|| ApiError::bad_request("No file uploaded"))?;
    check_semester_start(&semester_start)?;

    let text = extract_pdf_text(bytes)
        .await
        .map_err(|e| ApiError::bad_request(format!("{:#}", e)))?;
    if text.is_empty() {
        return Ok(failure("No content extracted from PDF"));
    }

    match ctx.agent.parse_syllabus(&text, semester_start.trim()).await? {
        Some(mut course) => {
            course.source = CourseSource::Pdf(file_name);
            Ok(Json(ctx.add_course(course).await?))
        }
        None => Ok(failure("Failed to parse syllabus from PDF")),
    }
}

/// All assignment deadlines as an ICS download
pub async fn export_calendar(State(ctx): Ctx) -> ApiResult<impl IntoResponse> {
    let assignments = ctx.state.read().await.assignments.clone();
    if assignments.is_empty() {
        return Err(ApiError::bad_request("No assignments to export"));
    }

    let export = assignments_calendar(&assignments);
    if export.events == 0 {
        return Err(ApiError::bad_request("No assignments with a due date to export"));
    }

    Ok((
        [
            (header::CONTENT_TYPE, "text/calendar; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", CALENDAR_FILE),
            ),
        ],
        export.ics,
    ))
}

pub async fn get_workload(State(ctx): Ctx) -> ApiResult<Json<Value>> {
    let (assignments, threshold) = {
        let state = ctx.state.read().await;
        (state.assignments.clone(), state.settings.risk_threshold)
    };
    if assignments.is_empty() {
        return Ok(failure("No assignments to analyze"));
    }

    match ctx.agent.analyze_workload(&assignments, threshold).await? {
        Some(analysis) => Ok(Json(json!({
            "success": true,
            "analysis": analysis,
            "risk_threshold": threshold,
        }))),
        None => Ok(failure("Failed to analyze workload")),
    }
}

pub async fn get_schedule(
    State(ctx): Ctx,
    Query(query): Query<ScheduleQuery>,
) -> ApiResult<Json<Value>> {
    let (assignments, default_hours) = {
        let state = ctx.state.read().await;
        (state.open_assignments(), state.settings.hours_per_day)
    };
    let hours = query.hours_per_day.unwrap_or(default_hours);
    if !(1..=24).contains(&hours) {
        return Err(ApiError::bad_request(format!(
            "hours_per_day must be between 1 and 24, got {}",
            hours
        )));
    }
    if assignments.is_empty() {
        return Ok(failure("No assignments to schedule"));
    }

    match ctx.agent.create_schedule(&assignments, hours).await? {
        Some(schedule) => Ok(Json(json!({
            "success": true,
            "schedule": schedule,
            "hours_per_day": hours,
        }))),
        None => Ok(failure("Failed to create schedule")),
    }
}

pub async fn get_notifications(State(ctx): Ctx) -> ApiResult<Json<Value>> {
    let (assignments, settings) = {
        let state = ctx.state.read().await;
        (state.open_assignments(), state.settings.clone())
    };
    if assignments.is_empty() {
        return Ok(failure("No assignments to notify about"));
    }

    let schedule = ctx
        .agent
        .create_schedule(&assignments, settings.hours_per_day)
        .await?;
    let notifications = ctx
        .agent
        .generate_notifications(
            schedule.as_ref(),
            &assignments,
            settings.notification_lead_days,
        )
        .await?;

    Ok(Json(json!({
        "success": true,
        "schedule": schedule,
        "notifications": notifications,
    })))
}

pub async fn update_progress(
    State(ctx): Ctx,
    Json(update): Json<ProgressUpdate>,
) -> ApiResult<Json<Value>> {
    let mut state = ctx.state.write().await;
    let progress = state.update_progress(update.assignment_index, update.progress)?;
    ctx.store.persist(state).await?;
    Ok(Json(json!({ "success": true, "progress": progress })))
}

pub async fn get_settings(State(ctx): Ctx) -> Json<Value> {
    Json(json!(ctx.state.read().await.settings))
}

pub async fn update_settings(
    State(ctx): Ctx,
    Json(update): Json<SettingsUpdate>,
) -> ApiResult<Json<Value>> {
    let mut state = ctx.state.write().await;
    update.apply(&mut state.settings)?;
    let settings = state.settings.clone();
    ctx.store.persist(state).await?;
    tracing::info!(settings = ?settings, "Settings updated");
    Ok(Json(json!({ "success": true, "settings": settings })))
}

pub async fn delete_course(State(ctx): Ctx, Path(index): Path<usize>) -> ApiResult<Json<Value>> {
    let mut state = ctx.state.write().await;
    let course = state.delete_course(index)?;
    ctx.store.persist(state).await?;
    Ok(Json(json!({ "success": true, "course": course.display_name() })))
}

pub async fn chat(State(ctx): Ctx, Json(req): Json<ChatRequest>) -> ApiResult<Json<Value>> {
    if req.message.trim().is_empty() {
        return Err(ApiError::bad_request("message is empty"));
    }
    let (courses, assignments): (Vec<Course>, _) = {
        let state = ctx.state.read().await;
        (state.courses.clone(), state.assignments.clone())
    };

    let response = ctx.agent.ask(&req.message, &courses, &assignments).await?;
    Ok(Json(json!({ "success": true, "response": response })))
}
