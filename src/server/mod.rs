// CourseSync web API
//
// JSON routes over the same agent and state the CLI uses. `serve` also runs
// the notification poller for as long as the server is up.

mod error;
mod handlers;

pub use error::{ApiError, ApiResult};

use anyhow::{Context, Result};
use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::agent::CourseSyncAgent;
use crate::config::constants::MAX_BODY_BYTES;
use crate::model::Course;
use crate::notify::{NotificationPoller, Notifier};
use crate::state::{SharedState, StateStore};

/// Everything a request handler needs
pub struct AppContext {
    pub agent: Arc<CourseSyncAgent>,
    pub store: StateStore,
    pub state: SharedState,
}

impl AppContext {
    pub fn new(agent: Arc<CourseSyncAgent>, store: StateStore, state: SharedState) -> Self {
        Self {
            agent,
            store,
            state,
        }
    }

    /// Record a parsed course and persist
    async fn add_course(&self, course: Course) -> Result<Value> {
        let mut state = self.state.write().await;
        let added = state.add_course(course);
        let course = state.courses.last().cloned();
        self.store.persist(state).await?;

        tracing::info!(
            course = course.as_ref().map(|c| c.display_name()).unwrap_or_default(),
            assignments = added,
            "Added course"
        );
        Ok(json!({ "success": true, "course": course }))
    }
}

pub fn create_router(ctx: Arc<AppContext>) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/api/state", get(handlers::get_state))
        .route("/api/syllabus/text", post(handlers::add_syllabus_text))
        .route("/api/syllabus/url", post(handlers::add_syllabus_url))
        .route("/api/syllabus/pdf", post(handlers::add_syllabus_pdf))
        .route("/api/calendar", get(handlers::export_calendar))
        .route("/api/workload", get(handlers::get_workload))
        .route("/api/schedule", get(handlers::get_schedule))
        .route("/api/notifications", get(handlers::get_notifications))
        .route("/api/progress", post(handlers::update_progress))
        .route(
            "/api/settings",
            get(handlers::get_settings).post(handlers::update_settings),
        )
        .route("/api/course/:index", delete(handlers::delete_course))
        .route("/api/chat", post(handlers::chat))
        .with_state(ctx)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Bind `bind_address` and serve until Ctrl-C
pub async fn serve(
    ctx: Arc<AppContext>,
    bind_address: &str,
    notifier: Arc<dyn Notifier>,
) -> Result<()> {
    let addr: SocketAddr = bind_address
        .parse()
        .with_context(|| format!("Invalid bind address '{}'", bind_address))?;

    let cancel = CancellationToken::new();
    let poller = NotificationPoller::new(
        Arc::clone(&ctx.agent),
        ctx.store.clone(),
        Arc::clone(&ctx.state),
        notifier,
    )
    .spawn(cancel.clone());

    let app = create_router(ctx);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("CourseSync API listening on http://{}", addr);

    let shutdown = cancel.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::warn!("Failed to listen for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
            tracing::info!("Shutting down");
            shutdown.cancel();
        })
        .await
        .context("Server error")?;

    cancel.cancel();
    if let Err(e) = poller.await {
        tracing::error!("Notification poller panicked: {:?}", e);
    }
    Ok(())
}
