//! HTTP API, mounted under `/api/v1`.

mod channels;
mod default_tasks;
mod error;
mod events;
mod holdings;
mod tasks;

use axum::routing::get;
use axum::Router;
use reminder_core::db::TemplatePolicy;
use reminder_core::Database;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::channels::ChannelDirectory;

pub use error::{ApiError, ApiJson, ApiPath, ApiQuery};

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub channels: ChannelDirectory,
    pub template_policy: TemplatePolicy,
    /// Used for new holdings that arrive without a channel id.
    pub default_channel_id: Option<String>,
}

impl AppState {
    pub fn new(db: Database, channels: ChannelDirectory, template_policy: TemplatePolicy) -> Self {
        Self {
            db,
            channels,
            template_policy,
            default_channel_id: None,
        }
    }

    pub fn with_default_channel(mut self, channel_id: Option<String>) -> Self {
        self.default_channel_id = channel_id
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());
        self
    }
}

pub fn create_router(state: AppState) -> Router {
    let api = Router::new()
        // Events
        .route("/events", get(events::list_events).post(events::create_event))
        .route(
            "/events/{event_id}",
            get(events::get_event)
                .put(events::update_event)
                .delete(events::delete_event),
        )
        // Default tasks (event templates)
        .route(
            "/events/{event_id}/default-tasks",
            get(default_tasks::list_default_tasks).post(default_tasks::create_default_task),
        )
        .route(
            "/default-tasks/{task_id}",
            get(default_tasks::get_default_task)
                .patch(default_tasks::update_default_task)
                .delete(default_tasks::delete_default_task),
        )
        // Holdings
        .route(
            "/holdings",
            get(holdings::list_holdings).post(holdings::create_holding),
        )
        .route(
            "/holdings/{holding_id}",
            get(holdings::get_holding)
                .patch(holdings::update_holding)
                .delete(holdings::delete_holding),
        )
        // Holding tasks
        .route(
            "/holdings/{holding_id}/tasks",
            get(tasks::list_tasks).post(tasks::create_task),
        )
        .route(
            "/holding-tasks/{task_id}",
            get(tasks::get_task)
                .patch(tasks::update_task)
                .delete(tasks::delete_task),
        )
        // traQ channels
        .route("/channels", get(channels::list_channels));

    Router::new()
        .nest("/api/v1", api)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
