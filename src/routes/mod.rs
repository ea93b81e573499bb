use axum::{
    Router,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use sqlx::SqlitePool;

use crate::template::{NotFoundTemplate, Template};

mod api;
mod health;
mod planner;

pub use planner::{DayCard, MealField, PageConfig, PlannerTemplate, ToggleField, day_cards};

#[derive(Clone)]
pub struct AppState {
    pub config: crate::config::Config,
    pub command: mealdays_mealday::Command,
    pub query: mealdays_mealday::Query,
    pub pool: SqlitePool,
}

pub async fn fallback(template: Template) -> impl IntoResponse {
    template.render_with_status(StatusCode::NOT_FOUND, NotFoundTemplate)
}

pub fn router(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .with_state(app_state.pool.clone())
        .route("/", get(planner::page))
        .route("/backwards", get(planner::backwards))
        .route("/save", post(planner::action))
        .route("/api/save", post(api::save))
        .route("/api/next-payday", get(api::next_payday))
        .route("/api/how-many-times", get(api::how_many_times))
        .route("/api/rotation-suggestions", get(api::rotation_suggestions))
        .route("/api/favorites", get(api::favorites))
        .route("/static/{*path}", get(crate::assets::serve))
        .fallback(fallback)
        .with_state(app_state)
}
