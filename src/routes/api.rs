use std::str::FromStr;

use axum::{
    Json,
    extract::{Query, State},
};
use mealdays_mealday::{
    MealType, PaydayInfo, SaveDayInput, payday_info, rotation_candidates, suggest_rotation,
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use time::Duration;

use crate::{error::ApiError, routes::AppState};

/// Accepts `{"day": {...}}` or `{"days": [{...}, ...]}`.
fn days_payload(payload: Value) -> Result<Vec<SaveDayInput>, ApiError> {
    let Value::Object(mut payload) = payload else {
        return Err(ApiError::BadRequest("Payload must be a JSON object.".to_owned()));
    };

    let days = match (payload.remove("day"), payload.remove("days")) {
        (Some(day), _) => vec![day],
        (None, Some(Value::Array(days))) => days,
        (None, Some(_)) => {
            return Err(ApiError::BadRequest("'days' must be an array.".to_owned()));
        }
        (None, None) => {
            return Err(ApiError::BadRequest(
                "Missing 'day' or 'days' field.".to_owned(),
            ));
        }
    };

    if days.iter().any(|day| day.get("id").is_none()) {
        return Err(ApiError::Unprocessable(
            "Each day must have an 'id'.".to_owned(),
        ));
    }

    days.into_iter()
        .map(|day| {
            serde_json::from_value(day).map_err(|err| ApiError::Unprocessable(err.to_string()))
        })
        .collect()
}

/// POST /api/save
#[tracing::instrument(skip_all)]
pub async fn save(
    State(app): State<AppState>,
    Json(payload): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let days = days_payload(payload)?;
    app.command.save(&days).await?;

    Ok(Json(json!({"status": "ok"})))
}

/// GET /api/next-payday
pub async fn next_payday(State(app): State<AppState>) -> Result<Json<PaydayInfo>, ApiError> {
    let planner = &app.config.planner;
    let anchor = planner
        .anchor()
        .map_err(|err| mealdays_shared::Error::Server(format!("payday anchor: {err}")))?;

    Ok(Json(payday_info(
        mealdays_shared::today(),
        anchor,
        planner.payday_period_days,
    )?))
}

#[derive(Serialize)]
pub struct CountResponse {
    pub count: u64,
}

/// GET /api/how-many-times
pub async fn how_many_times(State(app): State<AppState>) -> Result<Json<CountResponse>, ApiError> {
    let since = mealdays_shared::today()
        - Duration::days(app.config.planner.takeout_window_days.into());
    let count = app.query.count_takeout_since(since).await?;

    Ok(Json(CountResponse { count }))
}

#[derive(Deserialize)]
pub struct RotationParams {
    pub meal_type: Option<String>,
}

#[derive(Serialize)]
pub struct RotationResponse {
    pub suggestion: Option<String>,
}

/// GET /api/rotation-suggestions?meal_type=
#[tracing::instrument(skip_all)]
pub async fn rotation_suggestions(
    State(app): State<AppState>,
    Query(params): Query<RotationParams>,
) -> Result<Json<RotationResponse>, ApiError> {
    let meal_type = match params.meal_type.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(value) => Some(MealType::from_str(value).map_err(|_| {
            ApiError::Unprocessable(format!("Unknown meal type {value:?}."))
        })?),
    };

    let since = mealdays_shared::today()
        - Duration::days(app.config.planner.rotation_window_days.into());
    let favorites = app.query.favorite_descriptions(meal_type).await?;
    let recent = app.query.recent_descriptions(since, meal_type).await?;

    let candidates = rotation_candidates(&favorites, &recent);
    tracing::debug!(candidates = candidates.len(), "rotation candidates");

    Ok(Json(RotationResponse {
        suggestion: suggest_rotation(&candidates),
    }))
}

#[derive(Serialize)]
pub struct FavoriteResponse {
    pub meal_text: String,
}

/// GET /api/favorites
pub async fn favorites(
    State(app): State<AppState>,
) -> Result<Json<Vec<FavoriteResponse>>, ApiError> {
    let favorites = app.query.favorites().await?;

    Ok(Json(
        favorites
            .into_iter()
            .map(|meal_text| FavoriteResponse { meal_text })
            .collect(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_day_payload() {
        let days = days_payload(json!({"day": {"id": 3, "lunch": "Soup"}})).unwrap();
        assert_eq!(days.len(), 1);
        assert_eq!(days[0].id, 3);
        assert_eq!(days[0].lunch, "Soup");
    }

    #[test]
    fn test_missing_days_is_bad_request() {
        assert!(matches!(
            days_payload(json!({"week": []})),
            Err(ApiError::BadRequest(_))
        ));
        assert!(matches!(
            days_payload(json!([1, 2])),
            Err(ApiError::BadRequest(_))
        ));
    }

    #[test]
    fn test_day_without_id_is_unprocessable() {
        assert!(matches!(
            days_payload(json!({"days": [{"id": 1}, {"dinner": "Pasta"}]})),
            Err(ApiError::Unprocessable(_))
        ));
    }
}
