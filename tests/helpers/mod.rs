//! Shared setup for router-level tests.

#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Request, Response, header},
};
use http_body_util::BodyExt;
use mealdays::config::{Config, DatabaseConfig, LoggingConfig, PlannerConfig, ServerConfig};
use temp_dir::TempDir;
use tower::ServiceExt;

pub struct TestApp {
    pub app: Router,
    pub state: mealdays_shared::State,
    _dir: TempDir,
}

pub fn test_config(url: &str) -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8000,
        },
        database: DatabaseConfig {
            url: url.to_string(),
            max_connections: 5,
        },
        logging: LoggingConfig::default(),
        planner: PlannerConfig::default(),
    }
}

/// Migrated SQLite file in a fresh temp dir, behind the full middleware stack.
pub async fn setup_test_app() -> anyhow::Result<TestApp> {
    let dir = TempDir::new()?;
    let url = format!("sqlite:{}", dir.child("db.sqlite3").display());
    let config = test_config(&url);

    let pool = mealdays::db::create_pool(&url, config.database.max_connections).await?;
    mealdays::cli::run_migrations(&pool).await?;

    let state = mealdays_shared::State::single(pool.clone());
    let app = mealdays::cli::app(mealdays::AppState {
        config,
        command: mealdays_mealday::Command(state.clone()),
        query: mealdays_mealday::Query(state.clone()),
        pool,
    });

    Ok(TestApp {
        app,
        state,
        _dir: dir,
    })
}

impl TestApp {
    /// Reads one day back through `Query::find_range` on its stored date.
    pub async fn find_day(&self, id: i64) -> anyhow::Result<mealdays_mealday::Day> {
        let (date,): (String,) = sqlx::query_as("SELECT date FROM meal_day WHERE id = ?")
            .bind(id)
            .fetch_one(&self.state.read_db)
            .await?;
        let date = mealdays_shared::parse_date(&date)?;

        mealdays_mealday::Query(self.state.clone())
            .find_range(date, date)
            .await?
            .into_iter()
            .find(|day| day.id == id)
            .ok_or_else(|| anyhow::anyhow!("day {id} not found"))
    }

    pub async fn get(&self, uri: &str) -> anyhow::Result<Response<Body>> {
        let request = Request::builder().uri(uri).body(Body::empty())?;
        Ok(self.app.clone().oneshot(request).await?)
    }

    pub async fn post_form(
        &self,
        uri: &str,
        pairs: &[(String, String)],
    ) -> anyhow::Result<Response<Body>> {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(serde_urlencoded::to_string(pairs)?))?;
        Ok(self.app.clone().oneshot(request).await?)
    }

    pub async fn post_json(
        &self,
        uri: &str,
        payload: serde_json::Value,
    ) -> anyhow::Result<Response<Body>> {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(payload.to_string()))?;
        Ok(self.app.clone().oneshot(request).await?)
    }

    pub async fn insert_day(&self, date: time::Date) -> anyhow::Result<i64> {
        let id = sqlx::query(
            "INSERT INTO meal_day (date, is_sammy_home, is_work_day) VALUES (?, 0, 0)",
        )
        .bind(mealdays_shared::format_date(date)?)
        .execute(&self.state.write_db)
        .await?
        .last_insert_rowid();

        Ok(id)
    }

    pub async fn insert_meal(
        &self,
        day_id: i64,
        meal_type: &str,
        description: &str,
        is_favorite: bool,
    ) -> anyhow::Result<i64> {
        let id = sqlx::query(
            "INSERT INTO meal (meal_day_id, meal_type, description, is_favorite) VALUES (?, ?, ?, ?)",
        )
        .bind(day_id)
        .bind(meal_type)
        .bind(description)
        .bind(is_favorite)
        .execute(&self.state.write_db)
        .await?
        .last_insert_rowid();

        Ok(id)
    }
}

pub async fn body_string(response: Response<Body>) -> anyhow::Result<String> {
    let bytes = response.into_body().collect().await?.to_bytes();
    Ok(String::from_utf8(bytes.to_vec())?)
}

pub async fn body_json(response: Response<Body>) -> anyhow::Result<serde_json::Value> {
    let bytes = response.into_body().collect().await?.to_bytes();
    Ok(serde_json::from_slice(&bytes)?)
}

pub fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
    items
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Name/value pairs of the form controls in a rendered planner page, in
/// document order: hidden inputs and textareas.
pub fn rendered_fields(html: &str) -> Vec<(String, String)> {
    static FIELD: std::sync::LazyLock<regex::Regex> = std::sync::LazyLock::new(|| {
        regex::Regex::new(
            r#"<input type="hidden" name="([^"]+)" value="([^"]*)">|<textarea[^>]* name="([^"]+)">([^<]*)</textarea>"#,
        )
        .unwrap()
    });

    FIELD
        .captures_iter(html)
        .filter_map(|caps| {
            let name = caps.get(1).or_else(|| caps.get(3))?;
            let value = caps.get(2).or_else(|| caps.get(4))?;
            Some((name.as_str().to_owned(), value.as_str().to_owned()))
        })
        .collect()
}
