use std::{path::PathBuf, str::FromStr};

use mealdays_mealday::{Day, Query};
use mealdays_shared::State;
use sqlx::{SqlitePool, sqlite::SqliteConnectOptions};
use sqlx_migrator::migrator::{Migrate, Plan};

pub async fn setup_test_state(path: PathBuf) -> anyhow::Result<State> {
    let opts = SqliteConnectOptions::from_str(&format!("sqlite:{}", path.to_str().unwrap()))?
        .create_if_missing(true)
        .foreign_keys(true);
    let pool = SqlitePool::connect_with(opts).await?;
    let mut conn = pool.acquire().await?;
    mealdays_db::migrator()?
        .run(&mut *conn, &Plan::apply_all())
        .await?;

    Ok(State::single(pool))
}

/// Inserts a day row directly, bypassing the command layer.
#[allow(dead_code)]
pub async fn insert_day(state: &State, date: &str) -> anyhow::Result<i64> {
    let id = sqlx::query("INSERT INTO meal_day (date, is_sammy_home, is_work_day) VALUES (?, 0, 0)")
        .bind(date)
        .execute(&state.write_db)
        .await?
        .last_insert_rowid();

    Ok(id)
}

#[allow(dead_code)]
pub async fn insert_meal(
    state: &State,
    day_id: i64,
    meal_type: &str,
    description: &str,
) -> anyhow::Result<i64> {
    let id = sqlx::query("INSERT INTO meal (meal_day_id, meal_type, description) VALUES (?, ?, ?)")
        .bind(day_id)
        .bind(meal_type)
        .bind(description)
        .execute(&state.write_db)
        .await?
        .last_insert_rowid();

    Ok(id)
}

#[allow(dead_code)]
pub async fn set_meal_flags(
    state: &State,
    meal_id: i64,
    is_takeout: bool,
    is_favorite: bool,
) -> anyhow::Result<()> {
    sqlx::query("UPDATE meal SET is_takeout = ?, is_favorite = ? WHERE id = ?")
        .bind(is_takeout)
        .bind(is_favorite)
        .bind(meal_id)
        .execute(&state.write_db)
        .await?;

    Ok(())
}

/// Reads one day back through `Query::find_range` on its stored date.
#[allow(dead_code)]
pub async fn find_day(state: &State, id: i64) -> anyhow::Result<Day> {
    let (date,): (String,) = sqlx::query_as("SELECT date FROM meal_day WHERE id = ?")
        .bind(id)
        .fetch_one(&state.read_db)
        .await?;
    let date = mealdays_shared::parse_date(&date)?;

    Query(state.clone())
        .find_range(date, date)
        .await?
        .into_iter()
        .find(|day| day.id == id)
        .ok_or_else(|| anyhow::anyhow!("day {id} not found"))
}
