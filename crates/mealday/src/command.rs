use std::ops::Deref;

use mealdays_db::table::{Meal, MealDay};
use sea_query::{Expr, ExprTrait, Order, SqliteQueryBuilder};
use sea_query_sqlx::SqlxBinder;
use sqlx::{Sqlite, Transaction};
use strum::VariantArray;
use time::Date;
use validator::Validate;

use crate::{MealType, Query, SaveDayInput};

#[derive(Clone)]
pub struct Command(pub mealdays_shared::State);

impl Deref for Command {
    type Target = mealdays_shared::State;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Command {
    /// Loads `dates` in order, creating any missing day with one empty meal per type.
    pub async fn ensure_days(&self, dates: &[Date]) -> mealdays_shared::Result<Vec<crate::Day>> {
        let (Some(first), Some(last)) = (dates.iter().min(), dates.iter().max()) else {
            return Ok(vec![]);
        };

        let mut tx = self.write_db.begin().await?;
        let mut created = 0;
        for date in dates {
            if find_day_id(&mut tx, *date).await?.is_none() {
                create_day(&mut tx, *date).await?;
                created += 1;
            }
        }
        tx.commit().await?;

        if created > 0 {
            tracing::info!(created, "created empty days");
        }

        let stored = Query(self.0.clone()).find_range(*first, *last).await?;
        let mut days = Vec::with_capacity(dates.len());
        for date in dates {
            let Some(day) = stored.iter().find(|day| day.date == *date) else {
                mealdays_shared::bail!("day {} missing after creation", date);
            };
            days.push(day.clone());
        }

        Ok(days)
    }

    /// Applies every edit or none of them.
    pub async fn save(&self, days: &[SaveDayInput]) -> mealdays_shared::Result<()> {
        for day in days {
            day.validate()?;
        }

        let mut tx = self.write_db.begin().await?;
        for day in days {
            save_day(&mut tx, day).await?;
        }
        tx.commit().await?;

        tracing::info!(days = days.len(), "saved days");

        Ok(())
    }
}

async fn find_day_id(
    tx: &mut Transaction<'_, Sqlite>,
    date: Date,
) -> mealdays_shared::Result<Option<i64>> {
    let statement = sea_query::Query::select()
        .column(MealDay::Id)
        .from(MealDay::Table)
        .and_where(Expr::col(MealDay::Date).eq(mealdays_shared::format_date(date)?))
        .limit(1)
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
    let row = sqlx::query_as_with::<_, (i64,), _>(&sql, values)
        .fetch_optional(&mut **tx)
        .await?;

    Ok(row.map(|(id,)| id))
}

async fn create_day(tx: &mut Transaction<'_, Sqlite>, date: Date) -> mealdays_shared::Result<i64> {
    let statement = sea_query::Query::insert()
        .into_table(MealDay::Table)
        .columns([MealDay::Date, MealDay::IsSammyHome, MealDay::IsWorkDay])
        .values_panic([
            mealdays_shared::format_date(date)?.into(),
            false.into(),
            false.into(),
        ])
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
    let id = sqlx::query_with(&sql, values)
        .execute(&mut **tx)
        .await?
        .last_insert_rowid();

    for meal_type in MealType::VARIANTS {
        insert_meal(tx, id, *meal_type, "").await?;
    }

    Ok(id)
}

async fn insert_meal(
    tx: &mut Transaction<'_, Sqlite>,
    day_id: i64,
    meal_type: MealType,
    description: &str,
) -> mealdays_shared::Result<i64> {
    let statement = sea_query::Query::insert()
        .into_table(Meal::Table)
        .columns([Meal::MealDayId, Meal::MealType, Meal::Description])
        .values_panic([
            day_id.into(),
            meal_type.as_ref().into(),
            description.into(),
        ])
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
    let id = sqlx::query_with(&sql, values)
        .execute(&mut **tx)
        .await?
        .last_insert_rowid();

    Ok(id)
}

async fn save_day(
    tx: &mut Transaction<'_, Sqlite>,
    input: &SaveDayInput,
) -> mealdays_shared::Result<()> {
    let statement = sea_query::Query::update()
        .table(MealDay::Table)
        .value(MealDay::IsSammyHome, input.is_sammy_home)
        .value(MealDay::IsWorkDay, input.is_work_day)
        .and_where(Expr::col(MealDay::Id).eq(input.id))
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
    let updated = sqlx::query_with(&sql, values)
        .execute(&mut **tx)
        .await?
        .rows_affected();

    if updated == 0 {
        return Err(mealdays_shared::Error::NotFound(format!("day {}", input.id)));
    }

    for meal_type in MealType::VARIANTS {
        let description = input.description(*meal_type);
        let meal_id = match find_meal_id(tx, input.id, *meal_type).await? {
            Some(id) => {
                update_description(tx, id, description).await?;
                id
            }
            None => insert_meal(tx, input.id, *meal_type, description).await?,
        };

        if let Some(fields) = input.meals.get(meal_type) {
            let statement = sea_query::Query::update()
                .table(Meal::Table)
                .value(Meal::IsTakeout, fields.is_takeout)
                .value(Meal::IsFavorite, fields.is_favorite)
                .value(Meal::CookingUser, fields.cooking_user.clone())
                .and_where(Expr::col(Meal::Id).eq(meal_id))
                .to_owned();

            let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
            sqlx::query_with(&sql, values).execute(&mut **tx).await?;
        }
    }

    Ok(())
}

/// First meal of `meal_type` for the day, matching what the planner displays.
async fn find_meal_id(
    tx: &mut Transaction<'_, Sqlite>,
    day_id: i64,
    meal_type: MealType,
) -> mealdays_shared::Result<Option<i64>> {
    let statement = sea_query::Query::select()
        .column(Meal::Id)
        .from(Meal::Table)
        .and_where(Expr::col(Meal::MealDayId).eq(day_id))
        .and_where(Expr::col(Meal::MealType).eq(meal_type.as_ref()))
        .order_by(Meal::Id, Order::Asc)
        .limit(1)
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
    let row = sqlx::query_as_with::<_, (i64,), _>(&sql, values)
        .fetch_optional(&mut **tx)
        .await?;

    Ok(row.map(|(id,)| id))
}

async fn update_description(
    tx: &mut Transaction<'_, Sqlite>,
    meal_id: i64,
    description: &str,
) -> mealdays_shared::Result<()> {
    let statement = sea_query::Query::update()
        .table(Meal::Table)
        .value(Meal::Description, description)
        .and_where(Expr::col(Meal::Id).eq(meal_id))
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
    sqlx::query_with(&sql, values).execute(&mut **tx).await?;

    Ok(())
}
