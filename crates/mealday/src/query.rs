use std::collections::HashMap;
use std::ops::Deref;

use mealdays_db::table::{Meal, MealDay};
use sea_query::{Expr, ExprTrait, Func, Order, SelectStatement, SqliteQueryBuilder};
use sea_query_sqlx::SqlxBinder;
use time::Date;

use crate::{Day, DayRow, MealRow, MealType};

#[derive(Clone)]
pub struct Query(pub mealdays_shared::State);

impl Deref for Query {
    type Target = mealdays_shared::State;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

fn select_days() -> SelectStatement {
    sea_query::Query::select()
        .columns([
            MealDay::Id,
            MealDay::Date,
            MealDay::IsSammyHome,
            MealDay::IsWorkDay,
        ])
        .from(MealDay::Table)
        .to_owned()
}

impl Query {
    /// Stored days with `from <= date <= to`, oldest first. Absent dates are skipped.
    pub async fn find_range(&self, from: Date, to: Date) -> mealdays_shared::Result<Vec<Day>> {
        let statement = select_days()
            .and_where(Expr::col(MealDay::Date).gte(mealdays_shared::format_date(from)?))
            .and_where(Expr::col(MealDay::Date).lte(mealdays_shared::format_date(to)?))
            .order_by(MealDay::Date, Order::Asc)
            .to_owned();

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
        let rows = sqlx::query_as_with::<_, DayRow, _>(&sql, values)
            .fetch_all(&self.read_db)
            .await?;

        self.attach_meals(rows).await
    }

    async fn attach_meals(&self, rows: Vec<DayRow>) -> mealdays_shared::Result<Vec<Day>> {
        if rows.is_empty() {
            return Ok(vec![]);
        }

        let ids: Vec<i64> = rows.iter().map(|row| row.id).collect();
        let statement = sea_query::Query::select()
            .columns([
                Meal::Id,
                Meal::MealDayId,
                Meal::MealType,
                Meal::Description,
                Meal::IsTakeout,
                Meal::IsFavorite,
                Meal::CookingUser,
            ])
            .from(Meal::Table)
            .and_where(Expr::col(Meal::MealDayId).is_in(ids))
            .order_by(Meal::Id, Order::Asc)
            .to_owned();

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
        let meals = sqlx::query_as_with::<_, MealRow, _>(&sql, values)
            .fetch_all(&self.read_db)
            .await?;

        let mut by_day: HashMap<i64, Vec<MealRow>> = HashMap::new();
        for meal in meals {
            by_day.entry(meal.meal_day_id).or_default().push(meal);
        }

        rows.into_iter()
            .map(|row| {
                let meals = by_day.remove(&row.id).unwrap_or_default();
                row.into_day(meals)
            })
            .collect()
    }

    /// Takeout meals on days dated `since` or later.
    pub async fn count_takeout_since(&self, since: Date) -> mealdays_shared::Result<u64> {
        let statement = sea_query::Query::select()
            .expr(Func::count(Expr::col((Meal::Table, Meal::Id))))
            .from(Meal::Table)
            .inner_join(
                MealDay::Table,
                Expr::col((Meal::Table, Meal::MealDayId)).equals((MealDay::Table, MealDay::Id)),
            )
            .and_where(Expr::col((Meal::Table, Meal::IsTakeout)).eq(true))
            .and_where(
                Expr::col((MealDay::Table, MealDay::Date))
                    .gte(mealdays_shared::format_date(since)?),
            )
            .to_owned();

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
        let (count,) = sqlx::query_as_with::<_, (i64,), _>(&sql, values)
            .fetch_one(&self.read_db)
            .await?;

        Ok(count.try_into().unwrap_or_default())
    }

    /// Distinct non-empty descriptions of favorite meals, sorted.
    pub async fn favorites(&self) -> mealdays_shared::Result<Vec<String>> {
        let statement = sea_query::Query::select()
            .distinct()
            .column(Meal::Description)
            .from(Meal::Table)
            .and_where(Expr::col(Meal::IsFavorite).eq(true))
            .and_where(Expr::col(Meal::Description).ne(""))
            .order_by(Meal::Description, Order::Asc)
            .to_owned();

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
        let rows = sqlx::query_as_with::<_, (String,), _>(&sql, values)
            .fetch_all(&self.read_db)
            .await?;

        Ok(rows.into_iter().map(|(description,)| description).collect())
    }

    pub async fn favorite_descriptions(
        &self,
        meal_type: Option<MealType>,
    ) -> mealdays_shared::Result<Vec<String>> {
        let mut statement = sea_query::Query::select()
            .distinct()
            .column(Meal::Description)
            .from(Meal::Table)
            .and_where(Expr::col(Meal::IsFavorite).eq(true))
            .to_owned();

        if let Some(meal_type) = meal_type {
            statement.and_where(Expr::col(Meal::MealType).eq(meal_type.as_ref()));
        }

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
        let rows = sqlx::query_as_with::<_, (String,), _>(&sql, values)
            .fetch_all(&self.read_db)
            .await?;

        Ok(rows.into_iter().map(|(description,)| description).collect())
    }

    /// Descriptions of meals on days dated `since` or later.
    pub async fn recent_descriptions(
        &self,
        since: Date,
        meal_type: Option<MealType>,
    ) -> mealdays_shared::Result<Vec<String>> {
        let mut statement = sea_query::Query::select()
            .distinct()
            .column((Meal::Table, Meal::Description))
            .from(Meal::Table)
            .inner_join(
                MealDay::Table,
                Expr::col((Meal::Table, Meal::MealDayId)).equals((MealDay::Table, MealDay::Id)),
            )
            .and_where(
                Expr::col((MealDay::Table, MealDay::Date))
                    .gte(mealdays_shared::format_date(since)?),
            )
            .to_owned();

        if let Some(meal_type) = meal_type {
            statement.and_where(Expr::col((Meal::Table, Meal::MealType)).eq(meal_type.as_ref()));
        }

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
        let rows = sqlx::query_as_with::<_, (String,), _>(&sql, values)
            .fetch_all(&self.read_db)
            .await?;

        Ok(rows.into_iter().map(|(description,)| description).collect())
    }
}
