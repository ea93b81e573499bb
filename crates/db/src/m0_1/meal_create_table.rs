use sea_query::{
    ColumnDef, ForeignKey, ForeignKeyAction, Table, TableCreateStatement, TableDropStatement,
};

use crate::table::{Meal, MealDay};

pub struct Operation;

fn up_statement() -> TableCreateStatement {
    Table::create()
        .table(Meal::Table)
        .col(
            ColumnDef::new(Meal::Id)
                .integer()
                .not_null()
                .auto_increment()
                .primary_key(),
        )
        .col(ColumnDef::new(Meal::MealDayId).integer().not_null())
        .col(
            ColumnDef::new(Meal::MealType)
                .string()
                .not_null()
                .string_len(16),
        )
        .col(
            ColumnDef::new(Meal::Description)
                .text()
                .not_null()
                .default(""),
        )
        .col(
            ColumnDef::new(Meal::IsTakeout)
                .boolean()
                .not_null()
                .default(false),
        )
        .col(
            ColumnDef::new(Meal::IsFavorite)
                .boolean()
                .not_null()
                .default(false),
        )
        .col(ColumnDef::new(Meal::CookingUser).string().null())
        .foreign_key(
            ForeignKey::create()
                .name("fk_meal_meal_day")
                .from(Meal::Table, Meal::MealDayId)
                .to(MealDay::Table, MealDay::Id)
                .on_delete(ForeignKeyAction::Cascade),
        )
        .to_owned()
}

fn down_statement() -> TableDropStatement {
    Table::drop().table(Meal::Table).to_owned()
}

#[async_trait::async_trait]
impl sqlx_migrator::Operation<sqlx::Sqlite> for Operation {
    async fn up(
        &self,
        connection: &mut sqlx::SqliteConnection,
    ) -> Result<(), sqlx_migrator::Error> {
        let statement = up_statement().to_string(sea_query::SqliteQueryBuilder);
        sqlx::query(&statement).execute(connection).await?;

        Ok(())
    }

    async fn down(
        &self,
        connection: &mut sqlx::SqliteConnection,
    ) -> Result<(), sqlx_migrator::Error> {
        let statement = down_statement().to_string(sea_query::SqliteQueryBuilder);
        sqlx::query(&statement).execute(connection).await?;

        Ok(())
    }
}
