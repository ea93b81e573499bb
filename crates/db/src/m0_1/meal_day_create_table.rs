use sea_query::{ColumnDef, Table, TableCreateStatement, TableDropStatement};

use crate::table::MealDay;

pub struct Operation;

fn up_statement() -> TableCreateStatement {
    Table::create()
        .table(MealDay::Table)
        .col(
            ColumnDef::new(MealDay::Id)
                .integer()
                .not_null()
                .auto_increment()
                .primary_key(),
        )
        .col(
            ColumnDef::new(MealDay::Date)
                .string()
                .not_null()
                .string_len(10)
                .unique_key(),
        )
        .col(
            ColumnDef::new(MealDay::IsSammyHome)
                .boolean()
                .not_null()
                .default(false),
        )
        .col(
            ColumnDef::new(MealDay::IsWorkDay)
                .boolean()
                .not_null()
                .default(false),
        )
        .to_owned()
}

fn down_statement() -> TableDropStatement {
    Table::drop().table(MealDay::Table).to_owned()
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
