mod meal_create_day_idx;
mod meal_create_table;
mod meal_day_create_table;

use sqlx_migrator::vec_box;

pub struct Migration;

sqlx_migrator::sqlite_migration!(
    Migration,
    "mealdays",
    "m0_1",
    vec_box![],
    vec_box![
        meal_day_create_table::Operation,
        meal_create_table::Operation,
        meal_create_day_idx::Operation
    ]
);
