use sea_query::Iden;

#[derive(Iden, Clone, Copy)]
pub enum MealDay {
    Table,
    Id,
    Date,
    IsSammyHome,
    IsWorkDay,
}

#[derive(Iden, Clone, Copy)]
pub enum Meal {
    Table,
    Id,
    MealDayId,
    MealType,
    Description,
    IsTakeout,
    IsFavorite,
    CookingUser,
}
