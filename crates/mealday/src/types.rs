use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use sqlx::prelude::FromRow;
use strum::{AsRefStr, Display, EnumString, VariantArray};
use time::Date;
use validator::Validate;

/// Longest meal description accepted by the save handler.
pub const DESCRIPTION_MAX_LEN: usize = 2000;

#[derive(
    EnumString,
    Display,
    VariantArray,
    AsRefStr,
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
}

impl MealType {
    fn slot(self) -> usize {
        match self {
            MealType::Breakfast => 0,
            MealType::Lunch => 1,
            MealType::Dinner => 2,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Meal {
    pub id: i64,
    pub meal_type: MealType,
    pub description: String,
    pub is_takeout: bool,
    pub is_favorite: bool,
    pub cooking_user: Option<String>,
}

impl Meal {
    pub fn new(id: i64, meal_type: MealType, description: impl Into<String>) -> Self {
        Self {
            id,
            meal_type,
            description: description.into(),
            is_takeout: false,
            is_favorite: false,
            cooking_user: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Day {
    pub id: i64,
    pub date: Date,
    pub is_sammy_home: bool,
    pub is_work_day: bool,
    pub meals: Vec<Meal>,
}

impl Day {
    /// One meal per type; when the store holds several of a type the first wins.
    pub fn slots(&self) -> MealSlots<'_> {
        let mut slots = MealSlots::default();
        for meal in &self.meals {
            let slot = &mut slots.0[meal.meal_type.slot()];
            if slot.is_none() {
                *slot = Some(meal);
            }
        }

        slots
    }
}

#[derive(Default, Clone, Copy, Debug)]
pub struct MealSlots<'a>([Option<&'a Meal>; 3]);

impl<'a> MealSlots<'a> {
    pub fn get(&self, meal_type: MealType) -> Option<&'a Meal> {
        self.0[meal_type.slot()]
    }

    pub fn description(&self, meal_type: MealType) -> &'a str {
        self.get(meal_type)
            .map(|meal| meal.description.as_str())
            .unwrap_or_default()
    }
}

#[derive(Default, FromRow)]
pub struct DayRow {
    pub id: i64,
    pub date: String,
    pub is_sammy_home: bool,
    pub is_work_day: bool,
}

#[derive(Default, FromRow)]
pub struct MealRow {
    pub id: i64,
    pub meal_day_id: i64,
    pub meal_type: String,
    pub description: String,
    pub is_takeout: bool,
    pub is_favorite: bool,
    pub cooking_user: Option<String>,
}

impl DayRow {
    pub fn into_day(self, meals: Vec<MealRow>) -> mealdays_shared::Result<Day> {
        let date = mealdays_shared::parse_date(&self.date).map_err(|err| {
            mealdays_shared::Error::MalformedDay(format!(
                "day {} has an unreadable date {:?}: {err}",
                self.id, self.date
            ))
        })?;

        let meals = meals
            .into_iter()
            .map(|row| {
                let meal_type = MealType::from_str(&row.meal_type).map_err(|_| {
                    mealdays_shared::Error::MalformedDay(format!(
                        "day {} has a meal of unknown type {:?}",
                        self.id, row.meal_type
                    ))
                })?;

                Ok(Meal {
                    id: row.id,
                    meal_type,
                    description: row.description,
                    is_takeout: row.is_takeout,
                    is_favorite: row.is_favorite,
                    cooking_user: row.cooking_user,
                })
            })
            .collect::<mealdays_shared::Result<Vec<_>>>()?;

        Ok(Day {
            id: self.id,
            date,
            is_sammy_home: self.is_sammy_home,
            is_work_day: self.is_work_day,
            meals,
        })
    }
}

/// Edits to one day, keyed by the day id. Date and meal types are not editable.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Validate)]
pub struct SaveDayInput {
    pub id: i64,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub is_sammy_home: bool,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub is_work_day: bool,
    #[serde(default)]
    #[validate(length(max = (DESCRIPTION_MAX_LEN as u64)))]
    pub breakfast: String,
    #[serde(default)]
    #[validate(length(max = (DESCRIPTION_MAX_LEN as u64)))]
    pub lunch: String,
    #[serde(default)]
    #[validate(length(max = (DESCRIPTION_MAX_LEN as u64)))]
    pub dinner: String,
    /// Per-meal flags. Meals without an entry keep their stored flags.
    #[serde(default)]
    pub meals: BTreeMap<MealType, MealFieldsInput>,
}

impl SaveDayInput {
    pub fn description(&self, meal_type: MealType) -> &str {
        match meal_type {
            MealType::Breakfast => &self.breakfast,
            MealType::Lunch => &self.lunch,
            MealType::Dinner => &self.dinner,
        }
    }

    pub fn description_mut(&mut self, meal_type: MealType) -> &mut String {
        match meal_type {
            MealType::Breakfast => &mut self.breakfast,
            MealType::Lunch => &mut self.lunch,
            MealType::Dinner => &mut self.dinner,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MealFieldsInput {
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub is_takeout: bool,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub is_favorite: bool,
    #[serde(default)]
    pub cooking_user: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Flag {
    Bool(bool),
    Number(i64),
    Text(String),
    Null(()),
}

/// JSON clients send booleans, `1`/`0`, or the form strings `"on"`/`"off"`.
fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Flag::deserialize(deserializer)? {
        Flag::Bool(value) => value,
        Flag::Number(value) => value == 1,
        Flag::Text(value) => matches!(value.to_lowercase().as_str(), "on" | "true" | "1"),
        Flag::Null(()) => false,
    })
}
