//! Wire contract between the rendered planner form and the save handler.
//!
//! Every day card posts six fields named `days[i][field]`, where `i` is the
//! card position in the rendered sequence (not the day id). The two toggles
//! are mirrored into hidden fields holding the literal `on` or `off`.

use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

use crate::{MealType, SaveDayInput};

pub const TOGGLE_ON: &str = "on";
pub const TOGGLE_OFF: &str = "off";

static FIELD_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^days\[(\d+)\]\[([a-z_]+)\](?:\[([a-z_]+)\]\[([a-z_]+)\])?$")
        .expect("field name pattern is valid")
});

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DayField {
    Id,
    IsSammyHome,
    IsWorkDay,
    Meal(MealType),
}

impl DayField {
    pub const ALL: [DayField; 6] = [
        DayField::Id,
        DayField::IsSammyHome,
        DayField::IsWorkDay,
        DayField::Meal(MealType::Breakfast),
        DayField::Meal(MealType::Lunch),
        DayField::Meal(MealType::Dinner),
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DayField::Id => "id",
            DayField::IsSammyHome => "is_sammy_home",
            DayField::IsWorkDay => "is_work_day",
            DayField::Meal(MealType::Breakfast) => "breakfast",
            DayField::Meal(MealType::Lunch) => "lunch",
            DayField::Meal(MealType::Dinner) => "dinner",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.as_str() == value)
    }
}

/// `days[{index}][{field}]`
pub fn field_name(index: usize, field: DayField) -> String {
    format!("days[{index}][{}]", field.as_str())
}

/// Two-state control mirrored into a hidden form field.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Toggle {
    on: bool,
}

impl Toggle {
    pub fn new(on: bool) -> Self {
        Self { on }
    }

    /// Only the literal `on` is true; anything else reads as off.
    pub fn from_value(value: &str) -> Self {
        Self::new(value == TOGGLE_ON)
    }

    pub fn flip(&mut self) {
        self.on = !self.on;
    }

    pub fn is_on(&self) -> bool {
        self.on
    }

    /// Value written into the paired hidden field.
    pub fn value(&self) -> &'static str {
        if self.on { TOGGLE_ON } else { TOGGLE_OFF }
    }
}

#[derive(Default)]
struct PendingDay {
    id: Option<String>,
    input: SaveDayInput,
}

/// Parses a posted planner form into per-day edits, in index order.
///
/// Fields outside the `days[..]` namespace are ignored, as are unknown day
/// fields. A malformed `days[..]` name, a missing or non-numeric id, or a gap
/// in the indices rejects the whole submission.
pub fn parse_days_form<K, V>(pairs: &[(K, V)]) -> mealdays_shared::Result<Vec<SaveDayInput>>
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut pending: BTreeMap<usize, PendingDay> = BTreeMap::new();

    for (key, value) in pairs {
        let (key, value) = (key.as_ref(), value.as_ref());
        if !key.starts_with("days[") {
            continue;
        }

        let Some(captures) = FIELD_NAME.captures(key) else {
            return Err(invalid(format!("unrecognised field name {key:?}")));
        };

        let index = captures[1]
            .parse::<usize>()
            .map_err(|_| invalid(format!("day index out of range in {key:?}")))?;
        let day = pending.entry(index).or_default();

        match (&captures[2], captures.get(3), captures.get(4)) {
            ("meals", Some(meal_type), Some(field)) => {
                let Ok(meal_type) = MealType::from_str(meal_type.as_str()) else {
                    continue;
                };
                let fields = day.input.meals.entry(meal_type).or_default();
                match field.as_str() {
                    "is_takeout" => fields.is_takeout = Toggle::from_value(value).is_on(),
                    "is_favorite" => fields.is_favorite = Toggle::from_value(value).is_on(),
                    "cooking_user" => {
                        fields.cooking_user = Some(value.trim().to_owned())
                            .filter(|user| !user.is_empty())
                    }
                    _ => {}
                }
            }
            (_, Some(_), _) => {}
            (name, None, _) => match DayField::parse(name) {
                Some(DayField::Id) => day.id = Some(value.trim().to_owned()),
                Some(DayField::IsSammyHome) => {
                    day.input.is_sammy_home = Toggle::from_value(value).is_on()
                }
                Some(DayField::IsWorkDay) => {
                    day.input.is_work_day = Toggle::from_value(value).is_on()
                }
                Some(DayField::Meal(meal_type)) => {
                    *day.input.description_mut(meal_type) = value.to_owned()
                }
                None => {}
            },
        }
    }

    pending
        .into_iter()
        .enumerate()
        .map(|(expected, (index, day))| {
            if expected != index {
                return Err(invalid(format!("missing day index {expected}")));
            }

            let id = day
                .id
                .ok_or_else(|| invalid(format!("day {index} has no id")))?;
            let id = id
                .parse::<i64>()
                .map_err(|_| invalid(format!("day {index} has an invalid id {id:?}")))?;

            Ok(SaveDayInput { id, ..day.input })
        })
        .collect()
}

fn invalid(reason: String) -> mealdays_shared::Error {
    mealdays_shared::Error::InvalidForm(reason)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MealFieldsInput;

    /// Form pairs a browser would post for `days`, in rendered order.
    fn to_form_pairs(days: &[SaveDayInput]) -> Vec<(String, String)> {
        let mut pairs = Vec::with_capacity(days.len() * DayField::ALL.len());
        for (index, day) in days.iter().enumerate() {
            for field in DayField::ALL {
                let value = match field {
                    DayField::Id => day.id.to_string(),
                    DayField::IsSammyHome => Toggle::new(day.is_sammy_home).value().to_owned(),
                    DayField::IsWorkDay => Toggle::new(day.is_work_day).value().to_owned(),
                    DayField::Meal(meal_type) => day.description(meal_type).to_owned(),
                };
                pairs.push((field_name(index, field), value));
            }

            for (meal_type, fields) in &day.meals {
                let prefix = format!("days[{index}][meals][{meal_type}]");
                pairs.push((
                    format!("{prefix}[is_takeout]"),
                    Toggle::new(fields.is_takeout).value().to_owned(),
                ));
                pairs.push((
                    format!("{prefix}[is_favorite]"),
                    Toggle::new(fields.is_favorite).value().to_owned(),
                ));
                if let Some(user) = &fields.cooking_user {
                    pairs.push((format!("{prefix}[cooking_user]"), user.to_owned()));
                }
            }
        }

        pairs
    }

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn field_names_use_position() {
        assert_eq!(field_name(0, DayField::Id), "days[0][id]");
        assert_eq!(
            field_name(3, DayField::IsSammyHome),
            "days[3][is_sammy_home]"
        );
        assert_eq!(
            field_name(8, DayField::Meal(MealType::Dinner)),
            "days[8][dinner]"
        );
    }

    #[test]
    fn toggle_double_flip_restores_value() {
        for initial in [true, false] {
            let mut toggle = Toggle::new(initial);
            let original = toggle.value();
            toggle.flip();
            assert_ne!(toggle.value(), original);
            toggle.flip();
            assert_eq!(toggle.value(), original);
        }
    }

    #[test]
    fn toggle_values_outside_on_off_are_off() {
        assert!(Toggle::from_value("on").is_on());
        assert!(!Toggle::from_value("off").is_on());
        assert!(!Toggle::from_value("yes").is_on());
        assert!(!Toggle::from_value("ON ").is_on());
        assert!(!Toggle::from_value("").is_on());
    }

    #[test]
    fn parses_single_day() {
        let days = parse_days_form(&pairs(&[
            ("days[0][id]", "1"),
            ("days[0][is_sammy_home]", "off"),
            ("days[0][is_work_day]", "on"),
            ("days[0][breakfast]", "Eggs"),
            ("days[0][lunch]", ""),
            ("days[0][dinner]", ""),
            ("redirect", "/"),
        ]))
        .unwrap();

        assert_eq!(
            days,
            vec![SaveDayInput {
                id: 1,
                is_work_day: true,
                breakfast: "Eggs".to_owned(),
                ..Default::default()
            }]
        );
    }

    #[test]
    fn missing_toggle_reads_as_off() {
        let days = parse_days_form(&pairs(&[("days[0][id]", "5")])).unwrap();
        assert!(!days[0].is_sammy_home);
        assert!(!days[0].is_work_day);
    }

    #[test]
    fn days_come_back_in_index_order() {
        let days = parse_days_form(&pairs(&[
            ("days[1][id]", "20"),
            ("days[0][id]", "10"),
            ("days[1][dinner]", "Curry"),
        ]))
        .unwrap();

        assert_eq!(days.iter().map(|d| d.id).collect::<Vec<_>>(), vec![10, 20]);
        assert_eq!(days[1].dinner, "Curry");
    }

    #[test]
    fn rejects_missing_id() {
        let err = parse_days_form(&pairs(&[("days[0][breakfast]", "Toast")])).unwrap_err();
        assert!(matches!(err, mealdays_shared::Error::InvalidForm(_)));
    }

    #[test]
    fn rejects_non_numeric_id() {
        assert!(parse_days_form(&pairs(&[("days[0][id]", "abc")])).is_err());
    }

    #[test]
    fn rejects_gap_in_indices() {
        let err = parse_days_form(&pairs(&[("days[0][id]", "1"), ("days[2][id]", "3")]))
            .unwrap_err();
        assert!(err.to_string().contains("missing day index 1"));
    }

    #[test]
    fn rejects_unparseable_index() {
        assert!(parse_days_form(&pairs(&[("days[x][id]", "1")])).is_err());
        assert!(parse_days_form(&pairs(&[("days[0]", "1")])).is_err());
    }

    #[test]
    fn ignores_unknown_day_fields() {
        let days = parse_days_form(&pairs(&[("days[0][id]", "1"), ("days[0][snack]", "Chips")]))
            .unwrap();
        assert_eq!(days.len(), 1);
    }

    #[test]
    fn parses_nested_meal_fields() {
        let days = parse_days_form(&pairs(&[
            ("days[0][id]", "1"),
            ("days[0][meals][lunch][is_takeout]", "on"),
            ("days[0][meals][lunch][cooking_user]", " Sammy "),
            ("days[0][meals][brunch][is_takeout]", "on"),
        ]))
        .unwrap();

        assert_eq!(days[0].meals.len(), 1);
        assert_eq!(
            days[0].meals[&MealType::Lunch],
            MealFieldsInput {
                is_takeout: true,
                is_favorite: false,
                cooking_user: Some("Sammy".to_owned()),
            }
        );
    }

    #[test]
    fn form_pairs_parse_back() {
        let mut meals = BTreeMap::new();
        meals.insert(
            MealType::Dinner,
            MealFieldsInput {
                is_takeout: true,
                is_favorite: true,
                cooking_user: None,
            },
        );
        let days = vec![
            SaveDayInput {
                id: 1,
                is_sammy_home: true,
                breakfast: "Oatmeal".to_owned(),
                meals,
                ..Default::default()
            },
            SaveDayInput {
                id: 2,
                is_work_day: true,
                dinner: "Pasta".to_owned(),
                ..Default::default()
            },
        ];

        assert_eq!(parse_days_form(&to_form_pairs(&days)).unwrap(), days);
    }
}
