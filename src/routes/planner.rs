use axum::{
    extract::{Form, State},
    response::{IntoResponse, Redirect},
};
use mealdays_mealday::{
    Day, DayField, MealType, PaydayInfo, Toggle, field_name, parse_days_form, payday_info,
};
use strum::VariantArray;
use time::{Duration, format_description::BorrowedFormatItem, macros::format_description};

use crate::{error::AppError, routes::AppState, template::Template};

/// Page chrome around the day cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageConfig {
    pub title: &'static str,
    pub show_days_until_payday: bool,
    pub show_days_eating_out: bool,
    pub days_are_stale: bool,
}

impl PageConfig {
    pub const UPCOMING: PageConfig = PageConfig {
        title: "Home",
        show_days_until_payday: true,
        show_days_eating_out: true,
        days_are_stale: false,
    };

    pub const PAST: PageConfig = PageConfig {
        title: "Past Meals",
        show_days_until_payday: false,
        show_days_eating_out: false,
        days_are_stale: true,
    };
}

const DAY_LABEL: &[BorrowedFormatItem<'static>] =
    format_description!("[weekday], [month repr:long] [day padding:none]");

pub struct ToggleField {
    pub name: String,
    pub label: &'static str,
    pub toggle: Toggle,
}

pub struct MealField {
    pub name: String,
    pub label: &'static str,
    pub description: String,
}

/// Everything one card needs, with field names resolved for its position.
pub struct DayCard {
    pub id: i64,
    pub id_name: String,
    pub date: String,
    pub label: String,
    pub toggles: [ToggleField; 2],
    pub meals: Vec<MealField>,
}

impl DayCard {
    pub fn new(index: usize, day: &Day) -> Self {
        let slots = day.slots();

        Self {
            id: day.id,
            id_name: field_name(index, DayField::Id),
            date: mealdays_shared::format_date(day.date).unwrap_or_default(),
            label: day.date.format(DAY_LABEL).unwrap_or_default(),
            toggles: [
                ToggleField {
                    name: field_name(index, DayField::IsSammyHome),
                    label: "Sammy home",
                    toggle: Toggle::new(day.is_sammy_home),
                },
                ToggleField {
                    name: field_name(index, DayField::IsWorkDay),
                    label: "Work day",
                    toggle: Toggle::new(day.is_work_day),
                },
            ],
            meals: MealType::VARIANTS
                .iter()
                .map(|meal_type| MealField {
                    name: field_name(index, DayField::Meal(*meal_type)),
                    label: meal_label(*meal_type),
                    description: slots.description(*meal_type).to_owned(),
                })
                .collect(),
        }
    }
}

fn meal_label(meal_type: MealType) -> &'static str {
    match meal_type {
        MealType::Breakfast => "Breakfast",
        MealType::Lunch => "Lunch",
        MealType::Dinner => "Dinner",
    }
}

/// One card per day, indexed by position in `days`.
pub fn day_cards(days: &[Day]) -> Vec<DayCard> {
    days.iter()
        .enumerate()
        .map(|(index, day)| DayCard::new(index, day))
        .collect()
}

#[derive(askama::Template)]
#[template(path = "planner.html")]
pub struct PlannerTemplate {
    pub current_path: String,
    pub page: PageConfig,
    pub cards: Vec<DayCard>,
    pub payday: Option<PaydayInfo>,
    pub eating_out: Option<u64>,
}

impl PlannerTemplate {
    pub fn new(current_path: impl Into<String>, page: PageConfig, days: &[Day]) -> Self {
        Self {
            current_path: current_path.into(),
            page,
            cards: day_cards(days),
            payday: None,
            eating_out: None,
        }
    }
}

#[tracing::instrument(skip_all)]
pub async fn page(template: Template, State(app): State<AppState>) -> impl IntoResponse {
    let planner = &app.config.planner;
    let today = mealdays_shared::today();
    let dates = mealdays_shared::days_from(today, planner.days_forward);

    let days = crate::try_page_response!(app.command.ensure_days(&dates), template);
    let anchor = crate::try_page_response!(sync: planner.anchor(), template);
    let eating_out = crate::try_page_response!(
        app.query
            .count_takeout_since(today - Duration::days(planner.takeout_window_days.into())),
        template
    );

    let mut page = PlannerTemplate::new(&template.current_path, PageConfig::UPCOMING, &days);
    page.payday = Some(crate::try_page_response!(
        sync: payday_info(today, anchor, planner.payday_period_days),
        template
    ));
    page.eating_out = Some(eating_out);

    template.render(page).into_response()
}

#[tracing::instrument(skip_all)]
pub async fn backwards(template: Template, State(app): State<AppState>) -> impl IntoResponse {
    let dates = mealdays_shared::days_before(
        mealdays_shared::today(),
        app.config.planner.days_backward,
    );

    let days = match (dates.first(), dates.last()) {
        (Some(from), Some(to)) => {
            crate::try_page_response!(app.query.find_range(*from, *to), template)
        }
        _ => vec![],
    };

    template
        .render(PlannerTemplate::new(
            &template.current_path,
            PageConfig::PAST,
            &days,
        ))
        .into_response()
}

/// The posted `redirect` field when it is a local path, `/` otherwise.
fn redirect_target(pairs: &[(String, String)]) -> &str {
    pairs
        .iter()
        .find(|(key, _)| key == "redirect")
        .map(|(_, value)| value.as_str())
        .filter(|path| path.starts_with('/') && !path.starts_with("//"))
        .unwrap_or("/")
}

#[tracing::instrument(skip_all)]
pub async fn action(
    State(app): State<AppState>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Redirect, AppError> {
    let days = parse_days_form(&pairs)?;
    app.command.save(&days).await?;

    Ok(Redirect::to(redirect_target(&pairs)))
}
