use chrono::{Datelike, NaiveDate, Weekday};

use crate::config::{HouseholdConfig, MealIdea};

/// Which meal pool an evening draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolKind {
    Quick,
    Normal,
    Weekend,
}

impl PoolKind {
    pub fn label(&self) -> &'static str {
        match self {
            PoolKind::Quick => "quick",
            PoolKind::Normal => "normal",
            PoolKind::Weekend => "weekend",
        }
    }
}

/// A dinner pick with the pool it came from.
#[derive(Debug)]
pub struct Suggestion<'a> {
    pub meal: &'a MealIdea,
    pub pool: PoolKind,
}

/// Busy nights (configured busy day with an activity before dinner) eat
/// quick; weekends get the weekend pool; everything else is normal.
pub fn pool_for(cfg: &HouseholdConfig, date: NaiveDate) -> PoolKind {
    let day = date.weekday();
    let busy = cfg.is_busy_day(day)
        && cfg
            .activities_on(day)
            .iter()
            .any(|a| a.start < cfg.dinner_time);
    if busy {
        PoolKind::Quick
    } else if matches!(day, Weekday::Sat | Weekday::Sun) {
        PoolKind::Weekend
    } else {
        PoolKind::Normal
    }
}

/// Deterministic dinner suggestion: rotate through the pool by day of
/// year. Same date and config always suggest the same meal.
pub fn suggest(cfg: &HouseholdConfig, date: NaiveDate) -> Option<Suggestion<'_>> {
    let pool = pool_for(cfg, date);
    let ideas = match pool {
        PoolKind::Quick => &cfg.meals.quick,
        PoolKind::Normal => &cfg.meals.normal,
        PoolKind::Weekend => &cfg.meals.weekend,
    };
    // An unconfigured pool falls back to the normal one
    let (ideas, pool) = if ideas.is_empty() {
        (&cfg.meals.normal, PoolKind::Normal)
    } else {
        (ideas, pool)
    };
    if ideas.is_empty() {
        return None;
    }
    let idx = date.ordinal0() as usize % ideas.len();
    Some(Suggestion { meal: &ideas[idx], pool })
}
