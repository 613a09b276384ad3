//! Autocomplete handlers for Discord slash command parameters.
//!
//! Suggestions come straight from the sheets, so a newly added employee or a
//! freshly uploaded design shows up without a restart. A failed lookup just
//! yields no suggestions.

use crate::{
    bot::BotData,
    core::{dates::format_date, report, roster},
    errors::Error,
};
use tracing::debug;

/// Discord shows at most this many suggestions
const MAX_SUGGESTIONS: usize = 25;

/// Keeps the names containing `partial` (case-insensitive), in their given order.
fn matching(names: impl IntoIterator<Item = String>, partial: &str) -> Vec<String> {
    let partial_lower = partial.to_lowercase();
    names
        .into_iter()
        .filter(|name| name.to_lowercase().contains(&partial_lower))
        .take(MAX_SUGGESTIONS)
        .collect()
}

fn distinct(mut names: Vec<String>) -> Vec<String> {
    let mut seen = Vec::with_capacity(names.len());
    names.retain(|name| {
        if seen.contains(name) {
            false
        } else {
            seen.push(name.clone());
            true
        }
    });
    names
}

/// Suggests sectors present in the roster.
pub async fn autocomplete_sector(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    let Ok(sectors) = roster::sectors(&ctx.data().database).await else {
        return Vec::new();
    };
    matching(sectors, partial)
}

/// Suggests every subsector present in the roster, whatever its sector.
pub async fn autocomplete_subsector(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    let Ok(employees) = roster::list_employees(&ctx.data().database).await else {
        return Vec::new();
    };
    let subsectors = employees
        .into_iter()
        .map(|e| e.subsector)
        .filter(|s| !s.is_empty())
        .collect();
    matching(distinct(subsectors), partial)
}

/// Suggests active employees.
pub async fn autocomplete_employee(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    let Ok(employees) = roster::list_employees(&ctx.data().database).await else {
        return Vec::new();
    };
    let names = employees
        .into_iter()
        .filter(|e| e.active)
        .map(|e| e.name)
        .collect();
    matching(distinct(names), partial)
}

/// Suggests the teams a work order can be assigned to.
pub async fn autocomplete_team(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    let Ok(teams) = roster::work_order_teams(&ctx.data().database).await else {
        return Vec::new();
    };
    matching(teams, partial)
}

/// Suggests design names from the configured catalogue.
pub async fn autocomplete_design(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    match ctx.data().designs.list().await {
        Ok(designs) => matching(designs.into_iter().map(|d| d.name), partial),
        Err(e) => {
            debug!("Design autocomplete unavailable: {}", e);
            Vec::new()
        }
    }
}

/// Suggests months that have production data, newest first.
pub async fn autocomplete_period(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    let Ok(periods) = report::production_periods(&ctx.data().database).await else {
        return Vec::new();
    };
    matching(periods.iter().map(ToString::to_string), partial)
}

/// Suggests today's date, so the expected format is visible.
pub async fn autocomplete_date(
    _ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    let today = format_date(chrono::Local::now().date_naive());
    if partial.is_empty() || today.starts_with(partial) {
        vec![today]
    } else {
        vec![partial.to_string()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(values: &[&str]) -> Vec<String> {
        values.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_matching_is_case_insensitive_and_keeps_order() {
        let found = matching(names(&["Estamparia", "Costura", "ESTOQUE"]), "est");
        assert_eq!(found, names(&["Estamparia", "ESTOQUE"]));
        assert_eq!(matching(names(&["A", "B"]), "").len(), 2);
    }

    #[test]
    fn test_matching_caps_suggestions() {
        let many = (0..40).map(|i| format!("item {i}"));
        assert_eq!(matching(many, "item").len(), MAX_SUGGESTIONS);
    }

    #[test]
    fn test_distinct_keeps_first_seen_order() {
        assert_eq!(distinct(names(&["B", "A", "B", "C", "A"])), names(&["B", "A", "C"]));
    }
}
