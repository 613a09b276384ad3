//! Dashboard Discord commands - monthly production and individual production.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, commands::pick_period, handlers::autocomplete},
        core::{
            absence,
            dates::format_date,
            production,
            report::{self, format_quantity, format_share_bar, share_percent},
            roster,
        },
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;
    use std::fmt::Write;

    /// Subsectors shown per sector before the rest is summarised
    const MAX_SUBSECTORS: usize = 8;

    /// Parent command for production reports.
    #[poise::command(slash_command, subcommands("dashboard_monthly", "dashboard_individual"))]
    pub async fn dashboard(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "Dashboard command. Available subcommands:\n\
            `/dashboard monthly` - Production per sector in a month\n\
            `/dashboard individual` - Production credited to one employee";

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Shows a month's production per sector and subsector.
    #[poise::command(slash_command, rename = "monthly")]
    pub async fn dashboard_monthly(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Month as M/YYYY (default: newest with data)"]
        #[autocomplete = "autocomplete::autocomplete_period"]
        period: Option<String>,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let periods = report::production_periods(db).await?;
        let Some(period) = pick_period(period.as_deref(), &periods)? else {
            ctx.say("📊 No production has been recorded yet.").await?;
            return Ok(());
        };

        let entries = production::list_production(db).await?;
        let monthly = report::monthly_production_report(&entries, period);
        if monthly.sectors.is_empty() {
            ctx.say(format!("📊 No production recorded in {period}."))
                .await?;
            return Ok(());
        }

        let mut embed_fields = Vec::with_capacity(monthly.sectors.len());
        for sector in &monthly.sectors {
            let mut value = String::new();
            writeln!(
                &mut value,
                "**Share:** {}",
                format_share_bar(share_percent(sector.total, monthly.total), Some(10))
            )?;
            if let Some((day, best)) = sector.daily.iter().max_by_key(|(_, sum)| *sum) {
                writeln!(
                    &mut value,
                    "**Best day:** {} ({})",
                    format_date(*day),
                    format_quantity(*best)
                )?;
            }
            let days = u64::try_from(sector.daily.len())?;
            writeln!(
                &mut value,
                "**Daily average:** {} over {days} day(s)",
                format_quantity(sector.total / days.max(1))
            )?;
            for (subsector, total) in sector.subsectors.iter().take(MAX_SUBSECTORS) {
                writeln!(
                    &mut value,
                    "• {subsector}: {} {}",
                    format_quantity(*total),
                    format_share_bar(share_percent(*total, sector.total), Some(5))
                )?;
            }
            if sector.subsectors.len() > MAX_SUBSECTORS {
                writeln!(
                    &mut value,
                    "• …and {} more",
                    sector.subsectors.len() - MAX_SUBSECTORS
                )?;
            }

            let name = format!("{} - {}", sector.sector, format_quantity(sector.total));
            embed_fields.push((name, value, false));
        }

        let embed = serenity::CreateEmbed::default()
            .title(format!("📊 Production in {period}"))
            .description(format!("**Total:** {}", format_quantity(monthly.total)))
            .color(0x0034_98DB)
            .fields(embed_fields)
            .footer(serenity::CreateEmbedFooter::new(
                "Totals include overtime • /dashboard individual for one employee",
            ));

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }

    /// Shows the regular production credited to one employee in a month.
    ///
    /// Days with an unexcused absence are left out of the employee's figure.
    #[poise::command(slash_command, rename = "individual")]
    pub async fn dashboard_individual(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Employee"]
        #[autocomplete = "autocomplete::autocomplete_employee"]
        employee: String,
        #[description = "Subsector (default: the employee's own)"]
        #[autocomplete = "autocomplete::autocomplete_subsector"]
        subsector: Option<String>,
        #[description = "Month as M/YYYY (default: newest with data)"]
        #[autocomplete = "autocomplete::autocomplete_period"]
        period: Option<String>,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let employee = employee.trim();

        let subsector = match subsector {
            Some(subsector) => subsector.trim().to_string(),
            None => roster::list_employees(db)
                .await?
                .into_iter()
                .find(|e| e.name == employee)
                .map(|e| e.subsector)
                .ok_or_else(|| Error::LookupMiss {
                    entity: "employee",
                    key: employee.to_string(),
                })?,
        };

        let periods = report::production_periods(db).await?;
        let Some(period) = pick_period(period.as_deref(), &periods)? else {
            ctx.say("📊 No production has been recorded yet.").await?;
            return Ok(());
        };

        let entries = production::list_production(db).await?;
        let absences = absence::list_absences(db).await?;
        let figures =
            report::individual_production(&entries, &absences, employee, &subsector, period);

        let excluded = if figures.excluded_days.is_empty() {
            "None".to_string()
        } else {
            figures
                .excluded_days
                .iter()
                .map(|d| format_date(*d))
                .collect::<Vec<_>>()
                .join(", ")
        };

        let embed = serenity::CreateEmbed::default()
            .title(format!("👤 {employee} - {subsector} in {period}"))
            .color(0x002E_CC71)
            .field("Team production", format_quantity(figures.team_total), true)
            .field(
                "Credited to employee",
                format_quantity(figures.employee_total),
                true,
            )
            .field(
                "Share",
                format_share_bar(
                    share_percent(figures.employee_total, figures.team_total),
                    Some(10),
                ),
                false,
            )
            .field("Days left out (unexcused absence)", excluded, false)
            .footer(serenity::CreateEmbedFooter::new(
                "Regular production only, overtime not included",
            ));

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
