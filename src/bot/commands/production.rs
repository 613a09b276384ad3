//! Production Discord commands - record, edit and list daily figures.
//!
//! Overtime only counts when the overtime flag is set; a quantity given without
//! the flag is stored as zero.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{
            BotData,
            commands::{MAX_LISTED, date_or_today, pick_period},
            handlers::autocomplete,
        },
        core::{
            dates::{format_date, parse_date},
            production::{self, ProductionEntry},
            report::{format_quantity, production_periods},
            sheet::yes_no,
        },
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;
    use std::fmt::Write;

    fn summary_embed(title: &str, entry: &ProductionEntry, row: u32) -> serenity::CreateEmbed {
        serenity::CreateEmbed::default()
            .title(title)
            .color(0x002E_CC71)
            .field("Date", format_date(entry.date), true)
            .field("Sector", format!("{} / {}", entry.sector, entry.subsector), true)
            .field("Regular", format_quantity(entry.regular_quantity.into()), true)
            .field(
                "Overtime",
                format!(
                    "{} ({})",
                    yes_no(entry.overtime_flag),
                    format_quantity(entry.overtime_quantity().into())
                ),
                true,
            )
            .field("Total", format!("**{}**", format_quantity(entry.total())), true)
            .footer(serenity::CreateEmbedFooter::new(format!("Row {row}")))
    }

    /// Parent command for daily production figures.
    #[poise::command(
        slash_command,
        subcommands("production_record", "production_edit", "production_list")
    )]
    pub async fn production(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "Production command. Available subcommands:\n\
            `/production record` - Log a day's production\n\
            `/production edit` - Rewrite an existing entry\n\
            `/production list` - List the entries of a month";

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Logs the production of a subsector for one day.
    #[poise::command(slash_command, rename = "record")]
    pub async fn production_record(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Sector"]
        #[autocomplete = "autocomplete::autocomplete_sector"]
        sector: String,
        #[description = "Subsector team"]
        #[autocomplete = "autocomplete::autocomplete_subsector"]
        subsector: String,
        #[description = "Units produced in regular hours"] quantity: u32,
        #[description = "Was overtime worked? (default: no)"] overtime: Option<bool>,
        #[description = "Units produced in overtime"] overtime_quantity: Option<u32>,
        #[description = "Day of production, DD/MM/YYYY (default: today)"]
        #[autocomplete = "autocomplete::autocomplete_date"]
        date: Option<String>,
        #[description = "Note (max 50 characters)"] note: Option<String>,
    ) -> Result<()> {
        let entry = ProductionEntry::new(
            date_or_today(date.as_deref())?,
            &sector,
            &subsector,
            quantity,
            overtime.unwrap_or(false),
            overtime_quantity.unwrap_or(0),
            note.as_deref().unwrap_or_default(),
        )?;

        let row = production::record_production(&ctx.data().database, &entry).await?;
        ctx.send(poise::CreateReply::default().embed(summary_embed(
            "✅ Production recorded",
            &entry,
            row,
        )))
        .await?;
        Ok(())
    }

    /// Rewrites the entry of a day and subsector.
    ///
    /// Options left out keep their stored value.
    #[poise::command(slash_command, rename = "edit")]
    pub async fn production_edit(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Day of the entry, DD/MM/YYYY"]
        #[autocomplete = "autocomplete::autocomplete_date"]
        date: String,
        #[description = "Subsector of the entry"]
        #[autocomplete = "autocomplete::autocomplete_subsector"]
        subsector: String,
        #[description = "New sector"]
        #[autocomplete = "autocomplete::autocomplete_sector"]
        sector: Option<String>,
        #[description = "New regular quantity"] quantity: Option<u32>,
        #[description = "Was overtime worked?"] overtime: Option<bool>,
        #[description = "New overtime quantity"] overtime_quantity: Option<u32>,
        #[description = "New note (max 50 characters)"] note: Option<String>,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let day = parse_date(&date)?;

        let Some((_, current)) = production::find_production(db, day, subsector.trim()).await?
        else {
            return Err(Error::LookupMiss {
                entity: "production entry",
                key: format!("{} / {}", format_date(day), subsector.trim()),
            });
        };

        let updated = ProductionEntry::new(
            day,
            sector.as_deref().unwrap_or(&current.sector),
            &current.subsector,
            quantity.unwrap_or(current.regular_quantity),
            overtime.unwrap_or(current.overtime_flag),
            overtime_quantity.unwrap_or_else(|| current.overtime_quantity()),
            note.as_deref().unwrap_or(&current.note),
        )?;

        let row = production::edit_production(db, day, &current.subsector, &updated).await?;
        ctx.send(poise::CreateReply::default().embed(summary_embed(
            "✏️ Production updated",
            &updated,
            row,
        )))
        .await?;
        Ok(())
    }

    /// Lists the production entries of a month.
    #[poise::command(slash_command, rename = "list")]
    pub async fn production_list(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Month as M/YYYY (default: newest with data)"]
        #[autocomplete = "autocomplete::autocomplete_period"]
        period: Option<String>,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let periods = production_periods(db).await?;
        let Some(period) = pick_period(period.as_deref(), &periods)? else {
            ctx.say("📋 No production has been recorded yet.").await?;
            return Ok(());
        };

        let entries: Vec<ProductionEntry> = production::list_production(db)
            .await?
            .into_iter()
            .filter(|e| period.contains(e.date))
            .collect();
        if entries.is_empty() {
            ctx.say(format!("📋 No production recorded in {period}."))
                .await?;
            return Ok(());
        }

        let mut listing = String::new();
        for entry in entries.iter().rev().take(MAX_LISTED) {
            write!(
                &mut listing,
                "`{}` {} / {}: **{}**",
                format_date(entry.date),
                entry.sector,
                entry.subsector,
                format_quantity(entry.total())
            )?;
            if entry.overtime_flag {
                write!(
                    &mut listing,
                    " (incl. {} overtime)",
                    format_quantity(entry.overtime_quantity().into())
                )?;
            }
            writeln!(&mut listing)?;
        }

        let total: u64 = entries.iter().map(ProductionEntry::total).sum();
        let embed = serenity::CreateEmbed::default()
            .title(format!("📋 Production in {period}"))
            .description(listing)
            .color(0x0034_98DB)
            .footer(serenity::CreateEmbedFooter::new(format!(
                "{} entries, showing the latest {} • Total {}",
                entries.len(),
                entries.len().min(MAX_LISTED),
                format_quantity(total)
            )));

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
