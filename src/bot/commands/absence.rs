//! Absence Discord commands - record, edit and list absences.
//!
//! An absence is identified by its date and employee; editing rewrites the first
//! row that matches both.

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
            absence::{self, AbsenceEntry, Shift},
            dates::{Period, format_date, parse_date},
            sheet::yes_no,
        },
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;
    use std::fmt::Write;

    #[derive(Debug, Clone, Copy, poise::ChoiceParameter)]
    pub enum ShiftChoice {
        #[name = "Matutino"]
        Morning,
        #[name = "Vespertino"]
        Afternoon,
        #[name = "Dia inteiro"]
        FullDay,
    }

    impl From<ShiftChoice> for Shift {
        fn from(choice: ShiftChoice) -> Self {
            match choice {
                ShiftChoice::Morning => Self::Morning,
                ShiftChoice::Afternoon => Self::Afternoon,
                ShiftChoice::FullDay => Self::FullDay,
            }
        }
    }

    /// Parent command for the absence log.
    #[poise::command(
        slash_command,
        subcommands("absence_record", "absence_edit", "absence_list")
    )]
    pub async fn absence(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "Absence command. Available subcommands:\n\
            `/absence record` - Log an absence\n\
            `/absence edit` - Rewrite the absence of an employee on a day\n\
            `/absence list` - List the absences of a month";

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Logs an absence.
    #[poise::command(slash_command, rename = "record")]
    pub async fn absence_record(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Employee"]
        #[autocomplete = "autocomplete::autocomplete_employee"]
        employee: String,
        #[description = "Part of the day missed"] shift: ShiftChoice,
        #[description = "Was the absence justified?"] excused: bool,
        #[description = "Day of the absence, DD/MM/YYYY (default: today)"]
        #[autocomplete = "autocomplete::autocomplete_date"]
        date: Option<String>,
        #[description = "Note (max 50 characters)"] note: Option<String>,
    ) -> Result<()> {
        let entry = AbsenceEntry::new(
            date_or_today(date.as_deref())?,
            &employee,
            shift.into(),
            excused,
            note.as_deref().unwrap_or_default(),
        )?;
        let row = absence::record_absence(&ctx.data().database, &entry).await?;

        ctx.say(format!(
            "✅ Absence of **{}** on {} ({}, excused: {}) saved on row {row}.",
            entry.employee_name,
            format_date(entry.date),
            entry.shift,
            yes_no(entry.excused)
        ))
        .await?;
        Ok(())
    }

    /// Rewrites the absence of an employee on a day.
    ///
    /// Options left out keep their stored value.
    #[poise::command(slash_command, rename = "edit")]
    pub async fn absence_edit(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Day of the absence, DD/MM/YYYY"]
        #[autocomplete = "autocomplete::autocomplete_date"]
        date: String,
        #[description = "Employee"]
        #[autocomplete = "autocomplete::autocomplete_employee"]
        employee: String,
        #[description = "New shift"] shift: Option<ShiftChoice>,
        #[description = "Was the absence justified?"] excused: Option<bool>,
        #[description = "New note (max 50 characters)"] note: Option<String>,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let day = parse_date(&date)?;
        let employee = employee.trim();

        let Some(current) = absence::list_absences(db)
            .await?
            .into_iter()
            .find(|a| a.date == day && a.employee_name == employee)
        else {
            return Err(Error::LookupMiss {
                entity: "absence",
                key: format!("{} / {employee}", format_date(day)),
            });
        };

        let updated = AbsenceEntry::new(
            day,
            employee,
            shift.map_or(current.shift, Shift::from),
            excused.unwrap_or(current.excused),
            note.as_deref().unwrap_or(&current.note),
        )?;
        let row = absence::edit_absence(db, day, employee, &updated).await?;

        ctx.say(format!(
            "✏️ Absence of **{employee}** on {} updated ({}, excused: {}, row {row}).",
            format_date(day),
            updated.shift,
            yes_no(updated.excused)
        ))
        .await?;
        Ok(())
    }

    /// Lists the absences of a month, newest first.
    #[poise::command(slash_command, rename = "list")]
    pub async fn absence_list(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Month as M/YYYY (default: newest with absences)"] period: Option<String>,
        #[description = "Only this employee"]
        #[autocomplete = "autocomplete::autocomplete_employee"]
        employee: Option<String>,
    ) -> Result<()> {
        let absences = absence::list_absences(&ctx.data().database).await?;

        let mut periods: Vec<Period> = absences.iter().map(|a| Period::of(a.date)).collect();
        periods.sort_unstable_by(|a, b| b.cmp(a));
        periods.dedup();
        let Some(period) = pick_period(period.as_deref(), &periods)? else {
            ctx.say("📋 No absences have been recorded.").await?;
            return Ok(());
        };

        let mut selected: Vec<&AbsenceEntry> = absences
            .iter()
            .filter(|a| period.contains(a.date))
            .filter(|a| {
                employee
                    .as_deref()
                    .is_none_or(|name| a.employee_name == name.trim())
            })
            .collect();
        selected.sort_by(|a, b| b.date.cmp(&a.date));

        if selected.is_empty() {
            ctx.say(format!("📋 No absences in {period}.")).await?;
            return Ok(());
        }

        let mut listing = String::new();
        for entry in selected.iter().take(MAX_LISTED) {
            write!(
                &mut listing,
                "`{}` **{}** - {}",
                format_date(entry.date),
                entry.employee_name,
                entry.shift
            )?;
            if entry.excused {
                write!(&mut listing, " (excused)")?;
            }
            if !entry.note.is_empty() {
                write!(&mut listing, " - {}", entry.note)?;
            }
            writeln!(&mut listing)?;
        }

        let unexcused = selected.iter().filter(|a| !a.excused).count();
        let embed = serenity::CreateEmbed::default()
            .title(format!("📋 Absences in {period}"))
            .description(listing)
            .color(0x00E6_7E22)
            .footer(serenity::CreateEmbedFooter::new(format!(
                "{} absence(s), {unexcused} unexcused",
                selected.len()
            )));

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
