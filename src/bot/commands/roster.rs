//! Roster Discord commands - add, edit and list employees.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, commands::MAX_LISTED, handlers::autocomplete},
        core::roster::{self, Employee, Team},
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;
    use std::fmt::Write;

    /// Parent command for the employee roster.
    #[poise::command(
        slash_command,
        subcommands("roster_add", "roster_edit", "roster_list", "roster_sectors")
    )]
    pub async fn roster(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "Roster command. Available subcommands:\n\
            `/roster add` - Add an employee\n\
            `/roster edit` - Change an employee's team, role or status\n\
            `/roster list` - List employees, optionally of one team\n\
            `/roster sectors` - Show sectors and their subsectors";

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Adds an active employee to the roster.
    #[poise::command(slash_command, rename = "add")]
    pub async fn roster_add(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Full name"] name: String,
        #[description = "Sector"]
        #[autocomplete = "autocomplete::autocomplete_sector"]
        sector: String,
        #[description = "Subsector team"]
        #[autocomplete = "autocomplete::autocomplete_subsector"]
        subsector: String,
        #[description = "Job title"] role: String,
    ) -> Result<()> {
        let employee = Employee::new(&name, &sector, &subsector, &role)?;
        roster::add_employee(&ctx.data().database, &employee).await?;

        ctx.say(format!(
            "✅ Added **{}** to {} / {} as {}.",
            employee.name, employee.sector, employee.subsector, employee.role
        ))
        .await?;
        Ok(())
    }

    /// Changes an employee's team, role or status.
    ///
    /// Options left out keep their stored value.
    #[poise::command(slash_command, rename = "edit")]
    pub async fn roster_edit(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Employee to edit"]
        #[autocomplete = "autocomplete::autocomplete_employee"]
        name: String,
        #[description = "New sector"]
        #[autocomplete = "autocomplete::autocomplete_sector"]
        sector: Option<String>,
        #[description = "New subsector"]
        #[autocomplete = "autocomplete::autocomplete_subsector"]
        subsector: Option<String>,
        #[description = "New job title"] role: Option<String>,
        #[description = "Still on staff?"] active: Option<bool>,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let name = name.trim();
        let Some(current) = roster::list_employees(db)
            .await?
            .into_iter()
            .find(|e| e.name == name)
        else {
            return Err(Error::LookupMiss {
                entity: "employee",
                key: name.to_string(),
            });
        };

        let active = active.unwrap_or(current.active);
        roster::edit_employee(
            db,
            name,
            sector.as_deref().unwrap_or(&current.sector),
            subsector.as_deref().unwrap_or(&current.subsector),
            role.as_deref().unwrap_or(&current.role),
            active,
        )
        .await?;

        let status = if active { "active" } else { "inactive" };
        ctx.say(format!("✏️ Updated **{name}** ({status})."))
            .await?;
        Ok(())
    }

    /// Lists employees, optionally only those of a sector or subsector.
    #[poise::command(slash_command, rename = "list")]
    pub async fn roster_list(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Only this sector"]
        #[autocomplete = "autocomplete::autocomplete_sector"]
        sector: Option<String>,
        #[description = "Only this subsector"]
        #[autocomplete = "autocomplete::autocomplete_subsector"]
        subsector: Option<String>,
        #[description = "Include inactive employees (default: no)"] include_inactive: Option<bool>,
    ) -> Result<()> {
        let db = &ctx.data().database;

        let team_names = match (subsector.as_deref(), sector.as_deref()) {
            (Some(sub), _) => Some(roster::employees_in(db, Team::Subsector(sub.trim())).await?),
            (None, Some(sec)) => Some(roster::employees_in(db, Team::Sector(sec.trim())).await?),
            (None, None) => None,
        };

        let include_inactive = include_inactive.unwrap_or(false);
        let employees: Vec<Employee> = roster::list_employees(db)
            .await?
            .into_iter()
            .filter(|e| include_inactive || e.active)
            .filter(|e| team_names.as_ref().is_none_or(|names| names.contains(&e.name)))
            .collect();

        if employees.is_empty() {
            ctx.say("👥 No employees match.").await?;
            return Ok(());
        }

        let mut listing = String::new();
        for employee in employees.iter().take(MAX_LISTED) {
            write!(
                &mut listing,
                "**{}** - {} / {} ({})",
                employee.name, employee.sector, employee.subsector, employee.role
            )?;
            if !employee.active {
                write!(&mut listing, " *inactive*")?;
            }
            writeln!(&mut listing)?;
        }

        let embed = serenity::CreateEmbed::default()
            .title("👥 Roster")
            .description(listing)
            .color(0x0058_65F2)
            .footer(serenity::CreateEmbedFooter::new(format!(
                "{} employee(s)",
                employees.len()
            )));

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }

    /// Shows every sector with its subsectors.
    #[poise::command(slash_command, rename = "sectors")]
    pub async fn roster_sectors(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let db = &ctx.data().database;
        let sectors = roster::sectors(db).await?;
        if sectors.is_empty() {
            ctx.say("👥 The roster is empty.").await?;
            return Ok(());
        }

        let mut fields = Vec::with_capacity(sectors.len());
        for sector in sectors {
            let subsectors = roster::subsectors(db, &sector).await?;
            let value = if subsectors.is_empty() {
                "-".to_string()
            } else {
                subsectors.join(", ")
            };
            fields.push((sector, value, false));
        }

        let embed = serenity::CreateEmbed::default()
            .title("🏭 Sectors")
            .color(0x0058_65F2)
            .fields(fields);

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
