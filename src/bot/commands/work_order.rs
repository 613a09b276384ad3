//! Work order Discord commands - open with printing, close and list.
//!
//! `/work_order open` takes up to three orders at once. They get consecutive codes
//! and share one printed page, which is stored and attached to the reply.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{
            BotData,
            commands::{MAX_LISTED, today},
            handlers::autocomplete,
        },
        core::{
            dates::{format_date, parse_date},
            work_order::{self, OrderStatus, Size, WorkOrder, WorkOrderRequest},
        },
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;
    use std::fmt::Write;

    #[derive(Debug, Clone, Copy, poise::ChoiceParameter)]
    pub enum SizeChoice {
        P,
        M,
        G,
        GG,
    }

    impl From<SizeChoice> for Size {
        fn from(choice: SizeChoice) -> Self {
            match choice {
                SizeChoice::P => Self::P,
                SizeChoice::M => Self::M,
                SizeChoice::G => Self::G,
                SizeChoice::GG => Self::GG,
            }
        }
    }

    struct OrderFields {
        client: Option<String>,
        design: Option<String>,
        size: Option<SizeChoice>,
        team: Option<String>,
        delivery: Option<String>,
        note: Option<String>,
    }

    impl OrderFields {
        /// `Ok(None)` when the slot was left empty. A slot with fields but no
        /// client is rejected rather than dropped.
        fn into_request(self, slot: usize, default_team: &str) -> Result<Option<WorkOrderRequest>> {
            let missing = |field: &str| Error::Validation {
                message: format!("order {slot} needs a {field}"),
            };
            let Some(client) = self.client else {
                let filled = self.design.is_some()
                    || self.size.is_some()
                    || self.team.is_some()
                    || self.delivery.is_some()
                    || self.note.is_some();
                return if filled { Err(missing("client")) } else { Ok(None) };
            };
            Ok(Some(WorkOrderRequest {
                delivery_date: parse_date(&self.delivery.ok_or_else(|| missing("delivery date"))?)?,
                design: self.design.ok_or_else(|| missing("design"))?,
                size: self.size.ok_or_else(|| missing("size"))?.into(),
                client,
                team: self.team.unwrap_or_else(|| default_team.to_string()),
                note: self.note.unwrap_or_default(),
            }))
        }
    }

    fn order_line(order: &WorkOrder) -> String {
        format!(
            "**OS {}** - {} - {} ({}) for {}, due {}",
            order.code,
            order.client,
            order.design,
            order.size,
            order.team,
            format_date(order.delivery_date)
        )
    }

    /// Parent command for work orders.
    #[poise::command(
        slash_command,
        subcommands("work_order_open", "work_order_close", "work_order_list")
    )]
    pub async fn work_order(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "Work order command. Available subcommands:\n\
            `/work_order open` - Open up to three orders and print their slips\n\
            `/work_order close` - Close an open order\n\
            `/work_order list` - List open orders, or every order";

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Opens one to three work orders and prints them on a single page.
    ///
    /// The second and third orders are included when their client is given; their
    /// team defaults to the first order's. Filling any other field of a slot
    /// without its client is an error.
    #[allow(clippy::too_many_arguments)]
    #[poise::command(slash_command, rename = "open")]
    pub async fn work_order_open(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Client"] client: String,
        #[description = "Design"]
        #[autocomplete = "autocomplete::autocomplete_design"]
        design: String,
        #[description = "Garment size"] size: SizeChoice,
        #[description = "Team doing the work"]
        #[autocomplete = "autocomplete::autocomplete_team"]
        team: String,
        #[description = "Delivery date, DD/MM/YYYY"]
        #[autocomplete = "autocomplete::autocomplete_date"]
        delivery: String,
        #[description = "Note (max 200 characters)"] note: Option<String>,
        #[description = "Order 2: client"] client_2: Option<String>,
        #[description = "Order 2: design"]
        #[autocomplete = "autocomplete::autocomplete_design"]
        design_2: Option<String>,
        #[description = "Order 2: size"] size_2: Option<SizeChoice>,
        #[description = "Order 2: team"]
        #[autocomplete = "autocomplete::autocomplete_team"]
        team_2: Option<String>,
        #[description = "Order 2: delivery date"] delivery_2: Option<String>,
        #[description = "Order 2: note"] note_2: Option<String>,
        #[description = "Order 3: client"] client_3: Option<String>,
        #[description = "Order 3: design"]
        #[autocomplete = "autocomplete::autocomplete_design"]
        design_3: Option<String>,
        #[description = "Order 3: size"] size_3: Option<SizeChoice>,
        #[description = "Order 3: team"]
        #[autocomplete = "autocomplete::autocomplete_team"]
        team_3: Option<String>,
        #[description = "Order 3: delivery date"] delivery_3: Option<String>,
        #[description = "Order 3: note"] note_3: Option<String>,
    ) -> Result<()> {
        let slots = [
            OrderFields {
                client: Some(client),
                design: Some(design),
                size: Some(size),
                team: Some(team.clone()),
                delivery: Some(delivery),
                note,
            },
            OrderFields {
                client: client_2,
                design: design_2,
                size: size_2,
                team: team_2,
                delivery: delivery_2,
                note: note_2,
            },
            OrderFields {
                client: client_3,
                design: design_3,
                size: size_3,
                team: team_3,
                delivery: delivery_3,
                note: note_3,
            },
        ];
        let mut requests = Vec::with_capacity(slots.len());
        for (index, fields) in slots.into_iter().enumerate() {
            if let Some(request) = fields.into_request(index + 1, &team)? {
                requests.push(request);
            }
        }

        // Image lookups and the upload can outlast the interaction deadline
        ctx.defer().await?;

        let data = ctx.data();
        let submission = work_order::submit_work_orders(
            &data.database,
            &data.images,
            data.artifacts.as_ref(),
            requests,
            today(),
        )
        .await?;

        let mut content = String::new();
        writeln!(&mut content, "✅ Opened {} work order(s):", submission.orders.len())?;
        for order in &submission.orders {
            writeln!(&mut content, "• {}", order_line(order))?;
        }
        writeln!(&mut content, "🖨️ Saved to `{}`", submission.location)?;
        for warning in &submission.warnings {
            writeln!(&mut content, "⚠️ {warning}")?;
        }

        let attachment = serenity::CreateAttachment::bytes(submission.pdf, submission.artifact_name);
        ctx.send(
            poise::CreateReply::default()
                .content(content)
                .attachment(attachment),
        )
        .await?;
        Ok(())
    }

    /// Closes an open work order.
    #[poise::command(slash_command, rename = "close")]
    pub async fn work_order_close(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Work order code"] code: u32,
    ) -> Result<()> {
        work_order::close_work_order(&ctx.data().database, code).await?;
        ctx.say(format!("✅ Work order **{code}** closed.")).await?;
        Ok(())
    }

    /// Lists open work orders, or every order.
    #[poise::command(slash_command, rename = "list")]
    pub async fn work_order_list(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Include closed orders (default: no)"] all: Option<bool>,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let include_closed = all.unwrap_or(false);
        let orders = if include_closed {
            work_order::list_work_orders(db).await?
        } else {
            work_order::list_open_work_orders(db).await?
        };

        if orders.is_empty() {
            ctx.say("📦 No work orders to show.").await?;
            return Ok(());
        }

        let mut listing = String::new();
        for order in orders.iter().rev().take(MAX_LISTED) {
            write!(&mut listing, "{}", order_line(order))?;
            if order.status == OrderStatus::Closed {
                write!(&mut listing, " *{}*", order.status.as_str())?;
            }
            writeln!(&mut listing)?;
        }

        let title = if include_closed {
            "📦 All work orders"
        } else {
            "📦 Open work orders"
        };
        let embed = serenity::CreateEmbed::default()
            .title(title)
            .description(listing)
            .color(0x009B_59B6)
            .footer(serenity::CreateEmbedFooter::new(format!(
                "{} order(s), newest first",
                orders.len()
            )));

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }

}

// Re-export all commands
pub use inner::*;
