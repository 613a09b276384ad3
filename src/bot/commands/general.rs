//! General Discord commands - ping and help.
//! These commands don't touch the sheets.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::BotData,
        errors::{Error, Result},
    };

    /// Responds with "Pong!" to test bot connectivity.
    #[poise::command(slash_command, prefix_command)]
    pub async fn ping(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        ctx.say("Pong!").await?;
        Ok(())
    }

    /// Displays help information about available commands.
    #[poise::command(slash_command, prefix_command)]
    pub async fn help(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "**ShopFloor Help**\n\
        Dates are always written as DD/MM/YYYY; when left out, today is used.\n\n\
        **Production**\n\
        • `/production record <sector> <subsector> <quantity> [overtime] [date] [note]` - Logs a day's production.\n\
        • `/production edit <date> <subsector> ...` - Rewrites the entry of that day and subsector.\n\
        • `/production list [period]` - Lists the entries of a month.\n\n\
        **People**\n\
        • `/roster add|edit|list` - Manages the employee roster.\n\
        • `/absence record|edit|list` - Logs absences, excused or not.\n\n\
        **Work Orders**\n\
        • `/work_order open ...` - Opens one to three orders and prints their slips.\n\
        • `/work_order close <code>` - Closes an open order.\n\
        • `/work_order list [all]` - Lists open orders, or every order.\n\
        • `/designs list` and `/designs show <design>` - Browses the design images.\n\n\
        **Reports**\n\
        • `/dashboard monthly [period]` - Production per sector and subsector.\n\
        • `/dashboard individual <employee> <subsector> [period]` - Production credited to one employee.\n\n\
        **Utility**\n\
        • `/ping` - Checks if the bot is responsive.\n\
        • `/help` - Shows this help message.";

        ctx.say(help_text).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
