//! Design Discord commands - browse the catalogue and preview an image.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, handlers::autocomplete},
        core::designs::DesignAsset,
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;

    /// Discord rejects embed descriptions longer than this
    const DESCRIPTION_LIMIT: usize = 4000;

    fn catalogue_text(designs: &[DesignAsset]) -> String {
        let mut text = String::new();
        for design in designs {
            let line = if design.embroidered {
                format!("🧵 {}\n", design.name)
            } else {
                format!("🎨 {}\n", design.name)
            };
            if text.len() + line.len() > DESCRIPTION_LIMIT {
                text.push('…');
                break;
            }
            text.push_str(&line);
        }
        text
    }

    /// Parent command for the design catalogue.
    #[poise::command(slash_command, subcommands("designs_list", "designs_show"))]
    pub async fn designs(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "Designs command. Available subcommands:\n\
            `/designs list` - List every design\n\
            `/designs show` - Preview one design";

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Lists every design; embroidered ones are marked with 🧵.
    #[poise::command(slash_command, rename = "list")]
    pub async fn designs_list(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        ctx.defer().await?;
        let designs = ctx.data().designs.list().await?;

        if designs.is_empty() {
            ctx.say("🎨 No designs found.").await?;
            return Ok(());
        }

        let embroidered = designs.iter().filter(|d| d.embroidered).count();
        let embed = serenity::CreateEmbed::default()
            .title("🎨 Designs")
            .description(catalogue_text(&designs))
            .color(0x00F1_C40F)
            .footer(serenity::CreateEmbedFooter::new(format!(
                "{} design(s), {embroidered} embroidered",
                designs.len()
            )));

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }

    /// Shows the image of one design.
    #[poise::command(slash_command, rename = "show")]
    pub async fn designs_show(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Design name"]
        #[autocomplete = "autocomplete::autocomplete_design"]
        design: String,
    ) -> Result<()> {
        ctx.defer().await?;
        let name = design.trim();

        let Some(bytes) = ctx.data().images.fetch(name).await? else {
            return Err(Error::LookupMiss {
                entity: "design image",
                key: name.to_string(),
            });
        };

        let extension = image::guess_format(&bytes)?
            .extensions_str()
            .first()
            .copied()
            .unwrap_or("img");
        let file_name = format!("{name}.{extension}");
        let embed = serenity::CreateEmbed::default()
            .title(format!("🎨 {name}"))
            .color(0x00F1_C40F)
            .attachment(file_name.clone());

        ctx.send(
            poise::CreateReply::default()
                .embed(embed)
                .attachment(serenity::CreateAttachment::bytes(bytes, file_name)),
        )
        .await?;
        Ok(())
    }

}

// Re-export all commands
pub use inner::*;
