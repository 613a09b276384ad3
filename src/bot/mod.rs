//! Bot layer - Discord-specific interface and command handlers
//!
//! Each command stands in for one of the shop's forms: it collects the field
//! values, calls into [`crate::core`], and turns any failure into a reply.

/// Discord command implementations (production, roster, absence, work orders, ...)
pub mod commands;
/// Discord interaction handlers (autocomplete, etc.)
pub mod handlers;

use crate::{
    assets::{DriveImageSource, ImageResolver, LocalImageSource},
    config::{AppConfig, StorageConfig, settings::drive_access_token},
    core::designs::DesignCatalog,
    drive::DriveClient,
    errors::{Error, Result},
    print::{ArtifactStore, DriveArtifactStore, LocalArtifactStore},
};
use poise::serenity_prelude as serenity;
use sea_orm::DatabaseConnection;
use tracing::{error, info, warn};

/// Shared data available to all bot commands.
pub struct BotData {
    /// Database connection holding the sheets
    pub database: DatabaseConnection,
    /// Lookup chain for design images
    pub images: ImageResolver,
    /// Where printed work orders are kept
    pub artifacts: Box<dyn ArtifactStore>,
    /// Where the design list comes from
    pub designs: DesignCatalog,
}

impl BotData {
    /// Wires the storage backends chosen in `config`.
    ///
    /// # Errors
    /// Fails when a Drive backend is configured but `DRIVE_ACCESS_TOKEN` is
    /// missing, or when the HTTP client cannot be built.
    pub fn from_config(database: DatabaseConnection, config: &AppConfig) -> Result<Self> {
        let drive = if config.needs_drive() {
            Some(DriveClient::new(&config.drive.api_base, drive_access_token()?)?)
        } else {
            None
        };
        let drive_client = || {
            drive.clone().ok_or_else(|| Error::Config {
                message: "Drive backend configured without a Drive client".to_string(),
            })
        };

        let (images, designs) = match &config.assets {
            StorageConfig::Local { directory } => (
                ImageResolver::new().with_source(LocalImageSource::new(directory.clone())),
                DesignCatalog::Local(directory.clone()),
            ),
            StorageConfig::Drive { folder_id } => (
                ImageResolver::new()
                    .with_source(DriveImageSource::new(drive_client()?, folder_id.clone())),
                DesignCatalog::Drive {
                    client: drive_client()?,
                    folder_id: folder_id.clone(),
                },
            ),
        };

        let artifacts: Box<dyn ArtifactStore> = match &config.artifacts {
            StorageConfig::Local { directory } => Box::new(LocalArtifactStore::new(directory.clone())),
            StorageConfig::Drive { folder_id } => {
                Box::new(DriveArtifactStore::new(drive_client()?, folder_id.clone()))
            }
        };

        info!("Design images from {:?}", images);
        Ok(Self {
            database,
            images,
            artifacts,
            designs,
        })
    }
}

async fn on_error(error: poise::FrameworkError<'_, BotData, Error>) {
    match error {
        poise::FrameworkError::Command { error, ctx, .. } => {
            if error.is_warning() {
                warn!("Command '{}' rejected: {}", ctx.command().name, error);
            } else {
                error!("Command '{}' failed: {}", ctx.command().name, error);
            }
            if let Err(e) = ctx.say(error.user_message()).await {
                error!("Failed to send error reply: {}", e);
            }
        }
        other => {
            if let Err(e) = poise::builtins::on_error(other).await {
                error!("Error while handling error: {}", e);
            }
        }
    }
}

/// Registers the commands globally and runs the gateway client until it stops.
pub async fn run_bot(token: String, data: BotData) -> Result<()> {
    let options = poise::FrameworkOptions {
        commands: commands::all(),
        on_error: |error| Box::pin(on_error(error)),
        ..Default::default()
    };

    let framework = poise::Framework::builder()
        .options(options)
        .setup(|ctx, ready, framework| {
            Box::pin(async move {
                info!("Logged in as {}", ready.user.name);
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                info!("Registered {} commands", framework.options().commands.len());
                Ok(data)
            })
        })
        .build();

    let intents = serenity::GatewayIntents::non_privileged();
    let mut client = serenity::ClientBuilder::new(token, intents)
        .framework(framework)
        .await?;

    info!("Starting bot");
    client.start().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::setup_sheets;
    use std::path::PathBuf;

    #[tokio::test]
    async fn test_local_backends_need_no_drive_token() -> Result<()> {
        let db = setup_sheets().await?;
        let config: AppConfig = toml::from_str(
            r#"
            [assets]
            backend = "local"
            directory = "Estampas"

            [artifacts]
            backend = "local"
            directory = "OS"
        "#,
        )
        .unwrap();

        let data = BotData::from_config(db, &config)?;
        assert!(matches!(
            data.designs,
            DesignCatalog::Local(ref dir) if *dir == PathBuf::from("Estampas")
        ));
        assert_eq!(format!("{:?}", data.images), r#"["local directory Estampas"]"#);
        Ok(())
    }
}
