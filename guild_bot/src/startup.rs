use crate::{Data, Error};
use anyhow::Result;
use command_sync::{GuildCommandSynchronizer, PoiseRegistry, SyncReport};
use poise::serenity_prelude as serenity;
use serenity::{ActivityData, OnlineStatus};
use settings::Settings;

/// Brings the remote command tree in line with the allow-lists of every
/// approved guild.
pub async fn sync_commands(
    ctx: &serenity::Context,
    commands: &[poise::Command<Data, Error>],
    settings: &Settings,
) -> Result<SyncReport> {
    let registry = PoiseRegistry::new(ctx, commands);
    let mut synchronizer = GuildCommandSynchronizer::new(settings.command_config(), registry);
    synchronizer.sync_all(settings.approved_guilds()).await
}

pub async fn on_ready(
    ctx: &serenity::Context,
    ready: &serenity::Ready,
    commands: &[poise::Command<Data, Error>],
    data: &Data,
) {
    tracing::info!("Logged in as {} ({})", ready.user.name, ready.user.id);

    match sync_commands(ctx, commands, &data.settings).await {
        Ok(report) => tracing::info!(
            "Synced {} guilds ({} missing, {} failed)",
            report.synced.len(),
            report.missing.len(),
            report.failed.len()
        ),
        Err(e) => tracing::error!("Command synchronization failed: {e:#}"),
    }

    for line in data.service_status().await {
        tracing::info!("{line}");
    }

    ctx.set_presence(
        Some(ActivityData::playing("/help #RTFM")),
        OnlineStatus::Online,
    );
    tracing::info!("Bot is ready");
}
