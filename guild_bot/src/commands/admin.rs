use crate::startup::sync_commands;
use crate::Context;
use anyhow::{bail, Context as _, Result};
use command_config::ConfigStoreError;
use command_sync::SyncReport;
use serde_json::Value;
use std::path::Path;
use utils::command_handler_wrapper;

const MAX_COMMAND_NAME_LEN: usize = 32;
const LISTED_BACKUPS: usize = 10;

fn describe(report: &SyncReport) -> String {
    let mut text = format!("Synced commands for {} guilds.", report.synced.len());
    if !report.missing.is_empty() {
        text += &format!("\nGuilds not found: {:?}", report.missing);
    }
    if !report.failed.is_empty() {
        text += &format!("\nGuilds that failed: {:?}", report.failed);
    }
    text
}

async fn run_sync(ctx: Context<'_>) -> Result<String> {
    let report = sync_commands(
        ctx.serenity_context(),
        &ctx.framework().options().commands,
        &ctx.data().settings,
    )
    .await?;
    Ok(describe(&report))
}

/// Report latency and the state of the bot's services
#[poise::command(prefix_command, owners_only)]
pub async fn status(ctx: Context<'_>) -> Result<()> {
    let mut lines = vec![format!("Latency: {}ms", ctx.ping().await.as_millis())];
    lines.extend(ctx.data().service_status().await);
    ctx.say(lines.join("\n")).await?;
    Ok(())
}

/// Re-run command synchronization for every approved guild
#[poise::command(prefix_command, owners_only)]
pub async fn resync(ctx: Context<'_>) -> Result<()> {
    command_handler_wrapper!(handle_resync(ctx))
}

async fn handle_resync(ctx: Context<'_>) -> Result<()> {
    let summary = run_sync(ctx).await?;
    ctx.say(summary).await?;
    Ok(())
}

/// Replace the commands allowed in a guild, then resync
#[poise::command(prefix_command, owners_only)]
pub async fn allow(
    ctx: Context<'_>,
    #[description = "Guild to configure"] guild_id: u64,
    #[description = "Names of the commands to allow"] commands: Vec<String>,
) -> Result<()> {
    command_handler_wrapper!(handle_allow(ctx, guild_id, commands))
}

async fn handle_allow(ctx: Context<'_>, guild_id: u64, commands: Vec<String>) -> Result<()> {
    let data = ctx.data();
    let invalid: Vec<&String> = commands
        .iter()
        .filter(|name| {
            !data.validator.validate_string(
                &Value::String(name.to_string()),
                1,
                MAX_COMMAND_NAME_LEN,
            )
        })
        .collect();
    if !invalid.is_empty() {
        bail!("Invalid command names: {invalid:?}");
    }
    if !data.settings.is_approved(guild_id) {
        ctx.say(format!(
            "Warning: guild {guild_id} is not approved, its commands will not be synced"
        ))
        .await?;
    }

    data.settings
        .update_command_config(&guild_id.to_string(), commands.clone())
        .await
        .context("updating the allow-list")?;
    let summary = run_sync(ctx).await.context("resyncing commands")?;
    ctx.say(format!("Allowed {commands:?} in guild {guild_id}.\n{summary}"))
        .await?;
    Ok(())
}

/// Snapshot the command config into the backup directory
#[poise::command(prefix_command, owners_only)]
pub async fn backup(ctx: Context<'_>) -> Result<()> {
    match ctx.data().settings.command_config().backup().await {
        Some(path) => ctx.say(format!("Backup created: {}", file_name(&path))).await?,
        None => ctx.say("Backup failed, check the logs").await?,
    };
    Ok(())
}

/// List the most recent command config backups
#[poise::command(prefix_command, owners_only)]
pub async fn backups(ctx: Context<'_>) -> Result<()> {
    command_handler_wrapper!(handle_backups(ctx))
}

async fn handle_backups(ctx: Context<'_>) -> Result<()> {
    let backups = ctx
        .data()
        .settings
        .command_config()
        .list_backups()
        .await
        .context("listing backups")?;
    if backups.is_empty() {
        ctx.say("No backups yet").await?;
        return Ok(());
    }
    let listing = backups
        .iter()
        .rev()
        .take(LISTED_BACKUPS)
        .map(|path| format!("- {}", file_name(path)))
        .collect::<Vec<_>>()
        .join("\n");
    ctx.say(format!("Latest backups:\n{listing}")).await?;
    Ok(())
}

/// Restore the command config from a backup file, then resync
#[poise::command(prefix_command, owners_only)]
pub async fn restore(
    ctx: Context<'_>,
    #[description = "Backup file name"] file: String,
) -> Result<()> {
    command_handler_wrapper!(handle_restore(ctx, file))
}

async fn handle_restore(ctx: Context<'_>, file: String) -> Result<()> {
    if !is_bare_file_name(&file) {
        bail!("Expected a bare backup file name, got {file}");
    }
    let store = ctx.data().settings.command_config();
    let path = store.backup_dir().join(&file);
    match store.restore(&path).await {
        Ok(true) => {
            let summary = run_sync(ctx).await.context("resyncing commands")?;
            ctx.say(format!("Restored {file}.\n{summary}")).await?;
        }
        Ok(false) => {
            ctx.say(format!("{file} is not a valid command config, nothing changed"))
                .await?;
        }
        Err(ConfigStoreError::BackupNotFound(_)) => {
            ctx.say(format!("No backup named {file}")).await?;
        }
        Err(e) => return Err(anyhow::Error::new(e).context("restoring backup")),
    }
    Ok(())
}

fn is_bare_file_name(name: &str) -> bool {
    Path::new(name).file_name().and_then(|n| n.to_str()) == Some(name)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}
