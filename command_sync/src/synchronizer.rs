use crate::registry::{CommandRegistry, GuildHandle};
use anyhow::{Context, Result};
use command_config::CommandConfigStore;

/// Outcome of one synchronization run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SyncReport {
    /// Guilds whose commands were pushed, with the number registered.
    pub synced: Vec<(u64, usize)>,
    /// Approved guilds the gateway does not know about.
    pub missing: Vec<u64>,
    /// Guilds whose sync failed; the run carried on without them.
    pub failed: Vec<u64>,
}

/// Makes the remote command tree match the local allow-lists: each approved
/// guild gets exactly its configured commands and nothing stays registered
/// globally.
pub struct GuildCommandSynchronizer<'a, R> {
    store: &'a CommandConfigStore,
    registry: R,
}

impl<'a, R: CommandRegistry> GuildCommandSynchronizer<'a, R> {
    pub fn new(store: &'a CommandConfigStore, registry: R) -> Self {
        Self { store, registry }
    }

    pub fn into_registry(self) -> R {
        self.registry
    }

    /// Syncs every guild in `approved`, then clears the global commands.
    ///
    /// A guild that cannot be resolved or synced is logged and skipped. A
    /// failure to clear the global commands is returned.
    pub async fn sync_all(&mut self, approved: &[u64]) -> Result<SyncReport> {
        tracing::info!("Starting command synchronization...");
        let mut report = SyncReport::default();

        for &guild_id in approved {
            let Some(guild) = self.registry.resolve_guild(guild_id).await else {
                tracing::warn!("Could not find guild with ID {guild_id}");
                report.missing.push(guild_id);
                continue;
            };
            match self.sync_guild(&guild).await {
                Ok(count) => report.synced.push((guild_id, count)),
                Err(e) => {
                    tracing::error!("Failed to sync commands for guild {}: {e:#}", guild.name);
                    report.failed.push(guild_id);
                }
            }
        }

        self.registry.clear_global_commands();
        self.registry
            .sync_global()
            .await
            .context("clearing global commands")?;
        tracing::info!("Global commands cleared");
        tracing::info!("Command synchronization complete");
        Ok(report)
    }

    /// Replaces the commands of one guild with its allow-list. Names without
    /// a matching command in the catalog are skipped.
    pub async fn sync_guild(&mut self, guild: &GuildHandle) -> Result<usize> {
        tracing::info!("Syncing commands for guild: {}", guild.name);
        let allowed = self
            .store
            .commands_for_guild(&guild.id.to_string())
            .await
            .context("reading allow-list")?;

        self.registry.clear_guild_commands(guild.id);
        if allowed.is_empty() {
            tracing::info!("No commands configured for guild {}", guild.name);
            return self.registry.sync_guild(guild.id).await;
        }

        for name in &allowed {
            match self.registry.command_definition(name) {
                Some(definition) => self.registry.add_guild_command(guild.id, definition),
                None => tracing::debug!("Skipping unknown command {name} for guild {}", guild.id),
            }
        }

        let count = self.registry.sync_guild(guild.id).await?;
        tracing::info!("Synced {count} commands for guild {}", guild.name);
        Ok(count)
    }
}
