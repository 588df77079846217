use crate::registry::{CommandRegistry, GuildHandle};
use anyhow::{Context as _, Result};
use async_trait::async_trait;
use poise::serenity_prelude as serenity;
use rustc_hash::FxHashMap;
use serenity::{CreateCommand, GuildId};

/// [`CommandRegistry`] backed by Discord's application command endpoints,
/// with the bot's poise commands as the catalog.
pub struct PoiseRegistry {
    ctx: serenity::Context,
    catalog: FxHashMap<String, CreateCommand>,
    guild_pending: FxHashMap<u64, Vec<CreateCommand>>,
    global_pending: Vec<CreateCommand>,
}

impl PoiseRegistry {
    /// Only commands with an application command form (slash or context
    /// menu) end up in the catalog; prefix-only commands are never
    /// registered.
    pub fn new<U, E>(ctx: &serenity::Context, commands: &[poise::Command<U, E>]) -> Self {
        let catalog = commands
            .iter()
            .filter_map(|command| {
                let definition = command
                    .create_as_slash_command()
                    .or_else(|| command.create_as_context_menu_command())?;
                Some((command.name.clone(), definition))
            })
            .collect();
        Self {
            ctx: ctx.clone(),
            catalog,
            guild_pending: Default::default(),
            global_pending: vec![],
        }
    }
}

#[async_trait]
impl CommandRegistry for PoiseRegistry {
    type Definition = CreateCommand;

    async fn resolve_guild(&self, guild_id: u64) -> Option<GuildHandle> {
        if guild_id == 0 {
            return None;
        }
        let id = GuildId::new(guild_id);
        let cached = id.to_guild_cached(&self.ctx).map(|guild| guild.name.clone());
        if let Some(name) = cached {
            return Some(GuildHandle { id: guild_id, name });
        }
        match id.to_partial_guild(&self.ctx).await {
            Ok(guild) => Some(GuildHandle {
                id: guild_id,
                name: guild.name,
            }),
            Err(e) => {
                tracing::debug!("Fetching guild {guild_id} failed: {e}");
                None
            }
        }
    }

    fn clear_guild_commands(&mut self, guild_id: u64) {
        self.guild_pending.insert(guild_id, vec![]);
    }

    fn command_definition(&self, name: &str) -> Option<CreateCommand> {
        self.catalog.get(name).cloned()
    }

    fn add_guild_command(&mut self, guild_id: u64, definition: CreateCommand) {
        self.guild_pending
            .entry(guild_id)
            .or_default()
            .push(definition);
    }

    async fn sync_guild(&mut self, guild_id: u64) -> Result<usize> {
        let commands = self.guild_pending.remove(&guild_id).unwrap_or_default();
        let registered = GuildId::new(guild_id)
            .set_commands(&self.ctx.http, commands)
            .await
            .with_context(|| format!("registering commands for guild {guild_id}"))?;
        Ok(registered.len())
    }

    fn clear_global_commands(&mut self) {
        self.global_pending.clear();
    }

    async fn sync_global(&mut self) -> Result<()> {
        let commands = std::mem::take(&mut self.global_pending);
        serenity::Command::set_global_commands(&self.ctx.http, commands)
            .await
            .context("registering global commands")?;
        Ok(())
    }
}
