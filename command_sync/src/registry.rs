use anyhow::Result;
use async_trait::async_trait;

/// A guild the gateway knows about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuildHandle {
    pub id: u64,
    pub name: String,
}

/// Remote application command tree, scoped globally and per guild.
///
/// Registrations are staged locally with the `clear_*`/`add_*` methods and
/// only sent to the remote side by `sync_guild`/`sync_global`.
#[async_trait]
pub trait CommandRegistry: Send + Sync {
    /// Command description as understood by the remote side.
    type Definition: Send;

    async fn resolve_guild(&self, guild_id: u64) -> Option<GuildHandle>;

    fn clear_guild_commands(&mut self, guild_id: u64);

    /// Looks `name` up in the catalog of commands the bot implements.
    fn command_definition(&self, name: &str) -> Option<Self::Definition>;

    fn add_guild_command(&mut self, guild_id: u64, definition: Self::Definition);

    /// Pushes the staged commands of `guild_id`, returning how many were sent.
    async fn sync_guild(&mut self, guild_id: u64) -> Result<usize>;

    fn clear_global_commands(&mut self);

    async fn sync_global(&mut self) -> Result<()>;
}
