use crate::Context;
use anyhow::Result;

/// Check the bot's gateway latency
#[poise::command(slash_command, prefix_command)]
pub async fn ping(ctx: Context<'_>) -> Result<()> {
    let latency = ctx.ping().await;
    ctx.say(format!("Pong! In {}ms", latency.as_millis()))
        .await?;
    Ok(())
}
