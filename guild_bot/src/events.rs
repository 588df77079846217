use crate::{Data, Error};
use anyhow::Result;
use poise::serenity_prelude as serenity;
use serenity::{CreateEmbed, CreateMessage, HttpError, Mentionable, StatusCode};
use settings::{Settings, WelcomeConfig};

pub async fn event_handler(
    ctx: &serenity::Context,
    event: &serenity::FullEvent,
    _framework: poise::FrameworkContext<'_, Data, Error>,
    data: &Data,
) -> Result<()> {
    match event {
        serenity::FullEvent::Message { new_message } if new_message.author.bot => {}
        serenity::FullEvent::GuildCreate { guild, is_new } => {
            if is_new.unwrap_or(false) {
                tracing::info!("Joined guild: {}", guild.name);
            }
            leave_if_unapproved(ctx, &data.settings, guild.id).await;
        }
        serenity::FullEvent::GuildMemberAddition { new_member } => {
            welcome_member(ctx, new_member, data).await;
        }
        _ => {}
    }
    Ok(())
}

/// Leaves `guild_id` unless it is approved. Every guild, old or new, arrives
/// through `GuildCreate` after connecting, so this is the only place guilds
/// are left.
async fn leave_if_unapproved(
    ctx: &serenity::Context,
    settings: &Settings,
    guild_id: serenity::GuildId,
) {
    if settings.is_approved(guild_id.get()) {
        return;
    }
    let name = guild_id
        .name(ctx)
        .unwrap_or_else(|| guild_id.get().to_string());
    match guild_id.leave(&ctx.http).await {
        Ok(()) => tracing::info!("Left unapproved guild: {name}"),
        Err(e) => tracing::error!("Failed to leave unapproved guild {name}: {e}"),
    }
}

async fn welcome_member(ctx: &serenity::Context, member: &serenity::Member, data: &Data) {
    let guild_id = member.guild_id.get().to_string();
    let config = data.server_config(&guild_id).await;
    let Some(welcome) = WelcomeConfig::from_guild_config(&config) else {
        return;
    };
    let Some(channel_id) = welcome.channel_id else {
        tracing::warn!("Welcome is enabled for guild {guild_id} but no channel is set");
        return;
    };

    let mut message =
        CreateMessage::new().content(welcome.render(&member.user.id.mention().to_string()));
    if let Some(embed) = welcome.embed.clone() {
        match serde_json::from_value::<serenity::Embed>(embed) {
            Ok(embed) => message = message.embed(CreateEmbed::from(embed)),
            Err(e) => tracing::warn!("Ignoring invalid welcome embed for guild {guild_id}: {e}"),
        }
    }

    match serenity::ChannelId::new(channel_id)
        .send_message(&ctx.http, message)
        .await
    {
        Ok(_) => tracing::info!(
            "Sent welcome message for {} in guild {guild_id}",
            member.user.name
        ),
        Err(serenity::Error::Http(HttpError::UnsuccessfulRequest(response)))
            if response.status_code == StatusCode::FORBIDDEN =>
        {
            tracing::error!("Missing permissions to send welcome message in channel {channel_id}")
        }
        Err(e) => tracing::error!("Failed to send welcome message in guild {guild_id}: {e}"),
    }
}
