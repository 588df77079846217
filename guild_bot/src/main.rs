use anyhow::{Context as _, Result};
use poise::serenity_prelude as serenity;
use poise::PrefixFrameworkOptions;
use serenity::GatewayIntents;
use settings::settings::{COMMAND_PREFIX, LOG_FILE};
use settings::{Environment, Settings};
use std::process::ExitCode;

mod commands;
mod container;
mod events;
mod startup;

pub use container::Data;

pub type Error = anyhow::Error;
pub type Context<'a> = poise::Context<'a, Data, Error>;

async fn on_error(error: poise::FrameworkError<'_, Data, Error>) {
    match error {
        poise::FrameworkError::Setup { error, .. } => {
            tracing::error!("Failed to start bot: {error:#}")
        }
        poise::FrameworkError::Command { error, ctx, .. } => {
            tracing::error!("Error in command `{}`: {error:#}", ctx.command().name);
            if let Err(e) = ctx.say(error.to_string()).await {
                tracing::error!("Failed to report command error: {e}");
            }
        }
        error => {
            if let Err(e) = poise::builtins::on_error(error).await {
                tracing::error!("Error while handling error: {e}")
            }
        }
    }
}

async fn run(env: Environment) -> Result<()> {
    tracing::info!("Loading configuration...");
    let settings = Settings::from_environment(env)
        .await
        .context("Configuration error")?;
    tracing::info!("Configuration loaded successfully");

    let data = Data::build(settings).await?;
    let token = data.settings.token().to_string();
    let prefix = data.settings.get_or(COMMAND_PREFIX, "/");
    let owners = data
        .settings
        .admin_user_ids()
        .iter()
        .copied()
        .map(serenity::UserId::new)
        .collect();

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: commands::all(),
            prefix_options: PrefixFrameworkOptions {
                prefix: Some(prefix),
                ..Default::default()
            },
            owners,
            on_error: |error| Box::pin(on_error(error)),
            event_handler: |ctx, event, framework, data| {
                Box::pin(events::event_handler(ctx, event, framework, data))
            },
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            Box::pin(async move {
                startup::on_ready(ctx, ready, &framework.options().commands, &data).await;
                Ok(data)
            })
        })
        .build();

    let intents = GatewayIntents::non_privileged()
        | GatewayIntents::MESSAGE_CONTENT
        | GatewayIntents::GUILD_MEMBERS;

    serenity::ClientBuilder::new(token, intents)
        .framework(framework)
        .await
        .context("creating gateway client")?
        .start()
        .await
        .context("running gateway client")?;
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let env = Environment::load();
    if let Err(e) = utils::logging::init(env.get_or(LOG_FILE, "app.log")) {
        eprintln!("Failed to set up logging: {e}");
    }

    match run(env).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
