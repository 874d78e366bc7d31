use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use twilight_gateway::{EventTypeFlags, Intents, Shard, ShardId, StreamExt as _};
use twilight_http::Client;
use twilight_model::gateway::event::Event;
use twilight_standby::Standby;

use rustls::crypto::ring::default_provider;
use sqlx::postgres::PgPoolOptions;

use steward_commands::{handle_message, handle_reaction};
use steward_core::{Config, Context};
use steward_database::{Database, MIGRATOR, state::DataStore};
use steward_utils::{
    transport::{InboundMessage, ReactionEvent, ReactionKind},
    twilight::TwilightTransport,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("failed to install rustls ring provider"))?;

    // Reads .env as well as the process environment
    let config = Arc::new(Config::from_env()?);

    // Create a single shared HTTP Client
    let http = Arc::new(Client::new(config.discord_token.clone()));
    let standby = Arc::new(Standby::new());

    let db_pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;
    MIGRATOR.run(&db_pool).await?;
    info!("PostgreSQL connection established.");
    let store = Arc::new(DataStore::new(Arc::new(Database::new(db_pool))));

    let bot_user = http.current_user().await?.model().await?;
    let transport = Arc::new(TwilightTransport::new(Arc::clone(&http), Arc::clone(&standby)));
    let ctx = Context::new(transport, store, Arc::clone(&config), bot_user.id);

    // Reactions drive menus, prompts and role reactions
    let intents = Intents::GUILDS
        | Intents::GUILD_MESSAGES
        | Intents::MESSAGE_CONTENT
        | Intents::GUILD_MESSAGE_REACTIONS;

    let mut shard = Shard::new(ShardId::new(0, 1), config.discord_token.clone(), intents);

    info!(user = %bot_user.name, "Steward is connecting...");

    while let Some(item) = shard.next_event(EventTypeFlags::all()).await {
        let event = match item {
            Ok(event) => event,
            Err(source) => {
                error!(?source, "gateway event stream error");
                continue;
            }
        };

        // Waiting prompts and menus get first look at every event
        standby.process(&event);

        match event {
            Event::Ready(_) => {
                info!("Steward is ready.");
            }

            Event::MessageCreate(msg) => {
                let ctx = ctx.clone();
                let message = InboundMessage::from(&msg.0);
                tokio::spawn(async move {
                    if let Err(source) = handle_message(ctx, message).await {
                        error!(?source, "message handler failed");
                    }
                });
            }
            Event::ReactionAdd(reaction) => {
                spawn_reaction(&ctx, ReactionEvent::from_gateway(ReactionKind::Added, &reaction.0));
            }
            Event::ReactionRemove(reaction) => {
                spawn_reaction(
                    &ctx,
                    ReactionEvent::from_gateway(ReactionKind::Removed, &reaction.0),
                );
            }
            _ => {} // Ignore unused events
        }
    }

    Ok(())
}

fn spawn_reaction(ctx: &Context, event: ReactionEvent) {
    let ctx = ctx.clone();
    tokio::spawn(async move {
        if let Err(source) = handle_reaction(ctx, event).await {
            error!(?source, "reaction handler failed");
        }
    });
}
