use std::sync::Arc;

use anyhow::Context;
use teloxide::Bot;
use tracing::info;

use daypilot_bot::handlers::AppCore;
use daypilot_bot::BotContext;
use daypilot_core::{Clock, Settings};
use daypilot_store::{Database, NoteRepo, TaskRepo};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("starting daypilot");

    let settings = Settings::from_env().context("configuration error")?;

    // Connection probe: a bad database path fails here, before any
    // network traffic or scheduling happens.
    let db = Database::open(&settings.database_path).with_context(|| {
        format!(
            "cannot open database at {}",
            settings.database_path.display()
        )
    })?;

    let clock = Clock::new(settings.timezone);
    let bot = Bot::new(settings.bot_token.clone());
    info!(
        timezone = %settings.timezone,
        hour = settings.reminder_hour,
        minute = settings.reminder_minute,
        "reminder configured"
    );

    let core = AppCore {
        tasks: TaskRepo::new(db.clone()),
        notes: NoteRepo::new(db),
        settings,
    };
    let ctx = Arc::new(BotContext { bot, core, clock });

    daypilot_bot::run(ctx).await.context("bot runtime failed")?;
    Ok(())
}
