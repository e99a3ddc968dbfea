pub mod commands;
pub mod format;
pub mod handlers;
pub mod reminder;

use std::sync::Arc;

use teloxide::dptree;
use teloxide::prelude::*;
use teloxide::types::ParseMode;
use teloxide::utils::command::BotCommands;
use tracing::info;

use daypilot_core::Clock;

use crate::commands::Command;
use crate::handlers::{execute, AppCore, Reply};

/// Process-scoped context: transport, store handles, clock. Built once at
/// startup and passed explicitly to the dispatcher and the reminder job.
pub struct BotContext {
    pub bot: Bot,
    pub core: AppCore,
    pub clock: Clock,
}

/// Register the command list, start the reminder job, and run the receive
/// loop until the process is terminated.
pub async fn run(ctx: Arc<BotContext>) -> Result<(), teloxide::RequestError> {
    ctx.bot.set_my_commands(Command::bot_commands()).await?;

    tokio::spawn(reminder::run(ctx.clone()));

    let handler = Update::filter_message()
        .filter_command::<Command>()
        .endpoint(answer);

    info!("entering receive loop");
    Dispatcher::builder(ctx.bot.clone(), handler)
        .dependencies(dptree::deps![ctx])
        // Non-command chatter is ignored.
        .default_handler(|_| async {})
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}

async fn answer(
    bot: Bot,
    msg: Message,
    cmd: Command,
    ctx: Arc<BotContext>,
) -> ResponseResult<()> {
    let today = ctx.clock.today();
    match execute(&cmd, msg.chat.id.0, today, &ctx.core) {
        Reply::Silent => {}
        Reply::Text(text) => {
            bot.send_message(msg.chat.id, text)
                .parse_mode(ParseMode::Markdown)
                .await?;
        }
    }
    Ok(())
}
