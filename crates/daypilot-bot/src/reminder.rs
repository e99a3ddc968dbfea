use std::sync::Arc;

use chrono::{DateTime, TimeZone};
use chrono_tz::Tz;
use teloxide::prelude::*;
use teloxide::types::{ChatId, ParseMode};
use tracing::{debug, info, warn};

use daypilot_store::TaskRow;

use crate::BotContext;

/// Daily reminder loop. Sleeps until the next configured wall-clock
/// occurrence, fires one trigger, repeats. Nothing in here may crash the
/// loop: query and delivery failures are logged and dropped.
pub async fn run(ctx: Arc<BotContext>) {
    let hour = ctx.core.settings.reminder_hour;
    let minute = ctx.core.settings.reminder_minute;
    info!(hour, minute, tz = %ctx.clock.tz(), "reminder job started");

    loop {
        let now = ctx.clock.now();
        let at = next_occurrence(now, hour, minute);
        let wait = (at - now).to_std().unwrap_or_default();
        debug!(at = %at, "sleeping until next reminder");
        tokio::time::sleep(wait).await;

        trigger(&ctx).await;
    }
}

/// One reminder trigger: query unfinished tasks, send the summary if any
/// remain.
async fn trigger(ctx: &BotContext) {
    let today = ctx.clock.today();
    let tasks = match ctx.core.tasks.incomplete_for(today) {
        Ok(tasks) => tasks,
        Err(e) => {
            warn!(error = %e, "reminder query failed");
            return;
        }
    };

    let Some(text) = compose(
        &tasks,
        ctx.core.settings.reminder_hour,
        ctx.core.settings.reminder_minute,
    ) else {
        info!("all tasks done, no reminder needed");
        return;
    };

    match ctx
        .bot
        .send_message(ChatId(ctx.core.settings.chat_id), text)
        .parse_mode(ParseMode::Markdown)
        .await
    {
        Ok(_) => info!(count = tasks.len(), "reminder sent"),
        Err(e) => warn!(error = %e, "reminder delivery failed"),
    }
}

/// Build the reminder body, or None when nothing is unfinished.
pub fn compose(tasks: &[TaskRow], hour: u32, minute: u32) -> Option<String> {
    if tasks.is_empty() {
        return None;
    }

    let mut lines = vec![
        format!("*{hour:02}:{minute:02} reminder*"),
        String::new(),
        format!("You have {} unfinished task(s):", tasks.len()),
    ];
    for task in tasks {
        lines.push(format!("  - {}", task.title));
    }
    lines.push(String::new());
    lines.push("Use /done <id> to check one off.".to_string());
    Some(lines.join("\n"))
}

/// Next wall-clock occurrence of hour:minute strictly after `now`.
/// A time erased by a DST gap rolls to the next day; an ambiguous time
/// resolves to its earlier instant. The zone itself owns DST handling.
pub fn next_occurrence(now: DateTime<Tz>, hour: u32, minute: u32) -> DateTime<Tz> {
    let tz = now.timezone();
    let mut date = now.date_naive();
    for _ in 0..4 {
        if let Some(at) = date
            .and_hms_opt(hour, minute, 0)
            .and_then(|local| tz.from_local_datetime(&local).earliest())
        {
            if at > now {
                return at;
            }
        }
        date = date.succ_opt().expect("calendar overflow");
    }
    unreachable!("no valid trigger time within four days");
}
