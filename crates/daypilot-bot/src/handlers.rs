use chrono::NaiveDate;
use tracing::error;

use daypilot_core::{Category, Settings};
use daypilot_store::{NoteRepo, StoreError, TaskRepo};

use crate::commands::{parse_task_id, Command};
use crate::format;

/// Outcome of one command dispatch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Reply {
    /// Say nothing. Unauthorized traffic outside start/help ends here.
    Silent,
    Text(String),
}

/// Store handles and settings shared by every handler. Built once at
/// startup; no ambient globals.
pub struct AppCore {
    pub settings: Settings,
    pub tasks: TaskRepo,
    pub notes: NoteRepo,
}

const GENERIC_FAILURE: &str = "Something went wrong. Try again in a moment.";

/// Dispatch one command: authorization guard, then validate, store call,
/// formatted reply. A failing store call is logged and surfaced as a
/// generic reply; it never escapes to the receive loop.
pub fn execute(cmd: &Command, chat_id: i64, today: NaiveDate, core: &AppCore) -> Reply {
    if chat_id != core.settings.chat_id {
        return match cmd {
            Command::Start | Command::Help => Reply::Text("Not authorized.".to_string()),
            _ => Reply::Silent,
        };
    }

    match cmd {
        Command::Start | Command::Help => Reply::Text(format::help_text()),

        Command::List => match core.tasks.list_for(today) {
            Ok(tasks) => Reply::Text(format::task_list(&tasks)),
            Err(e) => failure("list", &e),
        },

        Command::Add(title) => {
            let title = title.trim();
            if title.is_empty() {
                return Reply::Text("Usage: /add <title>".to_string());
            }
            match core.tasks.add(today, title, Category::Dynamic, "", None) {
                Ok(task) => Reply::Text(format!("Added: *{}* (ID: {})", task.title, task.id)),
                Err(e) => failure("add", &e),
            }
        }

        Command::Done(arg) => match parse_task_id(arg) {
            None => Reply::Text("Usage: /done <id>".to_string()),
            Some(id) => match core.tasks.mark_done(today, id) {
                Ok(Some(task)) => Reply::Text(format!("Done: *{}*", task.title)),
                Ok(None) => Reply::Text("Task not found.".to_string()),
                Err(e) => failure("done", &e),
            },
        },

        Command::Undone(arg) => match parse_task_id(arg) {
            None => Reply::Text("Usage: /undone <id>".to_string()),
            Some(id) => match core.tasks.mark_undone(today, id) {
                Ok(Some(task)) => Reply::Text(format!("Not done: *{}*", task.title)),
                Ok(None) => Reply::Text("Task not found.".to_string()),
                Err(e) => failure("undone", &e),
            },
        },

        Command::Delete(arg) => match parse_task_id(arg) {
            None => Reply::Text("Usage: /delete <id>".to_string()),
            Some(id) => match core.tasks.delete(today, id) {
                Ok(true) => Reply::Text(format!("Task {id} deleted.")),
                Ok(false) => Reply::Text("Task not found.".to_string()),
                Err(e) => failure("delete", &e),
            },
        },

        Command::Stats => match core.tasks.stats_for(today) {
            Ok(stats) => Reply::Text(format::stats(&stats)),
            Err(e) => failure("stats", &e),
        },

        Command::Init => match core.tasks.seed_defaults(today) {
            Ok(created) if created.is_empty() => {
                Reply::Text("Tasks already exist for today.".to_string())
            }
            Ok(created) => Reply::Text(format!(
                "{} default tasks created.\nUse /list to see them.",
                created.len()
            )),
            Err(e) => failure("init", &e),
        },

        Command::Note(text) => {
            let text = text.trim();
            if text.is_empty() {
                match core.notes.get(today) {
                    Ok(Some(note)) => Reply::Text(format!("Current note: {note}")),
                    Ok(None) => Reply::Text("No note yet. Usage: /note <text>".to_string()),
                    Err(e) => failure("note", &e),
                }
            } else {
                match core.notes.set(today, text) {
                    Ok(_) => Reply::Text("Note saved.".to_string()),
                    Err(e) => failure("note", &e),
                }
            }
        }
    }
}

fn failure(op: &str, err: &StoreError) -> Reply {
    error!(op, error = %err, "store call failed");
    Reply::Text(GENERIC_FAILURE.to_string())
}

#[cfg(test)]
mod tests {
    use daypilot_store::Database;

    use super::*;

    const AUTHORIZED: i64 = 42;

    fn fixture() -> (AppCore, NaiveDate) {
        let db = Database::in_memory().unwrap();
        let core = AppCore {
            settings: Settings {
                bot_token: "token".to_string(),
                chat_id: AUTHORIZED,
                database_path: ":memory:".into(),
                timezone: chrono_tz::Europe::Paris,
                reminder_hour: 21,
                reminder_minute: 0,
            },
            tasks: TaskRepo::new(db.clone()),
            notes: NoteRepo::new(db),
        };
        (core, NaiveDate::from_ymd_opt(2025, 3, 10).unwrap())
    }

    fn text(reply: Reply) -> String {
        match reply {
            Reply::Text(t) => t,
            Reply::Silent => panic!("expected a text reply"),
        }
    }

    #[test]
    fn add_done_list_flow() {
        let (core, today) = fixture();

        let added = text(execute(
            &Command::Add("Buy milk".to_string()),
            AUTHORIZED,
            today,
            &core,
        ));
        assert!(added.contains("Buy milk"));
        let id: i64 = added
            .chars()
            .filter(|c| c.is_ascii_digit())
            .collect::<String>()
            .parse()
            .unwrap();

        let done = text(execute(
            &Command::Done(id.to_string()),
            AUTHORIZED,
            today,
            &core,
        ));
        assert!(done.contains("Buy milk"));

        let listed = text(execute(&Command::List, AUTHORIZED, today, &core));
        assert!(listed.contains("*Dynamic:*"));
        assert!(listed.contains(&format!("[x] {id}. Buy milk")));
    }

    #[test]
    fn init_twice_reports_existing() {
        let (core, today) = fixture();

        let first = text(execute(&Command::Init, AUTHORIZED, today, &core));
        assert!(first.contains("created"));

        let count_after_first = core.tasks.list_for(today).unwrap().len();
        let second = text(execute(&Command::Init, AUTHORIZED, today, &core));
        assert!(second.contains("already exist"));
        assert_eq!(core.tasks.list_for(today).unwrap().len(), count_after_first);
    }

    #[test]
    fn unauthorized_sender_gets_silence() {
        let (core, today) = fixture();
        core.tasks
            .add(today, "secret", Category::Dynamic, "", None)
            .unwrap();

        for cmd in [
            Command::List,
            Command::Add("x".to_string()),
            Command::Done("1".to_string()),
            Command::Stats,
        ] {
            assert_eq!(execute(&cmd, 999, today, &core), Reply::Silent);
        }
    }

    #[test]
    fn unauthorized_start_gets_explicit_refusal() {
        let (core, today) = fixture();
        let reply = text(execute(&Command::Start, 999, today, &core));
        assert_eq!(reply, "Not authorized.");
    }

    #[test]
    fn malformed_id_gets_usage_reply() {
        let (core, today) = fixture();
        for arg in ["", "abc", "1x"] {
            let reply = text(execute(
                &Command::Done(arg.to_string()),
                AUTHORIZED,
                today,
                &core,
            ));
            assert_eq!(reply, "Usage: /done <id>");
        }
    }

    #[test]
    fn add_without_title_gets_usage_reply() {
        let (core, today) = fixture();
        let reply = text(execute(
            &Command::Add(String::new()),
            AUTHORIZED,
            today,
            &core,
        ));
        assert_eq!(reply, "Usage: /add <title>");
    }

    #[test]
    fn done_on_unknown_id_reports_not_found() {
        let (core, today) = fixture();
        let reply = text(execute(
            &Command::Done("123".to_string()),
            AUTHORIZED,
            today,
            &core,
        ));
        assert_eq!(reply, "Task not found.");
    }

    #[test]
    fn yesterdays_id_reports_not_found() {
        let (core, today) = fixture();
        let yesterday = today.pred_opt().unwrap();
        let stale = core
            .tasks
            .add(yesterday, "old", Category::Dynamic, "", None)
            .unwrap();

        let reply = text(execute(
            &Command::Delete(stale.id.to_string()),
            AUTHORIZED,
            today,
            &core,
        ));
        assert_eq!(reply, "Task not found.");
    }

    #[test]
    fn note_round_trip() {
        let (core, today) = fixture();

        let empty = text(execute(&Command::Note(String::new()), AUTHORIZED, today, &core));
        assert!(empty.contains("No note yet"));

        let saved = text(execute(
            &Command::Note("Good day".to_string()),
            AUTHORIZED,
            today,
            &core,
        ));
        assert_eq!(saved, "Note saved.");

        let shown = text(execute(&Command::Note(String::new()), AUTHORIZED, today, &core));
        assert!(shown.contains("Good day"));
    }

    #[test]
    fn stats_on_empty_day() {
        let (core, today) = fixture();
        let reply = text(execute(&Command::Stats, AUTHORIZED, today, &core));
        assert!(reply.contains("Total: 0"));
        assert!(reply.contains("Progress: 0%"));
    }
}
