use teloxide::utils::command::BotCommands;

/// Inbound bot commands, one per user-facing operation.
#[derive(BotCommands, Clone, Debug, PartialEq)]
#[command(rename_rule = "lowercase")]
pub enum Command {
    #[command(description = "show available commands")]
    Start,
    #[command(description = "show available commands")]
    Help,
    #[command(description = "list today's tasks")]
    List,
    #[command(description = "add a task: /add <title>")]
    Add(String),
    #[command(description = "mark a task done: /done <id>")]
    Done(String),
    #[command(description = "mark a task not done: /undone <id>")]
    Undone(String),
    #[command(description = "delete a task: /delete <id>")]
    Delete(String),
    #[command(description = "today's completion stats")]
    Stats,
    #[command(description = "create the default task set for today")]
    Init,
    #[command(description = "show or set today's note: /note [text]")]
    Note(String),
}

/// Validate a task-id argument: digits only, nothing else. Anything that
/// fails here gets a usage reply and no store call.
pub fn parse_task_id(arg: &str) -> Option<i64> {
    let arg = arg.trim();
    if arg.is_empty() || !arg.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    arg.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_parse() {
        let cases = [
            ("/start", Command::Start),
            ("/list", Command::List),
            ("/add Buy milk", Command::Add("Buy milk".to_string())),
            ("/done 3", Command::Done("3".to_string())),
            ("/note", Command::Note(String::new())),
        ];
        for (input, expected) in cases {
            assert_eq!(Command::parse(input, "daypilot_bot").unwrap(), expected);
        }
    }

    #[test]
    fn valid_ids() {
        assert_eq!(parse_task_id("7"), Some(7));
        assert_eq!(parse_task_id("  42  "), Some(42));
    }

    #[test]
    fn invalid_ids_rejected() {
        for arg in ["", "   ", "abc", "12x", "-3", "1.5"] {
            assert_eq!(parse_task_id(arg), None, "should reject {arg:?}");
        }
    }
}
