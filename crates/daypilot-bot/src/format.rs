use teloxide::utils::command::BotCommands;

use daypilot_core::Category;
use daypilot_store::{TaskRow, TaskStats};

use crate::commands::Command;

pub fn help_text() -> String {
    format!("*Daypilot* — daily task tracker\n\n{}", Command::descriptions())
}

/// Render the day's tasks grouped by category: Recovery, Core, Dynamic,
/// Denial, then any unknown stored label in encounter order.
pub fn task_list(tasks: &[TaskRow]) -> String {
    if tasks.is_empty() {
        return "No tasks for today. Use /init or /add to create some.".to_string();
    }

    let mut groups: Vec<(Category, Vec<&TaskRow>)> = Vec::new();
    for task in tasks {
        match groups.iter_mut().find(|(c, _)| *c == task.category) {
            Some((_, bucket)) => bucket.push(task),
            None => groups.push((task.category.clone(), vec![task])),
        }
    }
    // Stable sort keeps encounter order within the same rank.
    groups.sort_by_key(|(category, _)| category.display_rank());

    let mut lines = vec!["*Today's tasks:*".to_string()];
    for (category, bucket) in groups {
        lines.push(format!("\n*{category}:*"));
        for task in bucket {
            let mark = if task.completed { "x" } else { " " };
            lines.push(format!("  [{mark}] {}. {}", task.id, task.title));
        }
    }
    lines.join("\n")
}

pub fn stats(stats: &TaskStats) -> String {
    format!(
        "*Today's stats:*\n\nTotal: {}\nDone: {}\nRemaining: {}\nProgress: {}%",
        stats.total,
        stats.completed,
        stats.pending,
        stats.percent()
    )
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn task(id: i64, title: &str, category: Category, completed: bool) -> TaskRow {
        TaskRow {
            id,
            title: title.to_string(),
            category,
            justification: String::new(),
            impact: None,
            task_date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            completed,
            completed_at: completed.then(|| "2025-03-10T12:00:00Z".to_string()),
        }
    }

    #[test]
    fn empty_list_hints_at_init() {
        assert!(task_list(&[]).contains("/init"));
    }

    #[test]
    fn groups_follow_display_order() {
        let tasks = vec![
            task(1, "skip dessert", Category::Denial, false),
            task(2, "deep work", Category::Core, false),
            task(3, "errand run", Category::Other("Errand".to_string()), false),
            task(4, "sleep", Category::Recovery, true),
        ];
        let rendered = task_list(&tasks);

        let recovery = rendered.find("*Recovery:*").unwrap();
        let core = rendered.find("*Core:*").unwrap();
        let denial = rendered.find("*Denial:*").unwrap();
        let errand = rendered.find("*Errand:*").unwrap();
        assert!(recovery < core && core < denial && denial < errand);
    }

    #[test]
    fn checkbox_marks_completion() {
        let tasks = vec![
            task(1, "done thing", Category::Dynamic, true),
            task(2, "open thing", Category::Dynamic, false),
        ];
        let rendered = task_list(&tasks);
        assert!(rendered.contains("[x] 1. done thing"));
        assert!(rendered.contains("[ ] 2. open thing"));
    }

    #[test]
    fn stats_renders_counts_and_percent() {
        let rendered = stats(&TaskStats {
            total: 3,
            completed: 2,
            pending: 1,
        });
        assert!(rendered.contains("Total: 3"));
        assert!(rendered.contains("Done: 2"));
        assert!(rendered.contains("Remaining: 1"));
        assert!(rendered.contains("Progress: 67%"));
    }

    #[test]
    fn help_lists_every_command() {
        let help = help_text();
        for name in ["/list", "/add", "/done", "/undone", "/delete", "/stats", "/init", "/note"] {
            assert!(help.contains(name), "help should mention {name}");
        }
    }
}
