// Plain-text rendering of a task list session

use crate::slot::Slot;
use crate::store::TaskListStore;
use crate::task::Task;
use colored::Colorize;

const SHORT_ID_LEN: usize = 8;
const EMPTY_MESSAGE: &str = "No todos to show";

pub fn short_id(id: &str) -> &str {
    id.get(..SHORT_ID_LEN).unwrap_or(id)
}

pub fn render_task(task: &Task) -> String {
    let id = short_id(&task.id).dimmed();
    if task.is_completed {
        format!("[x] {}  {}", task.text.strikethrough().bright_black(), id)
    } else {
        format!("[ ] {}  {}", task.text, id)
    }
}

/// Header line, then one line per visible task
pub fn render_list<S: Slot>(store: &TaskListStore<S>) -> String {
    let counts = store.counts();
    let mut lines = vec![format!(
        "{} ({}): {} total, {} completed, {} pending",
        "Todos".bold(),
        store.filter(),
        counts.total,
        counts.completed,
        counts.pending
    )];

    let mut visible = store.visible_tasks().peekable();
    if visible.peek().is_none() {
        lines.push(EMPTY_MESSAGE.bright_black().to_string());
    }
    lines.extend(visible.map(render_task));

    lines.join("\n")
}

/// Prompt for the interactive shell: add or update mode plus the draft
pub fn render_prompt<S: Slot>(store: &TaskListStore<S>) -> String {
    match store.editing_id() {
        Some(id) => format!("{} {}> ", "update".yellow(), short_id(id)),
        None => format!("{}> ", "add".green()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slot::MemorySlot;

    fn plain() {
        colored::control::set_override(false);
    }

    #[test]
    fn test_short_id() {
        assert_eq!(short_id("0123456789abcdef"), "01234567");
        assert_eq!(short_id("abc"), "abc");
    }

    #[test]
    fn test_render_task() {
        plain();
        let task = Task {
            id: "0123456789".to_string(),
            text: "Walk dog".to_string(),
            is_completed: false,
        };
        assert_eq!(render_task(&task), "[ ] Walk dog  01234567");

        let done = Task {
            is_completed: true,
            ..task
        };
        assert_eq!(render_task(&done), "[x] Walk dog  01234567");
    }

    #[test]
    fn test_render_empty_filtered_list() {
        plain();
        let mut store = TaskListStore::open(MemorySlot::new());
        store.add_or_update("Buy milk");
        store.set_filter("completed");

        let out = render_list(&store);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "Todos (completed): 1 total, 0 completed, 1 pending");
        assert_eq!(lines[1], EMPTY_MESSAGE);
    }

    #[test]
    fn test_render_list_follows_filter() {
        plain();
        let mut store = TaskListStore::open(MemorySlot::new());
        store.add_or_update("Buy milk");
        store.add_or_update("Walk dog");
        let first = store.tasks()[0].id.clone();
        store.toggle_completed(&first);
        store.set_filter("pending");

        let out = render_list(&store);
        assert_eq!(out.lines().count(), 2);
        assert!(out.contains("[ ] Walk dog"));
        assert!(!out.contains("Buy milk"));
    }

    #[test]
    fn test_render_prompt() {
        plain();
        let mut store = TaskListStore::open(MemorySlot::new());
        assert_eq!(render_prompt(&store), "add> ");

        store.add_or_update("Draft");
        let id = store.tasks()[0].id.clone();
        store.begin_edit(&id);
        assert_eq!(render_prompt(&store), format!("update {}> ", short_id(&id)));
    }
}
