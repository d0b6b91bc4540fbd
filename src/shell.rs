// Line-oriented commands for an interactive session

use crate::slot::Slot;
use crate::store::TaskListStore;
use crate::view;
use eyre::{Result, eyre};

pub const HELP: &str = "\
add <text>      add a task, or update the task under edit
type <text>     replace the draft
submit          add or update using the draft
edit <id>       load a task into the draft for editing
cancel          leave edit mode
toggle <id>     flip a task between pending and completed
delete <id>     remove a task
clear           remove every task
filter <name>   all | completed | pending
list            show the visible tasks
quit            end the session";

/// Result of one shell line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Continue(Option<String>),
    Quit,
}

/// Find the task whose id is `prefix` or uniquely starts with it
pub fn resolve_id<S: Slot>(store: &TaskListStore<S>, prefix: &str) -> Result<String> {
    if let Some(task) = store.get(prefix) {
        return Ok(task.id.clone());
    }

    let matches: Vec<&str> = store
        .tasks()
        .iter()
        .map(|t| t.id.as_str())
        .filter(|id| !prefix.is_empty() && id.starts_with(prefix))
        .collect();

    match matches.as_slice() {
        [] => Err(eyre!("No task matches id: {}", prefix)),
        [id] => Ok(id.to_string()),
        _ => Err(eyre!("Ambiguous id prefix: {} ({} matches)", prefix, matches.len())),
    }
}

/// Run one command line against the session
pub fn execute<S: Slot>(store: &mut TaskListStore<S>, line: &str) -> Result<Outcome> {
    let line = line.trim();
    let (command, rest) = match line.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (line, ""),
    };

    let message = match command {
        "" => None,
        "quit" | "exit" => return Ok(Outcome::Quit),
        "help" => Some(HELP.to_string()),
        "list" | "ls" => Some(view::render_list(store)),
        "add" => {
            store.set_draft(rest);
            submit(store)
        }
        "type" => {
            store.set_draft(rest);
            None
        }
        "submit" => submit(store),
        "edit" => {
            let id = resolve_id(store, rest)?;
            store.begin_edit(&id);
            Some(format!("Editing: {}", store.draft()))
        }
        "cancel" => {
            store.cancel_edit();
            None
        }
        "toggle" => {
            let id = resolve_id(store, rest)?;
            store.toggle_completed(&id);
            Some(view::render_list(store))
        }
        "delete" | "rm" => {
            let id = resolve_id(store, rest)?;
            store.delete(&id);
            Some(view::render_list(store))
        }
        "clear" => {
            let removed = store.clear_all();
            Some(format!("Removed {} tasks", removed))
        }
        "filter" => {
            store.set_filter(rest);
            Some(view::render_list(store))
        }
        other => return Err(eyre!("Unknown command: {} (try 'help')", other)),
    };

    Ok(Outcome::Continue(message))
}

fn submit<S: Slot>(store: &mut TaskListStore<S>) -> Option<String> {
    if store.submit() {
        Some(view::render_list(store))
    } else {
        Some("Nothing to save".to_string())
    }
}
