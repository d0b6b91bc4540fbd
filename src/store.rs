// Task list state manager synced to a persisted slot

use crate::filter::Filter;
use crate::slot::{Slot, TODOS_KEY};
use crate::task::{self, Task};
use tracing::{debug, info, warn};

/// What an effective mutation did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    Added(String),
    Updated(String),
    Deleted(String),
    Toggled(String),
    Cleared,
}

/// Observer called after each mutation, once the list has been persisted
pub type Listener = Box<dyn FnMut(&Change, &[Task])>;

/// Behavior switches for a store session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreOptions {
    /// Drop an in-progress edit when its task is deleted or the list is cleared
    pub reset_edit_on_remove: bool,
}

/// Task totals for a status line
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counts {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
}

/// The task list plus the input/edit/filter state of one session
///
/// The slot is read once in [`TaskListStore::open`]. Every mutation of the
/// list afterwards is written back in full before the method returns.
pub struct TaskListStore<S: Slot> {
    slot: S,
    tasks: Vec<Task>,
    draft: String,
    editing_id: Option<String>,
    filter: Filter,
    options: StoreOptions,
    listeners: Vec<Listener>,
}

impl<S: Slot> TaskListStore<S> {
    /// Load the task list from `slot`
    ///
    /// A missing or malformed value starts an empty list. Nothing is written.
    pub fn open(slot: S) -> Self {
        Self::with_options(slot, StoreOptions::default())
    }

    pub fn with_options(slot: S, options: StoreOptions) -> Self {
        let tasks = match slot.read(TODOS_KEY) {
            Some(raw) => task::decode_tasks(&raw).unwrap_or_default(),
            None => Vec::new(),
        };

        info!(count = tasks.len(), "Loaded task list");

        Self {
            slot,
            tasks,
            draft: String::new(),
            editing_id: None,
            filter: Filter::All,
            options,
            listeners: Vec::new(),
        }
    }

    // ========================================================================
    // Read access
    // ========================================================================

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn editing_id(&self) -> Option<&str> {
        self.editing_id.as_deref()
    }

    pub fn is_editing(&self) -> bool {
        self.editing_id.is_some()
    }

    pub fn filter(&self) -> Filter {
        self.filter
    }

    pub fn options(&self) -> StoreOptions {
        self.options
    }

    pub fn slot(&self) -> &S {
        &self.slot
    }

    pub fn into_slot(self) -> S {
        self.slot
    }

    /// Tasks passing the current filter, in list order
    ///
    /// Computed from the list on each call; the iterator can be cloned to
    /// walk it again.
    pub fn visible_tasks(&self) -> impl Iterator<Item = &Task> + Clone + '_ {
        let filter = self.filter;
        self.tasks.iter().filter(move |t| filter.matches(t))
    }

    pub fn counts(&self) -> Counts {
        let completed = self.tasks.iter().filter(|t| t.is_completed).count();
        Counts {
            total: self.tasks.len(),
            completed,
            pending: self.tasks.len() - completed,
        }
    }

    // ========================================================================
    // Input state
    // ========================================================================

    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    pub fn set_filter(&mut self, filter: impl Into<Filter>) {
        self.filter = filter.into();
        debug!(filter = %self.filter, "set_filter");
    }

    pub fn subscribe<F>(&mut self, listener: F)
    where
        F: FnMut(&Change, &[Task]) + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    /// Start editing a task: the draft takes its text
    ///
    /// Returns false, changing nothing, if no task has that id.
    pub fn begin_edit(&mut self, id: &str) -> bool {
        let Some(text) = self.get(id).map(|t| t.text.clone()) else {
            debug!(id, "begin_edit: unknown id");
            return false;
        };

        self.draft = text;
        self.editing_id = Some(id.to_string());
        true
    }

    /// Leave edit mode and discard the draft
    pub fn cancel_edit(&mut self) {
        self.editing_id = None;
        self.draft.clear();
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Add a task, or replace the text of the task under edit
    ///
    /// Whitespace-only text is ignored entirely. Otherwise the draft is
    /// cleared and edit mode ends. Returns true if the list changed.
    pub fn add_or_update(&mut self, text: &str) -> bool {
        if text.trim().is_empty() {
            debug!("add_or_update: empty text ignored");
            return false;
        }

        let change = match self.editing_id.take() {
            None => {
                let task = Task {
                    id: self.unique_id(),
                    text: text.to_string(),
                    is_completed: false,
                };
                let id = task.id.clone();
                self.tasks.push(task);
                Some(Change::Added(id))
            }
            Some(id) => match self.tasks.iter_mut().find(|t| t.id == id) {
                Some(task) => {
                    task.text = text.to_string();
                    Some(Change::Updated(id))
                }
                None => {
                    debug!(id = %id, "add_or_update: task under edit no longer exists");
                    None
                }
            },
        };

        self.draft.clear();

        match change {
            Some(change) => {
                self.commit(change);
                true
            }
            None => false,
        }
    }

    /// Submit the current draft
    pub fn submit(&mut self) -> bool {
        let text = std::mem::take(&mut self.draft);
        let changed = self.add_or_update(&text);
        if !changed && text.trim().is_empty() {
            self.draft = text;
        }
        changed
    }

    pub fn delete(&mut self, id: &str) -> bool {
        let Some(index) = self.tasks.iter().position(|t| t.id == id) else {
            debug!(id, "delete: unknown id");
            return false;
        };

        self.tasks.remove(index);
        if self.options.reset_edit_on_remove && self.editing_id.as_deref() == Some(id) {
            self.cancel_edit();
        }

        self.commit(Change::Deleted(id.to_string()));
        true
    }

    pub fn toggle_completed(&mut self, id: &str) -> bool {
        let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) else {
            debug!(id, "toggle_completed: unknown id");
            return false;
        };

        task.is_completed = !task.is_completed;
        self.commit(Change::Toggled(id.to_string()));
        true
    }

    /// Empty the list; always persists. Returns the number of tasks removed
    pub fn clear_all(&mut self) -> usize {
        let removed = self.tasks.len();
        self.tasks.clear();
        if self.options.reset_edit_on_remove {
            self.cancel_edit();
        }

        self.commit(Change::Cleared);
        removed
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn unique_id(&self) -> String {
        loop {
            let id = task::fresh_id();
            if self.get(&id).is_none() {
                return id;
            }
        }
    }

    fn commit(&mut self, change: Change) {
        debug!(?change, count = self.tasks.len(), "commit");
        self.persist();
        for listener in &mut self.listeners {
            listener(&change, &self.tasks);
        }
    }

    fn persist(&mut self) {
        let raw = match task::encode_tasks(&self.tasks) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = ?e, "Failed to serialize task list");
                return;
            }
        };

        if let Err(e) = self.slot.write(TODOS_KEY, &raw) {
            warn!(error = ?e, "Failed to persist task list");
        }
    }
}
