//! Task view controller: turns the server's task list into table rows and
//! runs row actions.
//!
//! Every action is followed by exactly one re-fetch of the full list; the
//! table is never patched locally.

use color_eyre::{eyre::eyre, Result};
use tracing::debug;

use super::client::TaskApi;
use super::types::{NewTask, Priority, Task, TaskEdit};

/// Placeholder shown in the due-date column
pub const NO_DUE_DATE: &str = "No due date";

/// One rendered table row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRow {
  pub id: u64,
  pub text: String,
  /// Text is struck through
  pub struck: bool,
  pub due: String,
  pub priority: Priority,
  /// Completion checkbox state
  pub checked: bool,
}

impl From<&Task> for TaskRow {
  fn from(task: &Task) -> Self {
    Self {
      id: task.id,
      text: task.task.clone(),
      struck: task.completed,
      due: task.due().unwrap_or(NO_DUE_DATE).to_string(),
      priority: task.priority,
      checked: task.completed,
    }
  }
}

/// Rendered task list, in server order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskTable {
  rows: Vec<TaskRow>,
}

impl TaskTable {
  pub fn from_tasks(tasks: &[Task]) -> Self {
    Self {
      rows: tasks.iter().map(TaskRow::from).collect(),
    }
  }

  pub fn rows(&self) -> &[TaskRow] {
    &self.rows
  }

  pub fn get(&self, index: usize) -> Option<&TaskRow> {
    self.rows.get(index)
  }

  /// Index of the row for task `id`
  pub fn position(&self, id: u64) -> Option<usize> {
    self.rows.iter().position(|row| row.id == id)
  }

  pub fn len(&self) -> usize {
    self.rows.len()
  }

  pub fn is_empty(&self) -> bool {
    self.rows.is_empty()
  }

  pub fn completed_count(&self) -> usize {
    self.rows.iter().filter(|row| row.checked).count()
  }
}

/// Row actions the user can trigger
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskAction {
  ToggleComplete(u64),
  Remove(u64),
  Add(NewTask),
  Edit { id: u64, edit: TaskEdit },
}

/// Result of a successful action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
  /// Acknowledgement text from the server, possibly empty
  pub message: String,
  pub table: TaskTable,
}

#[derive(Clone)]
pub struct TaskController<A: TaskApi> {
  api: A,
}

impl<A: TaskApi> TaskController<A> {
  pub fn new(api: A) -> Self {
    Self { api }
  }

  /// Fetch the task list and render it.
  pub async fn load(&self) -> Result<TaskTable> {
    let tasks = self.api.list_tasks().await?;
    debug!(count = tasks.len(), "task list loaded");
    Ok(TaskTable::from_tasks(&tasks))
  }

  /// Run an action, then re-fetch and re-render the full list.
  pub async fn perform(&self, action: TaskAction) -> Result<Outcome> {
    let ack = match &action {
      TaskAction::ToggleComplete(id) => self.api.toggle_complete(*id).await?,
      TaskAction::Remove(id) => self.api.remove_task(*id).await?,
      TaskAction::Add(task) => {
        if task.task.trim().is_empty() {
          return Err(eyre!("Task description is required"));
        }
        self.api.add_task(task).await?
      }
      TaskAction::Edit { id, edit } => {
        if edit.task.trim().is_empty() {
          return Err(eyre!("Task text cannot be empty"));
        }
        self.api.edit_task(*id, edit).await?
      }
    };

    debug!(?action, message = %ack.message, "task action acknowledged");
    Ok(Outcome {
      message: ack.message,
      table: self.load().await?,
    })
  }
}
