//! Wire types for the task server.

use serde::{Deserialize, Serialize};

use super::types::{NewTask, TaskEdit};

/// Acknowledgement returned by the mutation endpoints
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Ack {
  #[serde(default)]
  pub message: String,
  /// New completion state, sent by the completion toggle
  #[serde(default)]
  pub completed: Option<bool>,
  /// Id of a newly created task
  #[serde(default)]
  pub id: Option<u64>,
}

/// Error body sent with 4xx responses
#[derive(Debug, Clone, Deserialize)]
pub struct ApiError {
  pub error: String,
}

/// Form body for creating a task
#[derive(Debug, Serialize)]
pub struct AddTaskForm<'a> {
  pub task: &'a str,
  pub due_date: &'a str,
  pub priority: &'a str,
}

impl<'a> From<&'a NewTask> for AddTaskForm<'a> {
  fn from(task: &'a NewTask) -> Self {
    Self {
      task: &task.task,
      due_date: task.due_date.as_deref().unwrap_or(""),
      priority: task.priority.label(),
    }
  }
}

/// Form body for editing a task. Omitted fields are left alone by the server.
#[derive(Debug, Serialize)]
pub struct EditTaskForm<'a> {
  pub task: &'a str,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub due_date: Option<&'a str>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub priority: Option<&'static str>,
}

impl<'a> From<&'a TaskEdit> for EditTaskForm<'a> {
  fn from(edit: &'a TaskEdit) -> Self {
    Self {
      task: edit.task.trim(),
      due_date: edit.due_date.as_deref(),
      priority: edit.priority.map(|p| p.label()),
    }
  }
}
