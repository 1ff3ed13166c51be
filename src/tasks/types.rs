use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Task priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Priority {
  High,
  Medium,
  #[default]
  Low,
}

impl Priority {
  pub fn label(&self) -> &'static str {
    match self {
      Priority::High => "High",
      Priority::Medium => "Medium",
      Priority::Low => "Low",
    }
  }
}

impl fmt::Display for Priority {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.label())
  }
}

impl FromStr for Priority {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_lowercase().as_str() {
      "high" | "h" => Ok(Priority::High),
      "medium" | "med" | "m" => Ok(Priority::Medium),
      "low" | "l" => Ok(Priority::Low),
      other => Err(format!("Unknown priority '{}'", other)),
    }
  }
}

// The server stores priority as free text and may send null; anything that is
// not High or Medium is shown as Low.
impl<'de> Deserialize<'de> for Priority {
  fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
  where
    D: Deserializer<'de>,
  {
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(
      raw
        .as_deref()
        .and_then(|s| s.parse().ok())
        .unwrap_or_default(),
    )
  }
}

/// A task as returned by the task list endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
  pub id: u64,
  pub task: String,
  #[serde(default)]
  pub due_date: Option<String>,
  #[serde(default)]
  pub priority: Priority,
  #[serde(default)]
  pub completed: bool,
}

impl Task {
  /// Due date if one is set; blank strings count as unset
  pub fn due(&self) -> Option<&str> {
    self
      .due_date
      .as_deref()
      .map(str::trim)
      .filter(|d| !d.is_empty())
  }
}

/// A task to be created
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
  pub task: String,
  pub due_date: Option<String>,
  pub priority: Priority,
}

impl NewTask {
  /// Parse quick-add input: free text with optional `@<due date>` and
  /// `!<priority>` tokens, e.g. `Buy milk @2025-03-01 !high`.
  pub fn parse(input: &str) -> Result<Self, String> {
    let (task, due_date, priority) = split_tokens(input)?;
    Ok(Self {
      task,
      due_date,
      priority: priority.unwrap_or(Priority::Medium),
    })
  }
}

/// Changes to an existing task. Fields left as `None` keep their value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskEdit {
  pub task: String,
  pub due_date: Option<String>,
  pub priority: Option<Priority>,
}

impl TaskEdit {
  /// Same syntax as [`NewTask::parse`]; missing tokens leave the field unchanged.
  pub fn parse(input: &str) -> Result<Self, String> {
    let (task, due_date, priority) = split_tokens(input)?;
    Ok(Self {
      task,
      due_date,
      priority,
    })
  }
}

fn split_tokens(input: &str) -> Result<(String, Option<String>, Option<Priority>), String> {
  let mut words = Vec::new();
  let mut due_date = None;
  let mut priority = None;

  for word in input.split_whitespace() {
    if let Some(date) = word.strip_prefix('@').filter(|d| !d.is_empty()) {
      due_date = Some(date.to_string());
    } else if let Some(p) = word.strip_prefix('!').filter(|p| !p.is_empty()) {
      priority = Some(p.parse()?);
    } else {
      words.push(word);
    }
  }

  if words.is_empty() {
    return Err("Task description is required".to_string());
  }

  Ok((words.join(" "), due_date, priority))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_deserialize_task() {
    let json = r#"{"id":1,"task":"Buy milk","due_date":null,"priority":"High","completed":false}"#;
    let task: Task = serde_json::from_str(json).unwrap();
    assert_eq!(task.id, 1);
    assert_eq!(task.task, "Buy milk");
    assert_eq!(task.due(), None);
    assert_eq!(task.priority, Priority::High);
    assert!(!task.completed);
  }

  #[test]
  fn test_unknown_or_missing_priority_is_low() {
    let task: Task = serde_json::from_str(r#"{"id":2,"task":"x","priority":null}"#).unwrap();
    assert_eq!(task.priority, Priority::Low);
    let task: Task = serde_json::from_str(r#"{"id":3,"task":"x","priority":"Urgent"}"#).unwrap();
    assert_eq!(task.priority, Priority::Low);
    let task: Task = serde_json::from_str(r#"{"id":4,"task":"x"}"#).unwrap();
    assert_eq!(task.priority, Priority::Low);
  }

  #[test]
  fn test_blank_due_date_is_none() {
    let task: Task = serde_json::from_str(r#"{"id":1,"task":"x","due_date":"  "}"#).unwrap();
    assert_eq!(task.due(), None);
  }

  #[test]
  fn test_priority_from_str() {
    assert_eq!("HIGH".parse::<Priority>().unwrap(), Priority::High);
    assert_eq!("m".parse::<Priority>().unwrap(), Priority::Medium);
    assert!("urgent".parse::<Priority>().is_err());
  }

  #[test]
  fn test_parse_new_task_with_tokens() {
    let task = NewTask::parse("Buy milk @2025-03-01 !high").unwrap();
    assert_eq!(task.task, "Buy milk");
    assert_eq!(task.due_date.as_deref(), Some("2025-03-01"));
    assert_eq!(task.priority, Priority::High);
  }

  #[test]
  fn test_parse_new_task_defaults() {
    let task = NewTask::parse("  Walk the dog ").unwrap();
    assert_eq!(task.task, "Walk the dog");
    assert_eq!(task.due_date, None);
    assert_eq!(task.priority, Priority::Medium);
  }

  #[test]
  fn test_parse_new_task_requires_text() {
    assert!(NewTask::parse("").is_err());
    assert!(NewTask::parse("@2025-01-01 !low").is_err());
    assert!(NewTask::parse("Thing !urgent").is_err());
  }

  #[test]
  fn test_parse_edit_keeps_unset_fields() {
    let edit = TaskEdit::parse("Buy oat milk").unwrap();
    assert_eq!(edit.task, "Buy oat milk");
    assert_eq!(edit.due_date, None);
    assert_eq!(edit.priority, None);

    let edit = TaskEdit::parse("Buy oat milk !low @2025-05-02").unwrap();
    assert_eq!(edit.due_date.as_deref(), Some("2025-05-02"));
    assert_eq!(edit.priority, Some(Priority::Low));
    assert!(TaskEdit::parse("!high").is_err());
  }
}
