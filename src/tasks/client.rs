//! HTTP client for the task server, behind the `TaskApi` seam the controller uses.

use async_trait::async_trait;
use color_eyre::{eyre::eyre, Result};
use reqwest::{Client, Response};
use std::time::Duration;
use url::Url;

use crate::config::Config;

use super::api_types::{Ack, AddTaskForm, ApiError, EditTaskForm};
use super::types::{NewTask, Task, TaskEdit};

/// Operations the task view needs from the server
#[async_trait]
pub trait TaskApi: Send + Sync {
  /// Fetch the full task list
  async fn list_tasks(&self) -> Result<Vec<Task>>;

  /// Flip the completion flag of a task
  async fn toggle_complete(&self, id: u64) -> Result<Ack>;

  async fn remove_task(&self, id: u64) -> Result<Ack>;

  async fn add_task(&self, task: &NewTask) -> Result<Ack>;

  /// Replace the text of a task, and its due date or priority when given
  async fn edit_task(&self, id: u64, edit: &TaskEdit) -> Result<Ack>;
}

/// HTTP client for the task server
#[derive(Clone)]
pub struct TaskClient {
  client: Client,
  base: Url,
}

impl TaskClient {
  pub fn new(config: &Config) -> Result<Self> {
    Self::at(config.origin()?, config.timeout())
  }

  fn at(base: Url, timeout: Duration) -> Result<Self> {
    let client = Client::builder()
      .timeout(timeout)
      .user_agent(concat!("doable/", env!("CARGO_PKG_VERSION")))
      .build()
      .map_err(|e| eyre!("Failed to create HTTP client: {}", e))?;

    Ok(Self { client, base })
  }

  fn endpoint(&self, path: &str) -> Result<Url> {
    join_endpoint(&self.base, path)
  }

  /// Check response status and convert errors
  async fn check_response(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
      return Ok(response);
    }

    let url = response.url().to_string();
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiError>(&body)
      .map(|e| e.error)
      .unwrap_or(body);

    Err(eyre!("HTTP {} from {}: {}", status, url, message))
  }

  async fn read_ack(response: Response) -> Result<Ack> {
    let response = Self::check_response(response).await?;
    response
      .json::<Ack>()
      .await
      .map_err(|e| eyre!("Failed to parse acknowledgement: {}", e))
  }
}

#[async_trait]
impl TaskApi for TaskClient {
  async fn list_tasks(&self) -> Result<Vec<Task>> {
    let url = self.endpoint("/api/tasks")?;
    let response = self
      .client
      .get(url)
      .send()
      .await
      .map_err(|e| eyre!("Failed to get tasks: {}", e))?;

    Self::check_response(response)
      .await?
      .json::<Vec<Task>>()
      .await
      .map_err(|e| eyre!("Failed to parse task list: {}", e))
  }

  async fn toggle_complete(&self, id: u64) -> Result<Ack> {
    let url = self.endpoint(&format!("/complete/{}", id))?;
    let response = self
      .client
      .post(url)
      .send()
      .await
      .map_err(|e| eyre!("Failed to toggle task {}: {}", id, e))?;

    Self::read_ack(response).await
  }

  async fn remove_task(&self, id: u64) -> Result<Ack> {
    let url = self.endpoint(&format!("/remove/{}", id))?;
    let response = self
      .client
      .post(url)
      .send()
      .await
      .map_err(|e| eyre!("Failed to remove task {}: {}", id, e))?;

    Self::read_ack(response).await
  }

  async fn add_task(&self, task: &NewTask) -> Result<Ack> {
    let url = self.endpoint("/add")?;
    let response = self
      .client
      .post(url)
      .form(&AddTaskForm::from(task))
      .send()
      .await
      .map_err(|e| eyre!("Failed to add task: {}", e))?;

    Self::read_ack(response).await
  }

  async fn edit_task(&self, id: u64, edit: &TaskEdit) -> Result<Ack> {
    let url = self.endpoint(&format!("/edit/{}", id))?;
    let response = self
      .client
      .post(url)
      .form(&EditTaskForm::from(edit))
      .send()
      .await
      .map_err(|e| eyre!("Failed to edit task {}: {}", id, e))?;

    Self::read_ack(response).await
  }
}

fn join_endpoint(base: &Url, path: &str) -> Result<Url> {
  base
    .join(path)
    .map_err(|e| eyre!("Invalid endpoint {}: {}", path, e))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::tasks::types::Priority;
  use crate::test_server::serve_once;

  fn client(origin: Url) -> TaskClient {
    TaskClient::at(origin, Duration::from_secs(5)).unwrap()
  }

  #[test]
  fn test_endpoints_resolve_against_origin() {
    let base = Url::parse("https://todo.example.com/app/").unwrap();

    assert_eq!(
      join_endpoint(&base, "/api/tasks").unwrap().as_str(),
      "https://todo.example.com/api/tasks"
    );
    assert_eq!(
      join_endpoint(&base, &format!("/remove/{}", 7)).unwrap().as_str(),
      "https://todo.example.com/remove/7"
    );
  }

  #[tokio::test]
  async fn test_list_tasks_parses_body() {
    let body = r#"[{"id":1,"task":"Buy milk","due_date":null,"priority":"High","completed":true}]"#;
    let (origin, server) = serve_once("200 OK", "application/json", body).await;

    let tasks = client(origin).list_tasks().await.unwrap();
    assert_eq!(tasks.len(), 1);
    assert!(tasks[0].completed);
    assert_eq!(tasks[0].priority, Priority::High);
    assert!(server.await.unwrap().starts_with("GET /api/tasks "));
  }

  #[tokio::test]
  async fn test_error_body_becomes_message() {
    let body = r#"{"error":"Task not found or unauthorized"}"#;
    let (origin, server) = serve_once("403 Forbidden", "application/json", body).await;

    let err = client(origin).remove_task(9).await.unwrap_err().to_string();
    assert!(err.contains("403"), "{}", err);
    assert!(err.ends_with(": Task not found or unauthorized"), "{}", err);
    assert!(server.await.unwrap().starts_with("POST /remove/9 "));
  }

  #[tokio::test]
  async fn test_add_posts_form() {
    let body = r#"{"message":"Task added successfully!","id":3}"#;
    let (origin, server) = serve_once("200 OK", "application/json", body).await;

    let task = NewTask::parse("Pay rent @2025-04-01 !low").unwrap();
    let ack = client(origin).add_task(&task).await.unwrap();
    assert_eq!(ack.id, Some(3));
    assert_eq!(ack.message, "Task added successfully!");

    let request = server.await.unwrap();
    assert!(request.starts_with("POST /add "));
    assert!(request
      .to_lowercase()
      .contains("content-type: application/x-www-form-urlencoded"));
    assert!(request.ends_with("\r\n\r\ntask=Pay+rent&due_date=2025-04-01&priority=Low"));
  }

  #[tokio::test]
  async fn test_edit_sends_only_given_fields() {
    let body = r#"{"message":"Task updated successfully!"}"#;
    let (origin, server) = serve_once("200 OK", "application/json", body).await;

    let edit = TaskEdit::parse("Buy oat milk !high").unwrap();
    client(origin).edit_task(4, &edit).await.unwrap();

    let request = server.await.unwrap();
    assert!(request.starts_with("POST /edit/4 "));
    assert!(request.ends_with("\r\n\r\ntask=Buy+oat+milk&priority=High"));
  }
}
