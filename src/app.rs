use crate::event::{Event, EventHandler, TaskEvent};
use crate::tasks::{NewTask, TaskAction, TaskApi, TaskController, TaskEdit, TaskRow, TaskTable};
use crate::ui::components::{
  CommandEvent, CommandInput, KeyResult, Prompt, PromptEvent, PromptKind,
};
use crate::ui::renderfns::Status;
use crate::ui::{self, ensure_valid_selection};
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{
  disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::prelude::*;
use ratatui::widgets::TableState;
use std::io::{stdout, Stdout};
use std::panic;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{error, info};

/// Leave raw mode and the alternate screen before the panic report prints
fn restore_terminal_on_panic() {
  let previous = panic::take_hook();
  panic::set_hook(Box::new(move |info| {
    let _ = disable_raw_mode();
    let _ = stdout().execute(LeaveAlternateScreen);
    previous(info);
  }));
}

/// Main application state
pub struct App<A: TaskApi + Clone + 'static> {
  controller: TaskController<A>,

  /// Last table received from the server
  table: TaskTable,
  table_state: TableState,

  /// Command palette (after pressing :)
  command: CommandInput,

  /// Add/edit prompt, when open
  prompt: Option<Prompt>,

  title: String,
  server_url: String,

  /// Requests still in flight
  pending: usize,

  status: Option<Status>,

  /// Event sender for async tasks
  event_tx: mpsc::UnboundedSender<Event>,

  should_quit: bool,
}

impl<A: TaskApi + Clone + 'static> App<A> {
  pub fn new(controller: TaskController<A>, title: String, server_url: String) -> Self {
    let (tx, _rx) = mpsc::unbounded_channel();

    Self {
      controller,
      table: TaskTable::default(),
      table_state: TableState::default(),
      command: CommandInput::new(),
      prompt: None,
      title,
      server_url,
      pending: 0,
      status: None,
      event_tx: tx,
      should_quit: false,
    }
  }

  pub async fn run(&mut self) -> Result<()> {
    restore_terminal_on_panic();
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let mut events = EventHandler::new(Duration::from_millis(250));
    self.event_tx = events.sender();

    self.refresh();
    let result = self.event_loop(&mut terminal, &mut events).await;

    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
  }

  async fn event_loop(
    &mut self,
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    events: &mut EventHandler,
  ) -> Result<()> {
    while !self.should_quit {
      terminal.draw(|frame| ui::draw(frame, self))?;

      match events.next().await {
        Some(event) => self.handle_event(event),
        None => break,
      }
    }
    Ok(())
  }

  fn handle_event(&mut self, event: Event) {
    match event {
      Event::Key(key) => self.handle_key(key),
      Event::Tick => {}
      Event::Tasks(task_event) => self.handle_task_event(task_event),
    }
  }

  fn handle_task_event(&mut self, event: TaskEvent) {
    self.pending = self.pending.saturating_sub(1);
    match event {
      TaskEvent::Loaded(table) => self.apply_table(table),
      TaskEvent::Performed(outcome) => {
        self.apply_table(outcome.table);
        if !outcome.message.is_empty() {
          self.status = Some(Status::Info(outcome.message));
        }
      }
      // Table keeps its previous content
      TaskEvent::Failed(message) => self.status = Some(Status::Error(message)),
    }
  }

  fn apply_table(&mut self, table: TaskTable) {
    // Follow the selected task to its new row
    let selected_id = self.selected_row().map(|row| row.id);
    self.table = table;
    if let Some(index) = selected_id.and_then(|id| self.table.position(id)) {
      self.table_state.select(Some(index));
    }
    ensure_valid_selection(&mut self.table_state, self.table.len());
  }

  fn handle_key(&mut self, key: KeyEvent) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
      self.should_quit = true;
      return;
    }

    if let Some(prompt) = self.prompt.as_mut() {
      match prompt.handle_key(key) {
        KeyResult::Event(PromptEvent::Submitted(kind, text)) => {
          self.prompt = None;
          self.submit_prompt(kind, &text);
        }
        KeyResult::Event(PromptEvent::Cancelled) => self.prompt = None,
        KeyResult::Handled | KeyResult::NotHandled => {}
      }
      return;
    }

    match self.command.handle_key(key) {
      KeyResult::Event(CommandEvent::Submitted(cmd)) => {
        self.execute_command(&cmd);
        return;
      }
      KeyResult::Event(CommandEvent::Cancelled) | KeyResult::Handled => return,
      KeyResult::NotHandled if self.command.is_active() => return,
      KeyResult::NotHandled => {}
    }

    match key.code {
      KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
      KeyCode::Down | KeyCode::Char('j') => self.move_selection(1),
      KeyCode::Up | KeyCode::Char('k') => self.move_selection(-1),
      KeyCode::Home | KeyCode::Char('g') => self.select_edge(false),
      KeyCode::End | KeyCode::Char('G') => self.select_edge(true),
      KeyCode::Char(' ') | KeyCode::Char('x') | KeyCode::Enter => self.toggle_selected(),
      KeyCode::Char('d') | KeyCode::Delete => self.remove_selected(),
      KeyCode::Char('e') => self.edit_selected(),
      KeyCode::Char('a') => self.prompt = Some(Prompt::add()),
      KeyCode::Char('r') => self.refresh(),
      _ => {}
    }
  }

  fn execute_command(&mut self, cmd: &str) {
    match cmd {
      "refresh" => self.refresh(),
      "add" => self.prompt = Some(Prompt::add()),
      "edit" => self.edit_selected(),
      "complete" => self.toggle_selected(),
      "remove" => self.remove_selected(),
      "quit" => self.should_quit = true,
      "" => {}
      other => self.status = Some(Status::Error(format!("Unknown command: {}", other))),
    }
  }

  fn submit_prompt(&mut self, kind: PromptKind, text: &str) {
    match kind {
      PromptKind::Add => match NewTask::parse(text) {
        Ok(task) => self.dispatch(TaskAction::Add(task)),
        Err(message) => self.status = Some(Status::Error(message)),
      },
      PromptKind::Edit(id) => match TaskEdit::parse(text) {
        Ok(edit) => self.dispatch(TaskAction::Edit { id, edit }),
        Err(message) => self.status = Some(Status::Error(message)),
      },
    }
  }

  fn selected_row(&self) -> Option<&TaskRow> {
    self
      .table_state
      .selected()
      .and_then(|index| self.table.get(index))
  }

  fn toggle_selected(&mut self) {
    if let Some(id) = self.selected_row().map(|row| row.id) {
      self.dispatch(TaskAction::ToggleComplete(id));
    }
  }

  fn remove_selected(&mut self) {
    if let Some(id) = self.selected_row().map(|row| row.id) {
      self.dispatch(TaskAction::Remove(id));
    }
  }

  fn edit_selected(&mut self) {
    if let Some(prompt) = self.selected_row().map(|row| Prompt::edit(row.id, &row.text)) {
      self.prompt = Some(prompt);
    }
  }

  fn move_selection(&mut self, delta: i32) {
    let len = self.table.len();
    if len == 0 {
      return;
    }
    let current = self.table_state.selected().unwrap_or(0) as i32;
    let next = (current + delta).rem_euclid(len as i32) as usize;
    self.table_state.select(Some(next));
  }

  fn select_edge(&mut self, last: bool) {
    if !self.table.is_empty() {
      let index = if last { self.table.len() - 1 } else { 0 };
      self.table_state.select(Some(index));
    }
  }

  /// Reload the task list in the background
  pub fn refresh(&mut self) {
    self.spawn_work(None);
  }

  fn dispatch(&mut self, action: TaskAction) {
    info!(?action, "dispatching task action");
    self.spawn_work(Some(action));
  }

  fn spawn_work(&mut self, action: Option<TaskAction>) {
    self.pending += 1;
    self.status = None;

    let controller = self.controller.clone();
    let tx = self.event_tx.clone();

    tokio::spawn(async move {
      let result = match action {
        Some(action) => controller.perform(action).await.map(TaskEvent::Performed),
        None => controller.load().await.map(TaskEvent::Loaded),
      };
      let event = match result {
        Ok(event) => event,
        Err(e) => {
          error!(error = %e, "task server request failed");
          TaskEvent::Failed(e.to_string())
        }
      };
      let _ = tx.send(Event::Tasks(event));
    });
  }

  // Accessors for UI rendering
  pub fn title(&self) -> &str {
    &self.title
  }

  pub fn server_url(&self) -> &str {
    &self.server_url
  }

  pub fn is_loading(&self) -> bool {
    self.pending > 0
  }

  pub fn table_and_state(&mut self) -> (&TaskTable, &mut TableState) {
    (&self.table, &mut self.table_state)
  }

  pub fn status(&self) -> Option<&Status> {
    self.status.as_ref()
  }

  pub fn prompt(&self) -> Option<&Prompt> {
    self.prompt.as_ref()
  }

  pub fn command(&self) -> &CommandInput {
    &self.command
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::tasks::{Ack, Priority, Task};
  use async_trait::async_trait;
  use color_eyre::eyre::eyre;
  use std::sync::{Arc, Mutex};

  #[derive(Clone, Default)]
  struct FakeApi {
    tasks: Arc<Mutex<Vec<Task>>>,
    failing: bool,
  }

  #[async_trait]
  impl TaskApi for FakeApi {
    async fn list_tasks(&self) -> Result<Vec<Task>> {
      Ok(self.tasks.lock().unwrap().clone())
    }

    async fn toggle_complete(&self, id: u64) -> Result<Ack> {
      if self.failing {
        return Err(eyre!("HTTP 500"));
      }
      for task in self.tasks.lock().unwrap().iter_mut().filter(|t| t.id == id) {
        task.completed = !task.completed;
      }
      Ok(Ack {
        message: "Task status updated!".to_string(),
        ..Default::default()
      })
    }

    async fn remove_task(&self, id: u64) -> Result<Ack> {
      if self.failing {
        return Err(eyre!("HTTP 500"));
      }
      self.tasks.lock().unwrap().retain(|t| t.id != id);
      Ok(Ack::default())
    }

    async fn add_task(&self, task: &NewTask) -> Result<Ack> {
      let mut tasks = self.tasks.lock().unwrap();
      let id = tasks.len() as u64 + 1;
      tasks.push(Task {
        id,
        task: task.task.clone(),
        due_date: task.due_date.clone(),
        priority: task.priority,
        completed: false,
      });
      Ok(Ack::default())
    }

    async fn edit_task(&self, id: u64, edit: &TaskEdit) -> Result<Ack> {
      for task in self.tasks.lock().unwrap().iter_mut().filter(|t| t.id == id) {
        task.task = edit.task.clone();
        if let Some(priority) = edit.priority {
          task.priority = priority;
        }
      }
      Ok(Ack::default())
    }
  }

  fn app_with(api: FakeApi) -> (App<FakeApi>, mpsc::UnboundedReceiver<Event>) {
    let mut app = App::new(
      TaskController::new(api),
      "Todo".to_string(),
      "http://127.0.0.1:5000".to_string(),
    );
    let (tx, rx) = mpsc::unbounded_channel();
    app.event_tx = tx;
    (app, rx)
  }

  fn seeded() -> FakeApi {
    FakeApi {
      tasks: Arc::new(Mutex::new(vec![Task {
        id: 1,
        task: "Buy milk".to_string(),
        due_date: None,
        priority: Priority::High,
        completed: false,
      }])),
      failing: false,
    }
  }

  fn press(app: &mut App<FakeApi>, code: KeyCode) {
    app.handle_event(Event::Key(KeyEvent::new(code, KeyModifiers::NONE)));
  }

  async fn settle(app: &mut App<FakeApi>, rx: &mut mpsc::UnboundedReceiver<Event>) {
    let event = rx.recv().await.unwrap();
    app.handle_event(event);
  }

  #[tokio::test]
  async fn test_refresh_loads_and_selects_first_row() {
    let (mut app, mut rx) = app_with(seeded());
    app.refresh();
    assert!(app.is_loading());

    settle(&mut app, &mut rx).await;

    assert!(!app.is_loading());
    assert_eq!(app.table.len(), 1);
    assert_eq!(app.table_state.selected(), Some(0));
  }

  #[tokio::test]
  async fn test_space_toggles_selected_task() {
    let (mut app, mut rx) = app_with(seeded());
    app.refresh();
    settle(&mut app, &mut rx).await;

    press(&mut app, KeyCode::Char(' '));
    settle(&mut app, &mut rx).await;

    let row = app.table.get(0).unwrap();
    assert!(row.checked);
    assert!(row.struck);
    assert_eq!(
      app.status(),
      Some(&Status::Info("Task status updated!".to_string()))
    );
  }

  #[tokio::test]
  async fn test_edit_prompt_updates_priority() {
    let (mut app, mut rx) = app_with(seeded());
    app.refresh();
    settle(&mut app, &mut rx).await;

    press(&mut app, KeyCode::Char('e'));
    for c in " !low".chars() {
      press(&mut app, KeyCode::Char(c));
    }
    press(&mut app, KeyCode::Enter);
    settle(&mut app, &mut rx).await;

    let row = app.table.get(0).unwrap();
    assert_eq!(row.text, "Buy milk");
    assert_eq!(row.priority, Priority::Low);
    // Empty acknowledgement leaves no status behind
    assert_eq!(app.status(), None);
  }

  #[tokio::test]
  async fn test_add_prompt_creates_task() {
    let (mut app, mut rx) = app_with(seeded());
    press(&mut app, KeyCode::Char('a'));
    assert!(app.prompt().is_some());

    for c in "Pay rent !low".chars() {
      press(&mut app, KeyCode::Char(c));
    }
    press(&mut app, KeyCode::Enter);
    assert!(app.prompt().is_none());

    settle(&mut app, &mut rx).await;
    assert_eq!(app.table.len(), 2);
    assert_eq!(app.table.get(1).unwrap().priority, Priority::Low);
  }

  #[tokio::test]
  async fn test_failed_action_keeps_table() {
    let mut api = seeded();
    let (mut app, mut rx) = app_with(api.clone());
    app.refresh();
    settle(&mut app, &mut rx).await;

    api.failing = true;
    app.controller = TaskController::new(api);
    press(&mut app, KeyCode::Char('d'));
    settle(&mut app, &mut rx).await;

    assert_eq!(app.table.len(), 1);
    assert!(matches!(app.status(), Some(Status::Error(_))));
  }

  #[tokio::test]
  async fn test_quit_command() {
    let (mut app, _rx) = app_with(seeded());
    press(&mut app, KeyCode::Char(':'));
    for c in "quit".chars() {
      press(&mut app, KeyCode::Char(c));
    }
    assert!(!app.should_quit);
    press(&mut app, KeyCode::Enter);
    assert!(app.should_quit);
  }
}
