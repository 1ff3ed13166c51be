pub mod components;
pub mod renderfns;
pub mod views;

use crate::app::App;
use crate::tasks::TaskApi;
use ratatui::prelude::*;
use ratatui::widgets::TableState;

/// Main draw function
pub fn draw<A: TaskApi + Clone + 'static>(frame: &mut Frame, app: &mut App<A>) {
  let chunks = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // Header
      Constraint::Min(1),    // Task table
      Constraint::Length(1), // Footer
    ])
    .split(frame.area());

  renderfns::draw_header(frame, chunks[0], app.title(), app.server_url());

  let loading = app.is_loading();
  let (table, state) = app.table_and_state();
  views::draw_task_table(frame, chunks[1], table, state, loading);
  let (total, done) = (table.len(), table.completed_count());

  renderfns::draw_footer(frame, chunks[2], total, done, loading, app.status());

  if let Some(prompt) = app.prompt() {
    prompt.render_overlay(frame, chunks[1]);
  }
  app.command().render_overlay(frame, chunks[1]);
}

/// Keep the selection inside the table after its rows change
pub fn ensure_valid_selection(state: &mut TableState, len: usize) {
  match (state.selected(), len) {
    (_, 0) => state.select(None),
    (None, _) => state.select(Some(0)),
    (Some(i), len) if i >= len => state.select(Some(len - 1)),
    _ => {}
  }
}
