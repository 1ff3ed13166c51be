use super::input::{InputResult, TextInput};
use super::KeyResult;
use crate::commands::{self, Command};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph};

/// Events emitted by the command palette
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandEvent {
  /// Resolved command name
  Submitted(String),
  Cancelled,
}

/// Command palette with autocomplete, opened with `:`
#[derive(Debug, Clone, Default)]
pub struct CommandInput {
  input: TextInput,
  active: bool,
  selected_suggestion: usize,
}

impl CommandInput {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn is_active(&self) -> bool {
    self.active
  }

  pub fn activate(&mut self) {
    self.active = true;
    self.input.clear();
    self.selected_suggestion = 0;
  }

  fn deactivate(&mut self) {
    self.active = false;
    self.input.clear();
    self.selected_suggestion = 0;
  }

  pub fn suggestions(&self) -> Vec<&'static Command> {
    commands::get_suggestions(self.input.value())
  }

  /// Handle a key event. Handles activation too, so call it in every mode.
  pub fn handle_key(&mut self, key: KeyEvent) -> KeyResult<CommandEvent> {
    if !self.active {
      if key.code == KeyCode::Char(':') {
        self.activate();
        return KeyResult::Handled;
      }
      return KeyResult::NotHandled;
    }

    match key.code {
      KeyCode::Esc => {
        self.deactivate();
        return KeyResult::Event(CommandEvent::Cancelled);
      }
      KeyCode::Enter => {
        let cmd = self.resolve_command();
        self.deactivate();
        return KeyResult::Event(CommandEvent::Submitted(cmd));
      }
      KeyCode::Tab | KeyCode::Down => {
        let count = self.suggestions().len();
        if count > 0 {
          self.selected_suggestion = (self.selected_suggestion + 1) % count;
        }
        return KeyResult::Handled;
      }
      KeyCode::BackTab | KeyCode::Up => {
        let count = self.suggestions().len();
        if count > 0 {
          self.selected_suggestion = (self.selected_suggestion + count - 1) % count;
        }
        return KeyResult::Handled;
      }
      _ => {}
    }

    match self.input.handle_key(key) {
      InputResult::Consumed => {
        self.selected_suggestion = 0;
        KeyResult::Handled
      }
      InputResult::Submitted(_) | InputResult::Cancelled => KeyResult::Handled,
      InputResult::NotHandled => KeyResult::NotHandled,
    }
  }

  /// The highlighted suggestion, or the raw input when nothing matches
  fn resolve_command(&self) -> String {
    match self.suggestions().get(self.selected_suggestion) {
      Some(cmd) => cmd.name.to_string(),
      None => self.input.value().trim().to_lowercase(),
    }
  }

  /// Render the palette overlay if active
  pub fn render_overlay(&self, frame: &mut Frame, area: Rect) {
    if !self.active {
      return;
    }

    let suggestions = self.suggestions();
    let shown = suggestions.len().min(8) as u16;

    let width = (area.width * 60 / 100).clamp(30, 60).min(area.width);
    let height = (3 + shown).min(area.height);
    let overlay_area = Rect::new(area.x + 1, area.y + 1, width, height).intersection(area);

    frame.render_widget(Clear, overlay_area);

    let block = Block::default()
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Yellow))
      .title(" Command ");

    let inner = block.inner(overlay_area);
    frame.render_widget(block, overlay_area);

    if inner.height == 0 {
      return;
    }

    let chunks = Layout::default()
      .direction(Direction::Vertical)
      .constraints([Constraint::Length(1), Constraint::Min(0)])
      .split(inner);

    frame.render_widget(
      Paragraph::new(self.input.to_line(":", Color::Yellow)),
      chunks[0],
    );

    if suggestions.is_empty() || chunks[1].height == 0 {
      return;
    }

    let items: Vec<ListItem> = suggestions
      .iter()
      .take(8)
      .map(|cmd| {
        ListItem::new(Line::from(vec![
          Span::styled(
            format!("{:<10}", cmd.name),
            Style::default().fg(Color::Cyan),
          ),
          Span::styled(cmd.description, Style::default().fg(Color::DarkGray)),
        ]))
      })
      .collect();

    let list =
      List::new(items).highlight_style(Style::default().bg(Color::DarkGray).fg(Color::White));

    let mut state = ListState::default();
    state.select(Some(self.selected_suggestion));

    frame.render_stateful_widget(list, chunks[1], &mut state);
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crossterm::event::KeyModifiers;

  fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
  }

  fn type_str(palette: &mut CommandInput, text: &str) {
    for c in text.chars() {
      palette.handle_key(key(KeyCode::Char(c)));
    }
  }

  #[test]
  fn test_inactive_ignores_keys() {
    let mut palette = CommandInput::new();
    assert_eq!(palette.handle_key(key(KeyCode::Char('x'))), KeyResult::NotHandled);
    assert!(!palette.is_active());
  }

  #[test]
  fn test_colon_activates() {
    let mut palette = CommandInput::new();
    assert_eq!(palette.handle_key(key(KeyCode::Char(':'))), KeyResult::Handled);
    assert!(palette.is_active());
  }

  #[test]
  fn test_submit_resolves_alias() {
    let mut palette = CommandInput::new();
    palette.activate();
    type_str(&mut palette, "rm");
    assert_eq!(
      palette.handle_key(key(KeyCode::Enter)),
      KeyResult::Event(CommandEvent::Submitted("remove".to_string()))
    );
    assert!(!palette.is_active());
  }

  #[test]
  fn test_tab_cycles_suggestions() {
    let mut palette = CommandInput::new();
    palette.activate();
    palette.handle_key(key(KeyCode::Tab));
    assert_eq!(
      palette.handle_key(key(KeyCode::Enter)),
      KeyResult::Event(CommandEvent::Submitted(commands::COMMANDS[1].name.to_string()))
    );
  }

  #[test]
  fn test_unknown_input_submitted_verbatim() {
    let mut palette = CommandInput::new();
    palette.activate();
    type_str(&mut palette, "Bogus");
    assert_eq!(
      palette.handle_key(key(KeyCode::Enter)),
      KeyResult::Event(CommandEvent::Submitted("bogus".to_string()))
    );
  }

  #[test]
  fn test_escape_cancels() {
    let mut palette = CommandInput::new();
    palette.activate();
    type_str(&mut palette, "ref");
    assert_eq!(
      palette.handle_key(key(KeyCode::Esc)),
      KeyResult::Event(CommandEvent::Cancelled)
    );
    assert!(!palette.is_active());
  }
}
