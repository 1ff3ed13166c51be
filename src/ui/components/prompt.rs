use super::input::{InputResult, TextInput};
use super::KeyResult;
use crossterm::event::KeyEvent;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

/// What the submitted text is for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
  Add,
  Edit(u64),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptEvent {
  Submitted(PromptKind, String),
  Cancelled,
}

/// Text prompt for adding or editing a task
#[derive(Debug, Clone)]
pub struct Prompt {
  kind: PromptKind,
  input: TextInput,
}

impl Prompt {
  pub fn add() -> Self {
    Self {
      kind: PromptKind::Add,
      input: TextInput::new(),
    }
  }

  /// Prompt pre-filled with the task's current text
  pub fn edit(id: u64, current: &str) -> Self {
    Self {
      kind: PromptKind::Edit(id),
      input: TextInput::with_value(current),
    }
  }

  pub fn handle_key(&mut self, key: KeyEvent) -> KeyResult<PromptEvent> {
    match self.input.handle_key(key) {
      InputResult::Consumed => KeyResult::Handled,
      InputResult::Submitted(text) => KeyResult::Event(PromptEvent::Submitted(self.kind, text)),
      InputResult::Cancelled => KeyResult::Event(PromptEvent::Cancelled),
      InputResult::NotHandled => KeyResult::NotHandled,
    }
  }

  pub fn render_overlay(&self, frame: &mut Frame, area: Rect) {
    let (title, hint) = match self.kind {
      PromptKind::Add => (" New task ", "text @due-date !high|medium|low"),
      PromptKind::Edit(_) => (" Edit task ", "text, optionally @due-date !priority"),
    };

    let width = (area.width * 70 / 100).clamp(40, 80).min(area.width);
    let height = 4.min(area.height);
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 3;
    let overlay_area = Rect::new(x, y, width, height);

    frame.render_widget(Clear, overlay_area);

    let block = Block::default()
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Cyan))
      .title(title);

    let text = vec![
      self.input.to_line("> ", Color::Cyan),
      Line::from(Span::styled(hint, Style::default().fg(Color::DarkGray))),
    ];

    frame.render_widget(Paragraph::new(text).block(block), overlay_area);
  }
}
