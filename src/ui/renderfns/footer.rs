use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

/// Status line message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
  Info(String),
  Error(String),
}

/// Draw the footer: task counts on the left, the latest status on the right
pub fn draw_footer(
  frame: &mut Frame,
  area: Rect,
  total: usize,
  done: usize,
  loading: bool,
  status: Option<&Status>,
) {
  let mut spans = vec![Span::styled(
    format!(" {} tasks, {} done ", total, done),
    Style::default().fg(Color::White),
  )];

  if loading {
    spans.push(Span::styled(" loading... ", Style::default().fg(Color::Yellow)));
  }

  match status {
    Some(Status::Info(msg)) => {
      spans.push(Span::styled(format!(" {}", msg), Style::default().fg(Color::Green)));
    }
    Some(Status::Error(msg)) => {
      spans.push(Span::styled(format!(" {}", msg), Style::default().fg(Color::Red).bold()));
    }
    None => {}
  }

  let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
  frame.render_widget(paragraph, area);
}
