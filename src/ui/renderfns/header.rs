use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

/// Draw the header bar: app title, server, and key hints
pub fn draw_header(frame: &mut Frame, area: Rect, title: &str, server_url: &str) {
  let mut spans = vec![
    Span::styled(format!(" {} ", title), Style::default().fg(Color::Cyan).bold()),
    Span::styled("│", Style::default().fg(Color::DarkGray)),
    Span::styled(
      format!(" {} ", extract_domain(server_url)),
      Style::default().fg(Color::White),
    ),
    Span::raw("  "),
  ];

  let shortcuts = [
    ("<a>", "add"),
    ("<e>", "edit"),
    ("<space>", "done"),
    ("<d>", "remove"),
    ("<r>", "refresh"),
    ("<:>", "command"),
    ("<q>", "quit"),
  ];
  for (key, label) in shortcuts {
    spans.push(Span::styled(key, Style::default().fg(Color::Cyan)));
    spans.push(Span::styled(
      format!(" {}   ", label),
      Style::default().fg(Color::DarkGray),
    ));
  }

  let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
  frame.render_widget(paragraph, area);
}

/// Host (and port) part of the server URL
fn extract_domain(url: &str) -> &str {
  let rest = url
    .strip_prefix("https://")
    .or_else(|| url.strip_prefix("http://"))
    .unwrap_or(url);
  rest.split('/').next().unwrap_or(rest)
}
