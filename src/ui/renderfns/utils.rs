use ratatui::prelude::Color;

use crate::tasks::Priority;

/// Truncate to at most `max_len` characters, ending with "..." when cut
pub fn truncate(s: &str, max_len: usize) -> String {
  if s.chars().count() <= max_len {
    s.to_string()
  } else {
    let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
    format!("{}...", kept)
  }
}

/// Badge color for a task priority
pub fn priority_color(priority: Priority) -> Color {
  match priority {
    Priority::High => Color::Red,
    Priority::Medium => Color::Yellow,
    Priority::Low => Color::Green,
  }
}
