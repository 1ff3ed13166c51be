use crate::tasks::{TaskRow, TaskTable};
use crate::ui::renderfns::{priority_color, truncate};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState};

const ACTIONS: &str = "Edit | Remove";

fn checkbox(row: &TaskRow) -> &'static str {
  if row.checked {
    "[x]"
  } else {
    "[ ]"
  }
}

fn task_row(row: &TaskRow) -> Row<'static> {
  let text_style = if row.struck {
    Style::default()
      .fg(Color::DarkGray)
      .add_modifier(Modifier::CROSSED_OUT)
  } else {
    Style::default().fg(Color::White)
  };

  let badge = Span::styled(
    format!(" {} ", row.priority),
    Style::default()
      .fg(Color::Black)
      .bg(priority_color(row.priority))
      .bold(),
  );

  Row::new(vec![
    Cell::from(checkbox(row)).style(Style::default().fg(Color::Cyan)),
    Cell::from(row.text.clone()).style(text_style),
    Cell::from(row.due.clone()),
    Cell::from(Line::from(badge)),
    Cell::from(ACTIONS).style(Style::default().fg(Color::DarkGray)),
  ])
}

/// Draw the task table with the selected row highlighted
pub fn draw_task_table(
  frame: &mut Frame,
  area: Rect,
  table: &TaskTable,
  state: &mut TableState,
  loading: bool,
) {
  let title = if loading && table.is_empty() {
    " Tasks (loading...) ".to_string()
  } else {
    format!(" Tasks ({}) ", table.len())
  };

  let block = Block::default()
    .title(title)
    .title_alignment(Alignment::Center)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Blue));

  if table.is_empty() && !loading {
    let paragraph = Paragraph::new("No tasks. Press 'a' to add one, 'r' to reload.")
      .block(block)
      .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(paragraph, area);
    return;
  }

  let header = Row::new(vec!["", "Task", "Due", "Priority", "Actions"])
    .style(Style::default().fg(Color::Yellow).bold());

  let widths = [
    Constraint::Length(3),
    Constraint::Min(20),
    Constraint::Length(12),
    Constraint::Length(10),
    Constraint::Length(ACTIONS.len() as u16),
  ];

  let rows: Vec<Row> = table.rows().iter().map(task_row).collect();

  let widget = Table::new(rows, widths)
    .header(header)
    .block(block)
    .column_spacing(2)
    .row_highlight_style(
      Style::default()
        .bg(Color::DarkGray)
        .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol("> ");

  frame.render_stateful_widget(widget, area, state);
}

/// Plain-text rendering of the table, for non-interactive output
pub fn render_plain(table: &TaskTable) -> String {
  if table.is_empty() {
    return "No tasks.\n".to_string();
  }

  let mut out = String::new();
  for row in table.rows() {
    let text = truncate(&row.text, 50);
    let text = if row.struck {
      // Combining long stroke overlay, one per character
      text.chars().flat_map(|c| [c, '\u{0336}']).collect()
    } else {
      text
    };
    let pad = 50usize.saturating_sub(row.text.chars().count().min(50));
    out.push_str(&format!(
      "{} {:>4}  {}{}  {:<12}  {:<6}\n",
      checkbox(row),
      row.id,
      text,
      " ".repeat(pad),
      row.due,
      row.priority,
    ));
  }
  out
}
