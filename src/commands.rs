/// Command palette entries and autocomplete

#[derive(Debug, Clone)]
pub struct Command {
  pub name: &'static str,
  pub aliases: &'static [&'static str],
  pub description: &'static str,
}

/// All available commands
pub const COMMANDS: &[Command] = &[
  Command {
    name: "refresh",
    aliases: &["r", "reload"],
    description: "Reload the task list",
  },
  Command {
    name: "add",
    aliases: &["a", "new"],
    description: "Add a task (text @due !priority)",
  },
  Command {
    name: "edit",
    aliases: &["e"],
    description: "Edit the selected task",
  },
  Command {
    name: "complete",
    aliases: &["c", "done", "toggle"],
    description: "Toggle completion of the selected task",
  },
  Command {
    name: "remove",
    aliases: &["d", "rm", "delete"],
    description: "Remove the selected task",
  },
  Command {
    name: "quit",
    aliases: &["q", "exit"],
    description: "Exit doable",
  },
];

/// Get autocomplete suggestions for a given input
pub fn get_suggestions(input: &str) -> Vec<&'static Command> {
  let input_lower = input.trim().to_lowercase();

  if input_lower.is_empty() {
    return COMMANDS.iter().collect();
  }

  let mut matches: Vec<(&Command, u32)> = COMMANDS
    .iter()
    .filter_map(|cmd| match_rank(cmd, &input_lower).map(|rank| (cmd, rank)))
    .collect();

  matches.sort_by_key(|(_, rank)| *rank);
  matches.into_iter().map(|(cmd, _)| cmd).collect()
}

// Lower is better: exact name, exact alias, prefix, then substring.
fn match_rank(cmd: &Command, input: &str) -> Option<u32> {
  if cmd.name == input {
    Some(0)
  } else if cmd.aliases.contains(&input) {
    Some(1)
  } else if cmd.name.starts_with(input) {
    Some(2)
  } else if cmd.aliases.iter().any(|a| a.starts_with(input)) {
    Some(3)
  } else if cmd.name.contains(input) {
    Some(4)
  } else {
    None
  }
}
