mod command_input;
mod input;
mod prompt;

pub use command_input::{CommandEvent, CommandInput};
pub use prompt::{Prompt, PromptEvent, PromptKind};

/// How a component dealt with a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyResult<T> {
  /// Consumed, nothing for the parent to do
  Handled,
  /// Consumed, and the parent should act on this
  Event(T),
  /// Not consumed; try the next handler
  NotHandled,
}
