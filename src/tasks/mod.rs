//! Task server client and the task view controller.

mod api_types;
mod client;
mod controller;
mod types;

pub use client::{TaskApi, TaskClient};
pub use controller::{Outcome, TaskAction, TaskController, TaskRow, TaskTable};
pub use types::{NewTask, Priority, TaskEdit};

#[cfg(test)]
pub use api_types::Ack;
#[cfg(test)]
pub use controller::NO_DUE_DATE;
#[cfg(test)]
pub use types::Task;
