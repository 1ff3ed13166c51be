mod task_table;

pub use task_table::{draw_task_table, render_plain};
