//! fagent 固有のドメイン型（型と不変条件）

pub mod command;
pub mod directive;
pub mod operation_table;

pub use command::{Command, Operation};
