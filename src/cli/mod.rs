//! 命令行交互支持
//!
//! 命令解析与会话状态在 `commands`，表格输出在 `printer`

mod commands;
mod printer;

pub use commands::{CommandResult, Session};
pub use printer::{check_vertical_display, format_properties, PrintMode, Printer};
