//! PICA200 命令流编解码与固定功能状态模型

pub mod commands;
pub mod float24;
pub mod registers;
pub mod state;
pub mod texenv;

pub use commands::{CommandReader, CommandWriter, PicaCommand};
