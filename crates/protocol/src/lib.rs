#![forbid(unsafe_code)]

mod command;
mod decoder;
mod frame;
mod parse;

pub use command::Command;
pub use decoder::Decoder;
pub use frame::Frame;
pub use parse::Parse;
