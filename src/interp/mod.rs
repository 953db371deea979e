pub mod token;
pub mod validate;
pub mod parse;

pub use parse::{parse_line, Command, CommandSequence, Pipeline};
pub use validate::is_valid;
