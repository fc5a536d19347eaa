mod tinyflake;

pub use tinyflake::*;
