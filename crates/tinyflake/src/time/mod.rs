mod interface;
mod wall_clock;

pub use interface::*;
pub use wall_clock::*;
