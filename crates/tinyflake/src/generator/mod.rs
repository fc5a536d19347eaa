mod allocator;
mod global;
mod spin;
mod status;
#[cfg(test)]
mod tests;

pub use allocator::*;
pub use global::*;
pub use spin::*;
pub use status::*;
