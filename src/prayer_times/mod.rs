pub mod adjust;
pub mod resolver;

pub use adjust::{adjust_day, TimeError};
pub use resolver::next_prayer;
