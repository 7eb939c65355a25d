pub mod prayer;
pub mod prefs;

pub use prayer::AdjustedPrayer;
pub use prefs::{Permission, Theme};
