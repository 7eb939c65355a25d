pub mod documents;
pub mod source;

pub use documents::{CityRegistry, DaySchedule, Documents, Timetable};
pub use source::DataSource;
