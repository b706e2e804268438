pub mod error;
pub mod time_window;

pub use time_window::{TimeWindow, TimeWindowError};
