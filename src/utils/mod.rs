pub mod time;

pub use self::time::{Clock, format_clock_time};
