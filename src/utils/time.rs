use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};

/// Produces the `HH:MM:SS` captions attached to transcript messages.
///
/// The local offset is resolved once, when the clock is built.  `time`
/// refuses to read the local offset once a process has several threads, so
/// build the clock before the first request spawns resolver threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Clock {
    offset: UtcOffset,
}

impl Clock {
    /// A clock in the machine's local offset, or UTC if that cannot be read.
    pub fn local() -> Self {
        let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
        Self { offset }
    }

    /// A clock pinned to UTC.
    pub fn utc() -> Self {
        Self {
            offset: UtcOffset::UTC,
        }
    }

    /// The current wall-clock time, `HH:MM:SS`.
    pub fn now(&self) -> String {
        format_clock_time(OffsetDateTime::now_utc().to_offset(self.offset))
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::local()
    }
}

/// Format the time-of-day part of `datetime` as `HH:MM:SS`.
pub fn format_clock_time(datetime: OffsetDateTime) -> String {
    let format = format_description!("[hour]:[minute]:[second]");
    datetime
        .format(&format)
        .unwrap_or_else(|_| "--:--:--".to_string())
}
